// Refresh module.
// The scheduled job that repopulates the program cache, and its run report.

pub mod job;
pub mod report;

pub use job::RefreshJob;
pub use report::{IndexWrite, RefreshFailure, RefreshReport};
