//! Refreshes the shared cache of catalog program data.
//!
//! The refresh job asks the catalog service for every active or retired
//! program, fetches each program's detail document, and writes the documents
//! and the UUID index into a cache store with no expiry. Runs are single pass
//! and sequential; a degraded run is reported through the exit status.

pub mod accounts;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod refresh;
pub mod show;
pub mod sites;

pub use error::{ProgramCacheError, Result};
