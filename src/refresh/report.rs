// Refresh run report.
// Collects per-item and per-site failures and derives the process exit status.

use std::fmt;
use std::process::ExitCode;

use chrono::{DateTime, Utc};

use crate::sites::TenancyMode;

/// A recoverable failure recorded during a refresh run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    /// No catalog client could be built for the site.
    Client { site: Option<String>, error: String },
    /// The site's program UUID list could not be fetched.
    ProgramIndex { site: Option<String>, error: String },
    /// One program's detail document could not be fetched.
    ProgramDetail {
        uuid: String,
        site: Option<String>,
        error: String,
    },
}

impl RefreshFailure {
    pub fn site(&self) -> Option<&str> {
        match self {
            RefreshFailure::Client { site, .. }
            | RefreshFailure::ProgramIndex { site, .. }
            | RefreshFailure::ProgramDetail { site, .. } => site.as_deref(),
        }
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let site = self.site().unwrap_or("-");
        match self {
            RefreshFailure::Client { error, .. } => {
                write!(f, "[{}] client setup failed: {}", site, error)
            }
            RefreshFailure::ProgramIndex { error, .. } => {
                write!(f, "[{}] program UUID request failed: {}", site, error)
            }
            RefreshFailure::ProgramDetail { uuid, error, .. } => {
                write!(f, "[{}] program {} failed: {}", site, uuid, error)
            }
        }
    }
}

/// An index entry written at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexWrite {
    pub key: String,
    pub site: Option<String>,
    pub count: usize,
}

/// Outcome of one refresh run.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub mode: TenancyMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// UUIDs received across all index requests.
    pub uuids_received: usize,
    /// Detail requests issued.
    pub programs_requested: usize,
    /// Detail documents written to the cache.
    pub programs_cached: usize,
    pub indexes: Vec<IndexWrite>,
    pub failures: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn new(mode: TenancyMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            finished_at: None,
            uuids_received: 0,
            programs_requested: 0,
            programs_cached: 0,
            indexes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, failure: RefreshFailure) {
        self.failures.push(failure);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Whether any item or site failed.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Numeric exit status: 0 for a clean run, 1 for a degraded one.
    pub fn exit_status(&self) -> u8 {
        if self.is_degraded() { 1 } else { 0 }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
