use std::fmt;

use chrono::{DateTime, Utc};
use vendorbook_store::StoreError;

#[derive(Debug)]
pub enum ReconError {
    /// Store read or write failed.
    Store(StoreError),
    /// Plan file is not a valid plan.
    PlanParse(String),
    /// Plan file could not be read or written.
    Io(String),
    /// The plan was applied before, at the given time.
    AlreadyApplied(DateTime<Utc>),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "{e}"),
            Self::PlanParse(msg) => write!(f, "invalid import plan: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::AlreadyApplied(at) => write!(
                f,
                "import plan was already applied at {}",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ReconError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
