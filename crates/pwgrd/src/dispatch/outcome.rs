//! Per-request outcome labels for structured logs.

use std::fmt;

/// How a lookup concluded, recorded on every dispatch log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The record existed and was answered.
    Found,
    /// The directory has no such record.
    NotFound,
    /// The directory backend failed.
    BackendError,
    /// The group name is not UTF-8 and so cannot name a group.
    InvalidName,
}

impl DispatchOutcome {
    /// Stable label used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::BackendError => "backend_error",
            Self::InvalidName => "invalid_name",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
