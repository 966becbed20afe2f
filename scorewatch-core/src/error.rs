//! Error types for scorewatch.
//!
//! Every variant carries owned context only, which keeps [`WatchError`] `Clone`:
//! a single failed upstream fetch is handed to every caller waiting on it.

use thiserror::Error;

/// Result type alias using `WatchError`.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Main error type for all scorewatch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Upstream unreachable or response body undecodable.
    #[error("Fetch of {resource} failed: {reason}")]
    FetchFailed {
        /// Upstream resource (path or logical name)
        resource: String,
        /// Transport or decoding failure
        reason: String,
    },

    /// Upstream answered with a non-success status.
    #[error("Fetch of {resource} returned status {status}")]
    UpstreamStatus {
        /// Upstream resource (path or logical name)
        resource: String,
        /// HTTP status code
        status: u16,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // NAME RESOLUTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Code missing from the name mapping.
    #[error("No name for id {0}")]
    NameNotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // PARSING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A single event record could not be parsed.
    #[error("Malformed record '{id}': {reason}")]
    RecordParse {
        /// Event id, or the raw line when the id is unavailable
        id: String,
        /// What was wrong with the record
        reason: String,
    },

    /// Wire text that names no known enum variant.
    #[error("Unknown {kind} '{value}'")]
    UnknownValue {
        /// Which enumeration was being parsed
        kind: &'static str,
        /// The offending text
        value: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WatchError {
    /// Creates a fetch failure for the given resource.
    pub fn fetch(resource: impl Into<String>, reason: impl ToString) -> Self {
        WatchError::FetchFailed {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a record parse failure.
    pub fn record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        WatchError::RecordParse {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the failure is transient and the next cycle may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WatchError::FetchFailed { .. }
                | WatchError::UpstreamStatus { .. }
                | WatchError::NameNotFound(_)
        )
    }

    /// Returns true if this is an upstream fetch error.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            WatchError::FetchFailed { .. } | WatchError::UpstreamStatus { .. }
        )
    }

    /// Returns true if this is a parsing error.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            WatchError::RecordParse { .. } | WatchError::UnknownValue { .. }
        )
    }
}
