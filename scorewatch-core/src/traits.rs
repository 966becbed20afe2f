//! Common traits for scorewatch.
//!
//! These are the seams between the reconciliation core and its collaborators:
//! the upstream transport, name resolution, and whatever consumes the changes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChangeRecord, NameMapping, Snapshot};

// ═══════════════════════════════════════════════════════════════════════════════
// FEED SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface to the upstream feed.
///
/// Implementations return the raw payloads; parsing happens downstream.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches the newline-separated event state payload.
    async fn fetch_state(&self) -> Result<String>;

    /// Fetches the `;`-separated name mapping payload.
    async fn fetch_mappings(&self) -> Result<String>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAME LOOKUP TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolution of opaque codes against a mapping snapshot.
pub trait NameLookup: Send + Sync {
    /// Resolves `code` in `mapping`.
    ///
    /// Returns `WatchError::NameNotFound` when the code is absent.
    fn lookup(&self, code: &str, mapping: &NameMapping) -> Result<String>;

    /// Resolves `code`, falling back to the code itself when the lookup fails.
    ///
    /// Surrounding whitespace is trimmed and empty codes are never looked up.
    fn resolve_or_code(&self, code: &str, mapping: &NameMapping) -> String {
        let code = code.trim();
        if code.is_empty() {
            return String::new();
        }
        self.lookup(code, mapping).unwrap_or_else(|_| code.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHANGE REPORTER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Consumer of the ordered change list produced by each cycle.
pub trait ChangeReporter: Send + Sync {
    /// Reports `changes`; `snapshot` is the merged snapshot they were computed against.
    fn report(&self, changes: &[ChangeRecord], snapshot: &Snapshot);
}
