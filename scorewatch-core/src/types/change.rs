//! Field-level changes detected between two snapshots.

use std::fmt;

use serde::{Serialize, Serializer};

use super::event::{EventId, ScoreSegment};

/// What changed on an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Status transition
    Status,
    /// A segment reported for the first time
    NewPeriod(ScoreSegment),
    /// An already reported segment changed value
    Score(ScoreSegment),
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Status => f.write_str("Change in status"),
            ChangeKind::NewPeriod(segment) => write!(f, "New period {}", segment),
            ChangeKind::Score(segment) => write!(f, "Change in {} score", segment),
        }
    }
}

impl Serialize for ChangeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One delta between the previous and the merged snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Event the change belongs to
    pub id: EventId,
    /// What changed
    pub kind: ChangeKind,
    /// Previous value; `None` for a newly reported segment
    pub old_value: Option<String>,
    /// Current value
    pub new_value: String,
}

impl ChangeRecord {
    /// Creates a change record.
    pub fn new(
        id: impl Into<EventId>,
        kind: ChangeKind,
        old_value: Option<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            old_value,
            new_value: new_value.into(),
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.kind,
            self.old_value.as_deref().unwrap_or("null"),
            self.new_value
        )
    }
}
