//! Change reporting through `tracing`.

use tracing::info;

use scorewatch_core::traits::ChangeReporter;
use scorewatch_core::types::{ChangeRecord, EventRecord, Snapshot};

/// Renders a change with its event headline.
///
/// `[FOOTBALL, UEFA: Barcelona VS Manchester United]: Change in CURRENT score: 1:2 -> 2:2`
///
/// Falls back to the bare event id when the event is unknown.
pub fn format_change(change: &ChangeRecord, event: Option<&EventRecord>) -> String {
    match event {
        Some(event) => format!("[{}]: {}", event.headline(), change),
        None => format!("[{}]: {}", change.id, change),
    }
}

/// Reporter writing one `info` line per change.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl ChangeReporter for LogReporter {
    fn report(&self, changes: &[ChangeRecord], snapshot: &Snapshot) {
        for change in changes {
            info!(
                id = %change.id,
                "{}",
                format_change(change, snapshot.get(&change.id))
            );
        }
    }
}
