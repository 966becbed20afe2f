//! Reconciliation of freshly fetched snapshots against the authoritative one.
//!
//! Events are never deleted: an event missing from a fetch is kept with its
//! status rewritten to `REMOVED`, and a removed event stays removed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, instrument};

use scorewatch_core::types::{ChangeKind, ChangeRecord, EventRecord, EventStatus, Snapshot};

/// Counts over the authoritative snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    /// Every known event, removed ones included
    pub total: usize,
    /// Events not yet started
    pub pre: usize,
    /// Events in play
    pub live: usize,
    /// Events no longer reported upstream
    pub removed: usize,
    /// Number of fetched snapshots applied so far
    pub cycles: u64,
    /// When the snapshot was last swapped
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct EngineState {
    snapshot: Arc<Snapshot>,
    cycles: u64,
    updated_at: Option<DateTime<Utc>>,
}

/// Owner of the authoritative snapshot.
///
/// Readers clone the inner `Arc` and never hold the lock beyond that; the
/// snapshot is only ever swapped wholesale.
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    state: RwLock<EngineState>,
}

impl ReconciliationEngine {
    /// Creates an engine with an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine seeded with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(EngineState {
                snapshot: Arc::new(snapshot),
                ..Default::default()
            }),
        }
    }

    /// The authoritative snapshot.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read().snapshot)
    }

    /// The authoritative snapshot without removed events.
    pub fn active_snapshot(&self) -> Snapshot {
        self.current_snapshot()
            .iter()
            .filter(|(_, record)| !record.is_removed())
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Looks up one event, removed or not.
    pub fn event_by_id(&self, id: &str) -> Option<EventRecord> {
        self.current_snapshot().get(id).cloned()
    }

    /// Swaps the authoritative snapshot. Not counted as an applied cycle.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut state = self.state.write();
        state.snapshot = Arc::new(snapshot);
        state.updated_at = Some(Utc::now());
    }

    /// Merges `new_snapshot` into the authoritative snapshot without storing the result.
    pub fn merge(&self, new_snapshot: &Snapshot) -> Snapshot {
        merge_snapshots(&self.current_snapshot(), new_snapshot)
    }

    /// Field-level changes from `old` to `new`.
    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> Vec<ChangeRecord> {
        diff_snapshots(old, new)
    }

    /// Merges, diffs against the authoritative snapshot and replaces it.
    ///
    /// Returns the changes together with the snapshot they were computed against.
    #[instrument(skip_all, fields(events = new_snapshot.len()))]
    pub fn apply(&self, new_snapshot: &Snapshot) -> (Vec<ChangeRecord>, Arc<Snapshot>) {
        let mut state = self.state.write();
        let merged = merge_snapshots(&state.snapshot, new_snapshot);
        let changes = diff_snapshots(&state.snapshot, &merged);

        let merged = Arc::new(merged);
        state.snapshot = Arc::clone(&merged);
        state.cycles += 1;
        state.updated_at = Some(Utc::now());

        debug!(changes = changes.len(), total = merged.len(), "Applied snapshot");
        (changes, merged)
    }

    /// Counts over the authoritative snapshot.
    pub fn stats(&self) -> SnapshotStats {
        let state = self.state.read();
        let mut stats = SnapshotStats {
            total: state.snapshot.len(),
            cycles: state.cycles,
            updated_at: state.updated_at,
            ..Default::default()
        };
        for record in state.snapshot.values() {
            match record.status {
                EventStatus::Pre => stats.pre += 1,
                EventStatus::Live => stats.live += 1,
                EventStatus::Removed => stats.removed += 1,
            }
        }
        stats
    }
}

/// Merges a fresh snapshot into the previous one.
///
/// Every record of `new` is taken as-is, except that an event already removed
/// in `old` stays removed. Events of `old` missing from `new` are carried over
/// with status `REMOVED`.
pub fn merge_snapshots(old: &Snapshot, new: &Snapshot) -> Snapshot {
    let mut merged: Snapshot = new
        .iter()
        .map(|(id, record)| {
            let record = match old.get(id) {
                Some(previous) if previous.is_removed() && !record.is_removed() => {
                    record.with_status(EventStatus::Removed)
                }
                _ => record.clone(),
            };
            (id.clone(), record)
        })
        .collect();

    for (id, record) in old {
        if !merged.contains_key(id) {
            let record = if record.is_removed() {
                record.clone()
            } else {
                record.with_status(EventStatus::Removed)
            };
            merged.insert(id.clone(), record);
        }
    }

    merged
}

/// Changes between two snapshots, for events present in both.
///
/// Per event, a status change comes first, then score changes in segment
/// order. Segments that disappear are not reported.
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for (id, current) in new {
        let Some(previous) = old.get(id) else {
            continue;
        };

        if previous.status != current.status {
            changes.push(ChangeRecord::new(
                id.as_str(),
                ChangeKind::Status,
                Some(previous.status.to_string()),
                current.status.to_string(),
            ));
        }

        let Some(scores) = &current.scores else {
            continue;
        };
        for (segment, score) in scores {
            match previous.score(*segment) {
                None => changes.push(ChangeRecord::new(
                    id.as_str(),
                    ChangeKind::NewPeriod(*segment),
                    None,
                    score.to_string(),
                )),
                Some(old_score) if old_score != score => changes.push(ChangeRecord::new(
                    id.as_str(),
                    ChangeKind::Score(*segment),
                    Some(old_score.to_string()),
                    score.to_string(),
                )),
                Some(_) => {}
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use scorewatch_core::types::{Competitors, Score, ScoreSegment, Scores, Sport};

    fn event(id: &str, status: EventStatus) -> EventRecord {
        EventRecord {
            id: id.into(),
            status,
            start_time: Utc.timestamp_millis_opt(1_750_694_966_496).unwrap(),
            sport: Sport::Football,
            competition: "UEFA".into(),
            competitors: Competitors::new("Barcelona", "Manchester United"),
            scores: None,
        }
    }

    fn scored(
        id: &str,
        status: EventStatus,
        entries: &[(ScoreSegment, &str, &str)],
    ) -> EventRecord {
        EventRecord {
            scores: Some(
                entries
                    .iter()
                    .map(|(segment, home, away)| (*segment, Score::new(*home, *away)))
                    .collect(),
            ),
            ..event(id, status)
        }
    }

    fn current(id: &str, status: EventStatus, home: &str, away: &str) -> EventRecord {
        scored(id, status, &[(ScoreSegment::Current, home, away)])
    }

    fn snapshot(records: Vec<EventRecord>) -> Snapshot {
        records.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn test_missing_event_is_marked_removed() {
        let live = current("1", EventStatus::Live, "1", "0");
        let engine = ReconciliationEngine::with_snapshot(snapshot(vec![live.clone()]));

        let merged = engine.merge(&Snapshot::new());
        assert_eq!(merged["1"], live.with_status(EventStatus::Removed));

        let changes = engine.diff(&engine.current_snapshot(), &merged);
        assert_eq!(
            changes,
            vec![ChangeRecord::new("1", ChangeKind::Status, Some("LIVE".into()), "REMOVED")]
        );
        assert_eq!(changes[0].to_string(), "Change in status: LIVE -> REMOVED");
    }

    #[test]
    fn test_score_change() {
        let old = snapshot(vec![current("1", EventStatus::Live, "1", "2")]);
        let new = snapshot(vec![current("1", EventStatus::Live, "2", "2")]);

        assert_eq!(
            diff_snapshots(&old, &new),
            vec![ChangeRecord::new(
                "1",
                ChangeKind::Score(ScoreSegment::Current),
                Some("1:2".into()),
                "2:2"
            )]
        );
    }

    #[test]
    fn test_new_period_from_absent_scores() {
        let old = snapshot(vec![event("1", EventStatus::Pre)]);
        let new = snapshot(vec![current("1", EventStatus::Pre, "1", "2")]);

        assert_eq!(
            diff_snapshots(&old, &new),
            vec![ChangeRecord::new("1", ChangeKind::NewPeriod(ScoreSegment::Current), None, "1:2")]
        );
    }

    #[test]
    fn test_status_change_precedes_score_changes_in_segment_order() {
        let old = snapshot(vec![current("1", EventStatus::Pre, "0", "0")]);
        let new = snapshot(vec![scored(
            "1",
            EventStatus::Live,
            &[
                (ScoreSegment::Period2, "1", "0"),
                (ScoreSegment::Current, "1", "0"),
                (ScoreSegment::Period1, "0", "0"),
            ],
        )]);

        let kinds: Vec<ChangeKind> = diff_snapshots(&old, &new)
            .into_iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Status,
                ChangeKind::Score(ScoreSegment::Current),
                ChangeKind::NewPeriod(ScoreSegment::Period1),
                ChangeKind::NewPeriod(ScoreSegment::Period2),
            ]
        );
    }

    #[test]
    fn test_disappearing_segment_not_reported() {
        let old = snapshot(vec![scored(
            "1",
            EventStatus::Live,
            &[(ScoreSegment::Current, "1", "0"), (ScoreSegment::Period1, "1", "0")],
        )]);
        let new = snapshot(vec![current("1", EventStatus::Live, "1", "0")]);
        assert!(diff_snapshots(&old, &new).is_empty());

        let new = snapshot(vec![event("1", EventStatus::Live)]);
        assert!(diff_snapshots(&old, &new).is_empty());
    }

    #[test]
    fn test_new_events_produce_no_changes() {
        let new = snapshot(vec![current("9", EventStatus::Live, "3", "1")]);
        assert!(diff_snapshots(&Snapshot::new(), &new).is_empty());
    }

    #[test]
    fn test_removed_event_reappearing_stays_removed() {
        let old = snapshot(vec![event("1", EventStatus::Removed)]);
        let new = snapshot(vec![current("1", EventStatus::Live, "1", "0")]);

        let merged = merge_snapshots(&old, &new);
        assert_eq!(merged["1"].status, EventStatus::Removed);
        assert!(merged["1"].scores.is_some());

        assert_eq!(
            diff_snapshots(&old, &merged),
            vec![ChangeRecord::new("1", ChangeKind::NewPeriod(ScoreSegment::Current), None, "1:0")]
        );
    }

    #[test]
    fn test_already_removed_event_carried_forward() {
        let removed = event("1", EventStatus::Removed);
        let merged = merge_snapshots(&snapshot(vec![removed.clone()]), &Snapshot::new());
        assert_eq!(merged["1"], removed);
        assert!(diff_snapshots(&snapshot(vec![removed]), &merged).is_empty());
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let old = snapshot(vec![event("1", EventStatus::Live)]);
        let new = snapshot(vec![event("2", EventStatus::Pre)]);
        let (old_copy, new_copy) = (old.clone(), new.clone());

        let _ = merge_snapshots(&old, &new);
        assert_eq!(old, old_copy);
        assert_eq!(new, new_copy);
    }

    #[test]
    fn test_apply_replaces_snapshot_and_returns_changes() {
        let engine = ReconciliationEngine::new();
        let first = snapshot(vec![
            current("1", EventStatus::Live, "0", "0"),
            event("2", EventStatus::Pre),
        ]);

        let (changes, merged) = engine.apply(&first);
        assert!(changes.is_empty());
        assert_eq!(merged.len(), 2);

        let second = snapshot(vec![current("1", EventStatus::Live, "1", "0")]);
        let (changes, merged) = engine.apply(&second);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].id, "1");
        assert_eq!(changes[1].kind, ChangeKind::Status);
        assert_eq!(merged["2"].status, EventStatus::Removed);

        assert_eq!(*engine.current_snapshot(), *merged);
        assert_eq!(engine.active_snapshot().len(), 1);
        assert_eq!(engine.event_by_id("2").unwrap().status, EventStatus::Removed);
        assert!(engine.event_by_id("3").is_none());

        let stats = engine.stats();
        assert_eq!((stats.total, stats.live, stats.removed, stats.pre), (2, 1, 1, 0));
        assert_eq!(stats.cycles, 2);
        assert!(stats.updated_at.is_some());
    }

    #[test]
    fn test_replace_swaps_without_touching_readers() {
        let engine =
            ReconciliationEngine::with_snapshot(snapshot(vec![event("1", EventStatus::Live)]));
        let held = engine.current_snapshot();

        engine.replace(Snapshot::new());
        assert_eq!(held.len(), 1);
        assert!(engine.current_snapshot().is_empty());
    }

    #[test]
    fn test_replace_is_not_counted_as_cycle() {
        let engine = ReconciliationEngine::new();
        engine.replace(snapshot(vec![event("1", EventStatus::Live)]));

        let stats = engine.stats();
        assert_eq!(stats.cycles, 0);
        assert_eq!(stats.total, 1);
        assert!(stats.updated_at.is_some());

        engine.apply(&Snapshot::new());
        engine.replace(Snapshot::new());
        assert_eq!(engine.stats().cycles, 1);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PROPERTIES
    // ═══════════════════════════════════════════════════════════════════════════

    fn status_strategy() -> impl Strategy<Value = EventStatus> {
        prop_oneof![
            Just(EventStatus::Pre),
            Just(EventStatus::Live),
            Just(EventStatus::Removed)
        ]
    }

    fn scores_strategy() -> impl Strategy<Value = Option<Scores>> {
        let segment = prop_oneof![
            Just(ScoreSegment::Current),
            Just(ScoreSegment::Period1),
            Just(ScoreSegment::Period2),
            Just(ScoreSegment::Period3),
            Just(ScoreSegment::Period4),
        ];
        proptest::option::of(proptest::collection::btree_map(
            segment,
            (0u8..4, 0u8..4).prop_map(|(h, a)| Score::new(h.to_string(), a.to_string())),
            0..4,
        ))
    }

    fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
        proptest::collection::btree_map(
            (0u8..8).prop_map(|n| n.to_string()),
            (status_strategy(), scores_strategy()),
            0..6,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(id, (status, scores))| {
                    let record = EventRecord {
                        scores,
                        ..event(&id, status)
                    };
                    (id, record)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_removal_is_monotonic(old in snapshot_strategy(), new in snapshot_strategy()) {
            let merged = merge_snapshots(&old, &new);
            for (id, record) in &old {
                if record.is_removed() {
                    prop_assert_eq!(merged[id].status, EventStatus::Removed);
                }
            }
        }

        #[test]
        fn test_merge_is_complete(old in snapshot_strategy(), new in snapshot_strategy()) {
            let merged = merge_snapshots(&old, &new);
            for (id, record) in &new {
                let expected = match old.get(id) {
                    Some(previous) if previous.is_removed() => {
                        record.with_status(EventStatus::Removed)
                    }
                    _ => record.clone(),
                };
                prop_assert_eq!(&merged[id], &expected);
            }
            for (id, record) in &old {
                if !new.contains_key(id) {
                    prop_assert_eq!(&merged[id], &record.with_status(EventStatus::Removed));
                }
            }
            prop_assert!(merged.keys().all(|id| old.contains_key(id) || new.contains_key(id)));
        }

        #[test]
        fn test_diff_is_deterministic(old in snapshot_strategy(), new in snapshot_strategy()) {
            prop_assert_eq!(diff_snapshots(&old, &new), diff_snapshots(&old, &new));
        }

        #[test]
        fn test_diff_only_touches_shared_ids(
            old in snapshot_strategy(),
            new in snapshot_strategy(),
        ) {
            for change in diff_snapshots(&old, &new) {
                prop_assert!(old.contains_key(&change.id) && new.contains_key(&change.id));
            }
        }
    }
}
