//! Parsing of the raw event state payload.
//!
//! One event per line, comma separated:
//!
//! ```text
//! id,sport,competition,startTime,home,away,status,scores
//! 1,FOOTBALL,UEFA,1750694966496,Barcelona,ManUtd,LIVE,CURRENT@9:8|PERIOD_1@7:8
//! ```
//!
//! Every field except `id`, `startTime` and `scores` is a code resolved through
//! the name mapping; unknown codes are kept verbatim.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use tracing::{debug, warn};

use scorewatch_core::constants::{
    FIELD_SEPARATOR, RECORD_FIELD_COUNT, RECORD_SEPARATOR, SCORE_SEPARATOR, SEGMENT_SEPARATOR,
    SIDE_SEPARATOR,
};
use scorewatch_core::error::{Result, WatchError};
use scorewatch_core::traits::NameLookup;
use scorewatch_core::types::{
    Competitors, EventRecord, EventStatus, NameMapping, Score, ScoreSegment, Scores, Snapshot,
    Sport,
};

/// Parses a whole state payload.
///
/// Blank lines are ignored. Malformed records are logged and left out; they
/// never fail the payload as a whole.
pub fn parse_snapshot(raw: &str, mapping: &NameMapping, lookup: &dyn NameLookup) -> Snapshot {
    let mut snapshot = Snapshot::new();
    let mut skipped = 0usize;

    for line in raw.split(RECORD_SEPARATOR) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_record(line, mapping, lookup) {
            Ok(record) => {
                if snapshot.contains_key(&record.id) {
                    debug!(id = %record.id, "Duplicate event id, keeping the later record");
                }
                snapshot.insert(record.id.clone(), record);
            }
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "Skipping malformed event record");
            }
        }
    }

    debug!(events = snapshot.len(), skipped, "Parsed event state");
    snapshot
}

/// Parses one event record line.
pub fn parse_record(
    line: &str,
    mapping: &NameMapping,
    lookup: &dyn NameLookup,
) -> Result<EventRecord> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < RECORD_FIELD_COUNT {
        return Err(WatchError::record(
            line,
            format!(
                "expected {} fields, found {}",
                RECORD_FIELD_COUNT,
                fields.len()
            ),
        ));
    }

    let id = fields[0].trim();
    if id.is_empty() {
        return Err(WatchError::record(line, "empty event id"));
    }

    let sport = lookup
        .resolve_or_code(fields[1], mapping)
        .parse::<Sport>()
        .map_err(|e| WatchError::record(id, e.to_string()))?;
    let competition = lookup.resolve_or_code(fields[2], mapping);
    let start_time = parse_start_time(fields[3]).map_err(|e| WatchError::record(id, e))?;
    let competitors = Competitors::new(
        lookup.resolve_or_code(fields[4], mapping),
        lookup.resolve_or_code(fields[5], mapping),
    );
    let status = lookup
        .resolve_or_code(fields[6], mapping)
        .parse::<EventStatus>()
        .map_err(|e| WatchError::record(id, e.to_string()))?;
    let scores = parse_scores(fields[7], mapping, lookup)
        .map_err(|e| WatchError::record(id, e.to_string()))?;

    Ok(EventRecord {
        id: id.to_string(),
        status,
        start_time,
        sport,
        competition,
        competitors,
        scores,
    })
}

/// Parses the scores field.
///
/// Returns `None` when no segment is reported. A repeated segment keeps the
/// last value.
pub fn parse_scores(
    field: &str,
    mapping: &NameMapping,
    lookup: &dyn NameLookup,
) -> Result<Option<Scores>> {
    let entries: Vec<&str> = field.split(SCORE_SEPARATOR).collect();
    if entries.iter().all(|entry| entry.trim().is_empty()) {
        return Ok(None);
    }

    let mut scores = Scores::new();
    for entry in entries {
        let (segment_code, pair) = entry.split_once(SEGMENT_SEPARATOR).ok_or_else(|| {
            WatchError::UnknownValue {
                kind: "score entry",
                value: entry.to_string(),
            }
        })?;
        let (home, away) = pair
            .split_once(SIDE_SEPARATOR)
            .ok_or_else(|| WatchError::UnknownValue {
                kind: "score pair",
                value: pair.to_string(),
            })?;
        let segment = lookup.resolve_or_code(segment_code, mapping).parse::<ScoreSegment>()?;

        scores.insert(segment, Score::new(home.trim(), away.trim()));
    }

    Ok(Some(scores))
}

/// Renders epoch milliseconds as an ISO-8601 UTC instant with millisecond precision.
///
/// `1750694966496` becomes `2025-06-23T16:09:26.496Z`.
pub fn format_start_time(raw: &str) -> Result<String> {
    let start_time = parse_start_time(raw).map_err(|reason| WatchError::UnknownValue {
        kind: "start time",
        value: reason,
    })?;
    Ok(start_time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_start_time(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let millis: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("start time '{}' is not epoch millis", raw))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| format!("start time '{}' is out of range", raw))
}
