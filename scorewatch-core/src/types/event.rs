//! Sporting events and the snapshot that holds them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, WatchError};

/// Opaque event identifier, stable across snapshots.
pub type EventId = String;

/// Every known event keyed by id.
///
/// Ordered by id so that iteration, and therefore diff output, is deterministic.
pub type Snapshot = BTreeMap<EventId, EventRecord>;

/// Scores keyed by segment, iterated Current first then Period1..4.
pub type Scores = BTreeMap<ScoreSegment, Score>;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle status of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventStatus {
    /// Scheduled, not started
    #[serde(rename = "PRE")]
    Pre,
    /// In play
    #[serde(rename = "LIVE")]
    Live,
    /// No longer present upstream. Terminal.
    #[serde(rename = "REMOVED")]
    Removed,
}

impl EventStatus {
    /// All statuses in declaration order.
    pub const ALL: [EventStatus; 3] = [EventStatus::Pre, EventStatus::Live, EventStatus::Removed];

    /// Wire text of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pre => "PRE",
            EventStatus::Live => "LIVE",
            EventStatus::Removed => "REMOVED",
        }
    }
}

impl FromStr for EventStatus {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PRE" => Ok(EventStatus::Pre),
            "LIVE" => Ok(EventStatus::Live),
            "REMOVED" => Ok(EventStatus::Removed),
            other => Err(WatchError::UnknownValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sport an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    /// Association football
    #[serde(rename = "FOOTBALL")]
    Football,
    /// Basketball
    #[serde(rename = "BASKETBALL")]
    Basketball,
    /// Tennis
    #[serde(rename = "TENNIS")]
    Tennis,
}

impl Sport {
    /// Wire text of the sport.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "FOOTBALL",
            Sport::Basketball => "BASKETBALL",
            Sport::Tennis => "TENNIS",
        }
    }
}

impl FromStr for Sport {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FOOTBALL" => Ok(Sport::Football),
            "BASKETBALL" => Ok(Sport::Basketball),
            "TENNIS" => Ok(Sport::Tennis),
            other => Err(WatchError::UnknownValue {
                kind: "sport",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score segment. Declaration order is the diff reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreSegment {
    /// Running total
    #[serde(rename = "CURRENT")]
    Current,
    /// First period
    #[serde(rename = "PERIOD_1")]
    Period1,
    /// Second period
    #[serde(rename = "PERIOD_2")]
    Period2,
    /// Third period
    #[serde(rename = "PERIOD_3")]
    Period3,
    /// Fourth period
    #[serde(rename = "PERIOD_4")]
    Period4,
}

impl ScoreSegment {
    /// Wire text of the segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSegment::Current => "CURRENT",
            ScoreSegment::Period1 => "PERIOD_1",
            ScoreSegment::Period2 => "PERIOD_2",
            ScoreSegment::Period3 => "PERIOD_3",
            ScoreSegment::Period4 => "PERIOD_4",
        }
    }
}

impl FromStr for ScoreSegment {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CURRENT" => Ok(ScoreSegment::Current),
            "PERIOD_1" => Ok(ScoreSegment::Period1),
            "PERIOD_2" => Ok(ScoreSegment::Period2),
            "PERIOD_3" => Ok(ScoreSegment::Period3),
            "PERIOD_4" => Ok(ScoreSegment::Period4),
            other => Err(WatchError::UnknownValue {
                kind: "score segment",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScoreSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side a competitor plays on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitorRole {
    /// Home side
    #[serde(rename = "HOME")]
    Home,
    /// Away side
    #[serde(rename = "AWAY")]
    Away,
}

impl fmt::Display for CompetitorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompetitorRole::Home => "HOME",
            CompetitorRole::Away => "AWAY",
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Home and away values of one score segment, kept as upstream text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Home side value
    pub home: String,
    /// Away side value
    pub away: String,
}

impl Score {
    /// Creates a score.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

/// A participant in an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    /// Side the competitor plays on
    #[serde(rename = "type")]
    pub role: CompetitorRole,
    /// Display name
    pub name: String,
}

/// Both participants of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitors {
    /// Home participant
    #[serde(rename = "HOME")]
    pub home: Competitor,
    /// Away participant
    #[serde(rename = "AWAY")]
    pub away: Competitor,
}

impl Competitors {
    /// Builds the pair from display names.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: Competitor {
                role: CompetitorRole::Home,
                name: home.into(),
            },
            away: Competitor {
                role: CompetitorRole::Away,
                name: away.into(),
            },
        }
    }
}

/// One sporting event as last observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event identifier
    pub id: EventId,
    /// Lifecycle status
    pub status: EventStatus,
    /// Scheduled start, UTC
    #[serde(serialize_with = "serialize_start_time")]
    pub start_time: DateTime<Utc>,
    /// Sport
    pub sport: Sport,
    /// Competition display name
    pub competition: String,
    /// Home and away participants
    pub competitors: Competitors,
    /// Reported scores; `None` until the event starts reporting
    pub scores: Option<Scores>,
}

/// Always renders the fractional seconds, `.000Z` included.
fn serialize_start_time<S: Serializer>(
    start_time: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&start_time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl EventRecord {
    /// Returns true once the event has been marked removed.
    pub fn is_removed(&self) -> bool {
        self.status == EventStatus::Removed
    }

    /// Returns a copy with the status replaced and every other field preserved.
    pub fn with_status(&self, status: EventStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Start time as an ISO-8601 instant with millisecond precision.
    pub fn start_time_iso(&self) -> String {
        self.start_time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Score for a segment, if reported.
    pub fn score(&self, segment: ScoreSegment) -> Option<&Score> {
        self.scores.as_ref().and_then(|s| s.get(&segment))
    }

    /// `<sport>, <competition>: <home> VS <away>`
    pub fn headline(&self) -> String {
        format!(
            "{}, {}: {} VS {}",
            self.sport, self.competition, self.competitors.home.name, self.competitors.away.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn sample() -> EventRecord {
        EventRecord {
            id: "1".into(),
            status: EventStatus::Live,
            start_time: Utc.timestamp_millis_opt(1_750_694_966_496).unwrap(),
            sport: Sport::Football,
            competition: "UEFA".into(),
            competitors: Competitors::new("Barcelona", "Manchester United"),
            scores: Some(Scores::from([(ScoreSegment::Current, Score::new("9", "8"))])),
        }
    }

    #[test_case("PRE", EventStatus::Pre ; "pre")]
    #[test_case("LIVE", EventStatus::Live ; "live")]
    #[test_case("REMOVED", EventStatus::Removed ; "removed")]
    fn test_status_round_trips_wire_text(wire: &str, status: EventStatus) {
        assert_eq!(wire.parse::<EventStatus>().unwrap(), status);
        assert_eq!(status.to_string(), wire);
    }

    #[test_case("CURRENT", ScoreSegment::Current ; "current")]
    #[test_case("PERIOD_1", ScoreSegment::Period1 ; "period one")]
    #[test_case("PERIOD_4", ScoreSegment::Period4 ; "period four")]
    fn test_segment_parses_wire_text(wire: &str, segment: ScoreSegment) {
        assert_eq!(wire.parse::<ScoreSegment>().unwrap(), segment);
        assert_eq!(segment.as_str(), wire);
    }

    #[test]
    fn test_unknown_wire_text_is_rejected() {
        let err = "live".parse::<EventStatus>().unwrap_err();
        assert_eq!(
            err,
            WatchError::UnknownValue {
                kind: "status",
                value: "live".into()
            }
        );
        assert!("CRICKET".parse::<Sport>().is_err());
        assert!("PERIOD_5".parse::<ScoreSegment>().is_err());
    }

    #[test]
    fn test_segments_order_current_first() {
        let scores = Scores::from([
            (ScoreSegment::Period2, Score::new("1", "0")),
            (ScoreSegment::Current, Score::new("3", "1")),
            (ScoreSegment::Period1, Score::new("2", "1")),
        ]);
        let order: Vec<_> = scores.keys().copied().collect();
        assert_eq!(
            order,
            vec![ScoreSegment::Current, ScoreSegment::Period1, ScoreSegment::Period2]
        );
    }

    #[test]
    fn test_with_status_preserves_other_fields() {
        let event = sample();
        let removed = event.with_status(EventStatus::Removed);
        assert!(removed.is_removed());
        assert_eq!(removed.id, event.id);
        assert_eq!(removed.scores, event.scores);
        assert_eq!(removed.competitors, event.competitors);
        assert!(!event.is_removed());
    }

    #[test]
    fn test_start_time_iso_millis() {
        assert_eq!(sample().start_time_iso(), "2025-06-23T16:09:26.496Z");
    }

    #[test]
    fn test_headline() {
        assert_eq!(
            sample().headline(),
            "FOOTBALL, UEFA: Barcelona VS Manchester United"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["status"], "LIVE");
        assert_eq!(json["startTime"], "2025-06-23T16:09:26.496Z");
        assert_eq!(json["competitors"]["HOME"]["type"], "HOME");
        assert_eq!(json["competitors"]["AWAY"]["name"], "Manchester United");
        assert_eq!(json["scores"]["CURRENT"]["home"], "9");

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_start_time_keeps_zero_millis() {
        let event = EventRecord {
            start_time: Utc.timestamp_millis_opt(0).unwrap(),
            ..sample()
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["startTime"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["startTime"], event.start_time_iso().as_str());

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.start_time, event.start_time);
    }
}
