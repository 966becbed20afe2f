//! Wire-format separators and service defaults.

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT PAYLOAD FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Separates event records within a state payload.
pub const RECORD_SEPARATOR: char = '\n';

/// Separates fields within an event record.
pub const FIELD_SEPARATOR: char = ',';

/// Number of fields a well-formed event record carries.
///
/// `id, sport, competition, startTime, home, away, status, scores`
pub const RECORD_FIELD_COUNT: usize = 8;

/// Separates score triples within the scores field.
pub const SCORE_SEPARATOR: char = '|';

/// Separates the segment code from the `home:away` pair.
pub const SEGMENT_SEPARATOR: char = '@';

/// Separates home and away values in a score.
pub const SIDE_SEPARATOR: char = ':';

// ═══════════════════════════════════════════════════════════════════════════════
// MAPPING PAYLOAD FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Separates `code:name` pairs within a mapping payload.
pub const MAPPING_PAIR_SEPARATOR: char = ';';

/// Separates the code from its display name.
pub const MAPPING_VALUE_SEPARATOR: char = ':';

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Default base URL of the upstream feed.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Path serving the event state payload.
pub const STATE_PATH: &str = "/api/state";

/// Path serving the name mapping payload.
pub const MAPPINGS_PATH: &str = "/api/mappings";

/// Default upstream request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHING & SCHEDULING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default lifetime of a fetched name mapping (2 minutes).
pub const DEFAULT_MAPPING_TTL_SECS: u64 = 120;

/// Default lifetime of a fetched state snapshot.
///
/// Zero keeps single-flight deduplication without ever serving a cached snapshot.
pub const DEFAULT_STATE_TTL_MS: u64 = 0;

/// Default interval between reconciliation cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// READ API
// ═══════════════════════════════════════════════════════════════════════════════

/// Default bind address of the read API.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default port of the read API.
pub const DEFAULT_API_PORT: u16 = 4000;
