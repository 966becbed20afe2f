//! Mapping payload parsing.

use scorewatch_core::constants::{MAPPING_PAIR_SEPARATOR, MAPPING_VALUE_SEPARATOR};
use scorewatch_core::types::NameMapping;

/// Parses a `code:name;code:name` payload.
///
/// Splitting is literal: an empty payload yields a single `"" -> ""` entry, a
/// pair without `:` maps its code to `""`, and anything after a second `:` is
/// dropped. A repeated code keeps its last name.
pub fn parse_mapping(raw: &str) -> NameMapping {
    raw.split(MAPPING_PAIR_SEPARATOR)
        .map(|pair| {
            let mut parts = pair.split(MAPPING_VALUE_SEPARATOR);
            let code = parts.next().unwrap_or_default();
            let name = parts.next().unwrap_or_default();
            (code.to_string(), name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parses_pairs() {
        let mapping = parse_mapping("id1:Name 1;id2:Name 2");
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["id1"], "Name 1");
        assert_eq!(mapping["id2"], "Name 2");
    }

    #[test_case("", "", "" ; "empty payload yields empty key")]
    #[test_case("orphan;id1:Name 1", "orphan", "" ; "pair without separator")]
    #[test_case("id1:Half:Time", "id1", "Half" ; "extra separator truncates")]
    #[test_case("id1:Old;id1:New", "id1", "New" ; "repeated code keeps last")]
    fn test_literal_split_edge_cases(raw: &str, code: &str, name: &str) {
        assert_eq!(parse_mapping(raw).get(code).map(String::as_str), Some(name));
    }

    #[test]
    fn test_repeated_code_collapses() {
        assert_eq!(parse_mapping("id1:Old;id1:New").len(), 1);
        assert_eq!(parse_mapping("").len(), 1);
    }
}
