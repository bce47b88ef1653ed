use std::collections::HashSet;

use crate::extract::Entry;

/// Marker that identifies environment variables carrying an entry
pub const MARKER: &str = "INPUT_EBX_";

/// Recover the logical key from an environment variable name
///
/// Everything after the first `INPUT_EBX_` is the key, returned verbatim
/// (case and underscores preserved). Names without the marker yield `None`.
pub fn extract_yaml_key(name: &str) -> Option<&str> {
    name.find(MARKER).map(|pos| &name[pos + MARKER.len()..])
}

/// Return the entries of `secondary` whose key also appears in `primary`
///
/// Order of `secondary` is preserved. Values are ignored when matching.
pub fn find_duplicate_entries<'a>(primary: &[Entry], secondary: &'a [Entry]) -> Vec<&'a Entry> {
    let primary_keys: HashSet<&str> = primary.iter().map(|entry| entry.key.as_str()).collect();

    secondary
        .iter()
        .filter(|entry| primary_keys.contains(entry.key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(key: &str, value: serde_json::Value) -> Entry {
        Entry {
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn test_extract_yaml_key_with_prefix() {
        let result = extract_yaml_key("SOMETHING_SOMETHING_INPUT_EBX_MY_YAML_KEY");
        assert_eq!(result, Some("MY_YAML_KEY"));
    }

    #[test]
    fn test_extract_yaml_key_keeps_underscores_and_case() {
        assert_eq!(extract_yaml_key("_INPUT_EBX_hello___world"), Some("hello___world"));
        assert_eq!(extract_yaml_key("INPUT_EBX_MixedCase_Key"), Some("MixedCase_Key"));
    }

    #[test]
    fn test_extract_yaml_key_suffix_containing_marker() {
        assert_eq!(extract_yaml_key("INPUT_EBX_a_INPUT_EBX_b"), Some("a_INPUT_EBX_b"));
    }

    #[test]
    fn test_extract_yaml_key_empty_suffix() {
        assert_eq!(extract_yaml_key("INPUT_EBX_"), Some(""));
    }

    #[test]
    fn test_extract_yaml_key_without_marker() {
        assert_eq!(extract_yaml_key("INPUT_OTHER_KEY"), None);
        assert_eq!(extract_yaml_key("input_ebx_lowercase"), None);
    }

    #[test]
    fn test_find_duplicate_entries_same_length() {
        let primary = vec![
            entry("test_a", json!(1)),
            entry("test_b", json!(2)),
            entry("test_c", json!(3)),
        ];
        let secondary = vec![
            entry("test_a", json!(100)),
            entry("test_x", json!(101)),
            entry("test_y", json!(102)),
        ];

        let result = find_duplicate_entries(&primary, &secondary);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0], &secondary[0]);
    }

    #[test]
    fn test_find_duplicate_entries_different_length() {
        let primary = vec![
            entry("test_a", json!(1)),
            entry("test_b", json!(2)),
            entry("test_c", json!(3)),
            entry("test_d", json!(4)),
        ];
        let secondary = vec![entry("test_a", json!(100)), entry("test_x", json!(101))];

        let result = find_duplicate_entries(&primary, &secondary);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].key, "test_a");
        assert_eq!(result[0].value, json!(100));
    }

    #[test]
    fn test_find_duplicate_entries_preserves_secondary_order() {
        let primary = vec![entry("c", json!(null)), entry("a", json!(null))];
        let secondary = vec![
            entry("a", json!("first")),
            entry("b", json!("skip")),
            entry("c", json!("second")),
        ];

        let keys: Vec<&str> = find_duplicate_entries(&primary, &secondary)
            .iter()
            .map(|entry| entry.key.as_str())
            .collect();

        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_find_duplicate_entries_empty_inputs() {
        let secondary = vec![entry("a", json!(1))];

        assert!(find_duplicate_entries(&[], &secondary).is_empty());
        assert!(find_duplicate_entries(&secondary, &[]).is_empty());
    }
}
