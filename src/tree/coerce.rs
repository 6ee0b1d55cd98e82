//! Type-coercing merge.
//!
//! Overlays built from form fields or query strings carry every value as a
//! string. [`coercive_merge`] merges such an overlay into a typed tree, using
//! the type already stored at each key to decide how the incoming value is
//! read, and ignoring blank values so an empty field never erases a setting.

use regex_lite::Regex;
use serde_yaml::{Mapping, Number, Value};
use std::sync::LazyLock;

/// Digits with at most one decimal point and at least one digit.
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)$").expect("valid numeric regex"));

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("valid list separator regex"));

/// Merge `overlay` into `base`, coercing each overlay leaf to the type of the
/// base value at the same key.
///
/// - Mappings present on both sides are merged recursively
/// - Blank overlay values (see [`is_blank`]) are skipped
/// - Keys absent from `base` take the overlay value uncoerced
///
/// # Example
/// ```
/// use overlay_config::tree::coercive_merge;
///
/// let base: serde_yaml::Mapping =
///     serde_yaml::from_str("port: 80\nhosts: [a]\ndebug: true\nname: app").unwrap();
/// let params: serde_yaml::Mapping =
///     serde_yaml::from_str("port: '8080'\nhosts: 'b, c'\ndebug: '0'\nname: ''").unwrap();
/// let merged = coercive_merge(base, params);
/// assert_eq!(merged["port"], 8080);
/// assert_eq!(merged["hosts"][1], "c");
/// assert_eq!(merged["debug"], false);
/// assert_eq!(merged["name"], "app");
/// ```
pub fn coercive_merge(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, overlay_value) in overlay {
        let overlay_value = match overlay_value {
            Value::Mapping(overlay_map) => {
                if let Some(Value::Mapping(base_map)) = base.get_mut(&key) {
                    let taken = std::mem::take(base_map);
                    *base_map = coercive_merge(taken, overlay_map);
                    continue;
                }
                Value::Mapping(overlay_map)
            }
            other => other,
        };

        if is_blank(&overlay_value) {
            continue;
        }

        let merged = match base.get(&key) {
            Some(hint) => coerce_to(hint, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged);
    }
    base
}

/// Read `value` as the same kind of value as `hint`.
pub fn coerce_to(hint: &Value, value: Value) -> Value {
    match hint {
        Value::Sequence(_) => Value::Sequence(coerce_list(value)),
        Value::String(_) => Value::String(to_text(&value)),
        Value::Number(_) => numeric_value(value),
        Value::Bool(_) => Value::Bool(boolean_value(&value)),
        _ => value,
    }
}

/// True for null, empty or whitespace-only strings, and empty collections.
///
/// Boolean `false` is a value, not a blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => is_blank(&tagged.value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse a string as an integer or float when it looks numeric.
///
/// The string is trimmed first. Anything that is not digits with at most one
/// decimal point comes back as the trimmed string. Non-string values are
/// returned unchanged.
pub fn numeric_value(value: Value) -> Value {
    match value {
        Value::String(s) => parse_numeric(s.trim()),
        other => other,
    }
}

fn parse_numeric(text: &str) -> Value {
    if !NUMERIC.is_match(text) {
        return Value::String(text.to_string());
    }
    let number = if text.contains('.') {
        text.parse::<f64>().ok().map(Number::from)
    } else {
        text.parse::<i64>()
            .map(Number::from)
            .or_else(|_| text.parse::<u64>().map(Number::from))
            .ok()
    };
    match number {
        Some(n) => Value::Number(n),
        None => Value::String(text.to_string()),
    }
}

/// Only `false`, `"false"`, `"0"` and `0` read as false.
pub fn boolean_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s != "false" && s != "0",
        Value::Number(n) => n.as_i64() != Some(0),
        Value::Null => false,
        Value::Tagged(tagged) => boolean_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => true,
    }
}

/// Split a comma separated list, trimming whitespace around each element.
///
/// Trailing empty elements are dropped (`"a,b,"` has two elements).
pub fn split_list(text: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = LIST_SEPARATOR.split(text).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

fn coerce_list(value: Value) -> Vec<Value> {
    match value {
        Value::Sequence(items) => items.into_iter().map(numeric_value).collect(),
        Value::String(s) => split_list(&s).into_iter().map(parse_numeric_piece).collect(),
        other => split_list(&to_text(&other))
            .into_iter()
            .map(parse_numeric_piece)
            .collect(),
    }
}

fn parse_numeric_piece(piece: &str) -> Value {
    parse_numeric(piece.trim())
}

/// Plain text rendering of a value.
///
/// Scalars print as written, sequences join their elements with `", "` and
/// mappings render as YAML.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(to_text).collect::<Vec<_>>().join(", "),
        Value::Mapping(map) => serde_yaml::to_string(map)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => to_text(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Mapping {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_blank_overlay_keeps_base() {
        for blank in ["k: ''", "k: '   '", "k: null", "k: []", "k: {}"] {
            let result = coercive_merge(yaml("k: 7"), yaml(blank));
            assert_eq!(result, yaml("k: 7"), "overlay {blank} should be ignored");
        }
    }

    #[test]
    fn test_blank_overlay_keeps_nested_tree() {
        let result = coercive_merge(yaml("k: {a: 1}"), yaml("k: ''"));
        assert_eq!(result, yaml("k: {a: 1}"));
    }

    #[test]
    fn test_numeric_integer() {
        let result = coercive_merge(yaml("n: 1"), yaml("n: '42'"));
        assert_eq!(result, yaml("n: 42"));
        assert!(result["n"].is_i64());
    }

    #[test]
    fn test_numeric_float() {
        let result = coercive_merge(yaml("n: 1.0"), yaml("n: '4.2'"));
        assert_eq!(result, yaml("n: 4.2"));
        assert!(result["n"].is_f64());
    }

    #[test]
    fn test_numeric_trims_whitespace() {
        let result = coercive_merge(yaml("n: 1"), yaml("n: ' 12 '"));
        assert_eq!(result, yaml("n: 12"));
    }

    #[test]
    fn test_numeric_failure_falls_back_to_trimmed_string() {
        let result = coercive_merge(yaml("n: 1"), yaml("n: ' 12abc '"));
        assert_eq!(result, yaml("n: 12abc"));

        let result = coercive_merge(yaml("n: 1"), yaml("n: '1.2.3'"));
        assert_eq!(result, yaml("n: '1.2.3'"));

        let result = coercive_merge(yaml("n: 1"), yaml("n: '-5'"));
        assert_eq!(result, yaml("n: '-5'"));
    }

    #[test]
    fn test_numeric_overlay_already_number() {
        let result = coercive_merge(yaml("n: 1"), yaml("n: 5"));
        assert_eq!(result, yaml("n: 5"));
    }

    #[test]
    fn test_list_from_csv() {
        let result = coercive_merge(yaml("xs: [1]"), yaml("xs: '4,5,6'"));
        assert_eq!(result, yaml("xs: [4, 5, 6]"));
    }

    #[test]
    fn test_list_from_csv_with_spaces_and_words() {
        let result = coercive_merge(yaml("xs: [a]"), yaml("xs: ' x , 2.5,y ,'"));
        assert_eq!(result, yaml("xs: [x, 2.5, y]"));
    }

    #[test]
    fn test_list_from_sequence() {
        let result = coercive_merge(yaml("xs: [1]"), yaml("xs: ['7', ' 8 ', nine]"));
        assert_eq!(result, yaml("xs: [7, 8, nine]"));
    }

    #[test]
    fn test_list_from_scalar() {
        let result = coercive_merge(yaml("xs: [1]"), yaml("xs: 9"));
        assert_eq!(result, yaml("xs: [9]"));
    }

    #[test]
    fn test_string_base_stringifies() {
        let result = coercive_merge(yaml("s: text"), yaml("s: 100"));
        assert_eq!(result, yaml("s: '100'"));

        let result = coercive_merge(yaml("s: text"), yaml("s: true"));
        assert_eq!(result, yaml("s: 'true'"));

        let result = coercive_merge(yaml("s: text"), yaml("s: [a, b]"));
        assert_eq!(result, yaml("s: 'a, b'"));
    }

    #[test]
    fn test_boolean_coercion() {
        let cases = [
            ("b: 'false'", false),
            ("b: '0'", false),
            ("b: 0", false),
            ("b: false", false),
            ("b: 'yes'", true),
            ("b: 'true'", true),
            ("b: 1", true),
            ("b: 'no'", true),
        ];
        for (overlay, expected) in cases {
            let result = coercive_merge(yaml("b: true"), yaml(overlay));
            assert_eq!(result["b"], Value::Bool(expected), "overlay {overlay}");
        }
    }

    #[test]
    fn test_overlay_only_keys_are_not_coerced() {
        let result = coercive_merge(yaml("a: 1"), yaml("b: '42'"));
        assert_eq!(result, yaml("a: 1\nb: '42'"));
    }

    #[test]
    fn test_null_base_takes_overlay_as_is() {
        let result = coercive_merge(yaml("a: null"), yaml("a: '42'"));
        assert_eq!(result, yaml("a: '42'"));
    }

    #[test]
    fn test_nested_trees_recurse_with_coercion() {
        let base = yaml("db:\n  port: 5432\n  host: localhost\n  pool: {size: 5}\n");
        let overlay = yaml("db:\n  port: '6543'\n  host: ''\n  pool: {size: '10'}\n");
        let result = coercive_merge(base, overlay);
        assert_eq!(
            result,
            yaml("db:\n  port: 6543\n  host: localhost\n  pool: {size: 10}\n")
        );
    }

    #[test]
    fn test_string_hash_values_become_strings() {
        let base = yaml("string_hash: {foo: a, bar: b}");
        let overlay = yaml("string_hash: {foo: 1, bar: 2}");
        let result = coercive_merge(base, overlay);
        assert_eq!(result, yaml("string_hash: {foo: '1', bar: '2'}"));
    }

    #[test]
    fn test_tree_replaced_by_non_blank_scalar() {
        let result = coercive_merge(yaml("k: {a: 1}"), yaml("k: flat"));
        assert_eq!(result, yaml("k: flat"));
    }

    #[test]
    fn test_split_list_drops_trailing_empties() {
        assert_eq!(split_list("a, b ,c,,"), vec!["a", "b", "c"]);
        assert_eq!(split_list(",a"), vec!["", "a"]);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&Value::Null), "");
        assert_eq!(to_text(&Value::Bool(false)), "false");
        assert_eq!(to_text(&Value::Number(3.into())), "3");
        assert_eq!(to_text(&serde_yaml::from_str::<Value>("[1, x]").unwrap()), "1, x");
    }
}
