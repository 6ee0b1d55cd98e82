//! Deep merge for configuration trees.
//!
//! Implements key-by-key merging where overlay values override base values.
//! Sequences are replaced entirely, not concatenated.

use serde_yaml::{Mapping, Value};

/// Deep merge two trees, with `overlay` taking precedence over `base`.
///
/// - Mappings present on both sides are merged recursively
/// - Everything else in the overlay replaces the base value entirely,
///   including a mapping replaced by a scalar (or the reverse) and explicit nulls
/// - Keys only in `base` are carried through untouched
///
/// # Example
/// ```
/// use overlay_config::tree::deep_merge;
///
/// let base: serde_yaml::Mapping = serde_yaml::from_str(
///     "server: { port: 8080, host: localhost }\nfeatures: [a, b]",
/// ).unwrap();
/// let overlay: serde_yaml::Mapping = serde_yaml::from_str(
///     "server: { port: 9000 }\nfeatures: [c]",
/// ).unwrap();
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["server"]["host"], "localhost");
/// assert_eq!(merged["server"]["port"], 9000);
/// assert_eq!(merged["features"].as_sequence().unwrap().len(), 1);
/// ```
pub fn deep_merge(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, overlay_value) in overlay {
        let overlay_map = match overlay_value {
            Value::Mapping(overlay_map) => overlay_map,
            other => {
                base.insert(key, other);
                continue;
            }
        };
        if let Some(Value::Mapping(base_map)) = base.get_mut(&key) {
            let taken = std::mem::take(base_map);
            *base_map = deep_merge(taken, overlay_map);
            continue;
        }
        base.insert(key, Value::Mapping(overlay_map));
    }
    base
}

/// Merge multiple trees in order, with later trees taking precedence.
///
/// Equivalent to folding `deep_merge` over the list from an empty tree.
pub fn deep_merge_all(trees: impl IntoIterator<Item = Mapping>) -> Mapping {
    trees.into_iter().fold(Mapping::new(), deep_merge)
}

/// Replace top-level keys only; nested mappings are not combined.
pub fn shallow_merge(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Mapping {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_simple_mappings() {
        let result = deep_merge(yaml("{a: 1, b: 2}"), yaml("{b: 3, c: 4}"));
        assert_eq!(result, yaml("{a: 1, b: 3, c: 4}"));
    }

    #[test]
    fn test_merge_with_empty_overlay_is_identity() {
        let base = yaml("a: 1\nb: {c: [1, 2], d: null}\n");
        assert_eq!(deep_merge(base.clone(), Mapping::new()), base);
    }

    #[test]
    fn test_merge_nested_shared_keys() {
        let base = yaml("c:\n  c1:\n    d1: x\n    d2: y\n  c2: z\n");
        let overlay = yaml("c:\n  c1:\n    d2: CHANGED\n");
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            yaml("c:\n  c1:\n    d1: x\n    d2: CHANGED\n  c2: z\n")
        );
    }

    #[test]
    fn test_sequences_replaced_not_merged() {
        let result = deep_merge(yaml("items: [1, 2, 3]"), yaml("items: [4, 5]"));
        assert_eq!(result, yaml("items: [4, 5]"));
    }

    #[test]
    fn test_null_overlay_replaces_base() {
        let result = deep_merge(yaml("a: 1"), yaml("a: null"));
        assert_eq!(result, yaml("a: null"));
    }

    #[test]
    fn test_merge_all() {
        let trees = vec![yaml("a: 1"), yaml("b: 2"), yaml("{a: 3, c: 4}")];
        assert_eq!(deep_merge_all(trees), yaml("{a: 3, b: 2, c: 4}"));
    }

    #[test]
    fn test_overlay_replaces_scalar_with_mapping() {
        let result = deep_merge(yaml("value: 42"), yaml("value: {nested: true}"));
        assert_eq!(result, yaml("value: {nested: true}"));
    }

    #[test]
    fn test_overlay_replaces_mapping_with_scalar() {
        let result = deep_merge(yaml("value: {nested: true}"), yaml("value: 42"));
        assert_eq!(result, yaml("value: 42"));
    }

    #[test]
    fn test_shallow_merge_replaces_whole_subtree() {
        let result = shallow_merge(yaml("a: {x: 1, y: 2}"), yaml("a: {y: 3}"));
        assert_eq!(result, yaml("a: {y: 3}"));
    }
}
