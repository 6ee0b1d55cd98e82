//! Key normalization.
//!
//! Sources may spell the same key differently (`name`, `:name`, `!symbol name`).
//! Every key stored in a tree goes through [`normalize_key`] first, so lookups
//! never depend on the spelling a particular file used.

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

/// Tags treated as symbol spellings of a plain string key.
const SYMBOL_TAGS: [&str; 2] = ["symbol", "ruby/symbol"];

/// Canonicalize a single key.
///
/// String keys lose one leading `:`; symbol-tagged strings become the bare
/// string. Keys with no canonical form (numbers, booleans, null, collections,
/// a lone `:`) are returned unchanged.
pub fn normalize_key(key: Value) -> Value {
    match key {
        Value::String(s) => match s.strip_prefix(':') {
            Some(name) if !name.is_empty() => Value::String(name.to_string()),
            _ => Value::String(s),
        },
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let is_symbol = SYMBOL_TAGS.iter().any(|t| tag == *t);
            match value {
                Value::String(name) if is_symbol && !name.is_empty() => Value::String(name),
                value => Value::Tagged(Box::new(TaggedValue { tag, value })),
            }
        }
        other => other,
    }
}

/// Canonical key for a textual lookup.
pub fn canonical(key: &str) -> Value {
    normalize_key(Value::String(key.to_string()))
}

/// Normalize every key of a mapping and of every mapping nested under it.
///
/// Sequences are not descended into: a mapping reachable only through a
/// sequence keeps its keys as written. When two keys collapse to the same
/// canonical key the later one wins.
pub fn normalize(mapping: Mapping) -> Mapping {
    let mut out = Mapping::with_capacity(mapping.len());
    for (key, value) in mapping {
        out.insert(normalize_key(key), normalize_value(value));
    }
    out
}

/// Normalize a value if it is a mapping; anything else passes through.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(normalize(mapping)),
        other => other,
    }
}
