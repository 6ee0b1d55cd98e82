//! Merge and coercion engine for configuration trees.
//!
//! A tree is a `serde_yaml::Mapping`. Three operations act on it:
//! 1. **Normalize** - canonicalize every key so `name` and `:name` are one slot
//! 2. **Deep merge** - overlay wins at the leaves, mappings merge recursively
//! 3. **Coercive merge** - like deep merge, but leaves are read using the
//!    type already in the base tree and blank values are ignored

pub mod coerce;
pub mod keys;
pub mod merge;

pub use coerce::{boolean_value, coercive_merge, is_blank, numeric_value, split_list, to_text};
pub use keys::{canonical, normalize, normalize_key, normalize_value};
pub use merge::{deep_merge, deep_merge_all, shallow_merge};
