//! The configuration tree and read access into it.
//!
//! [`Store`] owns the merged tree. Every key that goes in or is looked up is
//! canonicalized first, so callers never need to know how a source spelled it.
//! Nested mappings are handed out as borrowed [`TreeView`]s so key access
//! composes (`store.get("db")` then `.get("port")`).

use crate::error::{ConfigError, Result};
use crate::loader::template;
use crate::tree::{canonical, coercive_merge, deep_merge, normalize};
use serde::{Deserialize, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::ops::Index;
use std::path::Path;
use tracing::{debug, info};

static NULL: Value = Value::Null;

/// Result of a key lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    /// A leaf: scalar, sequence or null.
    Value(&'a Value),
    /// A nested mapping.
    Tree(TreeView<'a>),
}

impl<'a> Entry<'a> {
    /// The underlying value, mappings included.
    pub fn value(&self) -> &'a Value {
        match self {
            Entry::Value(value) => value,
            Entry::Tree(view) => view.value,
        }
    }

    pub fn as_tree(&self) -> Option<TreeView<'a>> {
        match self {
            Entry::Tree(view) => Some(*view),
            Entry::Value(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value().as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value().as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().as_bool()
    }

    pub fn as_sequence(&self) -> Option<&'a [Value]> {
        self.value().as_sequence().map(Vec::as_slice)
    }
}

impl<'a> From<&'a Value> for Entry<'a> {
    fn from(value: &'a Value) -> Self {
        match value.as_mapping() {
            Some(_) => Entry::Tree(TreeView { value }),
            None => Entry::Value(value),
        }
    }
}

/// Borrowed view of a nested mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeView<'a> {
    /// Always a `Value::Mapping`.
    value: &'a Value,
}

impl<'a> TreeView<'a> {
    pub fn as_mapping(&self) -> &'a Mapping {
        self.value.as_mapping().unwrap_or(empty_mapping())
    }

    /// Value at `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<Entry<'a>> {
        get_in(self.as_mapping(), key)
    }

    /// Dotted-path lookup relative to this view (`"pool.size"`).
    pub fn lookup(&self, path: &str) -> Option<Entry<'a>> {
        lookup_in(self.as_mapping(), path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a Value> {
        self.as_mapping().keys()
    }

    pub fn len(&self) -> usize {
        self.as_mapping().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_mapping().is_empty()
    }
}

impl Index<&str> for TreeView<'_> {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.as_mapping().get(canonical(key)).unwrap_or(&NULL)
    }
}

fn empty_mapping() -> &'static Mapping {
    static EMPTY: std::sync::LazyLock<Mapping> = std::sync::LazyLock::new(Mapping::new);
    &EMPTY
}

fn get_in<'a>(map: &'a Mapping, key: &str) -> Option<Entry<'a>> {
    map.get(canonical(key)).map(Entry::from)
}

fn lookup_in<'a>(map: &'a Mapping, path: &str) -> Option<Entry<'a>> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = map.get(canonical(first))?;
    for segment in segments {
        current = current.as_mapping()?.get(canonical(segment))?;
    }
    Some(Entry::from(current))
}

/// The merged configuration tree.
///
/// Keys at every mapping level are canonical. The tree only grows or changes
/// through merges and [`Store::set`]; it is reset as a whole with
/// [`Store::clear`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Mapping")]
pub struct Store {
    tree: Mapping,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a raw value, which must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut store = Self::new();
        store.merge_value(value)?;
        Ok(store)
    }

    /// Deep merge a raw mapping into the tree.
    pub fn merge_value(&mut self, value: Value) -> Result<()> {
        let overlay = normalize(into_mapping(value)?);
        debug!(keys = overlay.len(), "Merging overlay into store");
        self.merge_tree(overlay);
        Ok(())
    }

    /// Coercively merge a raw mapping into the tree.
    ///
    /// Overlay values are read using the type of the value already stored at
    /// the same key; blank overlay values are ignored.
    pub fn coercive_merge_value(&mut self, value: Value) -> Result<()> {
        let overlay = normalize(into_mapping(value)?);
        debug!(keys = overlay.len(), "Coercively merging overlay into store");
        self.coercive_merge_tree(overlay);
        Ok(())
    }

    /// Deep merge an already normalized tree.
    pub(crate) fn merge_tree(&mut self, overlay: Mapping) {
        let base = std::mem::take(&mut self.tree);
        self.tree = deep_merge(base, overlay);
    }

    pub(crate) fn coercive_merge_tree(&mut self, overlay: Mapping) {
        let base = std::mem::take(&mut self.tree);
        self.tree = coercive_merge(base, overlay);
    }

    /// Value at `key`, a [`TreeView`] for nested mappings, or `None`.
    pub fn get(&self, key: &str) -> Option<Entry<'_>> {
        get_in(&self.tree, key)
    }

    /// Navigate nested mappings with a dotted path such as `"db.pool.size"`.
    pub fn lookup(&self, path: &str) -> Option<Entry<'_>> {
        lookup_in(&self.tree, path)
    }

    /// Store `value` under the canonical form of `key`, returning the
    /// previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        let value = crate::tree::normalize_value(value.into());
        self.tree.insert(canonical(key), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tree.contains_key(canonical(key))
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.tree = Mapping::new();
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn tree(&self) -> &Mapping {
        &self.tree
    }

    pub fn into_tree(self) -> Mapping {
        self.tree
    }

    /// Serialize the tree to a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.tree)?)
    }

    /// Write the tree as YAML to `path`, with every `$` written as `$$`.
    ///
    /// Fails with [`ConfigError::InvalidPath`] if the parent directory is
    /// missing or is a file, or if `path` is itself a directory.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            return Err(ConfigError::InvalidPath(format!(
                "directory '{}' for '{}' does not exist",
                dir.display(),
                path.display()
            )));
        }
        if !dir.is_dir() {
            return Err(ConfigError::InvalidPath(format!(
                "'{}' is a file, not a directory",
                dir.display()
            )));
        }
        if path.is_dir() {
            return Err(ConfigError::InvalidPath(format!(
                "'{}' is a directory",
                path.display()
            )));
        }

        // Loading expands `$` placeholders, so saved text carries them escaped.
        let yaml = self.to_yaml()?;
        std::fs::write(path, template::escape(&yaml).as_ref())
            .map_err(|e| ConfigError::io(path, e))?;
        info!(path = %path.display(), keys = self.len(), "Saved configuration");
        Ok(())
    }
}

fn into_mapping(value: Value) -> Result<Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ConfigError::InvalidSource(format!(
            "expected a mapping, got {}",
            kind_name(&other)
        ))),
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

impl From<Mapping> for Store {
    fn from(mapping: Mapping) -> Self {
        Self {
            tree: normalize(mapping),
        }
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.tree.serialize(serializer)
    }
}

impl Index<&str> for Store {
    type Output = Value;

    /// Missing keys index to `Value::Null` instead of panicking.
    fn index(&self, key: &str) -> &Value {
        self.tree.get(canonical(key)).unwrap_or(&NULL)
    }
}
