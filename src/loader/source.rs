//! Configuration sources.

use crate::error::{ConfigError, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Something that can be folded into a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A file or directory, absolute or relative to the context root.
    Path(PathBuf),
    /// An in-memory value; must be a mapping when loaded.
    Value(Value),
}

impl Source {
    /// Build a nested mapping of string values from form-style pairs.
    ///
    /// Keys nest on dots (`db.port`) or brackets (`db[port]`); a trailing `[]`
    /// appends to a sequence (`tags[]`). Later pairs overwrite earlier ones.
    pub fn from_params<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Mapping::new();
        for (key, value) in pairs {
            let flat = key.as_ref().replace(']', "").replace('[', ".");
            let segments: Vec<&str> = flat.split('.').collect();
            insert_param(&mut root, &segments, value.into());
        }
        Source::Value(Value::Mapping(root))
    }

    /// Parse a URL query string (`a=1&db.port=5432`) into a params source.
    ///
    /// A leading `?` is ignored, `+` decodes to a space and keys without `=`
    /// get an empty value.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut pairs = Vec::new();
        for part in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            pairs.push((decode_component(key)?, decode_component(value)?));
        }
        Ok(Self::from_params(pairs))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Source::Path(path) => Some(path),
            Source::Value(_) => None,
        }
    }
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| ConfigError::InvalidSource(format!("invalid query component '{raw}': {e}")))
}

fn insert_param(map: &mut Mapping, segments: &[&str], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = Value::String((*first).to_string());
    match rest {
        [] => {
            map.insert(key, Value::String(value));
        }
        [""] => match map.get_mut(&key) {
            Some(Value::Sequence(items)) => items.push(Value::String(value)),
            _ => {
                map.insert(key, Value::Sequence(vec![Value::String(value)]));
            }
        },
        _ => {
            if !matches!(map.get(&key), Some(Value::Mapping(_))) {
                map.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(child)) = map.get_mut(&key) {
                insert_param(child, rest, value);
            }
        }
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<&String> for Source {
    fn from(path: &String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<Mapping> for Source {
    fn from(mapping: Mapping) -> Self {
        Source::Value(Value::Mapping(mapping))
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Source::Value(value)
    }
}
