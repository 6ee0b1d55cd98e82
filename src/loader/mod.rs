//! Reading sources into raw mappings.
//!
//! A file goes through three steps before it reaches a store:
//! 1. **Template** - `${VAR}` placeholders are expanded on the raw text
//! 2. **Parse** - the text is parsed as a single YAML document
//! 3. **Shape check** - the document must be a mapping; an empty document
//!    contributes nothing
//!
//! Key normalization and merging happen afterwards, in the store.

pub mod paths;
pub mod source;
pub mod template;

pub use paths::{EXTENSION, gather, resolve, with_extension};
pub use source::Source;
pub use template::{EnvVars, VarSource, Variables};

use crate::error::{ConfigError, Result};
use crate::store::kind_name;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, warn};

/// Parse one YAML document into a raw mapping.
///
/// Returns `Ok(None)` for an empty document. `origin` is used in messages.
pub fn parse_document(content: &str, origin: &Path, vars: &dyn VarSource) -> Result<Option<Mapping>> {
    let rendered = template::render(content, vars, origin)?;
    let value: Value = serde_yaml::from_str(&rendered).map_err(|e| {
        ConfigError::InvalidSource(format!("'{}' is not valid YAML: {}", origin.display(), e))
    })?;

    match value {
        Value::Mapping(mapping) => Ok(Some(mapping)),
        Value::Null => {
            warn!(path = %origin.display(), "Configuration file is empty; nothing loaded");
            Ok(None)
        }
        other => Err(ConfigError::InvalidSource(format!(
            "'{}' must contain a mapping, found {}",
            origin.display(),
            kind_name(&other)
        ))),
    }
}

/// Read and parse a configuration file.
pub fn read_document(path: &Path, vars: &dyn VarSource) -> Result<Option<Mapping>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::not_found(path),
        _ => ConfigError::io(path, e),
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Read configuration file");
    parse_document(&content, path, vars)
}
