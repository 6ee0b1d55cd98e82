//! Configuration context: the owner of the process configuration.
//!
//! A `ConfigContext` holds the root directory used to resolve relative paths,
//! the template variables, and the [`Store`] every load folds into. Create one
//! at startup and pass it to whatever needs configuration.
//!
//! ## Environment Variables
//! - `OVERLAY_CONFIG_ROOT` - root directory for relative paths (read by [`ConfigContext::from_env`])

use crate::error::{ConfigError, Result};
use crate::loader::{self, Source, VarSource, Variables, paths};
use crate::store::{Entry, Store};
use crate::tree::{normalize, shallow_merge};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Environment variable naming the default root directory.
pub const ROOT_ENV: &str = "OVERLAY_CONFIG_ROOT";

/// Sources of one load call, after checking where raw values appear.
enum Plan {
    /// A trailing raw value; it is the only source used.
    Value(Value),
    /// Paths, in order.
    Paths(Vec<PathBuf>),
}

/// Root directory, template variables and the configuration store.
#[derive(Debug, Clone, Default)]
pub struct ConfigContext {
    root: Option<PathBuf>,
    vars: Variables,
    store: Store,
}

impl ConfigContext {
    /// Context with no root and an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose root comes from `OVERLAY_CONFIG_ROOT`, if set.
    pub fn from_env() -> Self {
        let root = std::env::var(ROOT_ENV).ok().map(PathBuf::from);
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set a template variable; takes precedence over the environment.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.set(name, value);
        self
    }

    /// Replace the variable lookup behind explicitly set variables.
    pub fn with_var_source(mut self, source: Arc<dyn VarSource>) -> Self {
        self.vars = self.vars.with_fallback(source);
        self
    }

    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.root = root;
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Load sources into the store with a deep merge, in order.
    ///
    /// A raw value is only accepted as the last source and then replaces path
    /// loading entirely. Each file's keys are normalized before merging, so
    /// later files override earlier ones key by key.
    pub fn load<I, S>(&mut self, sources: I) -> Result<&Store>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let plan = plan_sources(collect(sources))?;
        self.apply_load(plan)?;
        Ok(&self.store)
    }

    /// Load sources, coercing values to the types already in the store.
    ///
    /// With an empty store this is exactly [`ConfigContext::load`]. Otherwise
    /// the files are combined key by key at the top level (later files win),
    /// normalized and coercively merged: blank values are ignored and each
    /// value is read as the type already stored at its key.
    pub fn safe_load<I, S>(&mut self, sources: I) -> Result<&Store>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let plan = plan_sources(collect(sources))?;
        if self.store.is_empty() {
            debug!("Store is empty; safe load falls back to a plain load");
            self.apply_load(plan)?;
            return Ok(&self.store);
        }

        let overlay = match plan {
            Plan::Value(value) => value,
            Plan::Paths(sources) => {
                let mut combined = Mapping::new();
                for file in self.files(&sources)? {
                    if let Some(mapping) = loader::read_document(&file, &self.vars)? {
                        combined = shallow_merge(combined, normalize(mapping));
                    }
                }
                Value::Mapping(combined)
            }
        };
        self.store.coercive_merge_value(overlay)?;
        Ok(&self.store)
    }

    /// Apply form-style `(key, value)` pairs with [`ConfigContext::safe_load`].
    pub fn load_from_params<I, K, V>(&mut self, pairs: I) -> Result<&Store>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.safe_load([Source::from_params(pairs)])
    }

    /// Apply a URL query string with [`ConfigContext::safe_load`].
    pub fn load_from_query(&mut self, query: &str) -> Result<&Store> {
        let source = Source::from_query(query)?;
        self.safe_load([source])
    }

    /// Write the store to `path` and return the path written.
    ///
    /// Relative paths are resolved against the root; `.yml` is appended unless
    /// the path already ends in `.yml` or `.yaml`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let target = paths::with_extension(paths::resolve(path.as_ref(), self.root())?);
        self.store.write(&target)?;
        Ok(target)
    }

    /// Replace the store with an empty one.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn get(&self, key: &str) -> Option<Entry<'_>> {
        self.store.get(key)
    }

    pub fn lookup(&self, path: &str) -> Option<Entry<'_>> {
        self.store.lookup(path)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    fn apply_load(&mut self, plan: Plan) -> Result<()> {
        match plan {
            Plan::Value(value) => self.store.merge_value(value),
            Plan::Paths(sources) => {
                for file in self.files(&sources)? {
                    if let Some(mapping) = loader::read_document(&file, &self.vars)? {
                        debug!(path = %file.display(), "Merging configuration file");
                        self.store.merge_tree(normalize(mapping));
                    }
                }
                Ok(())
            }
        }
    }

    fn files(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in sources {
            files.extend(paths::gather(path, self.root())?);
        }
        Ok(files)
    }
}

fn collect<I, S>(sources: I) -> Vec<Source>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    sources.into_iter().map(Into::into).collect()
}

fn plan_sources(mut sources: Vec<Source>) -> Result<Plan> {
    if matches!(sources.last(), Some(Source::Value(_))) {
        let ignored = sources.len() - 1;
        if ignored > 0 {
            warn!(ignored, "In-memory source given; ignoring the preceding sources");
        }
        if let Some(Source::Value(value)) = sources.pop() {
            return Ok(Plan::Value(value));
        }
    }

    let mut entries = Vec::with_capacity(sources.len());
    for source in sources {
        match source {
            Source::Path(path) => entries.push(path),
            Source::Value(_) => {
                return Err(ConfigError::InvalidSource(
                    "an in-memory mapping is only accepted as the last source".to_string(),
                ));
            }
        }
    }
    Ok(Plan::Paths(entries))
}
