//! overlay-config library
//!
//! Layered YAML configuration: files and directories are loaded in order and
//! deep-merged into a [`Store`], keys are normalized (`:name` and `name` are the
//! same key), and string overlays such as form parameters can be merged with
//! type coercion against what is already loaded.
//!
//! ```no_run
//! use overlay_config::ConfigContext;
//!
//! let mut ctx = ConfigContext::new().with_root("/etc/myapp");
//! ctx.load(["base", "local"])?;
//! ctx.load_from_params([("db.port", "6543")])?;
//! let port = ctx.lookup("db.port").and_then(|e| e.as_i64());
//! # Ok::<(), overlay_config::ConfigError>(())
//! ```

pub mod cli;
pub mod context;
pub mod error;
pub mod format;
pub mod loader;
pub mod store;
pub mod tree;

pub use context::ConfigContext;
pub use error::{ConfigError, Result};
pub use loader::Source;
pub use store::{Entry, Store, TreeView};
