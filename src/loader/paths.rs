//! Resolution of source paths to configuration files.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of configuration files.
pub const EXTENSION: &str = "yml";

/// Extensions accepted as already present on an explicit file path.
const KNOWN_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Make `path` absolute, joining relative paths onto `root`.
///
/// A relative path needs a root that is set and exists.
pub fn resolve(path: &Path, root: Option<&Path>) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(root_dir(root)?.join(path))
}

/// Check that the root is set and exists.
pub fn root_dir(root: Option<&Path>) -> Result<&Path> {
    match root {
        Some(root) if root.exists() => Ok(root),
        Some(root) => Err(ConfigError::Configuration(format!(
            "root directory '{}' does not exist",
            root.display()
        ))),
        None => Err(ConfigError::Configuration(
            "root directory is not set; use an absolute path or configure a root".to_string(),
        )),
    }
}

/// Append `.yml` unless the path already ends in `.yml` or `.yaml`.
pub fn with_extension(path: PathBuf) -> PathBuf {
    let known = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| KNOWN_EXTENSIONS.contains(&e));
    if known {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(EXTENSION);
    PathBuf::from(raw)
}

/// Expand one source path into the files it names, in load order.
///
/// A directory yields every `*.yml` file directly inside it, sorted by file
/// name. Anything else is treated as a file path, gaining a `.yml` extension
/// if it has none, and must exist.
pub fn gather(path: &Path, root: Option<&Path>) -> Result<Vec<PathBuf>> {
    let resolved = resolve(path, root)?;

    if resolved.is_dir() {
        let files = list_directory(&resolved)?;
        debug!(dir = %resolved.display(), count = files.len(), "Expanded configuration directory");
        return Ok(files);
    }

    let file = with_extension(resolved);
    if !file.is_file() {
        return Err(ConfigError::not_found(file));
    }
    Ok(vec![file])
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConfigError::io(dir, e))?.path();
        let is_config = path.extension().and_then(|e| e.to_str()) == Some(EXTENSION);
        if is_config && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("a/file".into()), PathBuf::from("a/file.yml"));
        assert_eq!(with_extension("file.yml".into()), PathBuf::from("file.yml"));
        assert_eq!(with_extension("file.yaml".into()), PathBuf::from("file.yaml"));
        assert_eq!(with_extension("file.prod".into()), PathBuf::from("file.prod.yml"));
    }

    #[test]
    fn test_relative_path_without_root() {
        let err = resolve(Path::new("foo"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Configuration(_)));
    }

    #[test]
    fn test_relative_path_with_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        let err = resolve(Path::new("foo"), Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Configuration(_)));
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let temp = TempDir::new().unwrap();
        let abs = temp.path().join("x.yml");
        assert_eq!(resolve(&abs, None).unwrap(), abs);
    }

    #[test]
    fn test_gather_file_adds_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.yml"), "a: 1").unwrap();
        let files = gather(Path::new("app"), Some(temp.path())).unwrap();
        assert_eq!(files, vec![temp.path().join("app.yml")]);
    }

    #[test]
    fn test_gather_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = gather(Path::new("nope"), Some(temp.path())).unwrap_err();
        match err {
            ConfigError::NotFound { path } => assert_eq!(path, temp.path().join("nope.yml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_gather_directory_sorted_yml_only() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("conf");
        fs::create_dir(&dir).unwrap();
        for name in ["b.yml", "a.yml", "c.yml", "notes.txt", "d.yaml"] {
            fs::write(dir.join(name), "x: 1").unwrap();
        }
        fs::create_dir(dir.join("sub.yml")).unwrap();

        let files = gather(Path::new("conf"), Some(temp.path())).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.yml", "b.yml", "c.yml"]);
    }
}
