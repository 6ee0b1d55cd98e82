//! Inline templating applied to a file before it is parsed as YAML.
//!
//! ## Syntax
//!
//! - `${NAME}` - replaced with the value of variable `NAME`; error if unset
//! - `${NAME:-default}` - replaced with `NAME`, or `default` if unset
//! - `$$` - a literal `$`
//!
//! Anything else containing `$` (including an unclosed `${`) is left as is.
//! Variables are looked up in explicitly set values first, then in the
//! process environment.

use crate::error::{ConfigError, Result};
use regex_lite::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\$|\{([^}:]*)(?::-([^}]*))?\})").expect("valid placeholder regex")
});

/// Lookup of template variables, so tests can avoid the real environment.
pub trait VarSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads variables from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVars;

impl VarSource for EnvVars {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Explicit variables layered over a fallback source.
#[derive(Clone)]
pub struct Variables {
    values: BTreeMap<String, String>,
    fallback: Option<Arc<dyn VarSource>>,
}

impl Variables {
    /// Explicit values over the process environment.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            fallback: Some(Arc::new(EnvVars)),
        }
    }

    /// Explicit values only; the environment is never consulted.
    pub fn isolated() -> Self {
        Self {
            values: BTreeMap::new(),
            fallback: None,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn VarSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variables")
            .field("values", &self.values)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl VarSource for Variables {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|f| f.get(name)))
    }
}

/// Expand placeholders in `input`.
///
/// `origin` names the file being rendered in error messages. Returns the input
/// unchanged (borrowed) when it contains no `$`.
pub fn render<'a>(input: &'a str, vars: &dyn VarSource, origin: &Path) -> Result<Cow<'a, str>> {
    if !input.contains('$') {
        return Ok(Cow::Borrowed(input));
    }

    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&input[last..whole.start()]);
        last = whole.end();

        // `$$`
        let Some(name) = caps.get(1) else {
            out.push('$');
            continue;
        };

        let name = name.as_str().trim();
        match (vars.get(name), caps.get(2)) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(default)) => out.push_str(default.as_str()),
            (None, None) => {
                return Err(ConfigError::Template {
                    var: name.to_string(),
                    path: origin.to_path_buf(),
                });
            }
        }
    }
    out.push_str(&input[last..]);
    Ok(Cow::Owned(out))
}

/// Escape every `$` as `$$`, so [`render`] gives back `text` unchanged.
pub fn escape(text: &str) -> Cow<'_, str> {
    if text.contains('$') {
        Cow::Owned(text.replace('$', "$$"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        let mut vars = Variables::isolated();
        for (k, v) in pairs {
            vars.set(*k, *v);
        }
        vars
    }

    fn origin() -> &'static Path {
        Path::new("test.yml")
    }

    #[test]
    fn test_escaped_text_renders_back_unchanged() {
        let text = "password: pa$$word\nprompt: cost ${NEVER_SET}\nprice: $5";
        let escaped = escape(text);
        assert_eq!(render(&escaped, &vars(&[]), origin()).unwrap(), text);
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_no_placeholders_borrows() {
        let out = render("name: plain", &vars(&[]), origin()).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_substitutes_variable() {
        let v = vars(&[("HOST", "db.local")]);
        let out = render("host: ${HOST}\nurl: pg://${HOST}/x", &v, origin()).unwrap();
        assert_eq!(out, "host: db.local\nurl: pg://db.local/x");
    }

    #[test]
    fn test_default_used_when_unset() {
        let out = render("port: ${PORT:-5432}", &vars(&[]), origin()).unwrap();
        assert_eq!(out, "port: 5432");
    }

    #[test]
    fn test_value_beats_default() {
        let v = vars(&[("PORT", "6000")]);
        let out = render("port: ${PORT:-5432}", &v, origin()).unwrap();
        assert_eq!(out, "port: 6000");
    }

    #[test]
    fn test_empty_default() {
        let out = render("x: '${X:-}'", &vars(&[]), origin()).unwrap();
        assert_eq!(out, "x: ''");
    }

    #[test]
    fn test_missing_variable_is_error() {
        let err = render("x: ${MISSING}", &vars(&[]), origin()).unwrap_err();
        match err {
            ConfigError::Template { var, path } => {
                assert_eq!(var, "MISSING");
                assert_eq!(path, origin());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_escape_and_literals() {
        let out = render("a: $$HOME\nb: $${X}\nc: cost $5\nd: ${open", &vars(&[]), origin())
            .unwrap();
        assert_eq!(out, "a: $HOME\nb: ${X}\nc: cost $5\nd: ${open");
    }

    #[test]
    fn test_fallback_source() {
        struct Fixed;
        impl VarSource for Fixed {
            fn get(&self, name: &str) -> Option<String> {
                (name == "FROM_FALLBACK").then(|| "yes".to_string())
            }
        }

        let mut v = Variables::isolated().with_fallback(Arc::new(Fixed));
        v.set("LOCAL", "1");
        assert_eq!(v.get("LOCAL").as_deref(), Some("1"));
        assert_eq!(v.get("FROM_FALLBACK").as_deref(), Some("yes"));
        assert_eq!(v.get("OTHER"), None);
    }
}
