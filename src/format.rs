//! Output formatting for trees and values.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_yaml::Value;

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Render a value; scalars come out bare (`8080`, `localhost`).
    pub fn render(&self, value: &Value) -> Result<String> {
        let text = match self {
            OutputFormat::Yaml => {
                serde_yaml::to_string(value).context("Failed to render configuration as YAML")?
            }
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .context("Failed to render configuration as JSON (keys must be scalars)")?,
        };
        Ok(text.trim_end().to_string())
    }
}
