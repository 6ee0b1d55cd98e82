//! CLI command definitions for overlay-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod merge;
pub mod set;
pub mod show;

use crate::context::ConfigContext;
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use merge::MergeArgs;
use set::SetArgs;
use show::ShowArgs;
use std::path::PathBuf;

/// Layered YAML configuration: load, merge, inspect and update
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory for relative source paths (default: $OVERLAY_CONFIG_ROOT)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Template variable available to `${NAME}` placeholders
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_pair, global = true)]
    pub vars: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build the context shared by every subcommand.
    pub fn context(&self) -> ConfigContext {
        let mut ctx = ConfigContext::from_env();
        if let Some(ref root) = self.root {
            ctx.set_root(Some(root.clone()));
        }
        for (name, value) in &self.vars {
            ctx = ctx.with_var(name.clone(), value.clone());
        }
        ctx
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load sources and print the merged tree, or one value
    Show(ShowArgs),

    /// Load sources and write the merged tree to a file
    Merge(MergeArgs),

    /// Load sources, apply string parameters with type coercion, print or save
    Set(SetArgs),
}

/// Parse `NAME=VALUE`; the value may be empty or contain further `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
