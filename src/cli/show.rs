//! Show subcommand: print the merged tree or a single value.

use crate::context::ConfigContext;
use crate::format::OutputFormat;
use anyhow::Result;
use clap::Args;
use serde_yaml::Value;

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Files or directories to load, in order
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Dotted path of the value to print (e.g. `db.port`)
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Load the sources and render the requested part of the tree.
///
/// A missing key renders as an empty string.
pub fn run(ctx: &mut ConfigContext, args: &ShowArgs, format: OutputFormat) -> Result<String> {
    ctx.load(&args.sources)?;
    match args.key {
        Some(ref key) => match ctx.lookup(key) {
            Some(entry) => format.render(entry.value()),
            None => Ok(String::new()),
        },
        None => format.render(&Value::Mapping(ctx.store().tree().clone())),
    }
}
