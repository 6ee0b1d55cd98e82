//! Merge subcommand: combine sources and write the result.

use crate::context::ConfigContext;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Files or directories to load, in order (later ones win)
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<String>,

    /// Output file; relative paths resolve against the root, `.yml` is appended if missing
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Load the sources, save the merged tree and return the path written.
pub fn run(ctx: &mut ConfigContext, args: &MergeArgs) -> Result<PathBuf> {
    ctx.load(&args.sources)
        .with_context(|| format!("Failed to load {}", args.sources.join(", ")))?;
    let written = ctx.save(&args.output)?;
    info!(path = %written.display(), keys = ctx.store().len(), "Merged configuration");
    Ok(written)
}
