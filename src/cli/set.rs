//! Set subcommand: apply string parameters on top of loaded sources.
//!
//! Parameters go through a safe load, so `port=8080` stays an integer when the
//! loaded configuration already has an integer there, and `hosts=a,b` becomes
//! a list when `hosts` is a list.

use super::parse_pair;
use crate::context::ConfigContext;
use crate::format::OutputFormat;
use anyhow::Result;
use clap::Args;
use serde_yaml::Value;
use std::path::PathBuf;

/// Arguments for the set subcommand
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Files or directories to load first, in order
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Parameter `KEY=VALUE`; `a.b` and `a[b]` address nested keys, `a[]` appends
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// URL query string applied after the parameters (e.g. `port=80&debug=true`)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Save the result instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Outcome of the set subcommand.
#[derive(Debug)]
pub enum SetOutcome {
    /// The rendered tree.
    Printed(String),
    /// The path the tree was saved to.
    Saved(PathBuf),
}

pub fn run(ctx: &mut ConfigContext, args: &SetArgs, format: OutputFormat) -> Result<SetOutcome> {
    ctx.load(&args.sources)?;
    if !args.params.is_empty() {
        ctx.load_from_params(args.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    }
    if let Some(ref query) = args.query {
        ctx.load_from_query(query)?;
    }

    match args.output {
        Some(ref output) => Ok(SetOutcome::Saved(ctx.save(output)?)),
        None => {
            let tree = Value::Mapping(ctx.store().tree().clone());
            Ok(SetOutcome::Printed(format.render(&tree)?))
        }
    }
}
