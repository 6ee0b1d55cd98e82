//! overlay-config
//!
//! Loads layered YAML configuration files, merges them, and prints or saves
//! the result.

use anyhow::Result;
use clap::Parser;
use overlay_config::cli::set::SetOutcome;
use overlay_config::cli::{Cli, Command, merge, set, show};
use std::fs::OpenOptions;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {}
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut ctx = cli.context();
    debug!(root = ?ctx.root(), "Configuration context ready");

    match cli.command {
        Command::Show(ref args) => {
            let out = show::run(&mut ctx, args, cli.format)?;
            if !out.is_empty() {
                println!("{out}");
            }
        }
        Command::Merge(ref args) => {
            let written = merge::run(&mut ctx, args)?;
            println!("{}", written.display());
        }
        Command::Set(ref args) => match set::run(&mut ctx, args, cli.format)? {
            SetOutcome::Printed(out) => println!("{out}"),
            SetOutcome::Saved(path) => println!("{}", path.display()),
        },
    }

    Ok(())
}
