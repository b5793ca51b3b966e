//! Squirrel CLI - Command-line interface
//!
//! Mirrors key/file manifests into directory hierarchies.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use squirrel_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "squirrel")]
#[command(about = "Keep a directory hierarchy in sync with a keyed file collection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full trace log of this run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.into(), cli.logs_dir.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match commands::handle_command(cli.command) {
        Ok(()) => Ok(()),
        Err(e) if e.is_user_error() => anyhow::bail!(e.user_message()),
        Err(e) => Err(anyhow::Error::new(e).context("squirrel command failed")),
    }
}
