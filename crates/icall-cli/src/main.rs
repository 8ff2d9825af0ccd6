//! icall table inspector
//!
//! Reads the header the table producer generates, applies the same ordering
//! and flag rules the engine enforces at startup, and answers token lookups.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "icall")]
#[command(about = "Inspect and validate generated icall tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every table in a generated header
    Check {
        /// Generated icall-table header
        header: PathBuf,
        /// Dispatch config (TOML) to validate alongside the header
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve a token to its native symbol
    Lookup {
        /// Generated icall-table header
        header: PathBuf,
        /// Token to resolve
        token: u32,
        /// Assembly table to search
        #[arg(short, long, default_value = "corlib")]
        assembly: String,
    },

    /// Summarize conventions and signature classes per table
    Stats {
        /// Generated icall-table header
        header: PathBuf,
    },

    /// Show version and environment info
    Info,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("ICALL_LOG", "warn")).init();

    let cli = Cli::parse();
    let mut out = output::StyledOutput::new(output::resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Check { header, config } => commands::check::execute(&mut out, &header, config.as_deref()),
        Commands::Lookup {
            header,
            token,
            assembly,
        } => commands::lookup::execute(&mut out, &header, token, &assembly),
        Commands::Stats { header } => commands::stats::execute(&mut out, &header),
        Commands::Info => commands::info::execute(),
    }
}
