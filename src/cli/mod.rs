//! CLI interface for kospi-rsi
//!
//! Provides subcommands for:
//! - `run`: Start the periodic driver (daily collection + monthly rotation)
//! - `collect`: Run one collection pass now
//! - `files`: Dataset file management (list, backup, restore, sweep, sync, stats, fix)
//! - `status`: Show current dataset state
//! - `config`: Show configuration

mod collect;
mod files;
mod run;

pub use collect::CollectArgs;
pub use files::FilesArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kospi-rsi")]
#[command(about = "KOSPI 200 RSI screener with monthly dataset rotation and backup")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the periodic driver
    Run(RunArgs),
    /// Run one collection pass now
    Collect(CollectArgs),
    /// Manage dataset files
    Files(FilesArgs),
    /// Show current dataset state
    Status,
    /// Show configuration
    Config,
}
