//! Files command implementation
//!
//! Operational surface over the dataset store: every subcommand maps to
//! one store operation.

use crate::config::Config;
use crate::store::DatasetStore;
use chrono::Local;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// List all partitions, newest first
    List,
    /// Back up a file (defaults to the display file)
    Backup {
        /// File to back up
        file: Option<PathBuf>,
    },
    /// Restore a file from a backup
    Restore {
        /// Backup to restore from
        backup: PathBuf,
        /// Target path (defaults to the display file)
        target: Option<PathBuf>,
    },
    /// Remove partitions older than the retention horizon (backed up first)
    Sweep {
        /// Override the configured horizon
        #[arg(long)]
        keep_months: Option<u32>,
    },
    /// Resynchronize the display file from the active monthly partition
    Sync,
    /// Show aggregate statistics across all partitions
    Stats,
    /// Repair a malformed duplicate-suffix filename
    Fix {
        /// File to repair
        file: PathBuf,
    },
}

impl FilesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut store = DatasetStore::new(config.store.clone());

        match &self.command {
            FilesCommand::List => {
                let infos = store.list_partitions();
                println!("{} partition(s):", infos.len());
                for info in infos {
                    let range = info
                        .date_range
                        .map(|(a, b)| format!("{a} ~ {b}"))
                        .unwrap_or_else(|| "no dates".to_string());
                    println!(
                        "  {}\n    rows: {}, size: {} bytes, modified: {}, dates: {range}",
                        info.path.display(),
                        info.rows,
                        info.size,
                        info.modified.format("%Y-%m-%d %H:%M:%S"),
                    );
                }
            }
            FilesCommand::Backup { file } => {
                let source = file.clone().unwrap_or_else(|| store.display_path());
                let backup = store.backup(&source)?;
                println!("Backup created: {}", backup.display());
            }
            FilesCommand::Restore { backup, target } => {
                let target = target.clone().unwrap_or_else(|| store.display_path());
                store.restore(backup, &target)?;
                println!("Restored {} -> {}", backup.display(), target.display());
            }
            FilesCommand::Sweep { keep_months } => {
                let keep = keep_months.unwrap_or(config.store.keep_months);
                let removed = store.retention_sweep(keep);
                println!("Removed {removed} partition(s) older than {keep} months");
            }
            FilesCommand::Sync => {
                let synced = store.sync_display(Local::now().date_naive())?;
                if synced {
                    println!("Display file synced from the current monthly partition");
                } else {
                    println!("No monthly partition for the current month yet");
                }
            }
            FilesCommand::Stats => {
                let stats = store.statistics();
                println!("Files:    {}", stats.files);
                println!("Rows:     {}", stats.rows);
                println!("Size:     {:.2} MB", stats.bytes as f64 / (1024.0 * 1024.0));
                println!(
                    "Earliest: {}",
                    stats.earliest.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
                );
                println!(
                    "Latest:   {}",
                    stats.latest.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
                );
            }
            FilesCommand::Fix { file } => {
                let fixed = store.repair_name(file)?;
                if &fixed == file {
                    println!("Nothing to repair: {}", file.display());
                } else {
                    println!("Renamed {} -> {}", file.display(), fixed.display());
                }
            }
        }

        Ok(())
    }
}
