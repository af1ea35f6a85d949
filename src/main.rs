use chrono::{Datelike, Local};
use clap::Parser;
use kospi_rsi::cli::{Cli, Commands};
use kospi_rsi::config::Config;
use kospi_rsi::store::{DatasetStore, PartitionData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    kospi_rsi::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting periodic driver");
            args.execute(&config).await?;
        }
        Commands::Collect(args) => {
            tracing::info!("Starting one-shot collection");
            args.execute(&config).await?;
        }
        Commands::Files(args) => {
            args.execute(&config).await?;
        }
        Commands::Status => {
            let store = DatasetStore::new(config.store.clone());
            let today = Local::now().date_naive();
            let display = store.display_path();
            let monthly = store.monthly_path(today.year(), today.month());

            println!("kospi-rsi status");
            println!("  Display file: {} ({})", display.display(), presence(&store, &display));
            println!("  Monthly file: {} ({})", monthly.display(), presence(&store, &monthly));
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Provider: {:?}", config.provider.kind);
            println!(
                "  Windows: RSI{} / RSI{}",
                config.indicator.short_window, config.indicator.long_window
            );
            println!(
                "  Thresholds: bands {}..{}, deltas {}/{}, midline {}",
                config.signal.oversold,
                config.signal.overbought,
                config.signal.short_delta,
                config.signal.long_delta,
                config.signal.midline
            );
            println!(
                "  Store: {} (cap {}, keep {} months)",
                config.store.data_dir.display(),
                config.store.max_rows,
                config.store.keep_months
            );
            println!("  Instruments: {}", config.instruments.len());
            println!(
                "  Schedule: daily at {}, rotation check at {}",
                config.schedule.daily_at, config.schedule.rotate_check_at
            );
        }
    }

    Ok(())
}

fn presence(store: &DatasetStore, path: &std::path::Path) -> String {
    match store.read_partition(path) {
        PartitionData::Present(rows) => format!("{} rows", rows.len()),
        PartitionData::Absent => "missing".to_string(),
        PartitionData::Corrupt(reason) => format!("corrupt: {reason}"),
    }
}
