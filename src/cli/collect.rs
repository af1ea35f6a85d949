//! Collect command implementation

use crate::collector::Collector;
use crate::config::{Config, ProviderKind};
use crate::provider::{build_provider, PriceSeriesProvider, SyntheticProvider};
use crate::store::DatasetStore;
use chrono::{Local, NaiveDate};
use clap::Args;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Record date for the pass (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Use the seeded synthetic provider regardless of configuration
    #[arg(long)]
    pub synthetic: bool,
}

impl CollectArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let provider: Box<dyn PriceSeriesProvider> = if self.synthetic
            && config.provider.kind != ProviderKind::Synthetic
        {
            Box::new(SyntheticProvider::new(config.provider.seed))
        } else {
            build_provider(&config.provider)
        };

        let collector = Collector::new(
            provider,
            config.indicator.clone(),
            config.signal.clone(),
            config.instruments.clone(),
            config.provider.lookback_days,
        );
        let mut store = DatasetStore::new(config.store.clone());

        let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        let summary = collector.collect_and_store(&mut store, as_of).await?;

        println!(
            "Collected {} notable of {} evaluated ({} provider failures, {} too short)",
            summary.notable, summary.evaluated, summary.skipped_provider, summary.skipped_short
        );
        Ok(())
    }
}
