//! Run command implementation

use crate::collector::Collector;
use crate::config::Config;
use crate::provider::build_provider;
use crate::scheduler::{PeriodicDriver, Schedule};
use crate::store::DatasetStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let provider = build_provider(&config.provider);
        let collector = Collector::new(
            provider,
            config.indicator.clone(),
            config.signal.clone(),
            config.instruments.clone(),
            config.provider.lookback_days,
        );
        let store = DatasetStore::new(config.store.clone());
        let schedule = Schedule::from_config(&config.schedule)?;

        let mut driver = PeriodicDriver::new(collector, store, schedule);
        driver.run().await
    }
}
