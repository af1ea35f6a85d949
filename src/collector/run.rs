//! One collection pass over the tracked universe

use super::RecordAssembler;
use crate::config::{IndicatorConfig, Instrument, SignalConfig};
use crate::indicator::IndicatorError;
use crate::provider::PriceSeriesProvider;
use crate::signal::SignalEvaluator;
use crate::store::{DatasetStore, ScreenRecord};
use chrono::NaiveDate;

/// Minimum usable series length; shorter fetch results are skipped.
const MIN_SERIES_LEN: usize = 15;

/// End-of-run accounting, logged as the run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Instruments whose record was assembled and evaluated
    pub evaluated: usize,
    /// Records that crossed a threshold and were persisted
    pub notable: usize,
    /// Instruments skipped because the provider failed
    pub skipped_provider: usize,
    /// Instruments skipped for too little data
    pub skipped_short: usize,
}

/// Runs one pass: provider -> indicator -> evaluation -> store.
pub struct Collector {
    provider: Box<dyn PriceSeriesProvider>,
    assembler: RecordAssembler,
    evaluator: SignalEvaluator,
    universe: Vec<Instrument>,
    lookback_days: usize,
}

impl Collector {
    pub fn new(
        provider: Box<dyn PriceSeriesProvider>,
        indicator: IndicatorConfig,
        signal: SignalConfig,
        universe: Vec<Instrument>,
        lookback_days: usize,
    ) -> Self {
        Self {
            provider,
            assembler: RecordAssembler::new(indicator),
            evaluator: SignalEvaluator::new(signal),
            universe,
            // Never request fewer points than a full evaluation needs
            lookback_days: lookback_days.max(30),
        }
    }

    /// Walk the universe sequentially and collect the notable records.
    ///
    /// No instrument failure aborts the pass: provider errors and short
    /// series are logged and skipped. The provider's courtesy delay is
    /// honored between instruments.
    pub async fn collect(&self, as_of: NaiveDate) -> (Vec<ScreenRecord>, RunSummary) {
        let mut records = Vec::new();
        let mut summary = RunSummary::default();
        let total = self.universe.len();

        for (index, instrument) in self.universe.iter().enumerate() {
            tracing::debug!(
                ticker = %instrument.ticker,
                progress = %format!("{}/{total}", index + 1),
                "Evaluating instrument"
            );

            let series = match self.provider.fetch(&instrument.ticker, self.lookback_days).await {
                Ok(series) => series,
                Err(e) => {
                    tracing::warn!(ticker = %instrument.ticker, error = %e, "Provider failed, skipping");
                    summary.skipped_provider += 1;
                    self.pause().await;
                    continue;
                }
            };

            if series.len() < MIN_SERIES_LEN {
                tracing::warn!(
                    ticker = %instrument.ticker,
                    points = series.len(),
                    "Series too short, skipping"
                );
                summary.skipped_short += 1;
                self.pause().await;
                continue;
            }

            match self.assembler.assemble(instrument, &series, as_of) {
                Ok(record) => {
                    summary.evaluated += 1;
                    if self
                        .evaluator
                        .is_notable(&record.today_snapshot(), &record.yesterday_snapshot())
                    {
                        tracing::info!(
                            ticker = %instrument.ticker,
                            rsi7 = ?record.rsi7,
                            rsi14 = ?record.rsi14,
                            "Notable instrument"
                        );
                        records.push(record);
                    }
                }
                Err(IndicatorError::InsufficientData { required, actual }) => {
                    tracing::warn!(
                        ticker = %instrument.ticker,
                        required,
                        actual,
                        "Insufficient data, skipping"
                    );
                    summary.skipped_short += 1;
                }
                Err(e) => {
                    tracing::warn!(ticker = %instrument.ticker, error = %e, "Skipping instrument");
                    summary.skipped_short += 1;
                }
            }

            self.pause().await;
        }

        summary.notable = records.len();
        (records, summary)
    }

    /// Run one pass and persist the notable records.
    ///
    /// A pass with zero notable records still succeeds; nothing is written
    /// so partition mtimes keep meaning for the retention sweep.
    pub async fn collect_and_store(
        &self,
        store: &mut DatasetStore,
        as_of: NaiveDate,
    ) -> anyhow::Result<RunSummary> {
        tracing::info!(universe = self.universe.len(), %as_of, "Collection pass starting");

        let (records, summary) = self.collect(as_of).await;

        if records.is_empty() {
            tracing::info!(
                evaluated = summary.evaluated,
                skipped_provider = summary.skipped_provider,
                skipped_short = summary.skipped_short,
                "Collection pass finished with nothing notable"
            );
            return Ok(summary);
        }

        store.append_run(&records, as_of)?;

        tracing::info!(
            evaluated = summary.evaluated,
            notable = summary.notable,
            skipped_provider = summary.skipped_provider,
            skipped_short = summary.skipped_short,
            "Collection pass finished"
        );
        Ok(summary)
    }

    async fn pause(&self) {
        let delay = self.provider.throttle();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
