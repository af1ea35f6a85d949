//! Record assembly from one instrument's price series

use crate::config::{IndicatorConfig, Instrument};
use crate::indicator::{self, IndicatorError};
use crate::store::ScreenRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Builds one persisted record from metadata plus a price series.
///
/// Today's readings come from the full series; yesterday's are always
/// recomputed from the series with its last element removed, never reused
/// from today. A series long enough for today but not for yesterday is
/// rejected, so the record either carries four honest values or does not
/// exist. Whether the record is notable is the caller's decision.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    config: IndicatorConfig,
}

impl RecordAssembler {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    /// Minimum series length: yesterday's long window needs one extra point.
    pub fn required_len(&self) -> usize {
        self.config.long_window + 2
    }

    pub fn assemble(
        &self,
        instrument: &Instrument,
        series: &[Decimal],
        as_of: NaiveDate,
    ) -> Result<ScreenRecord, IndicatorError> {
        if series.len() < self.required_len() {
            return Err(IndicatorError::InsufficientData {
                required: self.required_len(),
                actual: series.len(),
            });
        }

        let truncated = &series[..series.len() - 1];

        Ok(ScreenRecord {
            ticker: instrument.ticker.clone(),
            name: instrument.name.clone(),
            industry: instrument.industry.clone(),
            date: as_of,
            rsi7: Some(indicator::compute(series, self.config.short_window)?),
            rsi14: Some(indicator::compute(series, self.config.long_window)?),
            yesterday_rsi7: Some(indicator::compute(truncated, self.config.short_window)?),
            yesterday_rsi14: Some(indicator::compute(truncated, self.config.long_window)?),
        })
    }
}
