//! Relative Strength Index over a fixed window of price differences

use crate::config::IndicatorConfig;
use rust_decimal::Decimal;
use thiserror::Error;

/// Indicator computation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// Series too short for the requested window
    #[error("insufficient data: need {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    /// Window of zero differences has no average
    #[error("window must be positive")]
    ZeroWindow,
}

/// Compute the RSI for one window.
///
/// Differences are taken between consecutive closes and split into gains
/// and losses; the averages are seeded over the FIRST `window` differences
/// of the slice, so the caller controls the evaluation date by truncating
/// the series, not by shifting a rolling cache. A zero average loss means
/// an uninterrupted-gain series and saturates the result at exactly 100.
/// Everything else is `100 - 100 / (1 + avg_gain / avg_loss)`, rounded to
/// two decimal places.
pub fn compute(series: &[Decimal], window: usize) -> Result<Decimal, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::ZeroWindow);
    }
    if series.len() < window + 1 {
        return Err(IndicatorError::InsufficientData {
            required: window + 1,
            actual: series.len(),
        });
    }

    let mut gain_sum = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;
    for pair in series.windows(2).take(window) {
        let delta = pair[1] - pair[0];
        if delta > Decimal::ZERO {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }

    let divisor = Decimal::from(window as u64);
    let avg_gain = gain_sum / divisor;
    let avg_loss = loss_sum / divisor;

    if avg_loss.is_zero() {
        return Ok(Decimal::from(100));
    }

    let ratio = avg_gain / avg_loss;
    let rsi = Decimal::from(100) - Decimal::from(100) / (Decimal::ONE + ratio);
    Ok(rsi.round_dp(2))
}

/// RSI readings for the two tracked windows, as of the series tail.
///
/// A window is `None` when the series cannot support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiSnapshot {
    pub rsi7: Option<Decimal>,
    pub rsi14: Option<Decimal>,
}

impl RsiSnapshot {
    /// Compute both windows from one series.
    pub fn from_series(series: &[Decimal], config: &IndicatorConfig) -> Self {
        Self {
            rsi7: compute(series, config.short_window).ok(),
            rsi14: compute(series, config.long_window).ok(),
        }
    }

    /// True when both windows produced a value.
    pub fn is_complete(&self) -> bool {
        self.rsi7.is_some() && self.rsi14.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spec_series() -> Vec<Decimal> {
        vec![
            dec!(100),
            dec!(102),
            dec!(101),
            dec!(103),
            dec!(105),
            dec!(107),
            dec!(106),
            dec!(108),
            dec!(110),
            dec!(109),
            dec!(111),
            dec!(113),
            dec!(112),
            dec!(114),
            dec!(116),
        ]
    }

    #[test]
    fn test_all_gains_saturates_at_100() {
        let series: Vec<Decimal> = (1..=8).map(Decimal::from).collect();
        assert_eq!(compute(&series, 7).unwrap(), dec!(100));
    }

    #[test]
    fn test_flat_series_saturates_at_100() {
        // Zero differences count as zero losses, so the saturation rule applies
        let series = vec![dec!(50); 8];
        assert_eq!(compute(&series, 7).unwrap(), dec!(100));
    }

    #[test]
    fn test_all_losses_is_zero() {
        let series: Vec<Decimal> = (1..=15).rev().map(Decimal::from).collect();
        assert_eq!(compute(&series, 14).unwrap(), dec!(0));
    }

    #[test]
    fn test_insufficient_data() {
        let series: Vec<Decimal> = (1..=14).map(Decimal::from).collect();
        assert_eq!(
            compute(&series, 14),
            Err(IndicatorError::InsufficientData {
                required: 15,
                actual: 14
            })
        );
    }

    #[test]
    fn test_zero_window() {
        let series = vec![dec!(1), dec!(2)];
        assert_eq!(compute(&series, 0), Err(IndicatorError::ZeroWindow));
    }

    #[test]
    fn test_boundary_15_points_window_14() {
        // len = 15 = 14 + 1: exactly enough for the long window.
        // Diffs: ten gains of 2 and four losses of 1 over 14 entries,
        // so avg_gain/avg_loss = 20/4 = 5 and RSI = 100 - 100/6.
        let value = compute(&spec_series(), 14).unwrap();
        assert_eq!(value, dec!(83.33));
    }

    #[test]
    fn test_window_7_uses_first_seven_differences() {
        // First 7 diffs: +2,-1,+2,+2,+2,-1,+2 -> gains 10, losses 2, rs = 5
        let value = compute(&spec_series(), 7).unwrap();
        assert_eq!(value, dec!(83.33));

        // A differing tail beyond the first 7 diffs must not change the result
        let mut tail_changed = spec_series();
        let last = tail_changed.len() - 1;
        tail_changed[last] = dec!(90);
        assert_eq!(compute(&tail_changed, 7).unwrap(), value);
    }

    #[test]
    fn test_result_in_range() {
        let series = vec![
            dec!(44.34),
            dec!(44.09),
            dec!(44.15),
            dec!(43.61),
            dec!(44.33),
            dec!(44.83),
            dec!(45.10),
            dec!(45.42),
            dec!(45.84),
            dec!(46.08),
            dec!(45.89),
            dec!(46.03),
            dec!(44.18),
            dec!(44.22),
            dec!(44.57),
        ];
        for window in [7usize, 14] {
            let value = compute(&series, window).unwrap();
            assert!(value >= Decimal::ZERO && value <= dec!(100), "RSI {value} out of range");
        }
    }

    #[test]
    fn test_snapshot_from_series() {
        let config = IndicatorConfig::default();
        let snapshot = RsiSnapshot::from_series(&spec_series(), &config);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.rsi7, Some(dec!(83.33)));
        assert_eq!(snapshot.rsi14, Some(dec!(83.33)));
    }

    #[test]
    fn test_snapshot_partial_when_short() {
        let config = IndicatorConfig::default();
        let series: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        let snapshot = RsiSnapshot::from_series(&series, &config);
        assert_eq!(snapshot.rsi7, Some(dec!(100)));
        assert_eq!(snapshot.rsi14, None);
        assert!(!snapshot.is_complete());
    }
}
