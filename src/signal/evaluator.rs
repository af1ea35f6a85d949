//! Threshold evaluation over today's and yesterday's RSI readings

use crate::config::SignalConfig;
use crate::indicator::RsiSnapshot;

/// Pure predicate over a pair of snapshots.
///
/// An instrument is notable when any one rule fires:
/// 1. short-window RSI at or past the oversold/overbought bands
/// 2. long-window RSI at or past the bands
/// 3. short-window day-over-day move of at least `short_delta`
/// 4. long-window day-over-day move of at least `long_delta`
/// 5. short-window crossing of the midline in either direction
///
/// Fails closed: any absent reading means not notable.
pub struct SignalEvaluator {
    config: SignalConfig,
}

impl SignalEvaluator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Apply all rules to one instrument's readings.
    pub fn is_notable(&self, today: &RsiSnapshot, yesterday: &RsiSnapshot) -> bool {
        let (rsi7, rsi14, prev7, prev14) =
            match (today.rsi7, today.rsi14, yesterday.rsi7, yesterday.rsi14) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => return false,
            };

        let cfg = &self.config;

        if rsi7 <= cfg.oversold || rsi7 >= cfg.overbought {
            return true;
        }
        if rsi14 <= cfg.oversold || rsi14 >= cfg.overbought {
            return true;
        }
        if (rsi7 - prev7).abs() >= cfg.short_delta {
            return true;
        }
        if (rsi14 - prev14).abs() >= cfg.long_delta {
            return true;
        }

        // Midline crossover on the short window
        (prev7 <= cfg.midline && rsi7 > cfg.midline)
            || (prev7 >= cfg.midline && rsi7 < cfg.midline)
    }
}
