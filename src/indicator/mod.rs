//! RSI computation engine
//!
//! Pure functions from a daily close series to the bounded [0, 100]
//! oscillator. No I/O and no state; callers own the series for one
//! evaluation and pass the exact slice whose tail is the evaluation date.

mod rsi;

pub use rsi::{compute, IndicatorError, RsiSnapshot};
