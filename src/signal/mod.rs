//! Screen signal evaluation
//!
//! Decides which instruments are worth recording for the day.

mod evaluator;

pub use evaluator::SignalEvaluator;
