//! Seeded synthetic price series
//!
//! Random-walk generator standing in for the network provider in tests
//! and offline runs. Deterministic per (seed, ticker), so repeated runs
//! over the same universe reproduce the same dataset.

use super::{PriceSeriesProvider, ProviderError};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic random-walk provider
pub struct SyntheticProvider {
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, ticker: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        ticker.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }
}

#[async_trait]
impl PriceSeriesProvider for SyntheticProvider {
    async fn fetch(&self, ticker: &str, num_points: usize) -> Result<Vec<Decimal>, ProviderError> {
        let mut rng = self.rng_for(ticker);

        let base = Decimal::from(rng.gen_range(10_000..100_000u32));
        let floor = base / Decimal::from(2);

        let mut prices = Vec::with_capacity(num_points);
        let mut price = base;
        for _ in 0..num_points {
            prices.push(price);
            // Daily move in [-2%, +2%] in 0.01% steps, floored at half the base
            let pct = Decimal::new(rng.gen_range(-200..=200i64), 4);
            price = (price * (Decimal::ONE + pct)).round_dp(2).max(floor);
        }

        Ok(prices)
    }
}
