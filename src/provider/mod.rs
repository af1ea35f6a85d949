//! Price series providers
//!
//! The collector only depends on the `PriceSeriesProvider` capability:
//! an ordered, oldest-first series of positive daily closes. Two
//! implementations exist and are never conflated:
//! - `NaverChartClient`: the production network-backed client
//! - `SyntheticProvider`: a seeded random walk for offline runs and tests

mod naver;
mod synthetic;

pub use naver::{NaverChartClient, NaverConfig};
pub use synthetic::SyntheticProvider;

use crate::config::{ProviderConfig, ProviderKind};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Provider failures
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Payload did not contain a usable series
    #[error("malformed chart payload: {0}")]
    Malformed(String),
}

/// Capability for fetching one instrument's daily close series
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Fetch up to `num_points` daily closes, oldest first, all positive.
    async fn fetch(&self, ticker: &str, num_points: usize) -> Result<Vec<Decimal>, ProviderError>;

    /// Courtesy delay the caller must honor between instrument fetches.
    fn throttle(&self) -> Duration {
        Duration::ZERO
    }
}

/// Build the configured provider implementation.
pub fn build_provider(config: &ProviderConfig) -> Box<dyn PriceSeriesProvider> {
    match config.kind {
        ProviderKind::Naver => Box::new(NaverChartClient::with_config(NaverConfig {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })),
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new(config.seed)),
    }
}
