//! Naver Finance daily chart client
//!
//! Fetches the `sise.nhn` daily chart payload for one ticker. The payload
//! is a small XML document whose `<item data="...">` attributes carry
//! `date|open|high|low|close|volume` rows in ascending date order, which
//! matches the oldest-first contract of the provider capability.

use super::{PriceSeriesProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// Default chart endpoint
pub const NAVER_CHART_URL: &str = "https://fchart.stock.naver.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for the chart client
#[derive(Debug, Clone)]
pub struct NaverConfig {
    /// Base URL for the chart endpoint
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Courtesy delay between instrument fetches
    pub request_delay: Duration,
}

impl Default for NaverConfig {
    fn default() -> Self {
        Self {
            base_url: NAVER_CHART_URL.to_string(),
            timeout: Duration::from_secs(10),
            request_delay: Duration::from_secs(1),
        }
    }
}

/// Client for the Naver Finance daily chart endpoint
pub struct NaverChartClient {
    config: NaverConfig,
    client: Client,
}

impl NaverChartClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(NaverConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: NaverConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

impl Default for NaverChartClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSeriesProvider for NaverChartClient {
    async fn fetch(&self, ticker: &str, num_points: usize) -> Result<Vec<Decimal>, ProviderError> {
        let url = format!("{}/sise.nhn", self.config.base_url);

        tracing::debug!(ticker, num_points, url = %url, "Fetching daily chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", ticker),
                ("timeframe", "day"),
                ("count", &num_points.to_string()),
                ("requestType", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let payload = response.text().await?;
        parse_chart_payload(&payload)
    }

    fn throttle(&self) -> Duration {
        self.config.request_delay
    }
}

/// Extract the close column from a chart payload, oldest first.
fn parse_chart_payload(payload: &str) -> Result<Vec<Decimal>, ProviderError> {
    let mut closes = Vec::new();

    let mut rest = payload;
    while let Some(start) = rest.find("data=\"") {
        rest = &rest[start + 6..];
        let end = rest
            .find('"')
            .ok_or_else(|| ProviderError::Malformed("unterminated data attribute".to_string()))?;
        let row = &rest[..end];
        rest = &rest[end + 1..];

        let mut fields = row.split('|');
        let close = fields
            .nth(4)
            .ok_or_else(|| ProviderError::Malformed(format!("row has too few fields: {row}")))?;
        let close = Decimal::from_str(close)
            .map_err(|_| ProviderError::Malformed(format!("unparseable close: {close}")))?;
        if close <= Decimal::ZERO {
            return Err(ProviderError::Malformed(format!(
                "non-positive close: {close}"
            )));
        }
        closes.push(close);
    }

    if closes.is_empty() {
        return Err(ProviderError::Malformed(
            "no data rows in payload".to_string(),
        ));
    }

    Ok(closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="EUC-KR" ?>
<protocol>
 <chartdata symbol="005930" name="Samsung" count="3" timeframe="day" precision="0" origintime="19900103">
  <item data="20240502|77500|78200|77300|77600|12000000" />
  <item data="20240503|77600|78000|77000|77900|10100000" />
  <item data="20240507|77900|79100|77800|78800|13400000" />
 </chartdata>
</protocol>"#;

    #[test]
    fn test_parse_chart_payload() {
        let closes = parse_chart_payload(SAMPLE).unwrap();
        assert_eq!(closes, vec![dec!(77600), dec!(77900), dec!(78800)]);
    }

    #[test]
    fn test_parse_rejects_empty_payload() {
        let err = parse_chart_payload("<protocol></protocol>").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let payload = r#"<item data="20240502|77500" />"#;
        let err = parse_chart_payload(payload).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_bad_close() {
        let payload = r#"<item data="20240502|77500|78200|77300|abc|12000000" />"#;
        let err = parse_chart_payload(payload).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_throttle_reports_configured_delay() {
        let client = NaverChartClient::with_config(NaverConfig {
            base_url: NAVER_CHART_URL.to_string(),
            timeout: Duration::from_secs(5),
            request_delay: Duration::from_millis(250),
        });
        assert_eq!(client.throttle(), Duration::from_millis(250));
    }
}
