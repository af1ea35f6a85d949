//! Configuration types for kospi-rsi

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    pub store: StoreConfig,
    pub schedule: ScheduleConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

/// One tracked instrument
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Instrument {
    /// Stable exchange code (e.g., "005930")
    pub ticker: String,
    pub name: String,
    pub industry: String,
}

/// Price series provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Base URL of the daily chart endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Courtesy delay between instrument fetches
    #[serde(default = "default_delay_ms")]
    pub request_delay_ms: u64,

    /// Number of daily closes requested per instrument
    #[serde(default = "default_lookback_days")]
    pub lookback_days: usize,

    /// Seed for the synthetic provider
    #[serde(default)]
    pub seed: u64,
}

/// Provider implementation: network-backed or seeded synthetic
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Naver,
    Synthetic,
}

fn default_base_url() -> String {
    "https://fchart.stock.naver.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    1000
}
fn default_lookback_days() -> usize {
    30
}

/// RSI window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    /// Short lookback window (price differences averaged)
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    /// Long lookback window
    #[serde(default = "default_long_window")]
    pub long_window: usize,
}

fn default_short_window() -> usize {
    7
}
fn default_long_window() -> usize {
    14
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_window: 7,
            long_window: 14,
        }
    }
}

/// Attention thresholds for the screen
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// At or below this the instrument is oversold
    #[serde(default = "default_oversold")]
    pub oversold: Decimal,

    /// At or above this the instrument is overbought
    #[serde(default = "default_overbought")]
    pub overbought: Decimal,

    /// Minimum day-over-day short-window move
    #[serde(default = "default_short_delta")]
    pub short_delta: Decimal,

    /// Minimum day-over-day long-window move
    #[serde(default = "default_long_delta")]
    pub long_delta: Decimal,

    /// Crossover line for the short window
    #[serde(default = "default_midline")]
    pub midline: Decimal,
}

fn default_oversold() -> Decimal {
    Decimal::from(30)
}
fn default_overbought() -> Decimal {
    Decimal::from(70)
}
fn default_short_delta() -> Decimal {
    Decimal::from(5)
}
fn default_long_delta() -> Decimal {
    Decimal::from(3)
}
fn default_midline() -> Decimal {
    Decimal::from(50)
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            oversold: Decimal::from(30),
            overbought: Decimal::from(70),
            short_delta: Decimal::from(5),
            long_delta: Decimal::from(3),
            midline: Decimal::from(50),
        }
    }
}

/// Dataset store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the display file and monthly partitions
    pub data_dir: PathBuf,

    /// Basename shared by all partitions (files are `results_<basename>*.csv`)
    pub base_name: String,

    /// Directory for timestamped backups
    pub backup_dir: PathBuf,

    /// Row cap applied after every write
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Retention horizon for the sweep, in months
    #[serde(default = "default_keep_months")]
    pub keep_months: u32,
}

fn default_max_rows() -> usize {
    1000
}
fn default_keep_months() -> u32 {
    6
}

/// Periodic driver configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Local time of the daily collection pass ("HH:MM")
    pub daily_at: String,

    /// Local time of the day-1 month rollover check ("HH:MM")
    pub rotate_check_at: String,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_toml() -> &'static str {
        r#"
            [provider]
            kind = "naver"
            base_url = "https://fchart.stock.naver.com"
            request_timeout_secs = 10
            request_delay_ms = 1000
            lookback_days = 30

            [indicator]
            short_window = 7
            long_window = 14

            [signal]
            oversold = 30
            overbought = 70
            short_delta = 5
            long_delta = 3
            midline = 50

            [store]
            data_dir = "./data"
            base_name = "kospi_200"
            backup_dir = "./data/backups"
            max_rows = 1000
            keep_months = 6

            [schedule]
            daily_at = "16:00"
            rotate_check_at = "09:00"

            [telemetry]
            log_level = "info"

            [[instruments]]
            ticker = "005930"
            name = "Samsung Electronics"
            industry = "Semiconductors"
        "#
    }

    #[test]
    fn test_config_deserialize() {
        let config: Config = toml::from_str(sample_toml()).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Naver);
        assert_eq!(config.indicator.long_window, 14);
        assert_eq!(config.store.max_rows, 1000);
        assert_eq!(config.instruments.len(), 1);
        assert_eq!(config.instruments[0].ticker, "005930");
    }

    #[test]
    fn test_provider_kind_synthetic() {
        let toml = r#"
            [provider]
            kind = "synthetic"

            [store]
            data_dir = "./data"
            base_name = "kospi_200"
            backup_dir = "./data/backups"

            [schedule]
            daily_at = "16:00"
            rotate_check_at = "09:00"

            [telemetry]
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Synthetic);
        // Section defaults kick in when omitted
        assert_eq!(config.provider.lookback_days, 30);
        assert_eq!(config.indicator.short_window, 7);
        assert_eq!(config.signal.overbought, dec!(70));
        assert!(config.instruments.is_empty());
    }

    #[test]
    fn test_signal_config_defaults() {
        let signal = SignalConfig::default();
        assert_eq!(signal.oversold, dec!(30));
        assert_eq!(signal.overbought, dec!(70));
        assert_eq!(signal.short_delta, dec!(5));
        assert_eq!(signal.long_delta, dec!(3));
        assert_eq!(signal.midline, dec!(50));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_instrument_clone() {
        let inst = Instrument {
            ticker: "000660".to_string(),
            name: "SK Hynix".to_string(),
            industry: "Semiconductors".to_string(),
        };
        let cloned = inst.clone();
        assert_eq!(inst, cloned);
    }
}
