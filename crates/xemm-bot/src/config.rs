//! Application configuration.
//!
//! Loaded from TOML. Venues here are paper venues seeded with books and
//! balances; market pairs reference them by name.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use xemm_strategy::StrategyConfig;

/// One seeded order book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Trading pair symbol, e.g. `ETH-USDT`.
    pub pair: String,
    /// Bid levels as `(price, size)`.
    #[serde(default)]
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ask levels as `(price, size)`.
    #[serde(default)]
    pub asks: Vec<(Decimal, Decimal)>,
    /// Minimum price increment.
    #[serde(default = "default_price_quantum")]
    pub price_quantum: Decimal,
    /// Minimum size increment.
    #[serde(default = "default_size_step")]
    pub size_step: Decimal,
}

fn default_price_quantum() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_size_step() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

/// One paper venue with its seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    /// Asset balances (total = available at start).
    #[serde(default)]
    pub balances: HashMap<String, Decimal>,
    #[serde(default)]
    pub books: Vec<BookConfig>,
}

/// One maker/taker pairing by venue name and symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub maker_venue: String,
    pub maker_pair: String,
    pub taker_venue: String,
    pub taker_pair: String,
}

/// A conversion rate between quote assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRateConfig {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive. Overridden by the `XEMM_LOG` env var.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info,xemm=debug".to_string()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Clock cadence driving the strategy.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub venues: Vec<VenueConfig>,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
    #[serde(default)]
    pub fx_rates: Vec<FxRateConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl AppConfig {
    /// Config path from `XEMM_CONFIG`, or the default location.
    pub fn resolve_path() -> String {
        std::env::var("XEMM_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string())
    }

    /// Load configuration from the resolved path, falling back to the
    /// built-in paper setup when no file exists. Logging is not yet
    /// initialized here, so the caller reports which source was used.
    pub fn load() -> AppResult<Self> {
        let config_path = Self::resolve_path();
        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

impl Default for AppConfig {
    /// Built-in two-venue paper setup, useful for a first run without any
    /// configuration file.
    fn default() -> Self {
        let book = |bid: Decimal, ask: Decimal| BookConfig {
            pair: "ETH-USDT".to_string(),
            bids: vec![(bid, Decimal::from(25))],
            asks: vec![(ask, Decimal::from(25))],
            price_quantum: default_price_quantum(),
            size_step: default_size_step(),
        };
        let balances: HashMap<String, Decimal> = [
            ("ETH".to_string(), Decimal::from(10)),
            ("USDT".to_string(), Decimal::from(20000)),
        ]
        .into();

        Self {
            tick_interval_ms: default_tick_interval_ms(),
            venues: vec![
                VenueConfig {
                    name: "paper_maker".to_string(),
                    balances: balances.clone(),
                    books: vec![book(Decimal::new(10000, 2), Decimal::new(10100, 2))],
                },
                VenueConfig {
                    name: "paper_taker".to_string(),
                    balances,
                    books: vec![book(Decimal::new(9950, 2), Decimal::new(10050, 2))],
                },
            ],
            pairs: vec![PairConfig {
                maker_venue: "paper_maker".to_string(),
                maker_pair: "ETH-USDT".to_string(),
                taker_venue: "paper_taker".to_string(),
                taker_pair: "ETH-USDT".to_string(),
            }],
            fx_rates: Vec::new(),
            logging: LoggingConfig::default(),
            strategy: StrategyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_consistent() {
        let config = AppConfig::default();
        assert_eq!(config.venues.len(), 2);
        assert_eq!(config.pairs.len(), 1);
        let pair = &config.pairs[0];
        assert!(config.venues.iter().any(|v| v.name == pair.maker_venue));
        assert!(config.venues.iter().any(|v| v.name == pair.taker_venue));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
tick_interval_ms = 500

[logging]
filter = "warn,xemm=info"
json = true

[strategy]
min_profitability = "0.004"

[[venues]]
name = "alpha"

[venues.balances]
ETH = "5"

[[venues.books]]
pair = "ETH-USDT"
bids = [["99.5", "2"]]
asks = [["100.5", "2"]]

[[pairs]]
maker_venue = "alpha"
maker_pair = "ETH-USDT"
taker_venue = "alpha"
taker_pair = "ETH-USDT"

[[fx_rates]]
from = "USDT"
to = "USD"
rate = "1.001"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.logging.filter, "warn,xemm=info");
        assert!(config.logging.json);
        assert_eq!(config.strategy.min_profitability, dec!(0.004));
        assert_eq!(config.venues[0].balances["ETH"], dec!(5));
        assert_eq!(config.venues[0].books[0].bids[0], (dec!(99.5), dec!(2)));
        assert_eq!(config.fx_rates[0].rate, dec!(1.001));
    }
}
