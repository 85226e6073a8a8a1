//! Strategy configuration.

use crate::error::{Result, StrategyError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bitmask selecting the optional log classes.
///
/// Unconditional warnings and errors are never gated; these flags only
/// control the chatty per-decision logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogOptions(pub u32);

impl LogOptions {
    pub const NULL_ORDER_SIZE: Self = Self(1 << 0);
    pub const REMOVING_ORDER: Self = Self(1 << 1);
    pub const ADJUST_ORDER: Self = Self(1 << 2);
    pub const CREATE_ORDER: Self = Self(1 << 3);
    pub const MAKER_ORDER_FILLED: Self = Self(1 << 4);
    pub const STATUS_REPORT: Self = Self(1 << 5);
    pub const MAKER_ORDER_HEDGED: Self = Self(1 << 6);

    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x7f);

    pub fn contains(&self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// Cross-exchange market-making configuration.
///
/// Ratios are plain fractions (`0.01` = 1%). Sizes are base units of the
/// maker trading pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Minimum maker-vs-taker edge required to keep or open an order.
    #[serde(default = "default_min_profitability")]
    pub min_profitability: Decimal,

    /// Absolute order size override in base units. Zero means size from
    /// the portfolio ratio cap instead.
    #[serde(default)]
    pub order_amount: Decimal,

    /// Cap on order size as a fraction of the hedgeable taker volume.
    #[serde(default = "default_order_size_taker_volume_factor")]
    pub order_size_taker_volume_factor: Decimal,

    /// Cap on order size as a fraction of the taker available balance.
    #[serde(default = "default_order_size_taker_balance_factor")]
    pub order_size_taker_balance_factor: Decimal,

    /// Cap on order size as a fraction of the maker portfolio value.
    #[serde(default = "default_order_size_portfolio_ratio_limit")]
    pub order_size_portfolio_ratio_limit: Decimal,

    /// Clamp maker prices to one tick past the top of book.
    #[serde(default = "default_true")]
    pub adjust_order_enabled: bool,

    /// When true, cancel on `min_profitability`; when false, rely on
    /// venue-side TTL and the looser `cancel_order_threshold`.
    #[serde(default = "default_true")]
    pub active_order_canceling: bool,

    /// Profitability bound used for cancels in passive-expiry mode.
    #[serde(default = "default_cancel_order_threshold")]
    pub cancel_order_threshold: Decimal,

    /// Seconds between price-drift re-cancels on a pair.
    #[serde(default = "default_anti_hysteresis_duration_secs")]
    pub anti_hysteresis_duration_secs: u64,

    /// TTL attached to maker orders in passive-expiry mode.
    #[serde(default = "default_limit_order_min_expiration_secs")]
    pub limit_order_min_expiration_secs: u64,

    /// Volume depth at which "top of book" is measured. Zero uses the
    /// best quote directly.
    #[serde(default)]
    pub top_depth_tolerance: Decimal,

    /// Seconds between repeated connectivity warnings / status reports.
    #[serde(default = "default_status_report_interval_secs")]
    pub status_report_interval_secs: u64,

    /// Optional log classes.
    #[serde(default)]
    pub logging_options: LogOptions,
}

impl StrategyConfig {
    /// Profitability bound for the cancel decision in the current mode.
    pub fn cancel_threshold(&self) -> Decimal {
        if self.active_order_canceling {
            self.min_profitability
        } else {
            self.cancel_order_threshold
        }
    }

    /// True when the given log class is enabled.
    pub fn logs(&self, flag: LogOptions) -> bool {
        self.logging_options.contains(flag)
    }

    /// Reject out-of-range parameters. Fatal at construction.
    pub fn validate(&self) -> Result<()> {
        fn fraction_in_unit(name: &str, value: Decimal) -> Result<()> {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(StrategyError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
            Ok(())
        }

        if self.min_profitability.is_sign_negative() {
            return Err(StrategyError::InvalidConfig(format!(
                "min_profitability must be >= 0, got {}",
                self.min_profitability
            )));
        }
        if self.cancel_order_threshold.is_sign_negative() {
            return Err(StrategyError::InvalidConfig(format!(
                "cancel_order_threshold must be >= 0, got {}",
                self.cancel_order_threshold
            )));
        }
        if self.order_amount.is_sign_negative() {
            return Err(StrategyError::InvalidConfig(format!(
                "order_amount must be >= 0, got {}",
                self.order_amount
            )));
        }
        if self.top_depth_tolerance.is_sign_negative() {
            return Err(StrategyError::InvalidConfig(format!(
                "top_depth_tolerance must be >= 0, got {}",
                self.top_depth_tolerance
            )));
        }
        fraction_in_unit(
            "order_size_taker_volume_factor",
            self.order_size_taker_volume_factor,
        )?;
        fraction_in_unit(
            "order_size_taker_balance_factor",
            self.order_size_taker_balance_factor,
        )?;
        if self.order_size_portfolio_ratio_limit.is_sign_negative()
            || self.order_size_portfolio_ratio_limit > Decimal::ONE
        {
            return Err(StrategyError::InvalidConfig(format!(
                "order_size_portfolio_ratio_limit must be in [0, 1], got {}",
                self.order_size_portfolio_ratio_limit
            )));
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_profitability: default_min_profitability(),
            order_amount: Decimal::ZERO,
            order_size_taker_volume_factor: default_order_size_taker_volume_factor(),
            order_size_taker_balance_factor: default_order_size_taker_balance_factor(),
            order_size_portfolio_ratio_limit: default_order_size_portfolio_ratio_limit(),
            adjust_order_enabled: true,
            active_order_canceling: true,
            cancel_order_threshold: default_cancel_order_threshold(),
            anti_hysteresis_duration_secs: default_anti_hysteresis_duration_secs(),
            limit_order_min_expiration_secs: default_limit_order_min_expiration_secs(),
            top_depth_tolerance: Decimal::ZERO,
            status_report_interval_secs: default_status_report_interval_secs(),
            logging_options: LogOptions::default(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_min_profitability() -> Decimal {
    Decimal::new(3, 3) // 0.3%
}
fn default_order_size_taker_volume_factor() -> Decimal {
    Decimal::new(25, 2) // 0.25
}
fn default_order_size_taker_balance_factor() -> Decimal {
    Decimal::new(995, 3) // 0.995
}
fn default_order_size_portfolio_ratio_limit() -> Decimal {
    Decimal::new(1667, 4) // 0.1667
}
fn default_cancel_order_threshold() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_anti_hysteresis_duration_secs() -> u64 {
    60
}
fn default_limit_order_min_expiration_secs() -> u64 {
    130
}
fn default_status_report_interval_secs() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_valid() {
        let config = StrategyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_profitability, dec!(0.003));
        assert_eq!(config.order_size_taker_balance_factor, dec!(0.995));
        assert!(config.adjust_order_enabled);
        assert!(config.active_order_canceling);
        assert_eq!(config.logging_options, LogOptions::ALL);
    }

    #[test]
    fn test_cancel_threshold_by_mode() {
        let mut config = StrategyConfig {
            min_profitability: dec!(0.01),
            cancel_order_threshold: dec!(0.05),
            ..Default::default()
        };
        assert_eq!(config.cancel_threshold(), dec!(0.01));
        config.active_order_canceling = false;
        assert_eq!(config.cancel_threshold(), dec!(0.05));
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let bad_factor = StrategyConfig {
            order_size_taker_balance_factor: dec!(1.5),
            ..Default::default()
        };
        assert!(bad_factor.validate().is_err());

        let negative_profit = StrategyConfig {
            min_profitability: dec!(-0.01),
            ..Default::default()
        };
        assert!(negative_profit.validate().is_err());

        let zero_volume_factor = StrategyConfig {
            order_size_taker_volume_factor: Decimal::ZERO,
            ..Default::default()
        };
        assert!(zero_volume_factor.validate().is_err());
    }

    #[test]
    fn test_log_options_bits() {
        let opts = LogOptions(LogOptions::CREATE_ORDER.0 | LogOptions::REMOVING_ORDER.0);
        assert!(opts.contains(LogOptions::CREATE_ORDER));
        assert!(opts.contains(LogOptions::REMOVING_ORDER));
        assert!(!opts.contains(LogOptions::MAKER_ORDER_HEDGED));
        assert!(LogOptions::ALL.contains(LogOptions::STATUS_REPORT));
        assert!(!LogOptions::NONE.contains(LogOptions::NULL_ORDER_SIZE));
    }

    #[test]
    fn test_toml_defaults() {
        let config: StrategyConfig = toml::from_str("min_profitability = \"0.01\"").unwrap();
        assert_eq!(config.min_profitability, dec!(0.01));
        assert_eq!(config.cancel_order_threshold, dec!(0.05));
        assert_eq!(config.anti_hysteresis_duration_secs, 60);
    }
}
