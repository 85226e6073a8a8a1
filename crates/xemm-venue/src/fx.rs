//! Cross-currency rate oracle.
//!
//! When the maker and taker legs settle in different quote assets
//! (e.g. USD vs USDT), hedging prices must be converted into maker-quote
//! units before any profitability comparison.

use rust_decimal::Decimal;
use std::collections::HashMap;

/// Source of conversion rates between quote assets.
pub trait FxOracle: Send + Sync {
    /// Rate multiplying a `from`-denominated value into `to` units.
    /// Identity on equal assets; `None` when the cross is unknown.
    fn rate(&self, from: &str, to: &str) -> Option<Decimal>;

    /// Convert an amount between assets.
    fn convert(&self, amount: Decimal, from: &str, to: &str) -> Option<Decimal> {
        Some(amount * self.rate(from, to)?)
    }
}

/// Static rate table for paper trading and tests.
///
/// Rates are stored directed; the reverse direction is derived by
/// inversion so a single `with_rate` covers both conversions.
#[derive(Debug, Default)]
pub struct FixedRateOracle {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedRateOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: impl Into<String>, to: impl Into<String>, rate: Decimal) -> Self {
        self.rates.insert((from.into(), to.into()), rate);
        self
    }
}

impl FxOracle for FixedRateOracle {
    fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(from.to_string(), to.to_string())) {
            return Some(*rate);
        }
        self.rates
            .get(&(to.to_string(), from.to_string()))
            .filter(|r| !r.is_zero())
            .map(|r| Decimal::ONE / r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_rate() {
        let oracle = FixedRateOracle::new();
        assert_eq!(oracle.rate("USDT", "USDT"), Some(dec!(1)));
    }

    #[test]
    fn test_directed_and_inverse() {
        let oracle = FixedRateOracle::new().with_rate("USDT", "USD", dec!(1.001));
        assert_eq!(oracle.rate("USDT", "USD"), Some(dec!(1.001)));
        let inverse = oracle.rate("USD", "USDT").unwrap();
        assert_eq!((inverse * dec!(1.001)).round_dp(10), dec!(1));
    }

    #[test]
    fn test_unknown_cross() {
        let oracle = FixedRateOracle::new();
        assert_eq!(oracle.rate("USD", "EUR"), None);
        assert_eq!(oracle.convert(dec!(5), "USD", "EUR"), None);
    }

    #[test]
    fn test_convert() {
        let oracle = FixedRateOracle::new().with_rate("USDT", "USD", dec!(1.001));
        assert_eq!(oracle.convert(dec!(100), "USDT", "USD"), Some(dec!(100.1)));
    }
}
