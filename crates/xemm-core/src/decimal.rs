//! Precision-safe decimal types for quoting and hedging.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Every price or size
//! that leaves the engine must be an exact multiple of the venue's price
//! quantum or size step, so the quantization helpers here come in both
//! rounding directions: the pricer floors bids and ceils asks so that
//! rounding can never cross a profitability threshold.

use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` so prices and sizes cannot be mixed up in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Largest quantum multiple not above this price.
    #[inline]
    pub fn floor_to_quantum(&self, quantum: Price) -> Self {
        if quantum.is_zero() {
            return *self;
        }
        Self((self.0 / quantum.0).floor() * quantum.0)
    }

    /// Smallest quantum multiple not below this price.
    #[inline]
    pub fn ceil_to_quantum(&self, quantum: Price) -> Self {
        if quantum.is_zero() {
            return *self;
        }
        Self((self.0 / quantum.0).ceil() * quantum.0)
    }

    /// True when the price sits exactly on the quantum grid.
    #[inline]
    pub fn is_quantized(&self, quantum: Price) -> bool {
        if quantum.is_zero() {
            return true;
        }
        (self.0 % quantum.0).is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Decimal>()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Size (base-asset quantity) with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round down to the venue's size step. Sizes are never rounded up:
    /// oversizing an order risks an unhedgeable remainder.
    #[inline]
    pub fn floor_to_step(&self, step: Size) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self((self.0 / step.0).floor() * step.0)
    }

    /// Notional value at the given price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Decimal>()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Size {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Size {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_floor_to_quantum() {
        let price = Price::new(dec!(98.5123));
        let quantum = Price::new(dec!(0.01));
        assert_eq!(price.floor_to_quantum(quantum).inner(), dec!(98.51));
    }

    #[test]
    fn test_ceil_to_quantum() {
        let price = Price::new(dec!(101.5023));
        let quantum = Price::new(dec!(0.01));
        assert_eq!(price.ceil_to_quantum(quantum).inner(), dec!(101.51));
    }

    #[test]
    fn test_quantization_exact_multiple_unchanged() {
        let price = Price::new(dec!(100.25));
        let quantum = Price::new(dec!(0.01));
        assert_eq!(price.floor_to_quantum(quantum), price);
        assert_eq!(price.ceil_to_quantum(quantum), price);
        assert!(price.is_quantized(quantum));
    }

    #[test]
    fn test_zero_quantum_is_identity() {
        let price = Price::new(dec!(99.12345));
        assert_eq!(price.floor_to_quantum(Price::ZERO), price);
        assert_eq!(price.ceil_to_quantum(Price::ZERO), price);
    }

    #[test]
    fn test_size_floor_to_step() {
        let size = Size::new(dec!(1.995));
        let step = Size::new(dec!(0.01));
        assert_eq!(size.floor_to_step(step).inner(), dec!(1.99));
    }

    #[test]
    fn test_notional() {
        let size = Size::new(dec!(2.5));
        let price = Price::new(dec!(100));
        assert_eq!(size.notional(price), dec!(250));
    }
}
