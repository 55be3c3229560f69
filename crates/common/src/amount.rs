//! Money arithmetic for the platform.
//!
//! Balances, stakes, contributions, and tallies are all [`Amount`]s: decimal
//! quantities kept at two fractional digits. Amounts are signed so the same
//! type carries ledger deltas; operations that need a strictly positive
//! quantity validate that at their own boundary.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quantity of stake-token or reputation-points at 2-decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount, normalizing to the platform's 2-decimal precision.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value.round_dp(2);
        normalized.rescale(2);
        Self(normalized)
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    /// Multiply by a stake multiplier, re-normalizing the scale.
    pub fn scale(&self, multiplier: Decimal) -> Self {
        Self::new(self.0 * multiplier)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// The underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Difference clamped at zero, for "remaining gap" readouts.
    pub fn saturating_sub(&self, other: Amount) -> Self {
        if other.0 >= self.0 {
            Self::zero()
        } else {
            Self::new(self.0 - other.0)
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::new(Decimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(Decimal::from_str(s)?))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_two_decimals() {
        let a = Amount::from_str("10.004").unwrap();
        assert_eq!(a.to_string(), "10.00");
        let b = Amount::from(110_000);
        assert_eq!(b.to_string(), "110000.00");
    }

    #[test]
    fn scale_applies_multiplier() {
        let stake = Amount::from(500);
        assert_eq!(stake.scale(Decimal::from(50)), Amount::from(25_000));
        assert_eq!(stake.scale(Decimal::from(10)), Amount::from(5_000));
    }

    #[test]
    fn arithmetic_and_sign_checks() {
        let mut total = Amount::zero();
        total += Amount::from(300);
        total += Amount::from(200);
        assert_eq!(total, Amount::from(500));
        assert!(total.is_positive());

        let delta = -Amount::from(700);
        assert!(delta.is_negative());
        assert_eq!(total + delta, Amount::from(-200));
    }

    #[test]
    fn saturating_sub_clamps_at_zero() {
        let requested = Amount::from(1_000);
        let funded = Amount::from(1_200);
        assert_eq!(requested.saturating_sub(funded), Amount::zero());
        assert_eq!(funded.saturating_sub(requested), Amount::from(200));
    }

    #[test]
    fn serializes_as_plain_decimal_string() {
        let a = Amount::from(10_000);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"10000.00\"");
        let back: Amount = serde_json::from_str("\"10000.00\"").unwrap();
        assert_eq!(back, a);
    }
}
