use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{Result, TrackerError};

/// Money type rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(2))
    }

    /// create from integer amount (reais, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, 2))
    }

    /// parse an amount typed by a person, accepting a decimal comma ("619,90")
    pub fn parse_user(input: &str) -> Result<Self> {
        let normalized = input.trim().replace(',', ".");
        Decimal::from_str(&normalized)
            .map(Money::from_decimal)
            .map_err(|_| TrackerError::InvalidAmount {
                input: input.to_string(),
            })
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// split into `count` equal monthly parts, rounded to cents
    pub fn split(&self, count: u32) -> Self {
        if count == 0 {
            return *self;
        }
        Money::from_decimal(self.0 / Decimal::from(count))
    }

    /// multiply a per-installment amount by the number of installments
    pub fn times(&self, count: u32) -> Self {
        Money::from_decimal(self.0 * Decimal::from(count))
    }

    /// render with a currency symbol, e.g. "R$ 161.90"
    pub fn format_with(&self, symbol: &str) -> String {
        format!("{} {:.2}", symbol, self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        Money::parse_user(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_user_accepts_decimal_comma() {
        assert_eq!(Money::parse_user("619,00").unwrap(), Money::from_major(619));
        assert_eq!(Money::parse_user(" 161.90 ").unwrap(), Money::from_minor(16_190));
    }

    #[test]
    fn test_parse_user_rejects_text() {
        let err = Money::parse_user("six hundred").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_cent_precision() {
        let m = Money::from_decimal(dec!(100.126));
        assert_eq!(m.to_string(), "100.13");
    }

    #[test]
    fn test_split_into_installments() {
        let total = Money::from_major(619);
        assert_eq!(total.split(10), Money::from_minor(6_190));

        // rounding to cents
        let odd = Money::from_major(100);
        assert_eq!(odd.split(3), Money::from_decimal(dec!(33.33)));

        assert_eq!(Money::from_minor(16_190).times(10), Money::from_major(1_619));
    }

    #[test]
    fn test_sum_and_format() {
        let parts = [Money::from_minor(3_220), Money::from_minor(10_000)];
        let total: Money = parts.iter().sum();
        assert_eq!(total.format_with("R$"), "R$ 132.20");
    }
}
