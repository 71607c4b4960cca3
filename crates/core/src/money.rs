//! Exact monetary amounts in the business's single currency.
//!
//! Amounts are held as a signed count of minor units (cents), so every sum
//! the ledger produces is already "rounded to 2 decimals". The store and the
//! UI speak decimal major units; conversion happens at the serde boundary.
//!
//! Single amounts are bounded by [`Money::MAX`] when they enter the ledger.
//! Arithmetic saturates, so no reduction over stored rows can overflow.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value_object::ValueObject;

/// Signed amount in minor units (1/100 of the currency unit).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Smallest amount treated as a real discrepancy (0.01).
    pub const EPSILON: Money = Money(1);

    /// Largest single amount accepted from a document (10 trillion units).
    pub const MAX: Money = Money(1_000_000_000_000_000);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole currency units (e.g. `Money::from_major_units(500)` is 500.00).
    pub const fn from_major_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Convert a decimal amount, rounding half away from zero to cents.
    ///
    /// `None` when the value is not finite or beyond [`Money::MAX`].
    pub fn try_from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Lenient [`Self::try_from_major`]: non-finite input is zero and
    /// out-of-range input is clamped to `±MAX`.
    pub fn from_major(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self::try_from_major(value).unwrap_or(if value < 0.0 { -Self::MAX } else { Self::MAX })
    }

    /// Parse user input; blank or non-numeric text is zero.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::ZERO;
        }
        trimmed
            .parse::<f64>()
            .map(Self::from_major)
            .unwrap_or(Self::ZERO)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub const fn checked_add(self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `|self| < 0.01`: floating noise, never a discrepancy worth acting on.
    pub const fn is_negligible(self) -> bool {
        self.0.abs() < Self::EPSILON.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

/// Shapes an amount may take in stored documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = match Option::<RawAmount>::deserialize(deserializer)? {
            Some(RawAmount::Number(n)) => n,
            // Blank or non-numeric text is zero; numeric text is range-checked.
            Some(RawAmount::Text(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => return Ok(Money::ZERO),
            },
            None => return Ok(Money::ZERO),
        };
        Money::try_from_major(major)
            .ok_or_else(|| D::Error::custom(format!("amount {major} is out of range")))
    }
}
