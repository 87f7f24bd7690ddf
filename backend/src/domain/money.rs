//! Money value objects.
//!
//! Prices are stored and summed as integer minor units (paise for INR) so
//! order totals are exact. Conversions to and from major units go through
//! `rust_decimal` at the edges.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Number of minor units in one major unit.
const MINOR_UNITS_PER_MAJOR: i64 = 100;
/// Decimal places carried by a major-unit amount.
const MINOR_UNIT_SCALE: u32 = 2;

/// Validation errors raised by money constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyValidationError {
    /// A major-unit amount carried more than two decimal places.
    #[error("amount must have at most two decimal places")]
    TooPrecise,
    /// The amount does not fit in the minor-unit range.
    #[error("amount is out of range")]
    OutOfRange,
    /// The currency code was not three ASCII letters.
    #[error("currency must be a three-letter ISO 4217 code")]
    InvalidCurrency,
}

/// A signed amount of money expressed in minor units.
///
/// May be zero or negative; order validation rejects non-positive prices.
///
/// # Examples
/// ```
/// use eduquest::domain::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::from_major(Decimal::new(49_950, 2)).expect("two decimals");
/// assert_eq!(price.minor_units(), 49_950);
/// assert_eq!(price.to_major().to_string(), "499.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero minor units.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw minor-unit amount.
    pub const fn from_minor(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Convert a major-unit decimal (for example rupees) into minor units.
    pub fn from_major(major: Decimal) -> Result<Self, MoneyValidationError> {
        let normalised = major.normalize();
        if normalised.scale() > MINOR_UNIT_SCALE {
            return Err(MoneyValidationError::TooPrecise);
        }
        let minor = normalised
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or(MoneyValidationError::OutOfRange)?;
        minor
            .to_i64()
            .map(Self)
            .ok_or(MoneyValidationError::OutOfRange)
    }

    /// Raw minor units.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Major-unit decimal with exactly two decimal places.
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Add two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiply by a count, returning `None` on overflow.
    pub fn checked_mul(self, count: u64) -> Option<Self> {
        i64::try_from(count)
            .ok()
            .and_then(|factor| self.0.checked_mul(factor))
            .map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_major())
    }
}

/// ISO 4217 currency code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Validate a three-letter currency code.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::Currency;
    ///
    /// assert_eq!(Currency::new("inr").expect("valid").as_str(), "INR");
    /// assert!(Currency::new("rupees").is_err());
    /// ```
    pub fn new(code: impl AsRef<str>) -> Result<Self, MoneyValidationError> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(MoneyValidationError::InvalidCurrency);
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Indian rupee, the marketplace default.
    pub fn inr() -> Self {
        Self("INR".to_owned())
    }

    /// Borrow the code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
