//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10,2)` and always carry exactly two
//! decimal places once validated. The mobile clients send prices as either
//! JSON numbers or strings, so deserialization accepts both and then runs
//! the same validation as [`Price::parse`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};

/// Currency symbol used when rendering prices for humans.
pub const CURRENCY_SYMBOL: &str = "Rs";

/// Largest unit price in cents. Item prices are `NUMERIC(10,2)`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 9_999_999_999;

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price is required")]
    Empty,
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit the item price column.
    #[error("price cannot exceed 99,999,999.99")]
    TooLarge,
}

/// A non-negative amount of money with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a unit price from user input such as `"12"`, `"12.5"` or
    /// `" 12.50 "`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the input is empty, not numeric, negative or
    /// above [`Price::max_unit`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = s
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError::NotANumber)?;
        let price = Self::from_decimal(amount)?;
        if price > Self::max_unit() {
            return Err(PriceError::TooLarge);
        }
        Ok(price)
    }

    /// Highest accepted unit price, `99,999,999.99`.
    #[must_use]
    pub fn max_unit() -> Self {
        Self(Decimal::new(MAX_UNIT_PRICE_CENTS, 2))
    }

    /// Validate a decimal amount and round it to two places. Totals use
    /// this directly, so no upper bound applies.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let mut rounded = amount.round_dp(2);
        rounded.rescale(2);
        Ok(Self(rounded))
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        let mut total = self.0 * Decimal::from(quantity);
        total.rescale(2);
        Self(total)
    }

    /// Plain two-decimal rendering, e.g. `"1250.00"`.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        format!("{:.2}", self.0)
    }

    /// Human-readable rendering with currency symbol and thousands
    /// separators, e.g. `"Rs 1,250.00"`.
    #[must_use]
    pub fn display(&self) -> String {
        let plain = self.to_plain_string();
        let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{CURRENCY_SYMBOL} {grouped}.{frac}")
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// Clients read prices as JSON numbers.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_decimal(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_inputs() {
        assert_eq!(Price::parse("12").unwrap().to_string(), "12.00");
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "12.50");
        assert_eq!(Price::parse(" 12.50 ").unwrap().to_string(), "12.50");
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_rounds_to_two_places() {
        assert_eq!(Price::parse("9.999").unwrap().to_string(), "10.00");
        assert_eq!(Price::parse("1.234").unwrap().to_string(), "1.23");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_rejects_prices_above_column_limit() {
        assert_eq!(Price::parse("99999999.99").unwrap(), Price::max_unit());
        assert_eq!(Price::parse("100000000"), Err(PriceError::TooLarge));
        assert_eq!(Price::parse("1000000000000"), Err(PriceError::TooLarge));
        assert_eq!(Price::parse("99999999.996"), Err(PriceError::TooLarge));
        assert_eq!(Price::parse("1e9"), Err(PriceError::TooLarge));
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::parse("1250").unwrap().display(), "Rs 1,250.00");
        assert_eq!(Price::parse("999.9").unwrap().display(), "Rs 999.90");
        assert_eq!(
            Price::parse("1234567.8").unwrap().display(),
            "Rs 1,234,567.80"
        );
    }

    #[test]
    fn test_times_and_sum() {
        let burger = Price::parse("450").unwrap();
        let fries = Price::parse("199.50").unwrap();
        let total: Price = [burger.times(2), fries.times(3)].into_iter().sum();
        assert_eq!(total.to_plain_string(), "1498.50");
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::parse("12.5").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");
    }

    #[test]
    fn test_deserializes_number_or_string() {
        let from_number: Price = serde_json::from_str("12.5").unwrap();
        let from_string: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
