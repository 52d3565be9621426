//! Type-safe unit prices using decimal arithmetic.
//!
//! Prices are persisted as plain JSON numbers (`9.99`), which is what
//! existing stored carts contain, but are held as [`Decimal`] in memory so
//! that subtotals do not accumulate floating point drift.
//!
//! A price has at most two decimal places and at most fifteen significant
//! digits. Every such value survives the trip through an `f64` unchanged, so
//! a reloaded cart always equals the one that was saved.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount has more than two decimal places.
    #[error("price cannot have fractions of a cent (got {0})")]
    TooPrecise(Decimal),

    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {max} (got {0})", max = Price::MAX)]
    TooLarge(Decimal),
}

/// A non-negative unit price in the store currency's standard unit
/// (dollars, not cents).
///
/// # Example
///
/// ```rust
/// # use techfix_core::{Price, Quantity};
/// let price = Price::from_cents(999).unwrap();
/// let qty = Quantity::new(2).unwrap();
///
/// assert_eq!(price.line_total(qty).to_string(), "19.98");
/// assert!(Price::from_cents(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest accepted price, `9999999999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, 2));

    /// Decimal places a price may carry.
    pub const SCALE: u32 = 2;

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero,
    /// [`PriceError::TooPrecise`] if it has fractions of a cent and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, Self::SCALE))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self, quantity: crate::Quantity) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity.get()))
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| format!("invalid price {s}: {e}"))?;
        Self::new(amount).map_err(|e| e.to_string())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Parsing the decimal text gives the nearest f64
        let value: f64 = self.0.to_string().parse().map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    THB,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::THB => "฿",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::THB => "THB",
        }
    }

    /// Format an amount for display (e.g., "$19.99").
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount.round_dp(2))
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "THB" => Ok(Self::THB),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        assert_eq!(
            Price::new(Decimal::new(-1, 0)),
            Err(PriceError::Negative(Decimal::new(-1, 0)))
        );
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::from_cents(999).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "9.99");

        let parsed: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(parsed, price);

        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole.amount(), Decimal::from(10));
    }

    #[test]
    fn test_negative_price_fails_to_deserialize() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_sub_cent_price_rejected() {
        assert!(matches!(
            "0.1234567890123456789".parse::<Price>(),
            Err(e) if e.contains("fractions of a cent")
        ));
        assert!(serde_json::from_str::<Price>("9.999").is_err());
        // Trailing zeros are not extra precision
        assert_eq!("0.100".parse::<Price>().unwrap(), Price::from_cents(10).unwrap());
    }

    #[test]
    fn test_price_above_max_rejected() {
        assert_eq!(Price::MAX.to_string(), "9999999999999.99");
        assert_eq!(Price::from_cents(999_999_999_999_999).unwrap(), Price::MAX);
        assert_eq!(
            Price::from_cents(1_000_000_000_000_000),
            Err(PriceError::TooLarge(Decimal::new(1_000_000_000_000_000, 2)))
        );
        assert!("12345678901234567.89".parse::<Price>().is_err());
        assert!(serde_json::from_str::<Price>("1e300").is_err());
    }

    #[test]
    fn test_price_json_round_trip_is_exact() {
        for cents in [1, 5, 10, 999, 1999, 123_456_789, 90_071_992_547_409, 999_999_999_999_999] {
            let price = Price::from_cents(cents).unwrap();
            let json = serde_json::to_string(&price).unwrap();
            let back: Price = serde_json::from_str(&json).unwrap();
            assert_eq!(back, price, "{json}");
        }
    }

    #[test]
    fn test_line_total_saturates() {
        let qty = crate::Quantity::new(u32::MAX).unwrap();
        let total = Price::MAX.line_total(qty);
        assert_eq!(total, Price::MAX.amount() * Decimal::from(u32::MAX));
        assert!(total < Decimal::MAX);

        let unbounded = Price(Decimal::MAX);
        assert_eq!(unbounded.line_total(qty), Decimal::MAX);
    }

    #[test]
    fn test_price_from_str() {
        assert_eq!("19.99".parse::<Price>().unwrap(), Price::from_cents(1999).unwrap());
        assert!("abc".parse::<Price>().is_err());
        assert!("-3".parse::<Price>().is_err());
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(CurrencyCode::USD.format(Decimal::new(25, 0)), "$25.00");
        assert_eq!(CurrencyCode::THB.format(Decimal::new(12346, 3)), "฿12.35");
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
