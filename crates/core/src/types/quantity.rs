//! Line item quantities.
//!
//! A cart never stores a line with zero units, so the type makes that state
//! unrepresentable.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A positive number of units of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZeroU32::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Quantity requested by an add-to-cart action.
    ///
    /// Missing and zero both mean "one unit".
    #[must_use]
    pub fn from_requested(requested: Option<u32>) -> Self {
        requested.and_then(Self::new).unwrap_or(Self::ONE)
    }

    /// Quantity from a signed update value; `None` when `n <= 0`.
    ///
    /// Values above `u32::MAX` are clamped.
    #[must_use]
    pub fn from_signed(n: i64) -> Option<Self> {
        if n <= 0 {
            return None;
        }
        Self::new(u32::try_from(n).unwrap_or(u32::MAX))
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n).ok_or(QuantityError::Zero)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_quantity() {
        assert!(Quantity::new(0).is_none());
        assert_eq!(Quantity::try_from(0), Err(QuantityError::Zero));
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
    }

    #[test]
    fn test_requested_defaults_to_one() {
        assert_eq!(Quantity::from_requested(None), Quantity::ONE);
        assert_eq!(Quantity::from_requested(Some(0)), Quantity::ONE);
        assert_eq!(Quantity::from_requested(Some(4)).get(), 4);
    }

    #[test]
    fn test_from_signed() {
        assert!(Quantity::from_signed(0).is_none());
        assert!(Quantity::from_signed(-3).is_none());
        assert_eq!(Quantity::from_signed(5).unwrap().get(), 5);
        assert_eq!(Quantity::from_signed(i64::MAX).unwrap().get(), u32::MAX);
    }

    #[test]
    fn test_saturating_add() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.saturating_add(Quantity::ONE), max);
        assert_eq!(
            Quantity::ONE.saturating_add(Quantity::ONE),
            Quantity::new(2).unwrap()
        );
    }

    #[test]
    fn test_serde_as_integer() {
        let q = Quantity::new(3).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
        assert_eq!(serde_json::from_str::<Quantity>("3").unwrap(), q);
    }
}
