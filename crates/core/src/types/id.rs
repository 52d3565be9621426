//! Product identifiers for cart line items.
//!
//! Catalog pages hand the cart either numeric or string IDs, and both shapes
//! end up in persisted carts. [`ProductId`] keeps whichever shape it was given
//! and serializes it back unchanged.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a product in the cart.
///
/// Equality is strict: the number `1` and the string `"1"` are different
/// products.
///
/// # Example
///
/// ```rust
/// # use techfix_core::ProductId;
/// let numeric = ProductId::from(42);
/// let text = ProductId::from("screen-repair");
///
/// assert_ne!(numeric, ProductId::from("42"));
/// assert_eq!(text.to_string(), "screen-repair");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric catalog ID.
    Number(i64),
    /// String catalog ID (slug, SKU, ...).
    Text(String),
}

impl ProductId {
    /// Returns the numeric value, if this is a numeric ID.
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Parses command-line input: anything that reads as an integer becomes a
/// numeric ID, everything else a string ID.
impl FromStr for ProductId {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map_or_else(|_| Self::from(s), Self::Number))
    }
}
