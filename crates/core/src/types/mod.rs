//! Core types for the TechFix cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::ProductId;
pub use price::{CurrencyCode, Price, PriceError};
pub use quantity::{Quantity, QuantityError};
