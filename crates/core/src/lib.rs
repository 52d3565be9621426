//! TechFix Core - Shared cart types.
//!
//! This crate provides the value types used by every TechFix component:
//! - `storefront` - Cart store, badges and toast notifications
//! - `cli` - Command-line driver for a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no clocks.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
