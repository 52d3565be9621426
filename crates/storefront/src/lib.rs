//! TechFix Storefront library.
//!
//! Client-side cart state for the storefront: an in-memory cart mirrored to
//! durable key-value storage, cart badge counts, and short-lived toast
//! notifications.
//!
//! # Architecture
//!
//! - [`cart::CartStore`] owns the cart and writes it to a [`storage::Storage`]
//!   backend after every mutation
//! - [`badge::BadgeBoard`] holds the badge elements the UI attached
//! - [`notifications::NotificationCenter`] owns the toast container
//! - [`clock::Clock`] drives every timer, so tests advance time by hand
//! - [`state::AppState`] wires the pieces together once at startup
//!
//! Everything runs on a single thread; shared handles are `Rc` based.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod badge;
pub mod cart;
pub mod clock;
pub mod config;
pub mod error;
pub mod notifications;
pub mod state;
pub mod storage;
