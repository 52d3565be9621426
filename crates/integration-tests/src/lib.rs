//! Integration tests for the TechFix cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techfix-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart mutations, totals, badges and listeners
//! - `toast_lifecycle` - Toast timers driven by a manual clock
//! - `file_persistence` - Reloading carts from a storage file
//!
//! Every test builds its own [`Harness`]; nothing is shared between tests.

use std::rc::Rc;

use rust_decimal::Decimal;
use techfix_core::Price;
use techfix_storefront::badge::{Badge, BadgeBoard, BadgeId};
use techfix_storefront::cart::{CartStore, NewCartItem};
use techfix_storefront::clock::ManualClock;
use techfix_storefront::notifications::NotificationCenter;
use techfix_storefront::storage::{MemoryStorage, Storage, keys};

/// A cart store wired to a manual clock, one badge and a notification center.
///
/// Storage is held through an `Rc`, so a second store can be loaded from the
/// same backend to check what was persisted.
#[derive(Debug)]
pub struct Harness<S: Storage = MemoryStorage> {
    pub clock: ManualClock,
    pub badges: BadgeBoard,
    pub badge: BadgeId,
    pub notifications: NotificationCenter,
    pub store: CartStore<Rc<S>>,
    storage: Rc<S>,
}

impl Harness<MemoryStorage> {
    /// Harness over empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }
}

impl Default for Harness<MemoryStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> Harness<S> {
    /// Harness over the given storage, loading whatever cart it holds.
    pub fn with_storage(storage: S) -> Self {
        let clock = ManualClock::default();
        let badges = BadgeBoard::new(clock.shared());
        let badge = badges.attach();
        let notifications = NotificationCenter::new(clock.shared());
        let storage = Rc::new(storage);

        let store = CartStore::load(Rc::clone(&storage), keys::CART)
            .with_badges(badges.clone())
            .with_notifications(notifications.clone());
        store.on_ready();

        Self {
            clock,
            badges,
            badge,
            notifications,
            store,
            storage,
        }
    }

    /// State of the harness badge.
    ///
    /// # Panics
    ///
    /// Panics if the badge was detached.
    #[must_use]
    pub fn badge(&self) -> Badge {
        self.badges
            .badge(self.badge)
            .unwrap_or_else(|| panic!("badge {:?} detached", self.badge))
    }

    /// A fresh store loaded from the same storage, as after a page reload.
    #[must_use]
    pub fn reload(&self) -> CartStore<Rc<S>> {
        CartStore::load(Rc::clone(&self.storage), keys::CART)
    }

    /// Raw JSON stored under the cart key.
    #[must_use]
    pub fn stored_json(&self) -> Option<String> {
        self.storage.get(keys::CART).ok().flatten()
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// A product priced in whole cents.
///
/// # Panics
///
/// Panics if `cents` is negative.
#[must_use]
pub fn product(id: &str, title: &str, cents: i64) -> NewCartItem {
    let price = Price::from_cents(cents).unwrap_or_else(|e| panic!("bad test price: {e}"));
    NewCartItem::new(id, title, price)
}

/// `Decimal` from a string literal such as `"9.99"`.
///
/// # Panics
///
/// Panics on malformed input.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    value
        .parse()
        .unwrap_or_else(|e| panic!("bad decimal {value}: {e}"))
}
