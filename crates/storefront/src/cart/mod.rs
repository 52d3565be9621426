//! Cart state and persistence.
//!
//! [`CartStore`] owns the in-memory cart and writes it to storage after every
//! mutation, so the stored copy always matches what callers observe. A write
//! that fails rolls the in-memory change back before the error is returned.
//!
//! Side effects of each operation, in order:
//!
//! | Operation | Persist | Badges | Listeners | Toast |
//! |---|---|---|---|---|
//! | `add_to_cart` | yes | yes | no | yes |
//! | `update_quantity` (known id) | yes | yes | yes | no |
//! | `remove_from_cart` | yes | yes | yes | no |
//! | `clear` | yes | yes | yes | no |
//!
//! # Example
//!
//! ```rust
//! use techfix_core::{Price, ProductId};
//! use techfix_storefront::cart::{CartStore, NewCartItem};
//! use techfix_storefront::storage::{MemoryStorage, keys};
//!
//! let mut store = CartStore::load(MemoryStorage::new(), keys::CART);
//! store.add_to_cart(NewCartItem::new("a", "Widget", Price::from_cents(999)?))?;
//! store.update_quantity(&ProductId::from("a"), 3)?;
//!
//! assert_eq!(store.total_items(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rust_decimal::Decimal;
use techfix_core::ProductId;
use tracing::{debug, instrument, warn};

use crate::badge::BadgeBoard;
use crate::error::{Result, add_breadcrumb};
use crate::notifications::NotificationCenter;
use crate::storage::Storage;

mod line_item;
mod listeners;

pub use line_item::{Cart, CartLineItem, InvalidCart, NewCartItem};
pub use listeners::{CartChange, CartListener, ListenerId};

use line_item::QuantityChange;
use listeners::Listeners;

/// The cart, its storage, and the UI pieces it keeps up to date.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    cart: Cart,
    storage: S,
    key: String,
    badges: Option<BadgeBoard>,
    notifications: Option<NotificationCenter>,
    listeners: Listeners,
}

impl<S: Storage> CartStore<S> {
    /// Load the cart stored under `key`.
    ///
    /// A missing entry gives an empty cart. So does an unreadable or invalid
    /// one, after logging a warning.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = read_cart(&storage, &key);
        debug!(key, items = cart.len(), "Loaded cart");

        Self {
            cart,
            storage,
            key,
            badges: None,
            notifications: None,
            listeners: Listeners::default(),
        }
    }

    /// Keep `badges` in sync with the item count.
    #[must_use]
    pub fn with_badges(mut self, badges: BadgeBoard) -> Self {
        self.badges = Some(badges);
        self
    }

    /// Show a toast on `notifications` whenever a product is added.
    #[must_use]
    pub fn with_notifications(mut self, notifications: NotificationCenter) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Page-ready hook: bring the badges in line with the loaded cart.
    pub fn on_ready(&self) {
        self.refresh_badges();
    }

    /// Add a product, or increase its quantity if already in the cart.
    ///
    /// Returns the resulting line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is left as
    /// it was.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&mut self, product: NewCartItem) -> Result<CartLineItem> {
        let previous = self.cart.clone();
        let line = self.cart.add(product);
        self.commit(previous)?;

        debug!(quantity = line.quantity.get(), "Added to cart");
        let product_id = line.id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

        if let Some(notifications) = &self.notifications {
            notifications.show_default();
        }
        Ok(line)
    }

    /// Set a product's quantity. Zero or below removes the product.
    ///
    /// Unknown products are ignored: nothing is written and listeners are not
    /// called. Returns whether the cart changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is left as
    /// it was.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn update_quantity(&mut self, id: &ProductId, new_quantity: i64) -> Result<bool> {
        let previous = self.cart.clone();
        let Some(change) = self.cart.set_quantity(id, new_quantity) else {
            debug!("Product not in cart");
            return Ok(false);
        };
        self.commit(previous)?;

        let change = match change {
            QuantityChange::Set(quantity) => CartChange::QuantityUpdated {
                id: id.clone(),
                quantity,
            },
            QuantityChange::Removed(item) => CartChange::Removed {
                id: id.clone(),
                item: Some(item),
            },
        };
        debug!(?change, "Updated quantity");
        let product_id = id.to_string();
        add_breadcrumb("cart", "Updated quantity", Some(&[("product_id", product_id.as_str())]));
        self.listeners.notify(&change, &self.cart);
        Ok(true)
    }

    /// Remove a product from the cart.
    ///
    /// The cart is written and listeners are called even when the product
    /// was not present. Returns the removed line, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is left as
    /// it was.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_from_cart(&mut self, id: &ProductId) -> Result<Option<CartLineItem>> {
        let previous = self.cart.clone();
        let removed = self.cart.remove(id);
        self.commit(previous)?;

        debug!(found = removed.is_some(), "Removed from cart");
        let product_id = id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", product_id.as_str())]));
        let change = CartChange::Removed {
            id: id.clone(),
            item: removed.clone(),
        };
        self.listeners.notify(&change, &self.cart);
        Ok(removed)
    }

    /// Remove every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is left as
    /// it was.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<()> {
        let previous = self.cart.clone();
        self.cart.clear();
        self.commit(previous)?;

        add_breadcrumb("cart", "Cleared cart", None);
        self.listeners.notify(&CartChange::Cleared, &self.cart);
        Ok(())
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// Line item for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.cart.get(id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Register a listener for update, remove and clear operations.
    pub fn subscribe(&mut self, listener: impl FnMut(&CartChange, &Cart) + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Storage key the cart is written under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage backend, dropping the in-memory cart.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the item count to every attached badge.
    pub fn refresh_badges(&self) {
        if let Some(badges) = &self.badges {
            badges.refresh(self.total_items());
        }
    }

    /// Persist the cart, restoring `previous` in memory if the write fails.
    fn commit(&mut self, previous: Cart) -> Result<()> {
        if let Err(e) = self.save_cart() {
            warn!(error = %e, "Failed to save cart, reverting change");
            self.cart = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Write the cart to storage, then refresh the badges.
    fn save_cart(&self) -> Result<()> {
        let json = serde_json::to_string(&self.cart)?;
        self.storage.set(&self.key, &json)?;
        self.refresh_badges();
        Ok(())
    }
}

fn read_cart(storage: &impl Storage, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(key, error = %e, "Could not read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "Stored cart is invalid, starting empty");
        Cart::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use techfix_core::{Price, Quantity};

    use super::*;
    use crate::badge::BadgeScale;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStorage, StorageError, keys};

    fn widget() -> NewCartItem {
        NewCartItem::new("a", "Widget", Price::from_cents(999).unwrap())
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::load(MemoryStorage::new(), keys::CART)
    }

    fn stored(store: &CartStore<MemoryStorage>) -> Cart {
        let raw = store.storage().get(keys::CART).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = store();
        assert!(store.is_empty());
        assert_eq!(store.total_items(), 0);
        assert_eq!(store.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        for raw in ["not json", "{}", "null", r#"[{"id":"a","price":1,"quantity":0}]"#] {
            let storage = MemoryStorage::new();
            storage.set(keys::CART, raw).unwrap();
            let store = CartStore::load(storage, keys::CART);
            assert!(store.is_empty(), "expected empty cart for {raw}");
        }
    }

    #[test]
    fn test_add_persists() {
        let mut store = store();
        let line = store.add_to_cart(widget()).unwrap();

        assert_eq!(line.quantity, Quantity::ONE);
        assert_eq!(store.total_items(), 1);
        assert_eq!(store.subtotal(), Decimal::new(999, 2));
        assert_eq!(&stored(&store), store.cart());
    }

    #[test]
    fn test_add_existing_increments_without_duplicate() {
        let mut store = store();
        store.add_to_cart(widget()).unwrap();
        store.add_to_cart(widget().with_quantity(1)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&"a".into()).unwrap().quantity,
            Quantity::new(2).unwrap()
        );
    }

    #[test]
    fn test_update_quantity() {
        let mut store = store();
        store.add_to_cart(widget()).unwrap();

        assert!(store.update_quantity(&"a".into(), 7).unwrap());
        assert_eq!(store.total_items(), 7);
        assert_eq!(&stored(&store), store.cart());

        assert!(store.update_quantity(&"a".into(), 0).unwrap());
        assert!(store.get(&"a".into()).is_none());
        assert!(stored(&store).is_empty());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        store.subscribe(move |_, _| *seen.borrow_mut() += 1);

        assert!(!store.update_quantity(&"ghost".into(), 3).unwrap());
        assert_eq!(*calls.borrow(), 0);
        // Nothing was written
        assert!(store.storage().get(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_still_persists_and_notifies() {
        let mut store = store();
        store.add_to_cart(widget()).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&changes);
        store.subscribe(move |change, _| seen.borrow_mut().push(change.clone()));

        assert!(store.remove_from_cart(&"ghost".into()).unwrap().is_none());

        assert_eq!(store.len(), 1);
        assert_eq!(
            *changes.borrow(),
            [CartChange::Removed {
                id: "ghost".into(),
                item: None
            }]
        );
    }

    #[test]
    fn test_listeners_see_updated_cart_in_order() {
        let mut store = store();
        store.add_to_cart(widget()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        store.subscribe(move |_, cart| first.borrow_mut().push(("first", cart.total_items())));
        let second = Rc::clone(&log);
        let id = store.subscribe(move |_, cart| second.borrow_mut().push(("second", cart.total_items())));

        store.update_quantity(&"a".into(), 4).unwrap();
        assert!(store.unsubscribe(id));
        store.remove_from_cart(&"a".into()).unwrap();

        assert_eq!(*log.borrow(), [("first", 4), ("second", 4), ("first", 0)]);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_add_does_not_notify_listeners() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        store.subscribe(move |_, _| *seen.borrow_mut() += 1);

        store.add_to_cart(widget()).unwrap();

        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut store = CartStore::load(MemoryStorage::with_quota(150), keys::CART);
        store.add_to_cart(widget()).unwrap();
        let before = store.cart().clone();

        let big = NewCartItem::new("b", "x".repeat(200), Price::ZERO);
        let err = store.add_to_cart(big).unwrap_err();

        assert!(matches!(
            err,
            crate::error::CartError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.cart(), &before);
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn test_badges_follow_every_mutation() {
        let clock = ManualClock::default();
        let badges = BadgeBoard::new(clock.shared());
        let badge = badges.attach();
        let mut store = store().with_badges(badges.clone());

        store.add_to_cart(widget().with_quantity(2)).unwrap();
        assert_eq!(badges.badge(badge).unwrap().text, "2");
        assert_eq!(badges.badge(badge).unwrap().scale, BadgeScale::Enlarged);

        store.update_quantity(&"a".into(), 5).unwrap();
        assert_eq!(badges.badge(badge).unwrap().text, "5");

        store.remove_from_cart(&"a".into()).unwrap();
        let hidden = badges.badge(badge).unwrap();
        assert_eq!(hidden.text, "0");
        assert!(!hidden.visible);
    }

    #[test]
    fn test_on_ready_refreshes_badges_from_loaded_cart() {
        let storage = MemoryStorage::new();
        storage
            .set(keys::CART, r#"[{"id":1,"title":"Cable","price":2.5,"quantity":3}]"#)
            .unwrap();
        let clock = ManualClock::default();
        let badges = BadgeBoard::new(clock.shared());
        let badge = badges.attach();

        let store = CartStore::load(storage, keys::CART).with_badges(badges.clone());
        assert_eq!(badges.badge(badge).unwrap().text, "0");

        store.on_ready();
        assert_eq!(badges.badge(badge).unwrap().text, "3");
        assert!(badges.badge(badge).unwrap().visible);
    }

    #[test]
    fn test_add_shows_toast() {
        let clock = ManualClock::default();
        let notifications = NotificationCenter::new(clock.shared());
        let mut store = store().with_notifications(notifications.clone());

        store.add_to_cart(widget()).unwrap();
        store.update_quantity(&"a".into(), 3).unwrap();
        store.remove_from_cart(&"a".into()).unwrap();

        assert_eq!(notifications.toasts().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.add_to_cart(widget()).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(stored(&store).is_empty());
    }
}
