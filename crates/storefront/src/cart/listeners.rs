//! Change listeners for cart re-rendering.
//!
//! A cart page registers a listener to re-render its line items. Listeners
//! run after the change has been persisted, in registration order.

use techfix_core::{ProductId, Quantity};

use super::{Cart, CartLineItem};

/// A cart change that listeners are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A line's quantity was set.
    QuantityUpdated { id: ProductId, quantity: Quantity },
    /// A product was removed, either explicitly or by setting its quantity
    /// to zero or below. `item` is `None` if it was not in the cart.
    Removed {
        id: ProductId,
        item: Option<CartLineItem>,
    },
    /// Every line was removed.
    Cleared,
}

/// Callback invoked after a cart change.
pub type CartListener = Box<dyn FnMut(&CartChange, &Cart)>;

/// Handle returned by [`super::CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, CartListener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: CartListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, change: &CartChange, cart: &Cart) {
        for (_, listener) in &mut self.entries {
            listener(change, cart);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
