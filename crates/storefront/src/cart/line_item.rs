//! Cart line items and the ordered cart itself.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use techfix_core::{Price, ProductId, Quantity};
use thiserror::Error;

/// One product in the cart.
///
/// This is also the persisted shape: `image` and `category` are omitted from
/// the JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: Quantity,
}

impl CartLineItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.line_total(self.quantity)
    }
}

/// A product being added to the cart.
///
/// # Example
///
/// ```rust
/// # use techfix_core::Price;
/// # use techfix_storefront::cart::NewCartItem;
/// let item = NewCartItem::new("screen-repair", "Screen Repair", Price::from_cents(4900).unwrap())
///     .with_category("repairs")
///     .with_quantity(2);
///
/// assert_eq!(item.quantity, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Units to add. Missing or zero adds one unit.
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl NewCartItem {
    /// Create an item with no image, no category and the default quantity.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image: None,
            category: None,
            quantity: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    fn into_line_item(self) -> CartLineItem {
        CartLineItem {
            quantity: Quantity::from_requested(self.quantity),
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            category: self.category,
        }
    }
}

/// Persisted data that violates cart invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCart {
    #[error("duplicate line item for product {0}")]
    DuplicateId(ProductId),
}

/// Ordered line items, at most one per product.
///
/// Serializes as a plain JSON array. Deserializing an array that repeats a
/// product ID fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    /// Line item for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of `price × quantity` across all line items, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        saturating_sum(self.items.iter().map(CartLineItem::line_total))
    }

    /// Add a product, merging into an existing line with the same ID.
    ///
    /// Returns the resulting line.
    pub(crate) fn add(&mut self, product: NewCartItem) -> CartLineItem {
        let added = Quantity::from_requested(product.quantity);
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(added);
            return existing.clone();
        }

        let line = product.into_line_item();
        self.items.push(line.clone());
        line
    }

    /// Set a line's quantity, removing it when `quantity <= 0`.
    ///
    /// Returns `None` if the product is not in the cart.
    pub(crate) fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Option<QuantityChange> {
        let index = self.position(id)?;
        match Quantity::from_signed(quantity) {
            Some(quantity) => {
                let item = self.items.get_mut(index)?;
                item.quantity = quantity;
                Some(QuantityChange::Set(quantity))
            }
            None => Some(QuantityChange::Removed(self.items.remove(index))),
        }
    }

    /// Remove every line for a product.
    pub(crate) fn remove(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .unwrap_or(Decimal::MAX)
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QuantityChange {
    Set(Quantity),
    Removed(CartLineItem),
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(InvalidCart::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
