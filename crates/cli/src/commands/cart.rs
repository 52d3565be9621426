//! Cart mutation commands.
//!
//! # Usage
//!
//! ```bash
//! techfix add 42 "USB-C Cable" 4.99 --quantity 2 --category accessories
//! techfix update 42 5
//! techfix remove 42
//! techfix clear
//! ```

use std::io::Write;

use techfix_core::{Price, ProductId};
use techfix_storefront::cart::NewCartItem;
use techfix_storefront::notifications::ToastTransition;
use techfix_storefront::state::AppState;
use techfix_storefront::storage::Storage;

use super::CliError;

/// Product fields given to `add`.
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: Option<u32>,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl From<AddArgs> for NewCartItem {
    fn from(args: AddArgs) -> Self {
        let mut item = Self::new(args.id, args.title, args.price);
        item.image = args.image;
        item.category = args.category;
        item.quantity = args.quantity;
        item
    }
}

/// Add a product and print the toast it raised.
pub fn add<S: Storage>(
    state: &mut AppState<S>,
    args: AddArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let line = state.store_mut().add_to_cart(args.into())?;
    let currency = state.config().currency;

    writeln!(
        out,
        "Added {} ({}): {} x {}",
        line.title,
        line.id,
        line.quantity,
        currency.format(line.price.amount())
    )?;
    if let Some(toast) = state.notifications().toasts().last() {
        writeln!(out, "{}: {}", toast.id(), toast.message())?;
    }
    writeln!(out, "Cart: {} item(s)", state.store().total_items())?;
    Ok(())
}

/// Set a product's quantity.
pub fn update<S: Storage>(
    state: &mut AppState<S>,
    id: &ProductId,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if !state.store_mut().update_quantity(id, quantity)? {
        tracing::warn!(product_id = %id, "Product not in cart");
        writeln!(out, "{id} is not in the cart")?;
        return Ok(());
    }

    match state.store().get(id) {
        Some(line) => writeln!(out, "Updated {id}: quantity {}", line.quantity)?,
        None => writeln!(out, "Removed {id}")?,
    }
    writeln!(out, "Cart: {} item(s)", state.store().total_items())?;
    Ok(())
}

/// Remove a product.
pub fn remove<S: Storage>(
    state: &mut AppState<S>,
    id: &ProductId,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match state.store_mut().remove_from_cart(id)? {
        Some(line) => writeln!(out, "Removed {} ({id})", line.title)?,
        None => writeln!(out, "{id} is not in the cart")?,
    }
    writeln!(out, "Cart: {} item(s)", state.store().total_items())?;
    Ok(())
}

/// Empty the cart.
pub fn clear<S: Storage>(state: &mut AppState<S>, out: &mut impl Write) -> Result<(), CliError> {
    state.store_mut().clear()?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Drive badge and toast timers in real time until none are pending.
pub async fn watch<S: Storage>(state: &AppState<S>, out: &mut impl Write) -> Result<(), CliError> {
    let started = state.clock().now();

    loop {
        print_transitions(&state.tick(), started, out)?;
        out.flush()?;

        let Some(deadline) = state.next_deadline() else {
            break;
        };
        let wait = (deadline - state.clock().now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
    }
    Ok(())
}

fn print_transitions(
    transitions: &[ToastTransition],
    started: chrono::DateTime<chrono::Utc>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    for transition in transitions {
        writeln!(
            out,
            "{:>6} ms  {}  {:?} -> {:?}",
            (transition.at - started).num_milliseconds(),
            transition.id,
            transition.from,
            transition.to
        )?;
    }
    Ok(())
}
