//! Read-only cart reports.

use std::io::Write;

use techfix_storefront::state::AppState;
use techfix_storefront::storage::Storage;

use super::CliError;

/// List every line item followed by the totals.
pub fn show<S: Storage>(state: &AppState<S>, out: &mut impl Write) -> Result<(), CliError> {
    let store = state.store();
    let currency = state.config().currency;

    if store.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in store.items() {
        write!(
            out,
            "{}\t{}\t{} x {}\t{}",
            line.id,
            line.title,
            line.quantity,
            currency.format(line.price.amount()),
            currency.format(line.line_total())
        )?;
        if let Some(category) = &line.category {
            write!(out, "\t[{category}]")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Items: {}", store.total_items())?;
    writeln!(out, "Subtotal: {}", currency.format(store.subtotal()))?;
    Ok(())
}

/// Print the number of units.
pub fn total<S: Storage>(state: &AppState<S>, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", state.store().total_items())?;
    Ok(())
}

/// Print the subtotal in the configured currency.
pub fn subtotal<S: Storage>(state: &AppState<S>, out: &mut impl Write) -> Result<(), CliError> {
    let currency = state.config().currency;
    writeln!(out, "{}", currency.format(state.store().subtotal()))?;
    Ok(())
}
