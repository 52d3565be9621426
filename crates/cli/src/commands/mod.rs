//! Command implementations.
//!
//! Each command writes its result to the given writer; logs go through
//! `tracing`.

use techfix_storefront::error::CartError;
use thiserror::Error;

pub mod cart;
pub mod report;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
