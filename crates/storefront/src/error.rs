//! Unified error handling with Sentry integration.
//!
//! Cart operations return `Result<T, CartError>`. Persistence failures are
//! not recovered here; callers decide whether to surface them, and
//! [`CartError::report`] sends them to Sentry.

use thiserror::Error;

use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Writing the cart to storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// Log the error and capture it to Sentry.
    pub fn report(&self) {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Cart operation failed"
        );
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error. Without an initialized Sentry client this
/// is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
