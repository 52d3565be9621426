//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `TECHFIX_STORAGE_PATH` - File backing the cart storage (default: techfix-storage.json)
//! - `TECHFIX_CART_KEY` - Storage key for the cart (default: techfix_cart)
//! - `TECHFIX_TOAST_MESSAGE` - Message of the "added to cart" toast
//! - `TECHFIX_TOAST_DURATION_MS` - How long toasts stay up (default: 3000)
//! - `TECHFIX_CURRENCY` - Currency used to display prices (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use techfix_core::CurrencyCode;
use thiserror::Error;

use crate::clock::millis;
use crate::notifications::{DEFAULT_TOAST_DURATION_MS, DEFAULT_TOAST_MESSAGE, ToastSettings};
use crate::storage::keys;

const DEFAULT_STORAGE_PATH: &str = "techfix-storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// File backing the cart storage
    pub storage_path: PathBuf,
    /// Storage key the cart is written under
    pub cart_key: String,
    /// Toast defaults
    pub toast: ToastSettings,
    /// Currency used to display prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            cart_key: keys::CART.to_string(),
            toast: ToastSettings::default(),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let duration_ms = env
            .or_default(
                "TECHFIX_TOAST_DURATION_MS",
                &DEFAULT_TOAST_DURATION_MS.to_string(),
            )
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TECHFIX_TOAST_DURATION_MS".to_string(), e.to_string())
            })?;
        let currency = env
            .or_default("TECHFIX_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("TECHFIX_CURRENCY".to_string(), e))?;

        Ok(Self {
            storage_path: PathBuf::from(env.or_default("TECHFIX_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            cart_key: env.or_default("TECHFIX_CART_KEY", keys::CART),
            toast: ToastSettings {
                default_message: env.or_default("TECHFIX_TOAST_MESSAGE", DEFAULT_TOAST_MESSAGE),
                default_duration: millis(i64::from(duration_ms)),
            },
            currency,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}
