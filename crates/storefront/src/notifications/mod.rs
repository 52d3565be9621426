//! Toast notifications.
//!
//! The [`NotificationCenter`] owns a single toast container, created the
//! first time a toast is shown and reused afterwards. Every
//! [`NotificationCenter::show_toast`] call appends an independent toast;
//! concurrent toasts stack in call order.
//!
//! Timers are not callbacks: each toast records its deadlines and
//! [`NotificationCenter::tick`] applies whatever is due. The
//! `Created -> Entering` step happens inside `show_toast` and is reported by
//! the next `tick`. A manually dismissed toast leaves the container at once
//! and its pending deadlines are dropped with it.
//!
//! # Example
//!
//! ```rust
//! use techfix_storefront::clock::ManualClock;
//! use techfix_storefront::notifications::{NotificationCenter, ToastPhase};
//!
//! let clock = ManualClock::default();
//! let center = NotificationCenter::new(clock.shared());
//!
//! let id = center.show_toast(Some("Saved"), None);
//! assert_eq!(center.phase(id), Some(ToastPhase::Entering));
//!
//! clock.advance_ms(3_300);
//! center.tick();
//! assert_eq!(center.phase(id), None);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::clock::{SharedClock, millis};

mod toast;

pub use toast::{
    ENTER_DELAY_MS, EXIT_TRANSITION_MS, Toast, ToastId, ToastPhase, ToastTransition,
};

/// Identifier of the toast container element.
pub const TOAST_CONTAINER_ID: &str = "toast-container";

/// Message shown when a product is added to the cart.
pub const DEFAULT_TOAST_MESSAGE: &str = "✅ เพิ่มสินค้าลงตะกร้าแล้ว!";

/// How long a toast stays up before it starts exiting.
pub const DEFAULT_TOAST_DURATION_MS: i64 = 3000;

/// Defaults applied when `show_toast` is called without a message or duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSettings {
    pub default_message: String,
    pub default_duration: TimeDelta,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_TOAST_MESSAGE.to_string(),
            default_duration: millis(DEFAULT_TOAST_DURATION_MS),
        }
    }
}

/// Container element holding the live toasts.
#[derive(Debug)]
struct ToastContainer {
    toasts: Vec<Toast>,
}

#[derive(Debug)]
struct Inner {
    container: Option<ToastContainer>,
    /// Transitions applied outside `tick`, not yet reported.
    reported_later: Vec<ToastTransition>,
    next_id: u64,
    settings: ToastSettings,
}

/// Owner of the toast container.
///
/// Cheap to clone; clones share the same container.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Rc<RefCell<Inner>>,
    clock: SharedClock,
}

impl NotificationCenter {
    /// Create a center with default message and duration.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self::with_settings(clock, ToastSettings::default())
    }

    /// Create a center with custom defaults.
    #[must_use]
    pub fn with_settings(clock: SharedClock, settings: ToastSettings) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                container: None,
                reported_later: Vec::new(),
                next_id: 1,
                settings,
            })),
            clock,
        }
    }

    /// Show a toast. `None` arguments fall back to the configured defaults.
    ///
    /// Creates the container on first use.
    pub fn show_toast(&self, message: Option<&str>, duration: Option<TimeDelta>) -> ToastId {
        let now = self.clock.now();
        let mut inner = self.inner.borrow_mut();

        let id = ToastId::new(inner.next_id);
        inner.next_id += 1;

        let message = message.map_or_else(|| inner.settings.default_message.clone(), str::to_owned);
        let duration = duration.unwrap_or(inner.settings.default_duration);
        let mut toast = Toast::new(id, message, now, duration);

        let inserted = toast.insert(now);
        debug!(%id, message = toast.message(), "Showing toast");
        inner
            .container
            .get_or_insert_with(|| {
                debug!(container = TOAST_CONTAINER_ID, "Created toast container");
                ToastContainer { toasts: Vec::new() }
            })
            .toasts
            .push(toast);
        inner.reported_later.extend(inserted);

        id
    }

    /// Show the default "added to cart" toast.
    pub fn show_default(&self) -> ToastId {
        self.show_toast(None, None)
    }

    /// Close a toast immediately. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.borrow_mut();
        inner.reported_later.retain(|t| t.id != id);
        let Some(container) = inner.container.as_mut() else {
            return false;
        };
        let Some(pos) = container.toasts.iter().position(|t| t.id() == id) else {
            return false;
        };

        let mut toast = container.toasts.remove(pos);
        let dismissed = toast.dismiss(now).is_some();
        if dismissed {
            debug!(%id, "Toast dismissed");
        }
        dismissed
    }

    /// Apply all due transitions and drop removed toasts from the container.
    ///
    /// Returns the transitions in the order they were due.
    pub fn tick(&self) -> Vec<ToastTransition> {
        let now = self.clock.now();
        let mut inner = self.inner.borrow_mut();
        let mut applied = std::mem::take(&mut inner.reported_later);
        let Some(container) = inner.container.as_mut() else {
            return applied;
        };

        applied.extend(container.toasts.iter_mut().flat_map(|toast| toast.advance(now)));
        container.toasts.retain(|toast| toast.phase().is_live());

        applied.sort_by_key(|t| t.at);
        for transition in &applied {
            if transition.to == ToastPhase::Removed {
                debug!(id = %transition.id, "Toast removed");
            }
        }
        applied
    }

    /// Phase of a toast still in the container; `None` once it is removed.
    #[must_use]
    pub fn phase(&self, id: ToastId) -> Option<ToastPhase> {
        self.inner
            .borrow()
            .container
            .as_ref()?
            .toasts
            .iter()
            .find(|t| t.id() == id)
            .map(Toast::phase)
    }

    /// Snapshot of the toasts in the container, oldest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner
            .borrow()
            .container
            .as_ref()
            .map(|c| c.toasts.clone())
            .unwrap_or_default()
    }

    /// Whether no toasts are showing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner
            .borrow()
            .container
            .as_ref()
            .is_none_or(|c| c.toasts.is_empty())
    }

    /// Whether the container has been created.
    #[must_use]
    pub fn has_container(&self) -> bool {
        self.inner.borrow().container.is_some()
    }

    /// Earliest pending transition across all toasts.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.inner
            .borrow()
            .container
            .as_ref()?
            .toasts
            .iter()
            .filter_map(Toast::next_deadline)
            .min()
    }
}
