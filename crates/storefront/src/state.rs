//! Application state wired up at startup.

use chrono::{DateTime, Utc};

use crate::badge::{BadgeBoard, BadgeId};
use crate::cart::CartStore;
use crate::clock::SharedClock;
use crate::config::StorefrontConfig;
use crate::notifications::{NotificationCenter, ToastTransition};
use crate::storage::{FileStorage, Storage};

/// Everything a page needs: the cart store and the UI pieces it drives.
///
/// The badge board and notification center are shared with the store, so
/// handles returned here observe the store's effects.
#[derive(Debug)]
pub struct AppState<S: Storage> {
    config: StorefrontConfig,
    clock: SharedClock,
    badges: BadgeBoard,
    notifications: NotificationCenter,
    store: CartStore<S>,
}

impl AppState<FileStorage> {
    /// Create state backed by the file named in the configuration.
    #[must_use]
    pub fn open(config: StorefrontConfig, clock: SharedClock) -> Self {
        let storage = FileStorage::new(config.storage_path.clone());
        Self::new(config, storage, clock)
    }
}

impl<S: Storage> AppState<S> {
    /// Load the cart from `storage` and run the page-ready hook.
    pub fn new(config: StorefrontConfig, storage: S, clock: SharedClock) -> Self {
        let badges = BadgeBoard::new(clock.clone());
        let notifications = NotificationCenter::with_settings(clock.clone(), config.toast.clone());
        let store = CartStore::load(storage, config.cart_key.as_str())
            .with_badges(badges.clone())
            .with_notifications(notifications.clone());
        store.on_ready();

        Self {
            config,
            clock,
            badges,
            notifications,
            store,
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn clock(&self) -> &SharedClock {
        &self.clock
    }

    #[must_use]
    pub const fn badges(&self) -> &BadgeBoard {
        &self.badges
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut CartStore<S> {
        &mut self.store
    }

    /// Attach a badge showing the current item count.
    pub fn attach_badge(&self) -> BadgeId {
        let id = self.badges.attach();
        self.store.refresh_badges();
        id
    }

    /// Apply due badge pulses and toast transitions.
    ///
    /// Returns the toast transitions in the order they were due.
    pub fn tick(&self) -> Vec<ToastTransition> {
        self.badges.tick();
        self.notifications.tick()
    }

    /// Earliest pending timer across badges and toasts.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match (self.badges.next_deadline(), self.notifications.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
