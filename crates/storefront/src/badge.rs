//! Cart count badges.
//!
//! A page may show the cart count in several places (header icon, mobile
//! nav, ...). Each of those is a badge attached to the [`BadgeBoard`]; the
//! cart store writes the item count to all of them after every save.
//!
//! A non-zero refresh plays a short pulse: the badge is enlarged and reverts
//! to normal size [`PULSE_DURATION_MS`] later, when the board is ticked.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::clock::{SharedClock, millis};

/// Marker shared by every cart badge element.
pub const CART_BADGE_MARKER: &str = "cart-badge";

/// How long a badge stays enlarged after a refresh.
pub const PULSE_DURATION_MS: i64 = 200;

/// Handle to an attached badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BadgeId(usize);

/// Badge size during the pulse animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeScale {
    #[default]
    Normal,
    Enlarged,
}

/// Displayed state of one badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Item count as displayed.
    pub text: String,
    /// Hidden when the cart is empty.
    pub visible: bool,
    pub scale: BadgeScale,
}

impl Default for Badge {
    fn default() -> Self {
        Self {
            text: "0".to_string(),
            visible: false,
            scale: BadgeScale::Normal,
        }
    }
}

#[derive(Debug)]
struct Slot {
    id: BadgeId,
    badge: Badge,
    revert_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: usize,
    slots: Vec<Slot>,
}

/// The set of cart badges on the current page.
///
/// Cheap to clone; clones share the same badges.
#[derive(Debug, Clone)]
pub struct BadgeBoard {
    inner: Rc<RefCell<Inner>>,
    clock: SharedClock,
}

impl BadgeBoard {
    /// Create a board with no badges.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: Rc::default(),
            clock,
        }
    }

    /// Attach a new badge in its initial hidden state.
    pub fn attach(&self) -> BadgeId {
        let mut inner = self.inner.borrow_mut();
        let id = BadgeId(inner.next_id);
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            badge: Badge::default(),
            revert_at: None,
        });
        id
    }

    /// Detach a badge. Returns `false` if it was not attached.
    pub fn detach(&self, id: BadgeId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.slots.len();
        inner.slots.retain(|slot| slot.id != id);
        inner.slots.len() != before
    }

    /// Current state of a badge.
    #[must_use]
    pub fn badge(&self, id: BadgeId) -> Option<Badge> {
        self.inner
            .borrow()
            .slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.badge.clone())
    }

    /// Current state of every badge, in attach order.
    #[must_use]
    pub fn badges(&self) -> Vec<Badge> {
        self.inner
            .borrow()
            .slots
            .iter()
            .map(|slot| slot.badge.clone())
            .collect()
    }

    /// Number of attached badges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Whether no badges are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `count` to every badge.
    ///
    /// Zero hides the badges. Any other count shows them and starts a pulse.
    pub fn refresh(&self, count: u64) {
        let now = self.clock.now();
        let text = count.to_string();
        let mut inner = self.inner.borrow_mut();

        for slot in &mut inner.slots {
            slot.badge.text.clone_from(&text);
            if count > 0 {
                slot.badge.visible = true;
                slot.badge.scale = BadgeScale::Enlarged;
                slot.revert_at = Some(now + millis(PULSE_DURATION_MS));
            } else {
                slot.badge.visible = false;
            }
        }

        trace!(count, badges = inner.slots.len(), "Refreshed cart badges");
    }

    /// Finish any pulses that are due. Returns how many badges reverted.
    pub fn tick(&self) -> usize {
        let now = self.clock.now();
        let mut reverted = 0;

        for slot in &mut self.inner.borrow_mut().slots {
            if slot.revert_at.is_some_and(|at| now >= at) {
                slot.badge.scale = BadgeScale::Normal;
                slot.revert_at = None;
                reverted += 1;
            }
        }

        reverted
    }

    /// Earliest pending pulse deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter_map(|slot| slot.revert_at)
            .min()
    }
}
