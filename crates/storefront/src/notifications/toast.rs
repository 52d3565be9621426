//! A single toast and its animation state machine.
//!
//! ```text
//! Created ──insert──> Entering ──enter delay──> Resting ──duration──> Exiting ──transition──> Removed
//!                        │                                               ▲                      ▲
//!                        └──────────── duration elapsed first ───────────┘                      │
//!  any live phase ──────────────────────── dismiss ─────────────────────────────────────────────┘
//! ```
//!
//! Phases only move forward. All deadlines are fixed when the toast is
//! inserted, so a late tick applies the same transitions as timely ones.

use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::millis;

/// Delay between insertion and the enter transition.
pub const ENTER_DELAY_MS: i64 = 10;

/// Length of the exit transition before the element is removed.
pub const EXIT_TRANSITION_MS: i64 = 300;

/// Identifier of a toast, unique within one notification center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Lifecycle phase of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToastPhase {
    /// Built but not yet in the container.
    Created,
    /// In the container, off-screen and transparent, sliding in.
    Entering,
    /// Fully visible.
    Resting,
    /// Sliding out.
    Exiting,
    /// Gone from the container.
    Removed,
}

impl ToastPhase {
    /// Whether the toast is still in the container.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Entering | Self::Resting | Self::Exiting)
    }
}

/// A phase change applied to a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTransition {
    pub id: ToastId,
    pub from: ToastPhase,
    pub to: ToastPhase,
    /// When the transition was due (not when it was observed).
    pub at: DateTime<Utc>,
}

/// A short-lived message element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    id: ToastId,
    message: String,
    phase: ToastPhase,
    enter_at: DateTime<Utc>,
    exit_at: DateTime<Utc>,
}

impl Toast {
    /// Build a toast whose timers start at `now`.
    pub(crate) fn new(id: ToastId, message: String, now: DateTime<Utc>, duration: TimeDelta) -> Self {
        Self {
            id,
            message,
            phase: ToastPhase::Created,
            enter_at: now + millis(ENTER_DELAY_MS),
            exit_at: now + duration.max(TimeDelta::zero()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ToastId {
        self.id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn phase(&self) -> ToastPhase {
        self.phase
    }

    /// When the exit transition starts.
    #[must_use]
    pub const fn exit_at(&self) -> DateTime<Utc> {
        self.exit_at
    }

    /// When the toast leaves the container, barring a manual dismissal.
    #[must_use]
    pub fn remove_at(&self) -> DateTime<Utc> {
        self.exit_at + millis(EXIT_TRANSITION_MS)
    }

    /// Next scheduled transition, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.next_step().map(|(at, _)| at)
    }

    /// Mark the toast as inserted into the container.
    pub(crate) fn insert(&mut self, now: DateTime<Utc>) -> Option<ToastTransition> {
        (self.phase == ToastPhase::Created).then(|| self.move_to(ToastPhase::Entering, now))
    }

    /// Apply every transition due at `now`, in order.
    pub(crate) fn advance(&mut self, now: DateTime<Utc>) -> Vec<ToastTransition> {
        let mut applied = Vec::new();
        while let Some((at, to)) = self.next_step() {
            if now < at {
                break;
            }
            applied.push(self.move_to(to, at));
        }
        applied
    }

    /// Close the toast immediately. Returns `None` if it was not live.
    pub(crate) fn dismiss(&mut self, now: DateTime<Utc>) -> Option<ToastTransition> {
        self.phase
            .is_live()
            .then(|| self.move_to(ToastPhase::Removed, now))
    }

    fn next_step(&self) -> Option<(DateTime<Utc>, ToastPhase)> {
        match self.phase {
            // The exit timer firing first skips the resting phase entirely
            ToastPhase::Entering if self.exit_at <= self.enter_at => {
                Some((self.exit_at, ToastPhase::Exiting))
            }
            ToastPhase::Entering => Some((self.enter_at, ToastPhase::Resting)),
            ToastPhase::Resting => Some((self.exit_at, ToastPhase::Exiting)),
            ToastPhase::Exiting => Some((self.remove_at(), ToastPhase::Removed)),
            ToastPhase::Created | ToastPhase::Removed => None,
        }
    }

    fn move_to(&mut self, to: ToastPhase, at: DateTime<Utc>) -> ToastTransition {
        let from = self.phase;
        self.phase = to;
        ToastTransition {
            id: self.id,
            from,
            to,
            at,
        }
    }
}
