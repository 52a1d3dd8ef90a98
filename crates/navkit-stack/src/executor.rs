#![forbid(unsafe_code)]

//! The contract between a [`NavigationStack`](crate::NavigationStack) and
//! the container that actually shows screens.
//!
//! A [`StackExecutor`] owns the live screens, root first. It knows nothing
//! about navigation identifiers: the reconciler keeps the mapping from
//! [`ScreenId`] to identifier on its own side.
//!
//! # Invariants
//!
//! - `screen_ids()` lists every live screen bottom to top, root included.
//! - `StackEntry::Existing` moves an already-live screen; it is never
//!   recreated.
//! - After any mutation that changes the top screen, the executor reports
//!   `will_show` and then `did_show` for the new top through the attached
//!   [`StackEvents`].
//!
//! # Failure Modes
//!
//! - `pop_to` with an id that is not live is ignored by [`ScreenStack`].
//! - `StackEntry::Existing` with an id that is not live is skipped.
//! - Events sent after the owning stack is dropped are discarded.
//!
//! [`ScreenStack`]: crate::ScreenStack

use std::fmt;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ScreenContext;

/// Global counter for unique screen IDs.
static SCREEN_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a live screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(u64);

impl ScreenId {
    /// Allocate a new unique screen ID.
    #[must_use]
    pub fn next() -> Self {
        Self(SCREEN_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// A screen created by the reconciler, ready to be shown.
pub struct NewScreen<S> {
    /// Identity the executor must report for this screen.
    pub id: ScreenId,
    /// The screen itself.
    pub screen: S,
    /// Navigation actions available to the screen.
    pub context: ScreenContext,
}

impl<S: fmt::Debug> fmt::Debug for NewScreen<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewScreen")
            .field("id", &self.id)
            .field("screen", &self.screen)
            .finish_non_exhaustive()
    }
}

/// One slot of a full-stack replacement.
#[derive(Debug)]
pub enum StackEntry<S> {
    /// Keep the live screen with this id.
    Existing(ScreenId),
    /// Insert a new screen.
    New(NewScreen<S>),
}

impl<S> StackEntry<S> {
    /// The id this entry will have once applied.
    #[must_use]
    pub fn id(&self) -> ScreenId {
        match self {
            Self::Existing(id) => *id,
            Self::New(screen) => screen.id,
        }
    }
}

/// A navigation container driven by a reconciler.
pub trait StackExecutor {
    /// The screen type this container shows.
    type Screen;

    /// Live screen ids, bottom (root) to top.
    fn screen_ids(&self) -> Vec<ScreenId>;

    /// Push a new screen on top.
    fn push(&mut self, screen: NewScreen<Self::Screen>, animated: bool);

    /// Remove the top screen.
    fn pop(&mut self, animated: bool);

    /// Remove every screen above `id`.
    fn pop_to(&mut self, id: ScreenId, animated: bool);

    /// Remove every screen above the root.
    fn pop_to_root(&mut self, animated: bool);

    /// Replace the whole stack.
    fn set_all(&mut self, entries: Vec<StackEntry<Self::Screen>>, animated: bool);

    /// Install the channel used to report will/did show events.
    fn attach(&mut self, events: StackEvents) {
        let _ = events;
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub(crate) trait EventSink {
    fn will_show(&self, screen: ScreenId, animated: bool);
    fn did_show(&self, screen: ScreenId, animated: bool);
}

/// Channel an executor uses to report screen appearance.
///
/// Holds only a weak reference to the stack; sending after the stack is
/// gone does nothing.
#[derive(Clone)]
pub struct StackEvents {
    sink: Option<Weak<dyn EventSink>>,
}

impl StackEvents {
    pub(crate) fn new(sink: Weak<dyn EventSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A channel connected to nothing.
    #[must_use]
    pub fn detached() -> Self {
        Self { sink: None }
    }

    /// Whether a stack is still listening.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.strong_count() > 0)
    }

    /// `screen` is about to become the top screen.
    pub fn will_show(&self, screen: ScreenId, animated: bool) {
        if let Some(sink) = self.sink.as_ref().and_then(Weak::upgrade) {
            sink.will_show(screen, animated);
        }
    }

    /// `screen` finished becoming the top screen.
    pub fn did_show(&self, screen: ScreenId, animated: bool) {
        if let Some(sink) = self.sink.as_ref().and_then(Weak::upgrade) {
            sink.did_show(screen, animated);
        }
    }
}

impl Default for StackEvents {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for StackEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEvents")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Observer of screen appearance, installed with
/// [`NavigationStack::set_delegate`](crate::NavigationStack::set_delegate).
///
/// Events are delivered after the executor call that raised them returns,
/// so a delegate may read the stack and its executor. Events raised while
/// the application holds [`NavigationStack::executor_mut`](crate::NavigationStack::executor_mut)
/// arrive on the next run-loop turn.
pub trait StackDelegate {
    /// `screen` is about to become the top screen.
    fn will_show(&self, screen: ScreenId, animated: bool) {
        let _ = (screen, animated);
    }

    /// `screen` finished becoming the top screen.
    fn did_show(&self, screen: ScreenId, animated: bool) {
        let _ = (screen, animated);
    }
}
