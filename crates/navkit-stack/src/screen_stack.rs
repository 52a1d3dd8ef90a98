#![forbid(unsafe_code)]

//! In-memory [`StackExecutor`] keeping screens in a LIFO list.
//!
//! `ScreenStack` is the reference container: it applies every command
//! immediately and reports appearance events for the new top screen. It is
//! what tests and headless hosts drive, and what platform adapters are
//! measured against.
//!
//! # Invariants
//!
//! - Entries are ordered bottom to top; index 0 is the root.
//! - `will_show`/`did_show` fire once per mutation, and only when the top
//!   screen changed.
//! - [`interactive_pop`](ScreenStack::interactive_pop) never removes the
//!   root.
//!
//! # Example
//!
//! ```ignore
//! let mut stack = ScreenStack::new();
//! stack.push(NewScreen { id: ScreenId::next(), screen: "root", context: ScreenContext::detached() }, false);
//! stack.push(NewScreen { id: ScreenId::next(), screen: "detail", context: ScreenContext::detached() }, true);
//!
//! // Simulate a back-swipe.
//! stack.interactive_pop();
//! assert_eq!(stack.len(), 1);
//! ```

use crate::context::ScreenContext;
use crate::executor::{NewScreen, ScreenId, StackEntry, StackEvents, StackExecutor};

/// One live screen with its navigation context.
#[derive(Debug)]
pub struct ScreenSlot<S> {
    /// Identity of the screen.
    pub id: ScreenId,
    /// The screen.
    pub screen: S,
    /// The context the screen was created with.
    pub context: ScreenContext,
}

impl<S> From<NewScreen<S>> for ScreenSlot<S> {
    fn from(new: NewScreen<S>) -> Self {
        Self {
            id: new.id,
            screen: new.screen,
            context: new.context,
        }
    }
}

/// Reference stack executor.
#[derive(Debug)]
pub struct ScreenStack<S> {
    slots: Vec<ScreenSlot<S>>,
    events: StackEvents,
}

impl<S> Default for ScreenStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ScreenStack<S> {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            events: StackEvents::detached(),
        }
    }

    /// Number of live screens, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no screen is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Live screens, bottom to top.
    pub fn slots(&self) -> impl Iterator<Item = &ScreenSlot<S>> {
        self.slots.iter()
    }

    /// Live screens, bottom to top.
    pub fn screens(&self) -> impl Iterator<Item = &S> {
        self.slots.iter().map(|slot| &slot.screen)
    }

    /// The top screen.
    #[must_use]
    pub fn top(&self) -> Option<&ScreenSlot<S>> {
        self.slots.last()
    }

    /// The screen with `id`, if live.
    #[must_use]
    pub fn get(&self, id: ScreenId) -> Option<&S> {
        self.slot(id).map(|slot| &slot.screen)
    }

    /// Mutable access to the screen with `id`, if live.
    pub fn get_mut(&mut self, id: ScreenId) -> Option<&mut S> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.screen)
    }

    /// The context of the screen with `id`, if live.
    #[must_use]
    pub fn context(&self, id: ScreenId) -> Option<&ScreenContext> {
        self.slot(id).map(|slot| &slot.context)
    }

    /// Position of `id` from the bottom, if live.
    #[must_use]
    pub fn position(&self, id: ScreenId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn slot(&self, id: ScreenId) -> Option<&ScreenSlot<S>> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// Pop the top screen as a user back gesture would.
    ///
    /// The root is never popped. Returns the removed screen.
    pub fn interactive_pop(&mut self) -> Option<S> {
        if self.slots.len() < 2 {
            return None;
        }
        let before = self.top_id();
        let popped = self.slots.pop().map(|slot| slot.screen);
        tracing::debug!(remaining = self.slots.len(), "interactive pop");
        self.notify_top_change(before, true);
        popped
    }

    fn top_id(&self) -> Option<ScreenId> {
        self.slots.last().map(|slot| slot.id)
    }

    fn notify_top_change(&self, before: Option<ScreenId>, animated: bool) {
        let after = self.top_id();
        if after == before {
            return;
        }
        if let Some(top) = after {
            self.events.will_show(top, animated);
            self.events.did_show(top, animated);
        }
    }
}

impl<S> StackExecutor for ScreenStack<S> {
    type Screen = S;

    fn screen_ids(&self) -> Vec<ScreenId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    fn push(&mut self, screen: NewScreen<S>, animated: bool) {
        let before = self.top_id();
        self.slots.push(screen.into());
        self.notify_top_change(before, animated);
    }

    fn pop(&mut self, animated: bool) {
        let before = self.top_id();
        self.slots.pop();
        self.notify_top_change(before, animated);
    }

    fn pop_to(&mut self, id: ScreenId, animated: bool) {
        let Some(index) = self.position(id) else {
            tracing::warn!(%id, "pop_to target is not in the stack");
            return;
        };
        let before = self.top_id();
        self.slots.truncate(index + 1);
        self.notify_top_change(before, animated);
    }

    fn pop_to_root(&mut self, animated: bool) {
        let before = self.top_id();
        self.slots.truncate(1);
        self.notify_top_change(before, animated);
    }

    fn set_all(&mut self, entries: Vec<StackEntry<S>>, animated: bool) {
        let before = self.top_id();
        let mut old: Vec<Option<ScreenSlot<S>>> =
            std::mem::take(&mut self.slots).into_iter().map(Some).collect();
        for entry in entries {
            match entry {
                StackEntry::Existing(id) => {
                    let found = old
                        .iter_mut()
                        .find(|slot| slot.as_ref().is_some_and(|s| s.id == id))
                        .and_then(Option::take);
                    match found {
                        Some(slot) => self.slots.push(slot),
                        None => tracing::warn!(%id, "set_all references a screen that is not live"),
                    }
                }
                StackEntry::New(screen) => self.slots.push(screen.into()),
            }
        }
        self.notify_top_change(before, animated);
    }

    fn attach(&mut self, events: StackEvents) {
        self.events = events;
    }
}
