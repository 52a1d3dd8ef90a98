#![forbid(unsafe_code)]

//! Deferred notification scopes.
//!
//! While a [`BatchScope`] is alive, [`Observable`](super::Observable)
//! notifications on this thread are queued instead of delivered. Each
//! observable queues at most one notification per batch and, when the
//! outermost scope exits, its subscribers see the final value only.
//!
//! The animation [`Transaction`](navkit_core::Transaction) is sampled when
//! each value changes, not when the scope exits. A change made under
//! `without_animation` inside the scope is delivered as instant.
//!
//! ```ignore
//! let path = Observable::new(Vec::<i32>::new());
//! {
//!     let _batch = BatchScope::new();
//!     path.update(|p| p.push(1));
//!     path.update(|p| p.push(2));
//! } // subscribers run once here, with [1, 2]
//! ```

use std::cell::RefCell;
use std::fmt;

type Deferred = Box<dyn FnOnce()>;

#[derive(Default)]
struct BatchState {
    depth: usize,
    pending: Vec<Deferred>,
}

thread_local! {
    static BATCH: RefCell<BatchState> = RefCell::new(BatchState::default());
}

pub(crate) fn is_batching() -> bool {
    BATCH.with(|b| b.borrow().depth > 0)
}

pub(crate) fn defer(notify: Deferred) {
    BATCH.with(|b| b.borrow_mut().pending.push(notify));
}

/// RAII guard deferring observable notifications until dropped.
#[must_use = "dropping the scope flushes notifications immediately"]
pub struct BatchScope {
    _private: (),
}

impl BatchScope {
    /// Open a batch scope on the current thread.
    pub fn new() -> Self {
        BATCH.with(|b| b.borrow_mut().depth += 1);
        Self { _private: () }
    }

    /// Whether any batch scope is open on this thread.
    #[must_use]
    pub fn is_active() -> bool {
        is_batching()
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let pending = BATCH.with(|b| {
            let mut state = b.borrow_mut();
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                std::mem::take(&mut state.pending)
            } else {
                Vec::new()
            }
        });
        for notify in pending {
            notify();
        }
    }
}

impl fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScope").finish()
    }
}
