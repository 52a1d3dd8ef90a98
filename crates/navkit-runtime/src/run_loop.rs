#![forbid(unsafe_code)]

//! A single-threaded deferred task queue.
//!
//! Work scheduled on a [`RunLoop`] runs on a later turn, never inside the
//! call that scheduled it. Navigation stacks use this to react to state
//! changes and container events without re-entering their own state.
//!
//! # Invariants
//!
//! 1. Tasks run in the order they were scheduled.
//! 2. A task scheduled during a turn runs on the next turn, not the
//!    current one.
//! 3. No internal borrow is held while a task runs, so tasks may schedule
//!    more work.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Task panics | Remaining tasks of that turn are dropped; the queue stays usable |
//! | Tasks keep rescheduling | `run_until_idle` stops after the turn limit and logs a warning |

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Default cap on turns for [`RunLoop::run_until_idle`].
pub const DEFAULT_TURN_LIMIT: usize = 1024;

struct Inner {
    queue: RefCell<VecDeque<Task>>,
    turns: Cell<u64>,
    turn_limit: usize,
}

/// Shared handle to a deferred task queue.
#[derive(Clone)]
pub struct RunLoop {
    inner: Rc<Inner>,
}

impl RunLoop {
    /// Create an empty run loop.
    #[must_use]
    pub fn new() -> Self {
        Self::with_turn_limit(DEFAULT_TURN_LIMIT)
    }

    /// Create a run loop whose `run_until_idle` stops after `limit` turns.
    #[must_use]
    pub fn with_turn_limit(limit: usize) -> Self {
        Self {
            inner: Rc::new(Inner {
                queue: RefCell::new(VecDeque::new()),
                turns: Cell::new(0),
                turn_limit: limit.max(1),
            }),
        }
    }

    /// Queue `task` for the next turn.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.inner.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    /// Turns run so far.
    #[must_use]
    pub fn turns(&self) -> u64 {
        self.inner.turns.get()
    }

    /// Run every task queued before this call. Returns how many ran.
    pub fn turn(&self) -> usize {
        let batch = std::mem::take(&mut *self.inner.queue.borrow_mut());
        if batch.is_empty() {
            return 0;
        }
        self.inner.turns.set(self.inner.turns.get() + 1);
        let count = batch.len();
        tracing::trace!(tasks = count, turn = self.inner.turns.get(), "run loop turn");
        for task in batch {
            task();
        }
        count
    }

    /// Run turns until the queue is empty or the turn limit is reached.
    ///
    /// Returns the number of turns run.
    pub fn run_until_idle(&self) -> usize {
        let mut turns = 0;
        while !self.is_idle() {
            if turns == self.inner.turn_limit {
                tracing::warn!(
                    limit = self.inner.turn_limit,
                    pending = self.pending(),
                    "run loop did not settle"
                );
                break;
            }
            self.turn();
            turns += 1;
        }
        turns
    }
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLoop")
            .field("pending", &self.pending())
            .field("turns", &self.turns())
            .finish()
    }
}
