#![forbid(unsafe_code)]

//! Shared, version-tracked values with change notification.
//!
//! # Invariants
//!
//! 1. `version()` increments exactly once per `set` that changes the value.
//! 2. Subscribers run in registration order, after the value is stored and
//!    with no internal borrow held, so a callback may read or write the
//!    observable it is subscribed to.
//! 3. Setting a value equal to the current one does nothing.
//! 4. Inside a [`BatchScope`](super::BatchScope) the value updates
//!    immediately but subscribers run once, when the outermost scope exits.
//! 5. Deferred subscribers run under an instant [`Transaction`] if any of
//!    the batched changes was made under one.
//!
//! # Failure Modes
//!
//! - A subscriber that panics propagates to the caller of `set`.
//! - Re-entrant `set` from a subscriber notifies again (nested), so
//!   subscribers must guard their own cycles.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use navkit_core::{Transaction, with_transaction};

use super::batch;

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
    notify_pending: bool,
    pending_instant: bool,
}

/// A shared, observable value.
///
/// Cloning an `Observable` shares the underlying value.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
                notify_pending: false,
                pending_instant: false,
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of value changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.schedule_notify();
    }

    /// Mutate a copy of the value and store it back.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Register `callback` to run after each change.
    ///
    /// The callback stays registered until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    fn schedule_notify(&self) {
        if batch::is_batching() {
            let mut inner = self.inner.borrow_mut();
            inner.pending_instant |= Transaction::current().disables_animations;
            if inner.notify_pending {
                return;
            }
            inner.notify_pending = true;
            drop(inner);
            let this = self.clone();
            batch::defer(Box::new(move || this.flush_batched()));
        } else {
            self.notify();
        }
    }

    fn flush_batched(&self) {
        let instant = std::mem::take(&mut self.inner.borrow_mut().pending_instant);
        if instant {
            with_transaction(Transaction::instant(), || self.notify());
        } else {
            self.notify();
        }
    }

    fn notify(&self) {
        let (value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.notify_pending = false;
            inner.subscribers.retain(|s| s.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

/// RAII guard for a subscriber callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
