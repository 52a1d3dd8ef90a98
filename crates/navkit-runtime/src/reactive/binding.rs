#![forbid(unsafe_code)]

//! Read/write handles onto observable state.
//!
//! A [`Binding<T>`] is a view of some `T` that lives elsewhere: either a
//! whole [`Observable<T>`] or a projection of one field of a larger model.
//! Navigation stacks hold a `Binding` to their path, so the application
//! decides where the path is actually stored.
//!
//! ```ignore
//! use navkit_runtime::reactive::{Binding, Observable};
//!
//! #[derive(Clone, PartialEq)]
//! struct Model { path: Vec<u32>, title: String }
//!
//! let model = Observable::new(Model { path: vec![], title: "inbox".into() });
//! let path = Binding::project(&model, |m| m.path.clone(), |m, p| m.path = p);
//!
//! path.update(|p| p.push(7));
//! assert_eq!(model.get().path, vec![7]);
//! ```
//!
//! # Invariants
//!
//! 1. `get()` always reads through to the source; bindings never cache.
//! 2. `version()` is the source observable's version, so it changes whenever
//!    the source changes, even if the projected field did not.
//! 3. `set()` with a value equal to the current projection does not bump the
//!    source version.
//! 4. Clones share the same source.
//!
//! # Failure Modes
//!
//! - Getter or setter panic: propagates to the caller.
//! - A subscriber that calls `set()` re-enters notification; callers that
//!   write back from a subscriber need their own re-entrancy guard.

use std::fmt;
use std::rc::Rc;

use super::observable::{Observable, Subscription};

// ---------------------------------------------------------------------------
// Binding<T>
// ---------------------------------------------------------------------------

/// A read/write handle onto a value stored in an [`Observable`].
pub struct Binding<T> {
    get: Rc<dyn Fn() -> T>,
    set: Rc<dyn Fn(T)>,
    version: Rc<dyn Fn() -> u64>,
    subscribe: Rc<dyn Fn(Box<dyn Fn()>) -> Subscription>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            get: Rc::clone(&self.get),
            set: Rc::clone(&self.set),
            version: Rc::clone(&self.version),
            subscribe: Rc::clone(&self.subscribe),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Binding<T> {
    /// Bind to a whole observable.
    pub fn new(source: &Observable<T>) -> Self {
        let (get_src, set_src, ver_src) = (source.clone(), source.clone(), source.clone());
        Self {
            get: Rc::new(move || get_src.get()),
            set: Rc::new(move |value| set_src.set(value)),
            version: Rc::new(move || ver_src.version()),
            subscribe: subscribe_fn(source),
        }
    }

    /// Bind to an observable that only this binding uses.
    pub fn detached(value: T) -> Self {
        Self::new(&Observable::new(value))
    }

    /// Bind to one part of a larger observable model.
    ///
    /// `read` extracts the part; `write` stores a new part into a copy of
    /// the model, which is then set back on `source`.
    pub fn project<S: Clone + PartialEq + 'static>(
        source: &Observable<S>,
        read: impl Fn(&S) -> T + 'static,
        write: impl Fn(&mut S, T) + 'static,
    ) -> Self {
        let read = Rc::new(read);
        let get_src = source.clone();
        let get_read = Rc::clone(&read);
        let set_src = source.clone();
        let ver_src = source.clone();
        Self {
            get: Rc::new(move || get_src.with(|s| get_read(s))),
            set: Rc::new(move |value: T| {
                if set_src.with(|s| read(s) == value) {
                    return;
                }
                set_src.update(|s| write(s, value));
            }),
            version: Rc::new(move || ver_src.version()),
            subscribe: subscribe_fn(source),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.get)()
    }

    /// Store a new value.
    pub fn set(&self, value: T) {
        (self.set)(value);
    }

    /// Modify a copy of the value and store it back.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// The source's change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        (self.version)()
    }

    /// Run `callback` after every change to the source.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        (self.subscribe)(Box::new(callback))
    }
}

fn subscribe_fn<S: Clone + PartialEq + 'static>(
    source: &Observable<S>,
) -> Rc<dyn Fn(Box<dyn Fn()>) -> Subscription> {
    let src = source.clone();
    Rc::new(move |callback: Box<dyn Fn()>| src.subscribe(move |_| callback()))
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BindingScope
// ---------------------------------------------------------------------------

/// Holds subscriptions for one owner and releases them together.
///
/// Subscriptions are released on drop or on [`clear`](Self::clear).
#[derive(Default)]
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every held subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("len", &self.subscriptions.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
