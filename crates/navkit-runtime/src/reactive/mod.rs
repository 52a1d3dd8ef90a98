#![forbid(unsafe_code)]

//! Reactive state for navkit.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Binding`]: a read/write handle onto an observable or one field of it.
//! - [`BindingScope`]: holds a group of subscriptions for one owner.
//! - [`BatchScope`]: defers notifications until the scope exits.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` callbacks and pruned lazily
//! during notification. `BatchScope` keeps its depth and queued
//! notifications in a thread-local; only the outermost scope flushes.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod batch;
pub mod binding;
pub mod observable;

pub use batch::BatchScope;
pub use binding::{Binding, BindingScope};
pub use observable::{Observable, Subscription};
