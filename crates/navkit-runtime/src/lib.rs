#![forbid(unsafe_code)]

//! Reactive state and deferred scheduling for navkit.
//!
//! Navigation stacks observe their path through a [`reactive::Binding`] and
//! react to changes on a [`RunLoop`] turn, so that container callbacks and
//! path mutations never re-enter each other.

pub mod reactive;
pub mod run_loop;

pub use reactive::{BatchScope, Binding, BindingScope, Observable, Subscription};
pub use run_loop::{DEFAULT_TURN_LIMIT, RunLoop};
