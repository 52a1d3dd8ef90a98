#![forbid(unsafe_code)]

//! navkit: drive navigation containers from application state.
//!
//! The application owns a path of values. A [`NavigationStack`] watches the
//! path and applies the smallest container command that makes the live
//! screens match it, and writes container-originated changes (a back
//! gesture, a screen dismissing itself) back into the path.
//!
//! ```ignore
//! use navkit::prelude::*;
//!
//! let run_loop = RunLoop::new();
//! let path = Observable::new(NavigationPath::new());
//! let stack = NavigationStack::with_path(
//!     ScreenStack::new(),
//!     &Binding::new(&path),
//!     || "inbox".to_string(),
//!     &run_loop,
//! );
//! stack.navigation_destination(|id: u32| format!("message {id}"));
//!
//! path.update(|p| p.append(7_u32));
//! run_loop.run_until_idle();
//! assert_eq!(stack.executor().len(), 2);
//! ```
//!
//! # Crates
//!
//! - [`core`]: identifiers, paths, codable representation, issues.
//! - [`runtime`]: observables, bindings, run loop.
//! - [`stack`]: the reconciler and the executor contract.

pub use navkit_core as core;
pub use navkit_runtime as runtime;
pub use navkit_stack as stack;

pub use navkit_core::{
    AnyValue, CodableRepresentation, Issue, IssueCapture, NavigationId, NavigationPath,
    Transaction, with_transaction, without_animation,
};
pub use navkit_runtime::{Binding, Observable, RunLoop};
pub use navkit_stack::{
    NavigationStack, ScreenContext, ScreenId, ScreenStack, StackConfig, StackExecutor,
};

/// Everything an application needs to set up a stack.
pub mod prelude {
    pub use navkit_core::{
        AnyValue, CodableRepresentation, CodableValue, Issue, NavigationId, NavigationPath,
        PathValue, Transaction, with_transaction, without_animation,
    };
    pub use navkit_runtime::{BatchScope, Binding, Observable, RunLoop, Subscription};
    pub use navkit_stack::{
        NavigationStack, NewScreen, ScreenContext, ScreenId, ScreenStack, StackConfig,
        StackDelegate, StackEntry, StackEvents, StackExecutor,
    };
}
