#![forbid(unsafe_code)]

//! Path-driven navigation stacks for navkit.
//!
//! - [`NavigationStack`]: the reconciler keeping a container in step with a
//!   navigation path.
//! - [`StackExecutor`]: the contract a container implements, with
//!   [`ScreenStack`] as the in-memory reference container.
//! - [`DestinationRegistry`]: factories turning path values into screens.
//! - [`PathStore`]: adapters for heterogeneous and homogeneous paths.
//! - [`ScreenContext`]: dismiss and push actions for screens.

pub mod config;
pub mod context;
pub mod controller;
pub mod executor;
pub mod registry;
pub mod screen_stack;
pub mod store;

pub use config::StackConfig;
pub use context::ScreenContext;
pub use controller::NavigationStack;
pub use executor::{NewScreen, ScreenId, StackDelegate, StackEntry, StackEvents, StackExecutor};
pub use registry::DestinationRegistry;
pub use screen_stack::{ScreenSlot, ScreenStack};
pub use store::{ErasedPathStore, PathStore, TypedPathStore};
