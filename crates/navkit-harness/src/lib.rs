#![forbid(unsafe_code)]

//! Test harness for navkit.
//!
//! - [`RecordingStack`]: a [`ScreenStack`](navkit_stack::ScreenStack) that
//!   logs every command the reconciler issues.
//! - [`Harness`]: a ready-made stack over a heterogeneous path, with helpers
//!   to settle the run loop and inspect the result.
//! - [`init_test_logging`]: opt-in `tracing` output for a test run.

pub mod fixture;
pub mod logging;
pub mod recording;

pub use fixture::{Harness, TestScreen, int_ids};
pub use logging::init_test_logging;
pub use recording::{RecordingStack, StackOp};
