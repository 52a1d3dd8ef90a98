#![forbid(unsafe_code)]

//! Ready-made stacks for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use navkit_core::{NavigationId, NavigationPath};
use navkit_runtime::{Binding, Observable, RunLoop};
use navkit_stack::{ErasedPathStore, NavigationStack, ScreenContext, ScreenId, StackConfig};

use crate::recording::{RecordingStack, StackOp};

static SERIAL: AtomicU64 = AtomicU64::new(1);

/// A screen that remembers which instance it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScreen {
    /// What the screen shows.
    pub label: String,
    /// Unique per constructed screen; equal serials mean the same instance.
    pub serial: u64,
}

impl TestScreen {
    /// Create a screen with a fresh serial.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            serial: SERIAL.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// A navigation stack over an observable [`NavigationPath`], driving a
/// [`RecordingStack`].
pub struct Harness {
    /// The run loop the stack schedules on.
    pub run_loop: RunLoop,
    /// The application-owned path.
    pub path: Observable<NavigationPath>,
    /// The stack under test.
    pub stack: NavigationStack<RecordingStack<TestScreen>>,
}

impl Harness {
    /// A stack over `initial` with the default config and no destinations.
    #[must_use]
    pub fn new(initial: NavigationPath) -> Self {
        Self::with_config(initial, StackConfig::default())
    }

    /// A stack over `initial` with `config` and no destinations.
    #[must_use]
    pub fn with_config(initial: NavigationPath, config: StackConfig) -> Self {
        let run_loop = RunLoop::new();
        let path = Observable::new(initial);
        let stack = NavigationStack::new(
            RecordingStack::new(),
            ErasedPathStore::new(Binding::new(&path)),
            || TestScreen::new("root"),
            &run_loop,
            config,
        );
        Self {
            run_loop,
            path,
            stack,
        }
    }

    /// Register a destination for `i32` rendering as `"int {n}"`.
    #[must_use]
    pub fn with_ints(self) -> Self {
        self.stack
            .navigation_destination(|n: i32| TestScreen::new(format!("int {n}")));
        self
    }

    /// Run the loop until nothing is pending.
    pub fn settle(&self) -> usize {
        self.run_loop.run_until_idle()
    }

    /// Labels of the live screens, root first.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.stack
            .executor()
            .inner()
            .screens()
            .map(|s| s.label.clone())
            .collect()
    }

    /// Serials of the live screens, root first.
    #[must_use]
    pub fn serials(&self) -> Vec<u64> {
        self.stack
            .executor()
            .inner()
            .screens()
            .map(|s| s.serial)
            .collect()
    }

    /// Ids of the live screens, root first.
    #[must_use]
    pub fn screen_ids(&self) -> Vec<ScreenId> {
        self.stack.executor().inner().slots().map(|s| s.id).collect()
    }

    /// The current path.
    #[must_use]
    pub fn path_ids(&self) -> Vec<NavigationId> {
        self.path.get().into_elements()
    }

    /// The context of the live screen at `index` (0 is the root).
    #[must_use]
    pub fn context(&self, index: usize) -> Option<ScreenContext> {
        self.stack
            .executor()
            .inner()
            .slots()
            .nth(index)
            .map(|s| s.context.clone())
    }

    /// Commands issued since the last call.
    pub fn take_ops(&self) -> Vec<StackOp> {
        self.stack.executor_mut().take_ops()
    }

    /// Simulate a user back gesture.
    pub fn back_swipe(&self) -> Option<TestScreen> {
        self.stack.executor_mut().inner_mut().interactive_pop()
    }
}

/// Eager identifiers for a list of integers.
#[must_use]
pub fn int_ids(values: impl IntoIterator<Item = i32>) -> Vec<NavigationId> {
    values.into_iter().map(NavigationId::eager).collect()
}
