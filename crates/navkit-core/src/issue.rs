#![forbid(unsafe_code)]

//! Non-fatal navigation issues.
//!
//! Navigation misconfiguration (a missing destination, a payload that no
//! longer decodes, a push from outside a stack) is common while a feature is
//! being built. None of it is allowed to crash or corrupt the live stack:
//! the offending operation degrades to a smaller, consistent state and an
//! [`Issue`] is reported.
//!
//! Reporting always emits a `tracing` warning. Tests (and tools) can open an
//! [`IssueCapture`] scope to collect issues reported on the current thread.
//!
//! # Invariants
//!
//! 1. Reporting never panics and never blocks.
//! 2. An issue is recorded into the innermost open capture only.
//! 3. Dropping an [`IssueCapture`] stops recording into it; the issues it
//!    already holds stay readable through clones of its handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static CAPTURES: RefCell<Vec<Rc<RefCell<Vec<Issue>>>>> = const { RefCell::new(Vec::new()) };
}

/// A diagnosable, non-fatal navigation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// No destination is registered for the element's type.
    UnregisteredDestination {
        /// Type tag of the element.
        type_name: String,
    },
    /// A codable element could not be decoded.
    DecodeFailed {
        /// Position of the element in the path.
        index: usize,
        /// Type tag of the element.
        type_name: String,
        /// Why decoding failed.
        reason: String,
    },
    /// A navigation action was used by a screen that is not inside a
    /// reconciling stack.
    OutsideNavigationContext {
        /// The attempted action (`"push"`, `"dismiss"`, ...).
        action: &'static str,
    },
    /// Dismiss was requested for a screen that was not presented by a
    /// path binding, or that has already left the stack.
    RedundantDismissal,
    /// A homogeneous path received a value of a different type.
    PathTypeMismatch {
        /// Element type of the path.
        expected: &'static str,
        /// Type of the rejected value.
        found: String,
    },
}

impl Issue {
    /// Short machine-friendly name of the issue kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnregisteredDestination { .. } => "unregistered_destination",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::OutsideNavigationContext { .. } => "outside_navigation_context",
            Self::RedundantDismissal => "redundant_dismissal",
            Self::PathTypeMismatch { .. } => "path_type_mismatch",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnregisteredDestination { type_name } => {
                write!(f, "No navigation destination registered for type {type_name}")
            }
            Self::DecodeFailed {
                index,
                type_name,
                reason,
            } => write!(
                f,
                "Failed to decode item at index {index} as {type_name}: {reason}"
            ),
            Self::OutsideNavigationContext { action } => write!(
                f,
                "Tried to {action} from outside of a navigation stack; \
                 the screen is not hosted by a reconciling stack"
            ),
            Self::RedundantDismissal => {
                write!(f, "A screen requested dismissal, but couldn't be dismissed")
            }
            Self::PathTypeMismatch { expected, found } => write!(
                f,
                "Path of {expected} cannot hold a value of type {found}"
            ),
        }
    }
}

impl std::error::Error for Issue {}

/// Report an issue: log it and record it into the innermost capture.
pub fn report_issue(issue: Issue) {
    tracing::warn!(kind = issue.kind(), "{issue}");
    CAPTURES.with(|captures| {
        if let Some(sink) = captures.borrow().last() {
            sink.borrow_mut().push(issue);
        }
    });
}

/// Collects issues reported on this thread while it is alive.
///
/// ```
/// use navkit_core::issue::{Issue, IssueCapture, report_issue};
///
/// let capture = IssueCapture::start();
/// report_issue(Issue::RedundantDismissal);
/// assert_eq!(capture.issues(), vec![Issue::RedundantDismissal]);
/// ```
#[must_use = "dropping the capture stops collecting issues"]
pub struct IssueCapture {
    sink: Rc<RefCell<Vec<Issue>>>,
}

impl IssueCapture {
    /// Open a capture scope on the current thread.
    pub fn start() -> Self {
        let sink = Rc::new(RefCell::new(Vec::new()));
        CAPTURES.with(|captures| captures.borrow_mut().push(Rc::clone(&sink)));
        Self { sink }
    }

    /// Issues recorded so far, in report order.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.sink.borrow().clone()
    }

    /// Number of issues recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sink.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sink.borrow().is_empty()
    }

    /// Remove and return the recorded issues.
    pub fn take(&self) -> Vec<Issue> {
        std::mem::take(&mut *self.sink.borrow_mut())
    }
}

impl Drop for IssueCapture {
    fn drop(&mut self) {
        CAPTURES.with(|captures| {
            let mut captures = captures.borrow_mut();
            if let Some(pos) = captures.iter().rposition(|s| Rc::ptr_eq(s, &self.sink)) {
                captures.remove(pos);
            }
        });
    }
}

impl fmt::Debug for IssueCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueCapture")
            .field("issues", &self.sink.borrow().len())
            .finish()
    }
}
