#![forbid(unsafe_code)]

//! Navigation actions available to a screen.
//!
//! Every screen a [`NavigationStack`](crate::NavigationStack) creates gets a
//! [`ScreenContext`]. The context holds a non-owning handle back to the
//! stack, so a screen can dismiss itself or push a new value without
//! keeping the stack alive.
//!
//! Dismissing a screen is the same as truncating the path just before that
//! screen. The truncation is applied on the next run loop turn, so it is
//! safe to call from inside screen code that the executor is running.

use std::fmt;
use std::rc::Weak;

use navkit_core::{AnyValue, CodableValue, Issue, NavigationId, PathValue, report_issue};

use crate::executor::ScreenId;

pub(crate) trait ContextHost {
    fn dismiss(&self, screen: ScreenId);
    fn push(&self, id: NavigationId);
    fn is_presented(&self, screen: ScreenId) -> bool;
}

/// Handle a screen uses to act on its enclosing stack.
#[derive(Clone)]
pub struct ScreenContext {
    screen: Option<ScreenId>,
    host: Option<Weak<dyn ContextHost>>,
}

impl ScreenContext {
    pub(crate) fn new(screen: ScreenId, host: Weak<dyn ContextHost>) -> Self {
        Self {
            screen: Some(screen),
            host: Some(host),
        }
    }

    /// A context for a screen that is not inside a navigation stack.
    ///
    /// Every action on it reports an [`Issue`] and does nothing else.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            screen: None,
            host: None,
        }
    }

    /// The screen this context belongs to.
    #[must_use]
    pub fn screen_id(&self) -> Option<ScreenId> {
        self.screen
    }

    fn host(&self) -> Option<std::rc::Rc<dyn ContextHost>> {
        self.host.as_ref().and_then(Weak::upgrade)
    }

    /// Remove this screen, and everything above it, from the path.
    pub fn dismiss(&self) {
        match (self.host(), self.screen) {
            (Some(host), Some(screen)) => host.dismiss(screen),
            _ => report_issue(Issue::RedundantDismissal),
        }
    }

    /// Append a value to the enclosing stack's path.
    pub fn push_value<T: PathValue>(&self, value: T) {
        self.push_id(NavigationId::eager(value));
    }

    /// Append a value that can be persisted with the path.
    pub fn push_codable<T: CodableValue>(&self, value: T) {
        self.push_id(NavigationId::Eager(AnyValue::codable(value)));
    }

    /// Append an identifier to the enclosing stack's path.
    pub fn push_id(&self, id: NavigationId) {
        match self.host() {
            Some(host) => host.push(id),
            None => report_issue(Issue::OutsideNavigationContext { action: "push" }),
        }
    }

    /// Whether this screen was presented from the path and is still live.
    #[must_use]
    pub fn is_presented(&self) -> bool {
        match (self.host(), self.screen) {
            (Some(host), Some(screen)) => host.is_presented(screen),
            _ => false,
        }
    }
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenContext")
            .field("screen", &self.screen)
            .field("attached", &self.host().is_some())
            .finish()
    }
}
