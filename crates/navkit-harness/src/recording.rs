#![forbid(unsafe_code)]

//! An executor that records the commands it receives.

use navkit_stack::{NewScreen, ScreenId, ScreenStack, StackEntry, StackEvents, StackExecutor};

/// One command received by a [`RecordingStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    /// `push`.
    Push { animated: bool },
    /// `pop`.
    Pop { animated: bool },
    /// `pop_to`.
    PopTo { target: ScreenId, animated: bool },
    /// `pop_to_root`.
    PopToRoot { animated: bool },
    /// `set_all`, with how many entries were kept and how many were new.
    SetAll {
        existing: usize,
        created: usize,
        animated: bool,
    },
}

impl StackOp {
    /// The animation flag the command carried.
    #[must_use]
    pub fn animated(&self) -> bool {
        match *self {
            Self::Push { animated }
            | Self::Pop { animated }
            | Self::PopTo { animated, .. }
            | Self::PopToRoot { animated }
            | Self::SetAll { animated, .. } => animated,
        }
    }
}

/// A [`ScreenStack`] that logs every command.
///
/// Gestures made through [`inner_mut`](Self::inner_mut) are not logged:
/// they come from the user, not the reconciler.
#[derive(Debug)]
pub struct RecordingStack<S> {
    inner: ScreenStack<S>,
    ops: Vec<StackOp>,
}

impl<S> Default for RecordingStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RecordingStack<S> {
    /// Create an empty recording stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ScreenStack::new(),
            ops: Vec::new(),
        }
    }

    /// Commands received so far.
    #[must_use]
    pub fn ops(&self) -> &[StackOp] {
        &self.ops
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<StackOp> {
        std::mem::take(&mut self.ops)
    }

    /// The wrapped stack.
    #[must_use]
    pub fn inner(&self) -> &ScreenStack<S> {
        &self.inner
    }

    /// The wrapped stack, for user-driven changes.
    pub fn inner_mut(&mut self) -> &mut ScreenStack<S> {
        &mut self.inner
    }
}

impl<S> StackExecutor for RecordingStack<S> {
    type Screen = S;

    fn screen_ids(&self) -> Vec<ScreenId> {
        self.inner.screen_ids()
    }

    fn push(&mut self, screen: NewScreen<S>, animated: bool) {
        self.ops.push(StackOp::Push { animated });
        self.inner.push(screen, animated);
    }

    fn pop(&mut self, animated: bool) {
        self.ops.push(StackOp::Pop { animated });
        self.inner.pop(animated);
    }

    fn pop_to(&mut self, id: ScreenId, animated: bool) {
        self.ops.push(StackOp::PopTo {
            target: id,
            animated,
        });
        self.inner.pop_to(id, animated);
    }

    fn pop_to_root(&mut self, animated: bool) {
        self.ops.push(StackOp::PopToRoot { animated });
        self.inner.pop_to_root(animated);
    }

    fn set_all(&mut self, entries: Vec<StackEntry<S>>, animated: bool) {
        let existing = entries
            .iter()
            .filter(|e| matches!(e, StackEntry::Existing(_)))
            .count();
        self.ops.push(StackOp::SetAll {
            existing,
            created: entries.len() - existing,
            animated,
        });
        self.inner.set_all(entries, animated);
    }

    fn attach(&mut self, events: StackEvents) {
        self.inner.attach(events);
    }
}
