#![forbid(unsafe_code)]

//! Animation intent for navigation mutations.
//!
//! A [`Transaction`] travels with a path mutation so the stack can decide
//! whether the resulting push/pop should animate. The current transaction is
//! thread-local; [`with_transaction`] scopes one around a closure and
//! restores the previous transaction afterwards, even on unwind.
//!
//! ```
//! use navkit_core::transaction::{Transaction, without_animation};
//!
//! assert!(!Transaction::current().disables_animations);
//! without_animation(|| {
//!     assert!(Transaction::current().disables_animations);
//! });
//! ```

use std::cell::Cell;

thread_local! {
    static CURRENT: Cell<Transaction> = const { Cell::new(Transaction::new()) };
}

/// Context captured alongside a path mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Apply the resulting stack change without animation.
    pub disables_animations: bool,
}

impl Transaction {
    /// A transaction that animates.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            disables_animations: false,
        }
    }

    /// A transaction that applies instantly.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            disables_animations: true,
        }
    }

    /// The transaction in effect on this thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Cell::get)
    }
}

struct Restore(Transaction);

impl Drop for Restore {
    fn drop(&mut self) {
        CURRENT.with(|current| current.set(self.0));
    }
}

/// Run `f` with `transaction` as the current transaction.
pub fn with_transaction<R>(transaction: Transaction, f: impl FnOnce() -> R) -> R {
    let _restore = Restore(CURRENT.with(|current| current.replace(transaction)));
    f()
}

/// Run `f` with animations disabled.
pub fn without_animation<R>(f: impl FnOnce() -> R) -> R {
    with_transaction(Transaction::instant(), f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_animates() {
        assert_eq!(Transaction::current(), Transaction::new());
    }

    #[test]
    fn scope_restores_previous() {
        with_transaction(Transaction::instant(), || {
            assert!(Transaction::current().disables_animations);
            with_transaction(Transaction::new(), || {
                assert!(!Transaction::current().disables_animations);
            });
            assert!(Transaction::current().disables_animations);
        });
        assert!(!Transaction::current().disables_animations);
    }

    #[test]
    fn returns_closure_value() {
        assert_eq!(without_animation(|| 7), 7);
    }

    #[test]
    fn restores_after_panic() {
        let result = std::panic::catch_unwind(|| {
            without_animation(|| panic!("boom"));
        });
        assert!(result.is_err());
        assert!(!Transaction::current().disables_animations);
    }
}
