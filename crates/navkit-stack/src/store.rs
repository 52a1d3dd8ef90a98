#![forbid(unsafe_code)]

//! Where a stack's path lives.
//!
//! The path is owned by the application. A [`PathStore`] adapts one of the
//! two supported shapes to the list of [`NavigationId`]s the reconciler
//! works with:
//!
//! - [`ErasedPathStore`]: a `Binding<NavigationPath>`, any mix of types,
//!   persistable through its codable representation.
//! - [`TypedPathStore<T>`]: a `Binding<Vec<T>>`, every element a `T`.
//!
//! # Failure Modes
//!
//! A typed store can only hold values of its element type. Writing any
//! other identifier (a different type, or a still-encoded codable element)
//! reports [`Issue::PathTypeMismatch`] and skips that element.

use std::fmt;
use std::marker::PhantomData;

use navkit_core::{Issue, NavigationId, NavigationPath, PathValue, report_issue, type_tag};
use navkit_runtime::{Binding, Subscription};

/// A two-way, observable list of navigation identifiers.
pub trait PathStore {
    /// Current identifiers, root side first.
    fn elements(&self) -> Vec<NavigationId>;

    /// Replace the identifiers.
    fn set_elements(&self, elements: Vec<NavigationId>);

    /// Change counter of the underlying state.
    fn version(&self) -> u64;

    /// Append one identifier.
    fn append(&self, id: NavigationId) {
        let mut elements = self.elements();
        elements.push(id);
        self.set_elements(elements);
    }

    /// Run `callback` after every change.
    fn subscribe(&self, callback: Box<dyn Fn()>) -> Subscription;
}

// ---------------------------------------------------------------------------
// ErasedPathStore
// ---------------------------------------------------------------------------

/// Path store over a heterogeneous [`NavigationPath`].
#[derive(Clone, Debug)]
pub struct ErasedPathStore {
    binding: Binding<NavigationPath>,
}

impl ErasedPathStore {
    /// Wrap a path binding.
    #[must_use]
    pub fn new(binding: Binding<NavigationPath>) -> Self {
        Self { binding }
    }

    /// The wrapped binding.
    #[must_use]
    pub fn binding(&self) -> &Binding<NavigationPath> {
        &self.binding
    }
}

impl PathStore for ErasedPathStore {
    fn elements(&self) -> Vec<NavigationId> {
        self.binding.get().into_elements()
    }

    fn set_elements(&self, elements: Vec<NavigationId>) {
        self.binding.set(NavigationPath::from_ids(elements));
    }

    fn version(&self) -> u64 {
        self.binding.version()
    }

    fn append(&self, id: NavigationId) {
        self.binding.update(|path| path.push_id(id));
    }

    fn subscribe(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.binding.subscribe(callback)
    }
}

// ---------------------------------------------------------------------------
// TypedPathStore
// ---------------------------------------------------------------------------

/// Path store over a homogeneous `Vec<T>`.
pub struct TypedPathStore<T> {
    binding: Binding<Vec<T>>,
    _marker: PhantomData<T>,
}

impl<T> Clone for TypedPathStore<T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: PathValue> TypedPathStore<T> {
    /// Wrap a typed path binding.
    #[must_use]
    pub fn new(binding: Binding<Vec<T>>) -> Self {
        Self {
            binding,
            _marker: PhantomData,
        }
    }

    /// The wrapped binding.
    #[must_use]
    pub fn binding(&self) -> &Binding<Vec<T>> {
        &self.binding
    }

    fn extract(id: &NavigationId) -> Option<T> {
        let value = id.downcast_ref::<T>().cloned();
        if value.is_none() {
            report_issue(Issue::PathTypeMismatch {
                expected: type_tag::<T>(),
                found: id.type_tag().to_owned(),
            });
        }
        value
    }
}

impl<T: PathValue> PathStore for TypedPathStore<T> {
    fn elements(&self) -> Vec<NavigationId> {
        self.binding
            .get()
            .into_iter()
            .map(NavigationId::eager)
            .collect()
    }

    fn set_elements(&self, elements: Vec<NavigationId>) {
        let values: Vec<T> = elements.iter().filter_map(Self::extract).collect();
        self.binding.set(values);
    }

    fn version(&self) -> u64 {
        self.binding.version()
    }

    fn append(&self, id: NavigationId) {
        if let Some(value) = Self::extract(&id) {
            self.binding.update(|values| values.push(value));
        }
    }

    fn subscribe(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.binding.subscribe(callback)
    }
}

impl<T: PathValue> fmt::Debug for TypedPathStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPathStore")
            .field("elements", &self.binding.get())
            .finish()
    }
}
