#![forbid(unsafe_code)]

//! A type-erased list of navigation identifiers.
//!
//! [`NavigationPath`] is the heterogeneous form of a navigation path: each
//! element may be a different type, and the whole path can be converted to
//! and from a [`CodableRepresentation`] for persistence and deep links.
//!
//! # Invariants
//!
//! 1. Index 0 is the screen immediately above the root; the root itself is
//!    never part of the path.
//! 2. `codable()` is `Some` iff every element can be encoded.
//! 3. A path rebuilt from a codable representation holds only
//!    [`NavigationId::Codable`] elements until a stack resolves them.

use serde::Serialize;

use crate::codable::{CodableElement, CodableRepresentation};
use crate::id::NavigationId;
use crate::value::{AnyValue, PathValue};

/// A heterogeneous navigation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationPath {
    elements: Vec<NavigationId>,
}

impl NavigationPath {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path of eager elements from typed values.
    pub fn from_values<T: PathValue>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            elements: values.into_iter().map(NavigationId::eager).collect(),
        }
    }

    /// Create a path of codable eager elements from typed values.
    pub fn from_codable_values<T: PathValue + Serialize>(
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            elements: values
                .into_iter()
                .map(|v| NavigationId::Eager(AnyValue::codable(v)))
                .collect(),
        }
    }

    /// Create a path of lazy elements from already-erased values.
    ///
    /// Each element is resolved against the destination registry when a
    /// stack first needs it.
    pub fn from_erased(values: impl IntoIterator<Item = AnyValue>) -> Self {
        Self {
            elements: values.into_iter().map(NavigationId::Lazy).collect(),
        }
    }

    /// Create a path from a codable representation.
    #[must_use]
    pub fn from_codable(codable: CodableRepresentation) -> Self {
        Self {
            elements: codable
                .into_elements()
                .into_iter()
                .map(NavigationId::Codable)
                .collect(),
        }
    }

    /// Create a path from raw identifiers.
    #[must_use]
    pub fn from_ids(elements: Vec<NavigationId>) -> Self {
        Self { elements }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The elements, root side first.
    #[must_use]
    pub fn elements(&self) -> &[NavigationId] {
        &self.elements
    }

    /// Mutable access to the elements.
    pub fn elements_mut(&mut self) -> &mut Vec<NavigationId> {
        &mut self.elements
    }

    /// Consume into the elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<NavigationId> {
        self.elements
    }

    /// Append a value. It will not be part of [`codable`](Self::codable).
    pub fn append<T: PathValue>(&mut self, value: T) {
        self.elements.push(NavigationId::eager(value));
    }

    /// Append a value that can be encoded.
    pub fn append_codable<T: PathValue + Serialize>(&mut self, value: T) {
        self.elements
            .push(NavigationId::Eager(AnyValue::codable(value)));
    }

    /// Append an already-erased value as a lazy element.
    pub fn append_erased(&mut self, value: AnyValue) {
        self.elements.push(NavigationId::Lazy(value));
    }

    /// Append an identifier as-is.
    pub fn push_id(&mut self, id: NavigationId) {
        self.elements.push(id);
    }

    /// Remove `k` values from the end.
    ///
    /// Removing more values than the path holds empties the path.
    pub fn remove_last(&mut self, k: usize) {
        if k > self.elements.len() {
            tracing::warn!(
                requested = k,
                len = self.elements.len(),
                "remove_last past the start of the path"
            );
        }
        let keep = self.elements.len().saturating_sub(k);
        self.elements.truncate(keep);
    }

    /// Keep only the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    /// A serializable description of the path.
    ///
    /// `None` if any element cannot be encoded.
    #[must_use]
    pub fn codable(&self) -> Option<CodableRepresentation> {
        let mut elements = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            match element {
                NavigationId::Eager(value) | NavigationId::Lazy(value) => {
                    elements.push(CodableElement::encode(value)?);
                }
                NavigationId::Codable(element) => elements.push(element.clone()),
            }
        }
        Some(CodableRepresentation::from_elements(elements))
    }
}

impl<T: PathValue> FromIterator<T> for NavigationPath {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl From<CodableRepresentation> for NavigationPath {
    fn from(codable: CodableRepresentation) -> Self {
        Self::from_codable(codable)
    }
}
