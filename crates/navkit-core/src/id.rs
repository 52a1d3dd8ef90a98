#![forbid(unsafe_code)]

//! Navigation identifiers: one entry of a navigation path.
//!
//! A [`NavigationId`] is either resolved ([`NavigationId::Eager`]) or still
//! waiting for a destination to accept it:
//!
//! - [`NavigationId::Lazy`] holds a concrete value that arrived type-erased
//!   and has not yet been matched against a registered destination.
//! - [`NavigationId::Codable`] holds a type tag and an encoded payload,
//!   produced when a path is rebuilt from its codable representation.
//!
//! Both lazy forms become `Eager` once resolved, or are dropped from the
//! path with a reported issue.
//!
//! # Invariants
//!
//! 1. Equality is variant-strict: `Eager(v) != Lazy(v)`.
//! 2. Within a variant, equality is value equality.
//! 3. Hashing agrees with equality (the variant is mixed into the hash).

use std::any::TypeId;
use std::fmt;

use crate::codable::CodableElement;
use crate::value::{AnyValue, PathValue};

/// One entry of a navigation path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum NavigationId {
    /// A resolved value with known identity.
    Eager(AnyValue),
    /// A concrete value awaiting a matching destination.
    Lazy(AnyValue),
    /// An encoded value awaiting a destination that can decode its tag.
    Codable(CodableElement),
}

impl NavigationId {
    /// Build an eager identifier from a typed value.
    pub fn eager<T: PathValue>(value: T) -> Self {
        Self::Eager(AnyValue::new(value))
    }

    /// Whether this identifier is resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Eager(_))
    }

    /// The type tag of the element, whatever its state.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Eager(value) | Self::Lazy(value) => value.type_name(),
            Self::Codable(element) => element.tag(),
        }
    }

    /// The concrete type, when it is known without decoding.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Eager(value) | Self::Lazy(value) => Some(value.type_id()),
            Self::Codable(_) => None,
        }
    }

    /// The in-memory value, when there is one.
    #[must_use]
    pub fn value(&self) -> Option<&AnyValue> {
        match self {
            Self::Eager(value) | Self::Lazy(value) => Some(value),
            Self::Codable(_) => None,
        }
    }

    /// Borrow the in-memory value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: PathValue>(&self) -> Option<&T> {
        self.value().and_then(AnyValue::downcast_ref::<T>)
    }
}

impl fmt::Debug for NavigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(value) => f.debug_tuple("Eager").field(value).finish(),
            Self::Lazy(value) => f.debug_tuple("Lazy").field(value).finish(),
            Self::Codable(element) => f.debug_tuple("Codable").field(element).finish(),
        }
    }
}
