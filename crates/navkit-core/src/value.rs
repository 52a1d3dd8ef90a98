#![forbid(unsafe_code)]

//! Type-erased, hashable path values.
//!
//! [`AnyValue`] is the currency of a type-erased navigation path: an
//! immutable, cheaply clonable handle to a value of some concrete type `T`
//! that is `Eq + Hash + Debug + Clone`. The handle remembers the value's
//! [`TypeId`] and type name so the destination registry can dispatch on it,
//! and optionally an encoder so the path can be persisted.
//!
//! # Invariants
//!
//! 1. Two `AnyValue`s are equal iff they hold the same concrete type and
//!    that type's `PartialEq` says the values are equal.
//! 2. Equal values hash equally (the type id is mixed into the hash).
//! 3. Encodability is fixed at construction: [`AnyValue::new`] never
//!    encodes, [`AnyValue::codable`] always does.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Downcast to wrong type | `downcast_ref::<U>()` with `U != T` | Returns `None` |
//! | Encode a plain value | Built with [`AnyValue::new`] | `encode()` returns `None` |
//! | Serializer error | `T: Serialize` impl fails | `encode()` returns `Some(Err(..))` |

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Values that can live in a navigation path.
///
/// Blanket-implemented for every `'static` type that is `Eq + Hash + Debug + Clone`.
pub trait PathValue: Any + Eq + Hash + fmt::Debug + Clone {}

impl<T: Any + Eq + Hash + fmt::Debug + Clone> PathValue for T {}

/// Path values that can also be written to and read from a codable path.
pub trait CodableValue: PathValue + Serialize + DeserializeOwned {}

impl<T: PathValue + Serialize + DeserializeOwned> CodableValue for T {}

/// The stable tag written in front of an encoded value.
///
/// This is the fully qualified Rust type name. It is what a codable
/// destination registers under, so encoder and decoder must agree on it.
#[must_use]
pub fn type_tag<T: ?Sized + 'static>() -> &'static str {
    std::any::type_name::<T>()
}

trait ErasedValue {
    fn as_any(&self) -> &dyn Any;
    fn value_type_id(&self) -> TypeId;
    fn value_type_name(&self) -> &'static str;
    fn eq_erased(&self, other: &dyn ErasedValue) -> bool;
    fn hash_erased(&self, state: &mut dyn Hasher);
    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn encode(&self) -> Option<Result<String, serde_json::Error>>;
}

struct Plain<T>(T);

struct Encodable<T>(T);

macro_rules! erased_common {
    () => {
        fn as_any(&self) -> &dyn Any {
            &self.0
        }

        fn value_type_id(&self) -> TypeId {
            TypeId::of::<T>()
        }

        fn value_type_name(&self) -> &'static str {
            type_tag::<T>()
        }

        fn eq_erased(&self, other: &dyn ErasedValue) -> bool {
            other
                .as_any()
                .downcast_ref::<T>()
                .is_some_and(|other| *other == self.0)
        }

        fn hash_erased(&self, mut state: &mut dyn Hasher) {
            TypeId::of::<T>().hash(&mut state);
            self.0.hash(&mut state);
        }

        fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Debug::fmt(&self.0, f)
        }
    };
}

impl<T: PathValue> ErasedValue for Plain<T> {
    erased_common!();

    fn encode(&self) -> Option<Result<String, serde_json::Error>> {
        None
    }
}

impl<T: PathValue + Serialize> ErasedValue for Encodable<T> {
    erased_common!();

    fn encode(&self) -> Option<Result<String, serde_json::Error>> {
        Some(serde_json::to_string(&self.0))
    }
}

/// A type-erased path value.
#[derive(Clone)]
pub struct AnyValue {
    inner: Rc<dyn ErasedValue>,
}

impl AnyValue {
    /// Erase a value that will not take part in codable paths.
    pub fn new<T: PathValue>(value: T) -> Self {
        Self {
            inner: Rc::new(Plain(value)),
        }
    }

    /// Erase a value that can be encoded into a codable path.
    pub fn codable<T: PathValue + Serialize>(value: T) -> Self {
        Self {
            inner: Rc::new(Encodable(value)),
        }
    }

    /// The [`TypeId`] of the concrete value.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.inner.value_type_id()
    }

    /// The type name of the concrete value (same string as [`type_tag`]).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.value_type_name()
    }

    /// Whether the concrete value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.value_type_id() == TypeId::of::<T>()
    }

    /// Borrow the concrete value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Whether [`encode`](Self::encode) can produce a payload.
    #[must_use]
    pub fn is_encodable(&self) -> bool {
        self.inner.encode().is_some()
    }

    /// Encode the value as a JSON payload.
    ///
    /// Returns `None` for values built with [`AnyValue::new`].
    pub fn encode(&self) -> Option<Result<String, serde_json::Error>> {
        self.inner.encode()
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_erased(other.inner.as_ref())
    }
}

impl Eq for AnyValue {}

impl Hash for AnyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash_erased(state);
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_erased(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &AnyValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    struct User {
        id: u32,
    }

    #[test]
    fn equal_values_are_equal() {
        assert_eq!(AnyValue::new(1_i32), AnyValue::new(1_i32));
        assert_ne!(AnyValue::new(1_i32), AnyValue::new(2_i32));
    }

    #[test]
    fn different_types_never_equal() {
        assert_ne!(AnyValue::new(1_i32), AnyValue::new(1_i64));
        assert_ne!(AnyValue::new("1".to_string()), AnyValue::new(1_i32));
    }

    #[test]
    fn plain_and_codable_of_same_value_are_equal() {
        let plain = AnyValue::new(User { id: 7 });
        let codable = AnyValue::codable(User { id: 7 });
        assert_eq!(plain, codable);
        assert_eq!(hash_of(&plain), hash_of(&codable));
    }

    #[test]
    fn hash_mixes_type() {
        assert_eq!(hash_of(&AnyValue::new(5_u8)), hash_of(&AnyValue::new(5_u8)));
        assert_ne!(hash_of(&AnyValue::new(5_u8)), hash_of(&AnyValue::new(5_u16)));
    }

    #[test]
    fn downcast() {
        let value = AnyValue::new(User { id: 3 });
        assert!(value.is::<User>());
        assert_eq!(value.downcast_ref::<User>(), Some(&User { id: 3 }));
        assert!(value.downcast_ref::<i32>().is_none());
        assert_eq!(value.type_name(), type_tag::<User>());
    }

    #[test]
    fn encoding_only_for_codable() {
        assert!(AnyValue::new(42_i32).encode().is_none());
        assert!(!AnyValue::new(42_i32).is_encodable());

        let payload = AnyValue::codable(User { id: 9 })
            .encode()
            .expect("codable value encodes")
            .expect("serializer succeeds");
        assert_eq!(payload, r#"{"id":9}"#);
    }

    #[test]
    fn debug_shows_inner_value() {
        assert_eq!(format!("{:?}", AnyValue::new("blob".to_string())), "\"blob\"");
    }
}
