#![forbid(unsafe_code)]

//! Destination factories keyed by element type.
//!
//! A [`DestinationRegistry`] turns path values into screens. Plain
//! registrations are keyed by [`TypeId`]; codable registrations also install
//! a decoder keyed by the type tag, so elements restored from a
//! [`CodableRepresentation`](navkit_core::CodableRepresentation) can be
//! decoded back into typed values.
//!
//! # Invariants
//!
//! 1. Registering a type again replaces its factory (last write wins).
//! 2. [`resolve`](DestinationRegistry::resolve) never creates a screen; it
//!    only turns an identifier into the value an eager identifier carries.
//! 3. A lazy or codable identifier resolves only if a factory exists for
//!    its type.
//!
//! # Failure Modes
//!
//! | Identifier | Condition | Result |
//! |------------|-----------|--------|
//! | `Lazy` | type not registered | `UnregisteredDestination` |
//! | `Codable` | tag not registered | `UnregisteredDestination` |
//! | `Codable` | registered without a decoder | `DecodeFailed` |
//! | `Codable` | payload does not parse as the type | `DecodeFailed` |

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use navkit_core::{AnyValue, CodableValue, Issue, NavigationId, PathValue, type_tag};

type Factory<S> = Rc<dyn Fn(&AnyValue) -> Option<S>>;
type Decoder = Rc<dyn Fn(&str) -> Result<AnyValue, serde_json::Error>>;

/// Maps element types to screen factories.
pub struct DestinationRegistry<S> {
    factories: AHashMap<TypeId, Factory<S>>,
    tags: AHashMap<&'static str, TypeId>,
    decoders: AHashMap<&'static str, Decoder>,
}

impl<S> Default for DestinationRegistry<S> {
    fn default() -> Self {
        Self {
            factories: AHashMap::new(),
            tags: AHashMap::new(),
            decoders: AHashMap::new(),
        }
    }
}

impl<S: 'static> DestinationRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the screen factory for values of type `T`.
    pub fn register<T: PathValue>(&mut self, factory: impl Fn(T) -> S + 'static) {
        let factory: Factory<S> =
            Rc::new(move |value: &AnyValue| value.downcast_ref::<T>().cloned().map(&factory));
        let tag = type_tag::<T>();
        if self.factories.insert(TypeId::of::<T>(), factory).is_some() {
            tracing::debug!(type_name = tag, "replaced navigation destination");
        }
        self.tags.insert(tag, TypeId::of::<T>());
    }

    /// Register the screen factory for `T` and allow decoding persisted
    /// elements tagged with `T`'s type tag.
    pub fn register_codable<T: CodableValue>(&mut self, factory: impl Fn(T) -> S + 'static) {
        self.register(factory);
        let decoder: Decoder =
            Rc::new(|payload: &str| serde_json::from_str::<T>(payload).map(AnyValue::codable));
        self.decoders.insert(type_tag::<T>(), decoder);
    }

    /// Whether a factory exists for the type with `type_id`.
    #[must_use]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.factories.contains_key(&type_id)
    }

    /// Whether a factory exists for the type tagged `tag`.
    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Whether a registration applies to `id`.
    #[must_use]
    pub fn matches(&self, id: &NavigationId) -> bool {
        match id {
            NavigationId::Eager(value) | NavigationId::Lazy(value) => {
                self.contains_type(value.type_id())
            }
            NavigationId::Codable(element) => self.contains_tag(element.tag()),
        }
    }

    /// Turn `id`, found at `index` in the path, into the value of its
    /// eager form.
    pub fn resolve(&self, id: &NavigationId, index: usize) -> Result<AnyValue, Issue> {
        match id {
            NavigationId::Eager(value) => Ok(value.clone()),
            NavigationId::Lazy(value) => {
                if self.contains_type(value.type_id()) {
                    Ok(value.clone())
                } else {
                    Err(Issue::UnregisteredDestination {
                        type_name: value.type_name().to_owned(),
                    })
                }
            }
            NavigationId::Codable(element) => {
                if !self.contains_tag(element.tag()) {
                    return Err(Issue::UnregisteredDestination {
                        type_name: element.tag().to_owned(),
                    });
                }
                let decoder = self.decoders.get(element.tag()).ok_or_else(|| {
                    Issue::DecodeFailed {
                        index,
                        type_name: element.tag().to_owned(),
                        reason: "destination is not registered as codable".to_owned(),
                    }
                })?;
                decoder(element.payload()).map_err(|err| Issue::DecodeFailed {
                    index,
                    type_name: element.tag().to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Build a screen for a resolved value.
    ///
    /// `None` if no factory is registered for the value's type.
    #[must_use]
    pub fn make_screen(&self, value: &AnyValue) -> Option<S> {
        let factory = self.factories.get(&value.type_id())?;
        factory(value)
    }
}

impl<S> fmt::Debug for DestinationRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags.keys().copied().collect();
        tags.sort_unstable();
        f.debug_struct("DestinationRegistry")
            .field("types", &tags)
            .field("codable", &self.decoders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navkit_core::CodableElement;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct Article {
        slug: String,
    }

    fn registry() -> DestinationRegistry<String> {
        let mut r = DestinationRegistry::new();
        r.register(|n: i32| format!("int {n}"));
        r.register_codable(|a: Article| format!("article {}", a.slug));
        r
    }

    #[test]
    fn eager_resolves_without_registration() {
        let r = DestinationRegistry::<String>::new();
        let id = NavigationId::eager("blob".to_string());
        let value = r.resolve(&id, 0).expect("eager");
        assert!(r.make_screen(&value).is_none());
    }

    #[test]
    fn lazy_requires_registration() {
        let r = registry();
        let ok = NavigationId::Lazy(AnyValue::new(5_i32));
        let value = r.resolve(&ok, 0).expect("registered");
        assert_eq!(r.make_screen(&value).as_deref(), Some("int 5"));

        let missing = NavigationId::Lazy(AnyValue::new(5_u64));
        assert_eq!(
            r.resolve(&missing, 0),
            Err(Issue::UnregisteredDestination {
                type_name: "u64".into()
            })
        );
    }

    #[test]
    fn codable_decodes_registered_tag() {
        let r = registry();
        let id = NavigationId::Codable(CodableElement::new(
            type_tag::<Article>(),
            r#"{"slug":"intro"}"#,
        ));
        assert!(r.matches(&id));
        let value = r.resolve(&id, 2).expect("decodes");
        assert!(value.is_encodable());
        assert_eq!(r.make_screen(&value).as_deref(), Some("article intro"));
    }

    #[test]
    fn codable_unknown_tag_is_unregistered() {
        let r = registry();
        let id = NavigationId::Codable(CodableElement::new("nope::Missing", "{}"));
        assert!(!r.matches(&id));
        assert!(matches!(
            r.resolve(&id, 0),
            Err(Issue::UnregisteredDestination { type_name }) if type_name == "nope::Missing"
        ));
    }

    #[test]
    fn codable_bad_payload_is_decode_failure() {
        let r = registry();
        let id = NavigationId::Codable(CodableElement::new(type_tag::<Article>(), "42"));
        assert!(matches!(
            r.resolve(&id, 3),
            Err(Issue::DecodeFailed { index: 3, .. })
        ));
    }

    #[test]
    fn codable_tag_without_decoder_is_decode_failure() {
        let r = registry();
        let id = NavigationId::Codable(CodableElement::new("i32", "1"));
        assert!(matches!(
            r.resolve(&id, 1),
            Err(Issue::DecodeFailed { index: 1, type_name, .. }) if type_name == "i32"
        ));
    }

    #[test]
    fn last_registration_wins() {
        let mut r = registry();
        r.register(|n: i32| format!("number {n}"));
        assert_eq!(r.len(), 2);
        assert_eq!(
            r.make_screen(&AnyValue::new(1_i32)).as_deref(),
            Some("number 1")
        );
    }

    #[test]
    fn debug_lists_types() {
        let dbg = format!("{:?}", registry());
        assert!(dbg.contains("i32"));
    }
}
