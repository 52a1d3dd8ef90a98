#![forbid(unsafe_code)]

//! Serializable representation of a navigation path.
//!
//! A [`CodableRepresentation`] is written as a flat JSON array of strings
//! alternating type tag and JSON payload, innermost (top of stack) first:
//!
//! ```text
//! path:  [1, "Blob", true]
//! wire:  ["bool","true","alloc::string::String","\"Blob\"","i32","1"]
//! ```
//!
//! Decoding reverses the order, so the first pair on the wire becomes the
//! last path element. Decoded elements are not interpreted here; they stay
//! [`CodableElement`]s until a destination that knows the tag decodes them.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Odd-length list | Truncated or hand-edited data | [`CodableError::UnpairedTag`] |
//! | Non-string entry | Wrong wire shape | [`CodableError::Json`] |
//! | Invalid JSON | Corrupt data | [`CodableError::Json`] |

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::AnyValue;

/// Errors from reading or writing a codable path.
#[derive(Debug)]
pub enum CodableError {
    /// The flat list ended with a tag that has no payload.
    UnpairedTag(String),
    /// The data was not a JSON array of strings.
    Json(serde_json::Error),
}

impl fmt::Display for CodableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnpairedTag(tag) => write!(f, "tag '{tag}' has no payload"),
            Self::Json(err) => write!(f, "invalid codable path: {err}"),
        }
    }
}

impl std::error::Error for CodableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnpairedTag(_) => None,
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// One encoded path element: a type tag plus its JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodableElement {
    tag: String,
    payload: String,
}

impl CodableElement {
    /// Create an element from a tag and an already-encoded payload.
    pub fn new(tag: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            payload: payload.into(),
        }
    }

    /// Encode an erased value.
    ///
    /// Returns `None` if the value is not encodable or its serializer fails.
    #[must_use]
    pub fn encode(value: &AnyValue) -> Option<Self> {
        match value.encode()? {
            Ok(payload) => Some(Self::new(value.type_name(), payload)),
            Err(err) => {
                tracing::debug!(
                    type_name = value.type_name(),
                    error = %err,
                    "path element failed to encode"
                );
                None
            }
        }
    }

    /// The type tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The JSON payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// A serializable snapshot of a navigation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodableRepresentation {
    elements: Vec<CodableElement>,
}

impl CodableRepresentation {
    /// Build from elements in path order (root side first).
    #[must_use]
    pub fn from_elements(elements: Vec<CodableElement>) -> Self {
        Self { elements }
    }

    /// Elements in path order.
    #[must_use]
    pub fn elements(&self) -> &[CodableElement] {
        &self.elements
    }

    /// Consume into elements in path order.
    #[must_use]
    pub fn into_elements(self) -> Vec<CodableElement> {
        self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the representation is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize to the flat JSON wire format.
    pub fn to_json(&self) -> Result<String, CodableError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the flat JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, CodableError> {
        let flat: Vec<String> = serde_json::from_str(json)?;
        Self::from_flat(flat)
    }

    fn from_flat(flat: Vec<String>) -> Result<Self, CodableError> {
        let mut elements = Vec::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let Some(tag) = iter.next() {
            let Some(payload) = iter.next() else {
                return Err(CodableError::UnpairedTag(tag));
            };
            elements.push(CodableElement { tag, payload });
        }
        elements.reverse();
        Ok(Self { elements })
    }
}

impl Serialize for CodableRepresentation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.elements.len() * 2))?;
        for element in self.elements.iter().rev() {
            seq.serialize_element(&element.tag)?;
            seq.serialize_element(&element.payload)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for CodableRepresentation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlatVisitor;

        impl<'de> Visitor<'de> for FlatVisitor {
            type Value = CodableRepresentation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a flat list of alternating type tags and payloads")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut flat = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(entry) = seq.next_element::<String>()? {
                    flat.push(entry);
                }
                CodableRepresentation::from_flat(flat).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(FlatVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_order_is_innermost_first() {
        let repr = CodableRepresentation::from_elements(vec![
            CodableElement::new("i32", "1"),
            CodableElement::new("String", "\"Blob\""),
            CodableElement::new("bool", "true"),
        ]);
        assert_eq!(
            repr.to_json().expect("encodes"),
            r#"["bool","true","String","\"Blob\"","i32","1"]"#
        );
    }

    #[test]
    fn decode_reverses_wire_order() {
        let repr = CodableRepresentation::from_json(r#"["Sb","true","SS","\"Blob\"","Si","1"]"#)
            .expect("valid wire data");
        assert_eq!(
            repr.elements(),
            &[
                CodableElement::new("Si", "1"),
                CodableElement::new("SS", "\"Blob\""),
                CodableElement::new("Sb", "true"),
            ]
        );
    }

    #[test]
    fn wire_round_trip() {
        let repr = CodableRepresentation::from_elements(vec![
            CodableElement::new("a", "{\"x\":1}"),
            CodableElement::new("b", "[]"),
        ]);
        let json = repr.to_json().expect("encodes");
        assert_eq!(CodableRepresentation::from_json(&json).expect("decodes"), repr);
    }

    #[test]
    fn empty_list() {
        let repr = CodableRepresentation::from_json("[]").expect("empty list is valid");
        assert!(repr.is_empty());
        assert_eq!(repr.to_json().expect("encodes"), "[]");
    }

    #[test]
    fn odd_length_is_rejected() {
        let err = CodableRepresentation::from_json(r#"["i32","1","bool"]"#)
            .expect_err("unpaired tag must fail");
        assert!(err.to_string().contains("bool"), "{err}");
    }

    #[test]
    fn non_string_entries_are_rejected() {
        assert!(CodableRepresentation::from_json("[1, 2]").is_err());
        assert!(CodableRepresentation::from_json("{}").is_err());
    }

    #[test]
    fn encode_plain_value_is_none() {
        assert!(CodableElement::encode(&AnyValue::new(3_u8)).is_none());
        let element = CodableElement::encode(&AnyValue::codable(3_u8)).expect("codable");
        assert_eq!(element.tag(), "u8");
        assert_eq!(element.payload(), "3");
    }
}
