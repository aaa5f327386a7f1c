//! Dynamic attribute value type.

use crate::error::{AttrError, AttrResult};
use crate::kind::AttributeKind;
use crate::number::is_number_string;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A stored item: attribute name to value.
///
/// Ordered so that iteration and serialization are deterministic.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A self-describing stored attribute value.
///
/// The serde representation follows DynamoDB JSON, so
/// `AttributeValue::S("x".into())` serializes as `{"S":"x"}` and byte
/// strings are base64 text: `{"B":"AQI="}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// UTF-8 string.
    #[serde(rename = "S")]
    S(String),
    /// Number carried as its decimal string form.
    #[serde(rename = "N")]
    N(String),
    /// Byte string.
    #[serde(rename = "B", with = "crate::binary")]
    B(Bytes),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Explicit null marker.
    #[serde(rename = "NULL")]
    Null(bool),
    /// Nested map of attributes.
    #[serde(rename = "M")]
    M(AttributeMap),
    /// Heterogeneous list.
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary set.
    #[serde(rename = "BS", with = "crate::binary::set")]
    Bs(Vec<Bytes>),
}

impl AttributeValue {
    /// Creates a number attribute from anything with a decimal `Display`.
    pub fn number(n: impl fmt::Display) -> Self {
        AttributeValue::N(n.to_string())
    }

    /// Creates a number attribute after checking that `s` is a decimal number.
    pub fn try_number(s: impl Into<String>) -> AttrResult<Self> {
        let s = s.into();
        if is_number_string(&s) {
            Ok(AttributeValue::N(s))
        } else {
            Err(AttrError::invalid_number(s))
        }
    }

    /// Creates a nested map attribute from name/value pairs.
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttributeValue)>,
    {
        AttributeValue::M(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the scalar key kind of this value, if it has one.
    #[must_use]
    pub fn kind(&self) -> Option<AttributeKind> {
        match self {
            AttributeValue::S(_) => Some(AttributeKind::String),
            AttributeValue::N(_) => Some(AttributeKind::Number),
            AttributeValue::B(_) => Some(AttributeKind::Binary),
            _ => None,
        }
    }

    /// Returns the DynamoDB type tag of this value (`S`, `N`, `M`, ...).
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::M(_) => "M",
            AttributeValue::L(_) => "L",
            AttributeValue::Ss(_) => "SS",
            AttributeValue::Ns(_) => "NS",
            AttributeValue::Bs(_) => "BS",
        }
    }

    /// Check if this value is the null marker.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null(_))
    }

    /// Get this value as a string, if it is one.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a number string, if it is one.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a byte string.
    #[must_use]
    pub fn as_b(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::B(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as a nested map, if it is one.
    #[must_use]
    pub fn as_m(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::M(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key in this map value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.as_m().and_then(|m| m.get(key))
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::number(n)
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        AttributeValue::number(n)
    }
}

impl From<u32> for AttributeValue {
    fn from(n: u32) -> Self {
        AttributeValue::number(n)
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(b: Vec<u8>) -> Self {
        AttributeValue::B(Bytes::from(b))
    }
}

impl From<&[u8]> for AttributeValue {
    fn from(b: &[u8]) -> Self {
        AttributeValue::B(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for AttributeValue {
    fn from(b: Bytes) -> Self {
        AttributeValue::B(b)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(m: AttributeMap) -> Self {
        AttributeValue::M(m)
    }
}
