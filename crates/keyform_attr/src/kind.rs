//! Scalar attribute kinds usable as key attributes.

use crate::error::{AttrError, AttrResult};
use std::fmt;
use std::str::FromStr;

/// The encoded type of a key attribute.
///
/// Key attributes are always scalar: a string, a number (carried as its
/// decimal string form) or a byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeKind {
    /// UTF-8 string (`S`).
    #[default]
    String,
    /// Decimal number (`N`).
    Number,
    /// Byte string (`B`).
    Binary,
}

impl AttributeKind {
    /// Returns the one-letter wire tag for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            AttributeKind::String => "S",
            AttributeKind::Number => "N",
            AttributeKind::Binary => "B",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AttributeKind {
    type Err = AttrError;

    fn from_str(s: &str) -> AttrResult<Self> {
        match s {
            "S" | "s" | "string" => Ok(AttributeKind::String),
            "N" | "n" | "number" => Ok(AttributeKind::Number),
            "B" | "b" | "binary" => Ok(AttributeKind::Binary),
            other => Err(AttrError::unknown_kind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_and_names() {
        assert_eq!("S".parse::<AttributeKind>().unwrap(), AttributeKind::String);
        assert_eq!("number".parse::<AttributeKind>().unwrap(), AttributeKind::Number);
        assert_eq!("b".parse::<AttributeKind>().unwrap(), AttributeKind::Binary);
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = "BOOL".parse::<AttributeKind>().unwrap_err();
        assert_eq!(err, AttrError::unknown_kind("BOOL"));
    }

    #[test]
    fn default_is_string() {
        assert_eq!(AttributeKind::default(), AttributeKind::String);
        assert_eq!(AttributeKind::Binary.to_string(), "B");
    }
}
