//! Key patterns.
//!
//! A pattern is a string template such as `ORDER#{tenant}#{createdAt:utc:unixnano:%020d}`.
//! Text outside braces is copied verbatim; each `{...}` names a field plus an
//! optional modifier chain and width spec.
//!
//! # Grammar
//!
//! ```text
//! pattern   := (literal | reference)+
//! reference := '{' path (':' modifier)* (':' '%' printf)? '}'
//! path      := identifier ('.' identifier)*
//! ```
//!
//! There is no escape for literal braces. A stray `}`, a nested `{` or an
//! unterminated `{` is rejected.

mod field_ref;
mod parser;

pub use field_ref::{FieldRef, UTC_MODIFIER};

use crate::error::ParseError;
use keyform_attr::AttributeKind;
use std::fmt;
use std::str::FromStr;

/// One piece of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Verbatim text.
    Literal {
        /// The text.
        value: String,
        /// Byte offset in the raw pattern.
        offset: usize,
    },
    /// A field reference.
    Field(FieldRef),
}

impl Segment {
    /// Returns the literal text, if this is a literal segment.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Segment::Literal { value, .. } => Some(value),
            Segment::Field(_) => None,
        }
    }

    /// Returns the field reference, if this is one.
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Segment::Field(field) => Some(field),
            Segment::Literal { .. } => None,
        }
    }

    /// Returns the byte offset where this segment starts in the raw pattern.
    ///
    /// For a field reference this is the first byte after the opening brace.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Segment::Literal { offset, .. } => *offset,
            Segment::Field(field) => field.offset(),
        }
    }
}

/// A parsed key pattern.
///
/// Immutable once built; `segments` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    raw: String,
    attribute_kind: AttributeKind,
    segments: Vec<Segment>,
}

impl PatternSpec {
    /// Parses a pattern targeting a string attribute.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        Self::parse_with_kind(raw, AttributeKind::String)
    }

    /// Parses a pattern targeting an attribute of the given kind.
    pub fn parse_with_kind(raw: &str, attribute_kind: AttributeKind) -> Result<Self, ParseError> {
        let segments = parser::scan(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            attribute_kind,
            segments,
        })
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the encoded attribute kind this pattern produces.
    #[must_use]
    pub fn attribute_kind(&self) -> AttributeKind {
        self.attribute_kind
    }

    /// Returns the ordered segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over the field references in pattern order.
    pub fn field_refs(&self) -> impl Iterator<Item = &FieldRef> {
        self.segments.iter().filter_map(Segment::as_field)
    }

    /// Returns true if the pattern is a single literal.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::Literal { .. }])
    }

    /// Returns the literal value of a constant pattern.
    #[must_use]
    pub fn constant_value(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Literal { value, .. }] => Some(value),
            _ => None,
        }
    }

    /// Returns the literal text before the first field reference.
    ///
    /// Empty when the pattern starts with a reference. For a constant pattern
    /// this is the whole value. Range queries use it as a begins-with prefix.
    #[must_use]
    pub fn leading_literal_prefix(&self) -> &str {
        self.segments
            .first()
            .and_then(Segment::as_literal)
            .unwrap_or("")
    }
}

/// Parses a pattern targeting a string attribute.
pub fn parse(raw: &str) -> Result<PatternSpec, ParseError> {
    PatternSpec::parse(raw)
}

impl FromStr for PatternSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
