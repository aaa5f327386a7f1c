//! Field references: the `{path:modifier:%width}` part of a pattern.

use super::PatternSpec;
use crate::error::ParseError;
use std::fmt;

/// The modifier that normalizes a timestamp to UTC before formatting.
pub const UTC_MODIFIER: &str = "utc";

/// One `{...}` reference inside a pattern.
///
/// The modifier chain is ordered. Its last entry is the primary encoding
/// format; earlier entries are pre-transforms applied before it. A trailing
/// token starting with `%` is split off as the width spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    path: String,
    modifiers: Vec<String>,
    width_spec: Option<String>,
    offset: usize,
}

impl FieldRef {
    /// Parses the body of a field reference (the text between the braces).
    ///
    /// Only the *last* colon-separated token may be a width spec. A `%` token
    /// anywhere else stays in the modifier chain.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        Self::parse_at(body, 0)
    }

    /// Parses a field reference body that starts at `offset` in its pattern.
    pub(crate) fn parse_at(body: &str, offset: usize) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        let mut start = 0;
        for (i, c) in body.char_indices() {
            if c == ':' {
                tokens.push((&body[start..i], offset + start));
                start = i + 1;
            }
        }
        tokens.push((&body[start..], offset + start));

        let (path, path_offset) = tokens[0];
        if path.split('.').any(str::is_empty) {
            return Err(ParseError::InvalidFieldPath {
                path: path.to_string(),
                offset: path_offset,
            });
        }

        let mut rest = &tokens[1..];
        if let Some((_, token_offset)) = rest.iter().find(|(t, _)| t.is_empty()) {
            return Err(ParseError::EmptyModifier {
                offset: *token_offset,
            });
        }

        let mut width_spec = None;
        if let Some(((last, _), init)) = rest.split_last() {
            if last.starts_with('%') {
                width_spec = Some((*last).to_string());
                rest = init;
            }
        }

        Ok(Self {
            path: path.to_string(),
            modifiers: rest.iter().map(|(t, _)| (*t).to_string()).collect(),
            width_spec,
            offset,
        })
    }

    /// Returns the dotted field path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the path split into its components.
    #[must_use]
    pub fn path_components(&self) -> Vec<&str> {
        self.path.split('.').collect()
    }

    /// Returns the ordered modifier chain.
    #[must_use]
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// Returns the printf-like width spec, if any.
    #[must_use]
    pub fn width_spec(&self) -> Option<&str> {
        self.width_spec.as_deref()
    }

    /// Returns the byte offset of this reference's body in its pattern.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the last path component, used as a human-readable identifier.
    #[must_use]
    pub fn parameter_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Returns the primary encoding format: the last modifier.
    #[must_use]
    pub fn primary_format(&self) -> Option<&str> {
        self.modifiers.last().map(String::as_str)
    }

    /// Returns the modifiers applied before the primary format.
    #[must_use]
    pub fn pre_transforms(&self) -> &[String] {
        match self.modifiers.split_last() {
            Some((_, init)) => init,
            None => &[],
        }
    }

    /// Returns true if the chain normalizes to UTC before formatting.
    #[must_use]
    pub fn is_utc_normalized(&self) -> bool {
        self.pre_transforms().iter().any(|m| m == UTC_MODIFIER)
    }

    /// Returns the literal text preceding the first field reference of the
    /// owning spec.
    #[must_use]
    pub fn leading_literal_prefix<'a>(&self, spec: &'a PatternSpec) -> &'a str {
        spec.leading_literal_prefix()
    }

    /// Returns true if the owning spec is a single literal.
    #[must_use]
    pub fn is_constant(&self, spec: &PatternSpec) -> bool {
        spec.is_constant()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.path)?;
        for modifier in &self.modifiers {
            write!(f, ":{modifier}")?;
        }
        if let Some(width) = &self.width_spec {
            write!(f, ":{width}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path() {
        let field = FieldRef::parse("id").unwrap();
        assert_eq!(field.path(), "id");
        assert!(field.modifiers().is_empty());
        assert_eq!(field.width_spec(), None);
        assert_eq!(field.primary_format(), None);
    }

    #[test]
    fn modifiers_and_width_spec() {
        let field = FieldRef::parse("createdAt:utc:unixnano:%020d").unwrap();
        assert_eq!(field.modifiers(), ["utc", "unixnano"]);
        assert_eq!(field.width_spec(), Some("%020d"));
        assert_eq!(field.primary_format(), Some("unixnano"));
        assert_eq!(field.pre_transforms(), ["utc"]);
        assert!(field.is_utc_normalized());
    }

    #[test]
    fn width_spec_only_when_last() {
        let field = FieldRef::parse("x:%05d:unix").unwrap();
        assert_eq!(field.modifiers(), ["%05d", "unix"]);
        assert_eq!(field.width_spec(), None);
    }

    #[test]
    fn nested_path_parameter_name() {
        let field = FieldRef::parse("user.profile.id").unwrap();
        assert_eq!(field.path_components(), ["user", "profile", "id"]);
        assert_eq!(field.parameter_name(), "id");
    }

    #[test]
    fn utc_as_primary_is_not_a_pre_transform() {
        let field = FieldRef::parse("ts:utc").unwrap();
        assert_eq!(field.primary_format(), Some("utc"));
        assert!(!field.is_utc_normalized());
    }

    #[test]
    fn empty_components_rejected() {
        assert_eq!(
            FieldRef::parse("a..b").unwrap_err(),
            ParseError::InvalidFieldPath {
                path: "a..b".to_string(),
                offset: 0
            }
        );
        assert!(matches!(
            FieldRef::parse(".a"),
            Err(ParseError::InvalidFieldPath { .. })
        ));
        assert!(matches!(
            FieldRef::parse(":unix"),
            Err(ParseError::InvalidFieldPath { .. })
        ));
    }

    #[test]
    fn empty_modifier_rejected_with_offset() {
        assert_eq!(
            FieldRef::parse("ts::unix").unwrap_err(),
            ParseError::EmptyModifier { offset: 3 }
        );
        assert_eq!(
            FieldRef::parse("ts:unix:").unwrap_err(),
            ParseError::EmptyModifier { offset: 8 }
        );
    }

    #[test]
    fn display_reproduces_source() {
        for body in ["id", "ts:utc:rfc3339fixed", "n:%020d", "a.b:x:%s"] {
            let field = FieldRef::parse(body).unwrap();
            assert_eq!(field.to_string(), format!("{{{body}}}"));
        }
    }
}
