//! Error types for Keyform core.
//!
//! Each layer has its own error enum so callers can match on exactly the
//! failures that layer produces. [`CoreError`] wraps all of them for the
//! compiler, index maintenance and registry entry points.

use keyform_attr::AttrError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while parsing a pattern string.
///
/// Offsets are byte offsets into the raw pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The pattern string was empty.
    #[error("pattern is empty")]
    EmptyPattern,

    /// A `{}` pair enclosed nothing.
    #[error("empty field reference at offset {offset}")]
    EmptyFieldReference {
        /// Offset of the opening brace.
        offset: usize,
    },

    /// A field path had an empty dot-separated component.
    #[error("invalid field path {path:?} at offset {offset}")]
    InvalidFieldPath {
        /// The offending path.
        path: String,
        /// Offset of the path's first byte.
        offset: usize,
    },

    /// A `::` produced an empty modifier token.
    #[error("empty modifier at offset {offset}")]
    EmptyModifier {
        /// Offset where the empty token starts.
        offset: usize,
    },

    /// A `{` was never closed.
    #[error("unclosed field reference starting at offset {offset}")]
    UnclosedFieldReference {
        /// Offset of the opening brace.
        offset: usize,
    },

    /// A `}` appeared outside any field reference.
    #[error("unexpected '}}' at offset {offset}")]
    UnexpectedClosingBrace {
        /// Offset of the stray brace.
        offset: usize,
    },

    /// A `{` appeared inside an open field reference.
    #[error("nested '{{' at offset {offset}")]
    NestedFieldReference {
        /// Offset of the nested brace.
        offset: usize,
    },
}

/// Errors produced while converting a field reference against its type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// A floating point field has no width/precision format.
    #[error("float field {field:?} needs an explicit format such as %020.2f")]
    MissingFloatFormat {
        /// Field path.
        field: String,
    },

    /// A temporal field has no format modifier.
    #[error("temporal field {field:?} needs a format modifier such as unix or rfc3339fixed")]
    MissingTemporalFormat {
        /// Field path.
        field: String,
    },

    /// The width spec token could not be parsed.
    #[error("invalid width spec {spec:?} on field {field:?}")]
    InvalidWidthSpec {
        /// Field path.
        field: String,
        /// The raw width spec.
        spec: String,
    },

    /// The width spec verb does not fit the field's type.
    #[error("width spec {spec:?} cannot format {semantic_type} field {field:?}")]
    IncompatibleWidthSpec {
        /// Field path.
        field: String,
        /// The raw width spec.
        spec: String,
        /// Name of the field's semantic type.
        semantic_type: String,
    },

    /// A custom temporal layout is not a valid format description.
    #[error("invalid temporal layout {layout:?} on field {field:?}: {message}")]
    InvalidTemporalLayout {
        /// Field path.
        field: String,
        /// The layout token.
        layout: String,
        /// Parser message.
        message: String,
    },

    /// A temporal field names a pre-transform other than `utc`.
    #[error("unknown pre-transform {modifier:?} on temporal field {field:?}")]
    UnknownPreTransform {
        /// Field path.
        field: String,
        /// The offending modifier.
        modifier: String,
    },
}

impl ConversionError {
    /// Creates a missing float format error.
    pub fn missing_float_format(field: impl Into<String>) -> Self {
        Self::MissingFloatFormat {
            field: field.into(),
        }
    }

    /// Creates a missing temporal format error.
    pub fn missing_temporal_format(field: impl Into<String>) -> Self {
        Self::MissingTemporalFormat {
            field: field.into(),
        }
    }
}

/// Errors produced while evaluating a conversion expression on a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// No value was bound for the expression's source.
    #[error("no value bound for {value_source}")]
    UnboundSource {
        /// Display form of the unbound source.
        value_source: String,
    },

    /// The value has the wrong type for the expression.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        actual: &'static str,
    },

    /// NaN and infinities have no key encoding.
    #[error("non-finite float cannot be encoded")]
    NonFiniteFloat,

    /// A computed value does not fit its encoding.
    #[error("value out of range: {message}")]
    OutOfRange {
        /// Description of the overflow.
        message: String,
    },

    /// The temporal formatter rejected the value.
    #[error("temporal formatting failed: {message}")]
    Temporal {
        /// Formatter message.
        message: String,
    },
}

impl EvalError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    /// Creates an out of range error.
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::OutOfRange {
            message: message.into(),
        }
    }
}

/// Errors produced while extracting a key from a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A path component was absent, null, or not a nested map.
    #[error("field not found: {path}")]
    FieldNotFound {
        /// Dotted path that failed to resolve.
        path: String,
    },

    /// A binary key was derived from a non-binary value.
    #[error("field {path} holds {actual}, which cannot form a binary key")]
    IncompatibleBinaryValue {
        /// Dotted path of the value.
        path: String,
        /// Stored type tag.
        actual: &'static str,
    },

    /// A number key was derived from a non-numeric value.
    #[error("{value:?} cannot form a number key")]
    IncompatibleNumberValue {
        /// The derived text.
        value: String,
    },

    /// The stored value has no string form.
    #[error("field {path} holds {actual}, which cannot be stringified")]
    UnstringifiableValue {
        /// Dotted path of the value.
        path: String,
        /// Stored type tag.
        actual: &'static str,
    },
}

impl ExtractError {
    /// Creates a field not found error.
    pub fn field_not_found(path: impl Into<String>) -> Self {
        Self::FieldNotFound { path: path.into() }
    }

    /// Returns true for missing-field failures, which secondary indexes treat
    /// as non-participation.
    #[must_use]
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Self::FieldNotFound { .. })
    }
}

/// Errors that can occur in Keyform core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Pattern parse error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Conversion error.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Evaluation error.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// Extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Attribute value error.
    #[error("attribute error: {0}")]
    Attr(#[from] AttrError),

    /// A pattern referenced a field the schema provider does not know.
    #[error("unknown field {field:?} on entity {entity}")]
    UnknownField {
        /// Entity label.
        entity: String,
        /// Field path.
        field: String,
    },

    /// Two indexes of one entity share a name.
    #[error("duplicate index {index:?} on entity {entity}")]
    DuplicateIndex {
        /// Entity label.
        entity: String,
        /// Index name.
        index: String,
    },

    /// Two keys of one entity write the same attribute with different
    /// patterns or kinds.
    #[error("key attribute {attribute:?} on entity {entity} is defined by {first:?} and {second:?}")]
    DuplicateKeyAttribute {
        /// Entity label.
        entity: String,
        /// Key attribute name.
        attribute: String,
        /// Pattern of the first key writing the attribute.
        first: String,
        /// Pattern of the conflicting key.
        second: String,
    },

    /// An entity label was registered twice.
    #[error("entity {entity} is already registered")]
    DuplicateEntity {
        /// Entity label.
        entity: String,
    },

    /// No entity is registered under the label.
    #[error("entity not found: {entity}")]
    EntityNotFound {
        /// Entity label.
        entity: String,
    },

    /// The registry no longer accepts registrations.
    #[error("registry is sealed")]
    RegistrySealed,

    /// A record has no derivable primary key.
    #[error("primary key of {entity} cannot be derived: {error}")]
    PrimaryKey {
        /// Entity label.
        entity: String,
        /// Underlying extraction failure.
        #[source]
        error: ExtractError,
    },
}

impl CoreError {
    /// Creates an unknown field error.
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Creates a duplicate index error.
    pub fn duplicate_index(entity: impl Into<String>, index: impl Into<String>) -> Self {
        Self::DuplicateIndex {
            entity: entity.into(),
            index: index.into(),
        }
    }

    /// Creates a duplicate key attribute error.
    pub fn duplicate_key_attribute(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateKeyAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates a duplicate entity error.
    pub fn duplicate_entity(entity: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            entity: entity.into(),
        }
    }

    /// Creates an entity not found error.
    pub fn entity_not_found(entity: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
        }
    }
}
