//! Semantic field types and the schema provider seam.
//!
//! Keyform does not discover field types itself. A schema provider (generated
//! from host-language type definitions, a config file, or written by hand)
//! answers "what is the type of field `path`?" and the conversion engine
//! dispatches on the answer.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The semantic type of a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// Text.
    Text,
    /// Fixed-width integer.
    Integer {
        /// Whether negative values are possible.
        signed: bool,
        /// Width in bits (8, 16, 32 or 64).
        bits: u8,
    },
    /// Floating point number.
    Float {
        /// Width in bits (32 or 64).
        bits: u8,
    },
    /// Point in time with an offset.
    Temporal,
    /// Any type the engine has no dedicated encoding for.
    Other(String),
}

impl SemanticType {
    /// Returns true for signed and unsigned integers.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, SemanticType::Integer { .. })
    }

    /// Returns true for floating point types.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, SemanticType::Float { .. })
    }

    /// Returns true for date-time types.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, SemanticType::Temporal)
    }
}

impl FromStr for SemanticType {
    type Err = std::convert::Infallible;

    /// Maps a provider's type name onto a semantic type.
    ///
    /// Unrecognized names become [`SemanticType::Other`], which falls back
    /// to a best-effort string encoding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "string" | "text" | "str" | "String" => SemanticType::Text,
            "int" | "i64" | "int64" | "long" => SemanticType::Integer {
                signed: true,
                bits: 64,
            },
            "i32" | "int32" => SemanticType::Integer {
                signed: true,
                bits: 32,
            },
            "i16" | "int16" => SemanticType::Integer {
                signed: true,
                bits: 16,
            },
            "i8" | "int8" => SemanticType::Integer {
                signed: true,
                bits: 8,
            },
            "uint" | "u64" | "uint64" => SemanticType::Integer {
                signed: false,
                bits: 64,
            },
            "u32" | "uint32" => SemanticType::Integer {
                signed: false,
                bits: 32,
            },
            "u16" | "uint16" => SemanticType::Integer {
                signed: false,
                bits: 16,
            },
            "u8" | "uint8" | "byte" => SemanticType::Integer {
                signed: false,
                bits: 8,
            },
            "f64" | "float64" | "float" | "double" => SemanticType::Float { bits: 64 },
            "f32" | "float32" => SemanticType::Float { bits: 32 },
            "timestamp" | "datetime" | "time" | "OffsetDateTime" => SemanticType::Temporal,
            other => SemanticType::Other(other.to_string()),
        };
        Ok(ty)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Text => f.write_str("text"),
            SemanticType::Integer { signed: true, bits } => write!(f, "i{bits}"),
            SemanticType::Integer {
                signed: false,
                bits,
            } => write!(f, "u{bits}"),
            SemanticType::Float { bits } => write!(f, "f{bits}"),
            SemanticType::Temporal => f.write_str("timestamp"),
            SemanticType::Other(name) => f.write_str(name),
        }
    }
}

/// Supplies the semantic type of each field path an entity exposes.
pub trait SchemaProvider: Send + Sync {
    /// Returns the type of the field at `path` (dotted form), if known.
    fn field_type(&self, path: &str) -> Option<SemanticType>;
}

/// In-memory field path to type table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTypeTable {
    fields: HashMap<String, SemanticType>,
}

impl FieldTypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous entry for the path.
    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>, ty: SemanticType) -> Self {
        self.insert(path, ty);
        self
    }

    /// Adds a field, replacing any previous entry for the path.
    pub fn insert(&mut self, path: impl Into<String>, ty: SemanticType) {
        self.fields.insert(path.into(), ty);
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SchemaProvider for FieldTypeTable {
    fn field_type(&self, path: &str) -> Option<SemanticType> {
        self.fields.get(path).cloned()
    }
}

impl<P, T> FromIterator<(P, T)> for FieldTypeTable
where
    P: Into<String>,
    T: Into<SemanticType>,
{
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(p, t)| (p.into(), t.into()))
                .collect(),
        }
    }
}

impl From<&str> for SemanticType {
    fn from(name: &str) -> Self {
        match name.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(SemanticType::from("string"), SemanticType::Text);
        assert_eq!(
            SemanticType::from("uint32"),
            SemanticType::Integer {
                signed: false,
                bits: 32
            }
        );
        assert_eq!(SemanticType::from("f32"), SemanticType::Float { bits: 32 });
        assert_eq!(SemanticType::from("datetime"), SemanticType::Temporal);
        assert_eq!(
            SemanticType::from("Decimal"),
            SemanticType::Other("Decimal".to_string())
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for name in ["text", "i64", "u8", "f64", "timestamp"] {
            assert_eq!(SemanticType::from(name).to_string(), name);
        }
    }

    #[test]
    fn table_lookup() {
        let table: FieldTypeTable = [("id", "string"), ("user.age", "u8")].into_iter().collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.field_type("id"), Some(SemanticType::Text));
        assert!(table.field_type("user.age").unwrap().is_integer());
        assert_eq!(table.field_type("missing"), None);
    }

    #[test]
    fn builder_replaces_entries() {
        let table = FieldTypeTable::new()
            .with_field("ts", SemanticType::Text)
            .with_field("ts", SemanticType::Temporal);
        assert_eq!(table.field_type("ts"), Some(SemanticType::Temporal));
    }
}
