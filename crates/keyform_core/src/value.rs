//! Typed field values fed to conversion expressions.

use std::fmt;
use time::OffsetDateTime;

/// A typed value of one record field.
///
/// This is what a caller holding a typed record (or a typed parameter)
/// hands to a [`ConversionDescriptor`](crate::ConversionDescriptor) to
/// produce an encoded key fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text.
    Text(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Point in time with its offset.
    Timestamp(OffsetDateTime),
    /// Boolean.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Returns a short type name for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Int(_) => "int",
            FieldValue::UInt(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bool(_) => "bool",
            FieldValue::Bytes(_) => "bytes",
        }
    }

    /// Returns the value as a wide integer, if it is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            FieldValue::Int(n) => Some(i128::from(*n)),
            FieldValue::UInt(n) => Some(i128::from(*n)),
            _ => None,
        }
    }
}

/// Best-effort string form, used for types without a dedicated encoding.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::UInt(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Timestamp(t) => write!(f, "{t}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Bytes(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(i64::from(n))
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::UInt(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::UInt(u64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<OffsetDateTime> for FieldValue {
    fn from(t: OffsetDateTime) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen() {
        assert_eq!(FieldValue::Int(-5).as_integer(), Some(-5));
        assert_eq!(
            FieldValue::UInt(u64::MAX).as_integer(),
            Some(i128::from(u64::MAX))
        );
        assert_eq!(FieldValue::Float(1.0).as_integer(), None);
    }

    #[test]
    fn best_effort_display() {
        assert_eq!(FieldValue::from("x").to_string(), "x");
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from(vec![0xde, 0xad]).to_string(), "dead");
        assert_eq!(FieldValue::from(2.5).to_string(), "2.5");
    }
}
