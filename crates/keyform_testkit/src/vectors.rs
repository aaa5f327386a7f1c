//! Encoding and ordering vectors.
//!
//! These vectors pin the exact text each encoding produces so that other
//! implementations of the pattern language can be checked against them.

use keyform_core::{FieldValue, SemanticType};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A typed input written as text.
///
/// The text is interpreted according to `field_type`: integers and floats
/// in decimal, timestamps in RFC 3339, everything else as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorInput {
    /// Semantic type name, e.g. `u64` or `timestamp`.
    pub field_type: String,
    /// The value.
    pub value: String,
}

impl VectorInput {
    fn new(field_type: &str, value: &str) -> Self {
        Self {
            field_type: field_type.into(),
            value: value.into(),
        }
    }

    /// Returns the semantic type.
    pub fn semantic_type(&self) -> SemanticType {
        SemanticType::from(self.field_type.as_str())
    }

    /// Returns the typed value.
    ///
    /// # Panics
    ///
    /// Panics if the text does not parse as the declared type.
    pub fn field_value(&self) -> FieldValue {
        match self.semantic_type() {
            SemanticType::Integer { signed: true, .. } => {
                FieldValue::Int(self.value.parse().expect("signed integer vector"))
            }
            SemanticType::Integer { signed: false, .. } => {
                FieldValue::UInt(self.value.parse().expect("unsigned integer vector"))
            }
            SemanticType::Float { .. } => {
                FieldValue::Float(self.value.parse().expect("float vector"))
            }
            SemanticType::Temporal => FieldValue::Timestamp(
                OffsetDateTime::parse(&self.value, &Rfc3339).expect("RFC 3339 vector"),
            ),
            SemanticType::Text | SemanticType::Other(_) => FieldValue::Text(self.value.clone()),
        }
    }
}

/// One field reference applied to one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Single-reference pattern, e.g. `{n:%020d}`.
    pub pattern: String,
    /// The input.
    pub input: VectorInput,
    /// Expected encoding.
    pub expected: Option<String>,
    /// Expected error message (if this should fail).
    pub expected_error: Option<String>,
}

fn encoding(
    id: &str,
    description: &str,
    pattern: &str,
    input: VectorInput,
    expected: &str,
) -> EncodingVector {
    EncodingVector {
        id: id.into(),
        description: description.into(),
        pattern: pattern.into(),
        input,
        expected: Some(expected.into()),
        expected_error: None,
    }
}

/// Encoding vectors covering each conversion family.
pub fn encoding_vectors() -> Vec<EncodingVector> {
    vec![
        encoding(
            "text_identity",
            "Text without a width spec is copied",
            "{id}",
            VectorInput::new("string", "u-1"),
            "u-1",
        ),
        encoding(
            "int_canonical",
            "Integer without a width spec is unpadded decimal",
            "{n}",
            VectorInput::new("i64", "-42"),
            "-42",
        ),
        encoding(
            "int_padded",
            "Zero-padded integer",
            "{n:%020d}",
            VectorInput::new("u64", "9"),
            "00000000000000000009",
        ),
        encoding(
            "int_hex",
            "Zero-padded lowercase hex",
            "{n:%08x}",
            VectorInput::new("u32", "255"),
            "000000ff",
        ),
        encoding(
            "float_padded",
            "Zero-padded fixed-point float",
            "{price:%020.2f}",
            VectorInput::new("f64", "3.14159"),
            "00000000000000003.14",
        ),
        encoding(
            "epoch_seconds",
            "Unix seconds after UTC normalization",
            "{ts:utc:unix}",
            VectorInput::new("timestamp", "2024-01-01T01:00:00+01:00"),
            "1704067200",
        ),
        encoding(
            "epoch_nanos_padded",
            "Zero-padded unix nanoseconds",
            "{ts:unixnano:%020d}",
            VectorInput::new("timestamp", "2024-01-01T00:00:00Z"),
            "01704067200000000000",
        ),
        encoding(
            "rfc3339_offset",
            "rfc3339 keeps the offset and drops the fraction",
            "{ts:rfc3339}",
            VectorInput::new("timestamp", "2024-05-01T09:30:00.25+02:00"),
            "2024-05-01T09:30:00+02:00",
        ),
        encoding(
            "rfc3339fixed_utc",
            "rfc3339fixed in UTC has nine fraction digits and Z",
            "{ts:utc:rfc3339fixed}",
            VectorInput::new("timestamp", "2024-05-01T09:30:00.25+02:00"),
            "2024-05-01T07:30:00.250000000Z",
        ),
        encoding(
            "rfc3339nano_trimmed",
            "rfc3339nano trims trailing zeros",
            "{ts:utc:rfc3339nano}",
            VectorInput::new("timestamp", "2024-05-01T07:30:00.250Z"),
            "2024-05-01T07:30:00.25Z",
        ),
        encoding(
            "layout_date",
            "Custom layout",
            "{ts:[year][month][day]}",
            VectorInput::new("timestamp", "2024-05-01T07:30:00Z"),
            "20240501",
        ),
        EncodingVector {
            id: "float_unformatted".into(),
            description: "Floats require a width spec".into(),
            pattern: "{price}".into(),
            input: VectorInput::new("f64", "1.5"),
            expected: None,
            expected_error: Some("MissingFloatFormat".into()),
        },
        EncodingVector {
            id: "temporal_unformatted".into(),
            description: "utc alone is not a format".into(),
            pattern: "{ts:utc}".into(),
            input: VectorInput::new("timestamp", "2024-05-01T07:30:00Z"),
            expected: None,
            expected_error: Some("MissingTemporalFormat".into()),
        },
    ]
}

/// A field reference whose encodings must sort like its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Single-reference pattern.
    pub pattern: String,
    /// Semantic type name.
    pub field_type: String,
    /// Inputs in strictly ascending order.
    pub ascending: Vec<String>,
}

impl OrderingVector {
    /// Returns the typed inputs.
    pub fn inputs(&self) -> Vec<VectorInput> {
        self.ascending
            .iter()
            .map(|value| VectorInput::new(&self.field_type, value))
            .collect()
    }
}

fn ordering(id: &str, pattern: &str, field_type: &str, ascending: &[&str]) -> OrderingVector {
    OrderingVector {
        id: id.into(),
        pattern: pattern.into(),
        field_type: field_type.into(),
        ascending: ascending.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Ordering vectors for every encoding the advisor accepts as sort-safe.
pub fn ordering_vectors() -> Vec<OrderingVector> {
    vec![
        ordering(
            "padded_digit_rollover",
            "{n:%020d}",
            "u64",
            &["0", "9", "10", "99", "100", "18446744073709551615"],
        ),
        ordering(
            "padded_float",
            "{x:%020.3f}",
            "f64",
            &["0", "0.5", "9.999", "10", "123456.789"],
        ),
        ordering(
            "padded_epoch_threshold",
            "{ts:unix:%020d}",
            "timestamp",
            &[
                "1973-03-03T09:46:39Z",
                "1973-03-03T09:46:40Z",
                "2001-09-09T01:46:40Z",
                "2286-11-20T17:46:40Z",
            ],
        ),
        ordering(
            "utc_fixed_across_offsets",
            "{ts:utc:rfc3339fixed}",
            "timestamp",
            &[
                "2024-05-01T09:00:00+05:00",
                "2024-05-01T04:30:00Z",
                "2024-05-01T04:30:00.000000001Z",
                "2024-04-30T23:45:00-05:00",
            ],
        ),
    ]
}
