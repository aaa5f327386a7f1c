//! Conversion expression trees and their evaluation.

use super::printf::WidthSpec;
use super::temporal::{self, EpochResolution, TimestampFormat};
use crate::error::EvalError;
use crate::value::FieldValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use time::UtcOffset;

/// Where the value feeding an expression comes from.
///
/// The same field reference converts over either source: a free-standing
/// parameter for callers that know a value, or a field access path for
/// callers holding a structured record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// A named input.
    Parameter(String),
    /// A field access path on a record.
    Field(Vec<String>),
}

impl ValueSource {
    /// Creates a parameter source.
    pub fn parameter(name: impl Into<String>) -> Self {
        ValueSource::Parameter(name.into())
    }

    /// Creates a field source from a dotted path.
    #[must_use]
    pub fn field(path: &str) -> Self {
        ValueSource::Field(path.split('.').map(str::to_string).collect())
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Parameter(name) => f.write_str(name),
            ValueSource::Field(path) => write!(f, "record.{}", path.join(".")),
        }
    }
}

/// Resolves value sources to typed values.
pub trait ValueLookup {
    /// Returns the value bound to `source`, if any.
    fn lookup(&self, source: &ValueSource) -> Option<FieldValue>;
}

impl<F> ValueLookup for F
where
    F: Fn(&ValueSource) -> Option<FieldValue>,
{
    fn lookup(&self, source: &ValueSource) -> Option<FieldValue> {
        self(source)
    }
}

/// Parameters are looked up by name, fields by dotted path.
impl<S: BuildHasher> ValueLookup for HashMap<String, FieldValue, S> {
    fn lookup(&self, source: &ValueSource) -> Option<FieldValue> {
        match source {
            ValueSource::Parameter(name) => self.get(name).cloned(),
            ValueSource::Field(path) => self.get(&path.join(".")).cloned(),
        }
    }
}

/// Parameters are looked up by name, fields by dotted path.
impl ValueLookup for BTreeMap<String, FieldValue> {
    fn lookup(&self, source: &ValueSource) -> Option<FieldValue> {
        match source {
            ValueSource::Parameter(name) => self.get(name).cloned(),
            ValueSource::Field(path) => self.get(&path.join(".")).cloned(),
        }
    }
}

/// How a field value becomes its encoded form.
///
/// Every tree has exactly one [`Expression::Source`] leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// The raw value.
    Source(ValueSource),
    /// Canonical unpadded base-10 integer.
    Decimal(Box<Expression>),
    /// printf-style formatting.
    Printf {
        /// The directive.
        spec: WidthSpec,
        /// The formatted value.
        operand: Box<Expression>,
    },
    /// Timestamp normalized to UTC.
    Utc(Box<Expression>),
    /// Integer epoch counter.
    Epoch {
        /// Counter resolution.
        resolution: EpochResolution,
        /// The timestamp.
        operand: Box<Expression>,
    },
    /// String timestamp.
    Timestamp {
        /// Encoding.
        format: TimestampFormat,
        /// The timestamp.
        operand: Box<Expression>,
    },
    /// Best-effort string form.
    Stringify(Box<Expression>),
}

impl Expression {
    /// Returns the source leaf of this tree.
    #[must_use]
    pub fn source(&self) -> &ValueSource {
        match self {
            Expression::Source(source) => source,
            Expression::Decimal(operand)
            | Expression::Utc(operand)
            | Expression::Stringify(operand)
            | Expression::Printf { operand, .. }
            | Expression::Epoch { operand, .. }
            | Expression::Timestamp { operand, .. } => operand.source(),
        }
    }

    /// Returns true if the tree is a bare source (identity conversion).
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Expression::Source(_))
    }

    /// Applies the expression to the value its source resolved to.
    pub fn apply(&self, input: &FieldValue) -> Result<FieldValue, EvalError> {
        match self {
            Expression::Source(_) => Ok(input.clone()),
            Expression::Decimal(operand) => {
                let value = operand.apply(input)?;
                value
                    .as_integer()
                    .map(|n| FieldValue::Text(n.to_string()))
                    .ok_or_else(|| EvalError::type_mismatch("integer", value.type_name()))
            }
            Expression::Printf { spec, operand } => {
                let value = operand.apply(input)?;
                printf(spec, &value).map(FieldValue::Text)
            }
            Expression::Utc(operand) => match operand.apply(input)? {
                FieldValue::Timestamp(t) => Ok(FieldValue::Timestamp(t.to_offset(UtcOffset::UTC))),
                other => Err(EvalError::type_mismatch("timestamp", other.type_name())),
            },
            Expression::Epoch {
                resolution,
                operand,
            } => match operand.apply(input)? {
                FieldValue::Timestamp(t) => temporal::epoch(t, *resolution).map(FieldValue::Int),
                other => Err(EvalError::type_mismatch("timestamp", other.type_name())),
            },
            Expression::Timestamp { format, operand } => match operand.apply(input)? {
                FieldValue::Timestamp(t) => {
                    temporal::format_timestamp(t, format).map(FieldValue::Text)
                }
                other => Err(EvalError::type_mismatch("timestamp", other.type_name())),
            },
            Expression::Stringify(operand) => {
                Ok(FieldValue::Text(operand.apply(input)?.to_string()))
            }
        }
    }

    /// Applies the expression and returns the encoded text.
    pub fn apply_text(&self, input: &FieldValue) -> Result<String, EvalError> {
        match self.apply(input)? {
            FieldValue::Text(s) => Ok(s),
            other => Err(EvalError::type_mismatch("text", other.type_name())),
        }
    }
}

fn printf(spec: &WidthSpec, value: &FieldValue) -> Result<String, EvalError> {
    match value {
        FieldValue::Text(s) if spec.accepts_text() => Ok(spec.format_text(s)),
        FieldValue::Int(_) | FieldValue::UInt(_) if spec.accepts_integer() => {
            let n = value.as_integer().unwrap_or_default();
            Ok(spec.format_integer(n))
        }
        FieldValue::Float(x) if spec.accepts_float() => spec.format_float(*x),
        other => Err(EvalError::type_mismatch(
            expected_by(spec),
            other.type_name(),
        )),
    }
}

fn expected_by(spec: &WidthSpec) -> &'static str {
    if spec.accepts_integer() && spec.accepts_float() {
        "number or text"
    } else if spec.accepts_integer() {
        "integer"
    } else if spec.accepts_float() {
        "float"
    } else {
        "text"
    }
}

/// Renders the tree as call-style pseudo-code, e.g.
/// `printf("%020d", unix_nanos(utc(record.createdAt)))`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Source(source) => write!(f, "{source}"),
            Expression::Decimal(operand) => write!(f, "decimal({operand})"),
            Expression::Printf { spec, operand } => write!(f, "printf({:?}, {operand})", spec.as_str()),
            Expression::Utc(operand) => write!(f, "utc({operand})"),
            Expression::Epoch {
                resolution,
                operand,
            } => {
                let name = match resolution {
                    EpochResolution::Seconds => "unix_seconds",
                    EpochResolution::Millis => "unix_millis",
                    EpochResolution::Nanos => "unix_nanos",
                };
                write!(f, "{name}({operand})")
            }
            Expression::Timestamp { format, operand } => match format {
                TimestampFormat::Layout(layout) => write!(f, "layout({layout:?}, {operand})"),
                other => write!(f, "{}({operand})", other.modifier()),
            },
            Expression::Stringify(operand) => write!(f, "string({operand})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn param(name: &str) -> Box<Expression> {
        Box::new(Expression::Source(ValueSource::parameter(name)))
    }

    #[test]
    fn source_is_found_through_nesting() {
        let expr = Expression::Printf {
            spec: WidthSpec::parse("%020d").unwrap(),
            operand: Box::new(Expression::Epoch {
                resolution: EpochResolution::Nanos,
                operand: Box::new(Expression::Utc(Box::new(Expression::Source(
                    ValueSource::field("order.createdAt"),
                )))),
            }),
        };
        assert_eq!(
            expr.source(),
            &ValueSource::Field(vec!["order".to_string(), "createdAt".to_string()])
        );
        assert_eq!(
            expr.to_string(),
            "printf(\"%020d\", unix_nanos(utc(record.order.createdAt)))"
        );
    }

    #[test]
    fn decimal_rejects_text() {
        let expr = Expression::Decimal(param("n"));
        assert_eq!(expr.apply_text(&FieldValue::Int(-12)).unwrap(), "-12");
        assert_eq!(
            expr.apply_text(&FieldValue::from("12")).unwrap_err(),
            EvalError::type_mismatch("integer", "text")
        );
    }

    #[test]
    fn utc_then_fixed_timestamp() {
        let expr = Expression::Timestamp {
            format: TimestampFormat::Rfc3339Fixed,
            operand: Box::new(Expression::Utc(param("ts"))),
        };
        let value = FieldValue::from(datetime!(2024-05-01 09:30:00 +02:00));
        assert_eq!(
            expr.apply_text(&value).unwrap(),
            "2024-05-01T07:30:00.000000000Z"
        );
    }

    #[test]
    fn identity_requires_text_result() {
        let expr = Expression::Source(ValueSource::parameter("id"));
        assert!(expr.is_identity());
        assert_eq!(expr.apply_text(&FieldValue::from("u1")).unwrap(), "u1");
        assert!(expr.apply_text(&FieldValue::Int(1)).is_err());
    }

    #[test]
    fn lookups_by_name_and_path() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), FieldValue::from("p"));
        values.insert("user.id".to_string(), FieldValue::from("f"));

        assert_eq!(
            values.lookup(&ValueSource::parameter("id")),
            Some(FieldValue::from("p"))
        );
        assert_eq!(
            values.lookup(&ValueSource::field("user.id")),
            Some(FieldValue::from("f"))
        );
        assert_eq!(values.lookup(&ValueSource::field("id.x")), None);
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |source: &ValueSource| match source {
            ValueSource::Parameter(name) if name == "n" => Some(FieldValue::Int(3)),
            _ => None,
        };
        assert_eq!(
            lookup.lookup(&ValueSource::parameter("n")),
            Some(FieldValue::Int(3))
        );
        assert_eq!(lookup.lookup(&ValueSource::parameter("m")), None);
    }
}
