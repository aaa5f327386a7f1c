//! Type-aware conversion of field references.
//!
//! A field reference plus the semantic type of its field determines how a
//! value becomes its encoded key fragment:
//!
//! | type     | width spec | encoding                                    |
//! |----------|------------|---------------------------------------------|
//! | text     | yes / no   | printf on the raw text / identity           |
//! | integer  | yes / no   | printf / canonical unpadded decimal         |
//! | float    | required   | printf                                      |
//! | temporal | optional   | `[utc:]format`, then printf if given        |
//! | other    | optional   | best-effort string, then printf if given    |
//!
//! Conversion is pure and parameterized over the [`ValueSource`], so the same
//! field reference yields both the parameter-side and the entity-side
//! descriptor from one code path.

mod expression;
mod printf;
mod temporal;

pub use expression::{Expression, ValueLookup, ValueSource};
pub use printf::{Verb, WidthSpec, MAX_WIDTH};
pub use temporal::{EpochResolution, TemporalFormat, TimestampFormat};

use crate::error::{ConversionError, EvalError};
use crate::pattern::{FieldRef, UTC_MODIFIER};
use crate::schema::SemanticType;
use crate::value::FieldValue;
use std::fmt;

/// The result of converting one field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionDescriptor {
    expression: Expression,
    requires_numeric_library: bool,
    requires_temporal_library: bool,
}

impl ConversionDescriptor {
    /// Returns the expression tree.
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Returns the value source the expression reads.
    #[must_use]
    pub fn source(&self) -> &ValueSource {
        self.expression.source()
    }

    /// Returns true if emitted code needs number formatting support.
    #[must_use]
    pub const fn requires_numeric_library(&self) -> bool {
        self.requires_numeric_library
    }

    /// Returns true if emitted code needs date-time support.
    #[must_use]
    pub const fn requires_temporal_library(&self) -> bool {
        self.requires_temporal_library
    }

    /// Resolves the source through `lookup` and encodes the value.
    pub fn evaluate(&self, lookup: &dyn ValueLookup) -> Result<String, EvalError> {
        let source = self.expression.source();
        let value = lookup
            .lookup(source)
            .ok_or_else(|| EvalError::UnboundSource {
                value_source: source.to_string(),
            })?;
        self.expression.apply_text(&value)
    }

    /// Encodes a value directly, bypassing source resolution.
    pub fn apply_value(&self, value: &FieldValue) -> Result<String, EvalError> {
        self.expression.apply_text(value)
    }
}

impl fmt::Display for ConversionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Both descriptors for one field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyFieldConversion {
    /// Reads the value from a named parameter.
    pub parameter: ConversionDescriptor,
    /// Reads the value from a record field path.
    pub entity: ConversionDescriptor,
}

/// Converts a field reference reading from a parameter named after the
/// field's last path component.
pub fn convert(field: &FieldRef, ty: &SemanticType) -> Result<ConversionDescriptor, ConversionError> {
    convert_from(field, ty, ValueSource::parameter(field.parameter_name()))
}

/// Converts a field reference for both the parameter and the entity side.
pub fn convert_key_field(
    field: &FieldRef,
    ty: &SemanticType,
) -> Result<KeyFieldConversion, ConversionError> {
    let parameter = convert(field, ty)?;
    let entity = convert_from(field, ty, ValueSource::field(field.path()))?;
    Ok(KeyFieldConversion { parameter, entity })
}

/// Converts a field reference reading from `source`.
pub fn convert_from(
    field: &FieldRef,
    ty: &SemanticType,
    source: ValueSource,
) -> Result<ConversionDescriptor, ConversionError> {
    let width = field
        .width_spec()
        .map(|raw| {
            WidthSpec::parse(raw).ok_or_else(|| ConversionError::InvalidWidthSpec {
                field: field.path().to_string(),
                spec: raw.to_string(),
            })
        })
        .transpose()?;
    let leaf = Expression::Source(source);

    match ty {
        SemanticType::Text => Ok(match width {
            Some(spec) => {
                require(field, ty, &spec, WidthSpec::accepts_text)?;
                numeric(printf(spec, leaf))
            }
            None => plain(leaf),
        }),
        SemanticType::Integer { .. } => {
            let expression = match width {
                Some(spec) => {
                    require(field, ty, &spec, WidthSpec::accepts_integer)?;
                    printf(spec, leaf)
                }
                None => Expression::Decimal(Box::new(leaf)),
            };
            Ok(numeric(expression))
        }
        SemanticType::Float { .. } => {
            let spec = width.ok_or_else(|| ConversionError::missing_float_format(field.path()))?;
            require(field, ty, &spec, WidthSpec::accepts_float)?;
            Ok(numeric(printf(spec, leaf)))
        }
        SemanticType::Temporal => convert_temporal(field, ty, width, leaf),
        SemanticType::Other(_) => {
            let stringified = Expression::Stringify(Box::new(leaf));
            Ok(match width {
                Some(spec) => {
                    require(field, ty, &spec, WidthSpec::accepts_text)?;
                    numeric(printf(spec, stringified))
                }
                None => plain(stringified),
            })
        }
    }
}

fn convert_temporal(
    field: &FieldRef,
    ty: &SemanticType,
    width: Option<WidthSpec>,
    leaf: Expression,
) -> Result<ConversionDescriptor, ConversionError> {
    let primary = match field.primary_format() {
        Some(token) if token != UTC_MODIFIER => token,
        _ => return Err(ConversionError::missing_temporal_format(field.path())),
    };

    if let Some(unknown) = field.pre_transforms().iter().find(|m| *m != UTC_MODIFIER) {
        return Err(ConversionError::UnknownPreTransform {
            field: field.path().to_string(),
            modifier: unknown.clone(),
        });
    }

    let mut operand = leaf;
    if field.is_utc_normalized() {
        operand = Expression::Utc(Box::new(operand));
    }

    let (formatted, is_epoch) = match TemporalFormat::from_modifier(primary) {
        TemporalFormat::Epoch(resolution) => (
            Expression::Epoch {
                resolution,
                operand: Box::new(operand),
            },
            true,
        ),
        TemporalFormat::Timestamp(format) => {
            if let TimestampFormat::Layout(layout) = &format {
                temporal::validate_layout(layout).map_err(|message| {
                    ConversionError::InvalidTemporalLayout {
                        field: field.path().to_string(),
                        layout: layout.clone(),
                        message,
                    }
                })?;
            }
            (
                Expression::Timestamp {
                    format,
                    operand: Box::new(operand),
                },
                false,
            )
        }
    };

    let (expression, numeric) = match width {
        Some(spec) => {
            let accepts: fn(&WidthSpec) -> bool = if is_epoch {
                WidthSpec::accepts_integer
            } else {
                WidthSpec::accepts_text
            };
            require(field, ty, &spec, accepts)?;
            (printf(spec, formatted), true)
        }
        None => (formatted, is_epoch),
    };

    Ok(ConversionDescriptor {
        expression,
        requires_numeric_library: numeric,
        requires_temporal_library: true,
    })
}

fn require(
    field: &FieldRef,
    ty: &SemanticType,
    spec: &WidthSpec,
    accepts: fn(&WidthSpec) -> bool,
) -> Result<(), ConversionError> {
    if accepts(spec) {
        Ok(())
    } else {
        Err(ConversionError::IncompatibleWidthSpec {
            field: field.path().to_string(),
            spec: spec.as_str().to_string(),
            semantic_type: ty.to_string(),
        })
    }
}

fn printf(spec: WidthSpec, operand: Expression) -> Expression {
    Expression::Printf {
        spec,
        operand: Box::new(operand),
    }
}

fn plain(expression: Expression) -> ConversionDescriptor {
    ConversionDescriptor {
        expression,
        requires_numeric_library: false,
        requires_temporal_library: false,
    }
}

fn numeric(expression: Expression) -> ConversionDescriptor {
    ConversionDescriptor {
        expression,
        requires_numeric_library: true,
        requires_temporal_library: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::macros::datetime;

    fn field(body: &str) -> FieldRef {
        FieldRef::parse(body).unwrap()
    }

    fn int64() -> SemanticType {
        SemanticType::Integer {
            signed: true,
            bits: 64,
        }
    }

    #[test]
    fn text_identity_and_width() {
        let d = convert(&field("id"), &SemanticType::Text).unwrap();
        assert!(d.expression().is_identity());
        assert!(!d.requires_numeric_library());
        assert_eq!(d.apply_value(&FieldValue::from("u1")).unwrap(), "u1");

        let d = convert(&field("code:%-4s"), &SemanticType::Text).unwrap();
        assert!(d.requires_numeric_library());
        assert_eq!(d.apply_value(&FieldValue::from("ab")).unwrap(), "ab  ");
    }

    #[test]
    fn integer_padded_and_canonical() {
        let d = convert(&field("n:%020d"), &int64()).unwrap();
        assert_eq!(
            d.apply_value(&FieldValue::Int(9)).unwrap(),
            "00000000000000000009"
        );

        let d = convert(&field("n"), &int64()).unwrap();
        assert!(d.requires_numeric_library());
        assert_eq!(d.apply_value(&FieldValue::Int(-42)).unwrap(), "-42");
    }

    #[test]
    fn float_requires_width_spec() {
        let ty = SemanticType::Float { bits: 64 };
        assert_eq!(
            convert(&field("price"), &ty).unwrap_err(),
            ConversionError::missing_float_format("price")
        );

        let d = convert(&field("price:%020.2f"), &ty).unwrap();
        assert_eq!(
            d.apply_value(&FieldValue::Float(3.14159)).unwrap(),
            "00000000000000003.14"
        );
    }

    #[test]
    fn oversized_width_spec_fails_at_compile_time() {
        let ty = SemanticType::Float { bits: 64 };
        assert!(matches!(
            convert(&field("price:%.70000f"), &ty),
            Err(ConversionError::InvalidWidthSpec { .. })
        ));
        assert!(matches!(
            convert(&field("id:%0100000s"), &SemanticType::Text),
            Err(ConversionError::InvalidWidthSpec { .. })
        ));
        assert!(matches!(
            convert(&field("n:%099999999d"), &int64()),
            Err(ConversionError::InvalidWidthSpec { .. })
        ));
    }

    #[test]
    fn width_spec_errors() {
        assert!(matches!(
            convert(&field("n:%zz"), &int64()),
            Err(ConversionError::InvalidWidthSpec { .. })
        ));
        assert_eq!(
            convert(&field("n:%s"), &int64()).unwrap_err(),
            ConversionError::IncompatibleWidthSpec {
                field: "n".to_string(),
                spec: "%s".to_string(),
                semantic_type: "i64".to_string(),
            }
        );
        assert!(matches!(
            convert(&field("id:%d"), &SemanticType::Text),
            Err(ConversionError::IncompatibleWidthSpec { .. })
        ));
    }

    #[test]
    fn temporal_requires_format() {
        let ty = SemanticType::Temporal;
        assert_eq!(
            convert(&field("ts"), &ty).unwrap_err(),
            ConversionError::missing_temporal_format("ts")
        );
        assert_eq!(
            convert(&field("ts:utc"), &ty).unwrap_err(),
            ConversionError::missing_temporal_format("ts")
        );
    }

    #[test]
    fn temporal_epoch_with_padding() {
        let d = convert(&field("createdAt:utc:unixnano:%020d"), &SemanticType::Temporal).unwrap();
        assert!(d.requires_temporal_library());
        assert!(d.requires_numeric_library());
        assert_eq!(
            d.to_string(),
            "printf(\"%020d\", unix_nanos(utc(createdAt)))"
        );
        let t = datetime!(2024-01-01 00:00:00 UTC);
        assert_eq!(
            d.apply_value(&FieldValue::from(t)).unwrap(),
            "01704067200000000000"
        );
    }

    #[test]
    fn temporal_string_formats() {
        let d = convert(&field("ts:utc:rfc3339fixed"), &SemanticType::Temporal).unwrap();
        assert!(!d.requires_numeric_library());
        let t = datetime!(2024-05-01 09:30:00.5 +02:00);
        assert_eq!(
            d.apply_value(&FieldValue::from(t)).unwrap(),
            "2024-05-01T07:30:00.500000000Z"
        );

        let d = convert(&field("day:[year][month][day]"), &SemanticType::Temporal).unwrap();
        assert_eq!(d.apply_value(&FieldValue::from(t)).unwrap(), "20240501");
    }

    #[test]
    fn temporal_errors() {
        let ty = SemanticType::Temporal;
        assert!(matches!(
            convert(&field("ts:[nope]"), &ty),
            Err(ConversionError::InvalidTemporalLayout { .. })
        ));
        assert!(matches!(
            convert(&field("ts:unix:%s"), &ty),
            Err(ConversionError::IncompatibleWidthSpec { .. })
        ));
        assert!(matches!(
            convert(&field("ts:rfc3339:%05d"), &ty),
            Err(ConversionError::IncompatibleWidthSpec { .. })
        ));
        assert_eq!(
            convert(&field("ts:local:unix"), &ty).unwrap_err(),
            ConversionError::UnknownPreTransform {
                field: "ts".to_string(),
                modifier: "local".to_string(),
            }
        );
    }

    #[test]
    fn modifiers_ignored_on_non_temporal_types() {
        let d = convert(&field("n:unix"), &int64()).unwrap();
        assert_eq!(d.apply_value(&FieldValue::Int(5)).unwrap(), "5");
    }

    #[test]
    fn other_types_stringify() {
        let d = convert(&field("flag"), &SemanticType::Other("bool".to_string())).unwrap();
        assert_eq!(d.apply_value(&FieldValue::Bool(true)).unwrap(), "true");
        assert!(!d.requires_numeric_library());
    }

    #[test]
    fn both_sides_share_the_expression_shape() {
        let pair = convert_key_field(&field("user.id:%08d"), &int64()).unwrap();
        assert_eq!(pair.parameter.source(), &ValueSource::parameter("id"));
        assert_eq!(pair.entity.source(), &ValueSource::field("user.id"));
        assert_eq!(pair.parameter.to_string(), "printf(\"%08d\", id)");
        assert_eq!(pair.entity.to_string(), "printf(\"%08d\", record.user.id)");

        let mut values = HashMap::new();
        values.insert("id".to_string(), FieldValue::Int(7));
        values.insert("user.id".to_string(), FieldValue::Int(7));
        assert_eq!(
            pair.parameter.evaluate(&values).unwrap(),
            pair.entity.evaluate(&values).unwrap()
        );
    }

    #[test]
    fn unbound_sources_fail() {
        let d = convert(&field("id"), &SemanticType::Text).unwrap();
        let values: HashMap<String, FieldValue> = HashMap::new();
        assert_eq!(
            d.evaluate(&values).unwrap_err(),
            EvalError::UnboundSource {
                value_source: "id".to_string()
            }
        );
    }

    #[test]
    fn type_mismatch_at_evaluation() {
        let d = convert(&field("n:%05d"), &int64()).unwrap();
        assert_eq!(
            d.apply_value(&FieldValue::from("x")).unwrap_err(),
            EvalError::type_mismatch("integer", "text")
        );
    }
}
