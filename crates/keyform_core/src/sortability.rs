//! Sort-key safety checks.
//!
//! Range and sort keys collate byte-wise. An encoding whose width varies
//! with the value, or whose text depends on a timezone offset, breaks that
//! ordering (`"9" > "10"`). The advisor inspects a field reference used in
//! sort-key position and reports such encodings. Diagnostics are advisory
//! and never fail compilation.

use crate::convert::{TemporalFormat, TimestampFormat, WidthSpec};
use crate::pattern::{FieldRef, PatternSpec, UTC_MODIFIER};
use crate::schema::{SchemaProvider, SemanticType};
use std::fmt;

/// An encoding that does not preserve order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsafeCondition {
    /// Integer without a zero-padded width.
    UnpaddedInteger,
    /// Float without a zero-padded total width.
    UnpaddedFloat,
    /// Epoch counter without a zero-padded width.
    UnpaddedEpoch,
    /// `rfc3339` or `rfc3339nano`.
    VariableWidthTimestamp,
    /// `rfc3339fixed` without `utc` normalization.
    OffsetDependentTimestamp,
}

impl UnsafeCondition {
    /// Returns a stable identifier for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UnsafeCondition::UnpaddedInteger => "unpadded_integer",
            UnsafeCondition::UnpaddedFloat => "unpadded_float",
            UnsafeCondition::UnpaddedEpoch => "unpadded_epoch",
            UnsafeCondition::VariableWidthTimestamp => "variable_width_timestamp",
            UnsafeCondition::OffsetDependentTimestamp => "offset_dependent_timestamp",
        }
    }
}

impl fmt::Display for UnsafeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a sort-key field reference will not collate correctly, and how to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortabilityDiagnostic {
    /// Label of the entity owning the key.
    pub entity: String,
    /// Field path of the reference.
    pub field: String,
    /// What was detected.
    pub condition: UnsafeCondition,
    /// One-line cause.
    pub cause: String,
    /// One-line suggested fix.
    pub suggestion: String,
}

impl fmt::Display for SortabilityDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {} (fix: {})",
            self.entity, self.field, self.cause, self.suggestion
        )
    }
}

/// Checks one field reference in sort-key position.
///
/// Text, other types and custom temporal layouts are never flagged.
///
/// Zero padding makes integers collate correctly only when they are
/// non-negative: `-0001` sorts before `-0042`, and `+0042` before `-0001`.
/// A padded signed integer is still accepted, so fields that can go
/// negative need an offset applied before they reach the key.
#[must_use]
pub fn check_sort_safety(
    field: &FieldRef,
    ty: &SemanticType,
    entity_label: &str,
) -> Option<SortabilityDiagnostic> {
    let padded = field
        .width_spec()
        .and_then(WidthSpec::parse)
        .is_some_and(|spec| spec.is_zero_padded());

    let (condition, cause, suggestion) = match ty {
        SemanticType::Integer { .. } if !padded => (
            UnsafeCondition::UnpaddedInteger,
            "integer digit count varies, so \"9\" sorts after \"10\"".to_string(),
            format!("use {{{}:%020d}}", field.path()),
        ),
        SemanticType::Float { .. } if !padded => (
            UnsafeCondition::UnpaddedFloat,
            "float text has no fixed total width".to_string(),
            format!("use {{{}:%020.6f}}", field.path()),
        ),
        SemanticType::Temporal => {
            let primary = field.primary_format().filter(|m| *m != UTC_MODIFIER)?;
            match TemporalFormat::from_modifier(primary) {
                TemporalFormat::Epoch(resolution) if !padded => (
                    UnsafeCondition::UnpaddedEpoch,
                    format!(
                        "{} epoch digit count grows at a fixed date",
                        resolution.modifier()
                    ),
                    format!("use {{{}:{}:%020d}}", field.path(), resolution.modifier()),
                ),
                TemporalFormat::Timestamp(
                    format @ (TimestampFormat::Rfc3339 | TimestampFormat::Rfc3339Nano),
                ) => (
                    UnsafeCondition::VariableWidthTimestamp,
                    format!(
                        "{} has variable width and keeps the timezone offset",
                        format.modifier()
                    ),
                    format!("use {{{}:utc:rfc3339fixed}}", field.path()),
                ),
                TemporalFormat::Timestamp(TimestampFormat::Rfc3339Fixed)
                    if !field.is_utc_normalized() =>
                {
                    (
                        UnsafeCondition::OffsetDependentTimestamp,
                        "timestamps with different offsets do not collate in time order"
                            .to_string(),
                        format!("use {{{}:utc:rfc3339fixed}}", field.path()),
                    )
                }
                _ => return None,
            }
        }
        _ => return None,
    };

    Some(SortabilityDiagnostic {
        entity: entity_label.to_string(),
        field: field.path().to_string(),
        condition,
        cause,
        suggestion,
    })
}

/// Checks every field reference of a compound sort-key pattern.
///
/// Fields unknown to the schema are skipped; the compiler reports them.
#[must_use]
pub fn check_spec(
    spec: &PatternSpec,
    schema: &dyn SchemaProvider,
    entity_label: &str,
) -> Vec<SortabilityDiagnostic> {
    spec.field_refs()
        .filter_map(|field| {
            let ty = schema.field_type(field.path())?;
            check_sort_safety(field, &ty, entity_label)
        })
        .collect()
}
