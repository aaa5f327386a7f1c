//! Check command implementation.

use super::parse_field_types;
use keyform_core::{check_spec, convert_key_field, CoreError, PatternSpec, SchemaProvider};
use serde::Serialize;
use tracing::{info, warn};

/// Pattern check result.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    /// The pattern as written.
    pub pattern: String,
    /// Entity label used in diagnostics.
    pub entity: String,
    /// Whether the pattern was checked as a sort key.
    pub sort_key: bool,
    /// Conversion of each field reference.
    pub fields: Vec<FieldConversionInfo>,
    /// Sortability diagnostics (sort keys only).
    pub diagnostics: Vec<DiagnosticInfo>,
}

/// Conversion of one field reference.
#[derive(Debug, Serialize)]
pub struct FieldConversionInfo {
    /// Dotted field path.
    pub path: String,
    /// Declared semantic type.
    pub semantic_type: String,
    /// Expression reading the parameter.
    pub parameter: String,
    /// Expression reading the record field.
    pub entity: String,
    /// Whether number formatting is needed.
    pub requires_numeric: bool,
    /// Whether date-time support is needed.
    pub requires_temporal: bool,
}

/// One sortability diagnostic.
#[derive(Debug, Serialize)]
pub struct DiagnosticInfo {
    /// Field path.
    pub field: String,
    /// Condition name.
    pub condition: String,
    /// Cause.
    pub cause: String,
    /// Suggested fix.
    pub suggestion: String,
}

/// Runs the check command.
pub fn run(
    pattern: &str,
    fields: &[String],
    sort: bool,
    entity: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking pattern {:?}", pattern);
    let result = check(pattern, fields, sort, entity)?;
    for diagnostic in &result.diagnostics {
        warn!(
            field = %diagnostic.field,
            condition = %diagnostic.condition,
            "sort key does not collate in value order"
        );
    }
    super::emit(&result, format, print_text_output)
}

/// Converts every field reference of `pattern` and, for sort keys, runs
/// the sortability advisor.
pub fn check(
    pattern: &str,
    fields: &[String],
    sort: bool,
    entity: &str,
) -> Result<CheckResult, Box<dyn std::error::Error>> {
    let spec = PatternSpec::parse(pattern)?;
    let schema = parse_field_types(fields)?;

    let mut conversions = Vec::new();
    for field in spec.field_refs() {
        let ty = schema
            .field_type(field.path())
            .ok_or_else(|| CoreError::unknown_field(entity, field.path()))?;
        let pair = convert_key_field(field, &ty)?;
        conversions.push(FieldConversionInfo {
            path: field.path().to_string(),
            semantic_type: ty.to_string(),
            parameter: pair.parameter.to_string(),
            entity: pair.entity.to_string(),
            requires_numeric: pair.parameter.requires_numeric_library(),
            requires_temporal: pair.parameter.requires_temporal_library(),
        });
    }

    let diagnostics = if sort {
        check_spec(&spec, &schema, entity)
            .into_iter()
            .map(|d| DiagnosticInfo {
                field: d.field,
                condition: d.condition.to_string(),
                cause: d.cause,
                suggestion: d.suggestion,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(CheckResult {
        pattern: spec.raw().to_string(),
        entity: entity.to_string(),
        sort_key: sort,
        fields: conversions,
        diagnostics,
    })
}

fn print_text_output(result: &CheckResult) {
    println!("Pattern Check");
    println!("=============");
    println!();
    println!("Pattern: {}", result.pattern);
    println!("Entity:  {}", result.entity);
    println!();

    println!("Conversions");
    println!("-----------");
    for field in &result.fields {
        println!("  {} ({})", field.path, field.semantic_type);
        println!("    parameter: {}", field.parameter);
        println!("    entity:    {}", field.entity);
        let mut needs = Vec::new();
        if field.requires_numeric {
            needs.push("numeric");
        }
        if field.requires_temporal {
            needs.push("temporal");
        }
        if !needs.is_empty() {
            println!("    requires:  {}", needs.join(", "));
        }
    }

    if result.sort_key {
        println!();
        println!("Sortability");
        println!("-----------");
        if result.diagnostics.is_empty() {
            println!("  ✓ Sorts correctly");
        }
        for d in &result.diagnostics {
            println!("  ✗ {}.{} [{}]: {}", result.entity, d.field, d.condition, d.cause);
            println!("    fix: {}", d.suggestion);
        }
    }
}
