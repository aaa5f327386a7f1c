//! Inspect command implementation.

use keyform_attr::AttributeKind;
use keyform_core::{PatternSpec, Segment};
use serde::Serialize;
use tracing::info;

/// Pattern inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// The pattern as written.
    pub pattern: String,
    /// Attribute kind tag.
    pub kind: String,
    /// Whether the pattern has no field references.
    pub constant: bool,
    /// Literal text before the first field reference.
    pub prefix: String,
    /// Parsed segments in order.
    pub segments: Vec<SegmentInfo>,
}

/// One parsed segment.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentInfo {
    /// Literal text.
    Literal {
        /// Byte offset in the pattern.
        offset: usize,
        /// The text.
        value: String,
    },
    /// A `{...}` field reference.
    Field {
        /// Byte offset of the opening brace.
        offset: usize,
        /// Dotted field path.
        path: String,
        /// Name used for the parameter side.
        parameter: String,
        /// Modifiers before the width spec.
        modifiers: Vec<String>,
        /// printf-style width spec, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        width_spec: Option<String>,
    },
}

/// Runs the inspect command.
pub fn run(
    pattern: &str,
    kind: AttributeKind,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting pattern {:?}", pattern);
    let result = inspect(pattern, kind)?;
    super::emit(&result, format, print_text_output)
}

/// Parses `pattern` and describes its structure.
pub fn inspect(
    pattern: &str,
    kind: AttributeKind,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let spec = PatternSpec::parse_with_kind(pattern, kind)?;

    let segments = spec
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal { value, offset } => SegmentInfo::Literal {
                offset: *offset,
                value: value.clone(),
            },
            Segment::Field(field) => SegmentInfo::Field {
                offset: field.offset(),
                path: field.path().to_string(),
                parameter: field.parameter_name().to_string(),
                modifiers: field.modifiers().to_vec(),
                width_spec: field.width_spec().map(str::to_string),
            },
        })
        .collect();

    Ok(InspectResult {
        pattern: spec.raw().to_string(),
        kind: spec.attribute_kind().to_string(),
        constant: spec.is_constant(),
        prefix: spec.leading_literal_prefix().to_string(),
        segments,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Pattern Inspection");
    println!("==================");
    println!();
    println!("Pattern: {}", result.pattern);
    println!("Kind:    {}", result.kind);
    println!("Prefix:  {:?}", result.prefix);
    if result.constant {
        println!("Constant pattern (no field references)");
    }
    println!();
    println!("Segments");
    println!("--------");
    for segment in &result.segments {
        match segment {
            SegmentInfo::Literal { offset, value } => {
                println!("  @{:<4} literal {:?}", offset, value);
            }
            SegmentInfo::Field {
                offset,
                path,
                parameter,
                modifiers,
                width_spec,
            } => {
                println!("  @{:<4} field   {} (parameter {})", offset, path, parameter);
                if !modifiers.is_empty() {
                    println!("         modifiers: {}", modifiers.join(", "));
                }
                if let Some(spec) = width_spec {
                    println!("         width spec: {}", spec);
                }
            }
        }
    }
}
