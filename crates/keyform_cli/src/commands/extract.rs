//! Extract command implementation.

use keyform_attr::{AttributeKind, AttributeMap, AttributeValue};
use keyform_core::{KeyExtractor, PatternSpec};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Key extraction result.
#[derive(Debug, Serialize)]
pub struct ExtractResult {
    /// The pattern as written.
    pub pattern: String,
    /// Record file path.
    pub record: String,
    /// Attribute kind tag.
    pub kind: String,
    /// Derived key attribute, if the record participates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
    /// Path of the missing field when a sparse key does not apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<String>,
}

/// Runs the extract command.
pub fn run(
    pattern: &str,
    record: &Path,
    kind: AttributeKind,
    sparse: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Extracting {:?} from {:?}", pattern, record);
    let result = extract(pattern, record, kind, sparse)?;
    super::emit(&result, format, print_text_output)
}

/// Reads an attribute-value JSON record and derives the key for `pattern`.
///
/// With `sparse`, a missing field yields an excluded result instead of an
/// error, as for a secondary index.
pub fn extract(
    pattern: &str,
    record: &Path,
    kind: AttributeKind,
    sparse: bool,
) -> Result<ExtractResult, Box<dyn std::error::Error>> {
    let spec = PatternSpec::parse_with_kind(pattern, kind)?;
    let text = std::fs::read_to_string(record)
        .map_err(|e| format!("Cannot read record {:?}: {}", record, e))?;
    let attributes: AttributeMap = serde_json::from_str(&text)?;
    debug!(attributes = attributes.len(), "loaded record");

    let extractor = KeyExtractor::build(&spec);
    let (value, excluded) = match extractor.apply(&attributes) {
        Ok(value) => (Some(value), None),
        Err(e) if sparse && e.is_field_not_found() => (None, Some(missing_path(&e))),
        Err(e) => return Err(e.into()),
    };

    Ok(ExtractResult {
        pattern: spec.raw().to_string(),
        record: record.display().to_string(),
        kind: kind.to_string(),
        value,
        excluded,
    })
}

fn missing_path(error: &keyform_core::ExtractError) -> String {
    match error {
        keyform_core::ExtractError::FieldNotFound { path } => path.clone(),
        other => other.to_string(),
    }
}

fn print_text_output(result: &ExtractResult) {
    println!("Key Extraction");
    println!("==============");
    println!();
    println!("Pattern: {}", result.pattern);
    println!("Record:  {}", result.record);
    println!("Kind:    {}", result.kind);
    println!();
    match (&result.value, &result.excluded) {
        (Some(value), _) => println!("Key: {}", describe(value)),
        (None, Some(path)) => println!("Not indexed: field {} is missing", path),
        (None, None) => println!("No key derived"),
    }
}

fn describe(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => format!("S {:?}", s),
        AttributeValue::N(n) => format!("N {}", n),
        AttributeValue::B(b) => format!("B {} bytes", b.len()),
        other => format!("{} {:?}", other.type_tag(), other),
    }
}
