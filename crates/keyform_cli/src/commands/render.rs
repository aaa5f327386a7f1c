//! Render command implementation.

use super::{parse_field_types, parse_values};
use keyform_attr::{AttributeKind, AttributeValue};
use keyform_core::{ConversionSide, EntityDefinition, IndexCompiler, IndexDefinition, KeyDefinition};
use serde::Serialize;
use tracing::info;

/// Key rendering result.
#[derive(Debug, Serialize)]
pub struct RenderResult {
    /// The pattern as written.
    pub pattern: String,
    /// Attribute kind tag.
    pub kind: String,
    /// Expression used for each field reference.
    pub expressions: Vec<String>,
    /// The rendered key attribute.
    pub key: AttributeValue,
}

/// Runs the render command.
pub fn run(
    pattern: &str,
    fields: &[String],
    values: &[String],
    kind: AttributeKind,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Rendering pattern {:?}", pattern);
    let result = render(pattern, fields, values, kind)?;
    super::emit(&result, format, print_text_output)
}

/// Compiles `pattern` as a single key and renders it from typed values
/// keyed by field path.
pub fn render(
    pattern: &str,
    fields: &[String],
    values: &[String],
    kind: AttributeKind,
) -> Result<RenderResult, Box<dyn std::error::Error>> {
    let schema = parse_field_types(fields)?;
    let lookup = parse_values(values, &schema)?;

    let definition = EntityDefinition::new(
        "cli",
        IndexDefinition::new("key", KeyDefinition::new("key", pattern).with_kind(kind)),
    );
    let entity = IndexCompiler::default().compile(&definition, &schema)?;
    let key = entity.primary().partition();

    Ok(RenderResult {
        pattern: key.spec().raw().to_string(),
        kind: key.kind().to_string(),
        expressions: key.fields().map(|f| f.entity.to_string()).collect(),
        key: key.render(ConversionSide::Entity, &lookup)?,
    })
}

fn print_text_output(result: &RenderResult) {
    println!("Key Rendering");
    println!("=============");
    println!();
    println!("Pattern: {}", result.pattern);
    println!("Kind:    {}", result.kind);
    for expression in &result.expressions {
        println!("  {}", expression);
    }
    println!();
    match &result.key {
        AttributeValue::S(s) => println!("Key: {}", s),
        AttributeValue::N(n) => println!("Key: {}", n),
        AttributeValue::B(b) => println!("Key: {} bytes", b.len()),
        other => println!("Key: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn renders_utc_epoch_key() {
        let result = render(
            "ORDER#{createdAt:utc:unixnano:%020d}",
            &args(&["createdAt=timestamp"]),
            &args(&["createdAt=2024-01-01T01:00:00+01:00"]),
            AttributeKind::String,
        )
        .unwrap();
        assert_eq!(
            result.key,
            AttributeValue::from("ORDER#01704067200000000000")
        );
        assert_eq!(
            result.expressions,
            vec!["printf(\"%020d\", unix_nanos(utc(record.createdAt)))".to_string()]
        );
    }

    #[test]
    fn renders_nested_paths() {
        let result = render(
            "C#{customer.id}#{n:%05d}",
            &args(&["customer.id=string", "n=u32"]),
            &args(&["customer.id=c-1", "n=42"]),
            AttributeKind::String,
        )
        .unwrap();
        assert_eq!(result.key, AttributeValue::from("C#c-1#00042"));
    }

    #[test]
    fn number_keys() {
        let result = render(
            "{n}",
            &args(&["n=i64"]),
            &args(&["n=-7"]),
            AttributeKind::Number,
        )
        .unwrap();
        assert_eq!(result.key, AttributeValue::N("-7".to_string()));

        assert!(render(
            "N#{n}",
            &args(&["n=i64"]),
            &args(&["n=7"]),
            AttributeKind::Number,
        )
        .is_err());
    }

    #[test]
    fn missing_value_fails() {
        assert!(render(
            "{id}",
            &args(&["id=string"]),
            &[],
            AttributeKind::String,
        )
        .is_err());
    }
}
