//! CLI command implementations.

pub mod check;
pub mod extract;
pub mod inspect;
pub mod render;

use keyform_core::{FieldTypeTable, FieldValue, SchemaProvider, SemanticType};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Errors in command-line arguments.
#[derive(Debug, Error)]
pub enum ArgError {
    /// A `path=value` argument had no `=`.
    #[error("expected path=value, got {arg:?}")]
    MissingSeparator {
        /// The argument as given.
        arg: String,
    },

    /// A value was given for a field with no declared type.
    #[error("no --field type declared for {path:?}")]
    UndeclaredField {
        /// Field path.
        path: String,
    },

    /// A value did not parse as its field's type.
    #[error("{value:?} is not a valid {semantic_type} for {path:?}")]
    InvalidValue {
        /// Field path.
        path: String,
        /// Declared type.
        semantic_type: String,
        /// The value as given.
        value: String,
    },
}

fn split_pair(arg: &str) -> Result<(&str, &str), ArgError> {
    arg.split_once('=').ok_or_else(|| ArgError::MissingSeparator {
        arg: arg.to_string(),
    })
}

/// Parses `path=type` arguments into a schema.
pub fn parse_field_types(args: &[String]) -> Result<FieldTypeTable, ArgError> {
    let mut table = FieldTypeTable::new();
    for arg in args {
        let (path, ty) = split_pair(arg)?;
        table.insert(path, SemanticType::from(ty));
    }
    Ok(table)
}

/// Parses `path=value` arguments according to the declared field types.
///
/// Integers and floats are decimal; timestamps are RFC 3339; booleans are
/// `true` or `false`; anything else is text.
pub fn parse_values(
    args: &[String],
    schema: &FieldTypeTable,
) -> Result<HashMap<String, FieldValue>, ArgError> {
    let mut values = HashMap::new();
    for arg in args {
        let (path, raw) = split_pair(arg)?;
        let ty = schema
            .field_type(path)
            .ok_or_else(|| ArgError::UndeclaredField {
                path: path.to_string(),
            })?;
        let invalid = || ArgError::InvalidValue {
            path: path.to_string(),
            semantic_type: ty.to_string(),
            value: raw.to_string(),
        };

        let value = match &ty {
            SemanticType::Text => FieldValue::from(raw),
            SemanticType::Integer { signed: true, .. } => {
                FieldValue::Int(raw.parse().map_err(|_| invalid())?)
            }
            SemanticType::Integer { signed: false, .. } => {
                FieldValue::UInt(raw.parse().map_err(|_| invalid())?)
            }
            SemanticType::Float { .. } => FieldValue::Float(raw.parse().map_err(|_| invalid())?),
            SemanticType::Temporal => {
                FieldValue::Timestamp(OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| invalid())?)
            }
            SemanticType::Other(name) if name == "bool" => {
                FieldValue::Bool(raw.parse().map_err(|_| invalid())?)
            }
            SemanticType::Other(_) => FieldValue::from(raw),
        };
        values.insert(path.to_string(), value);
    }
    Ok(values)
}

/// Prints a report as pretty JSON or through its text printer.
pub fn emit<T: Serialize>(
    report: &T,
    format: &str,
    print_text: impl FnOnce(&T),
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        _ => print_text(report),
    }
    Ok(())
}
