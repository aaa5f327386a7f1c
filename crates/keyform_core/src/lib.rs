//! # Keyform Core
//!
//! Key-pattern compiler and derivation engine for Keyform.
//!
//! This crate provides:
//! - Pattern parsing (`ORDER#{tenant}#{createdAt:utc:unixnano:%020d}`)
//! - Type-aware conversion of field references into key encodings
//! - Sortability checks for keys used in sort-key position
//! - Key derivation from stored attribute maps, with sparse-index semantics
//! - Index compilation and a sealable registry of compiled entities
//!
//! The parser, conversion engine, advisor and extractor are pure and never
//! log. The index compiler, maintenance and registry layers report through
//! `tracing`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod convert;
mod error;
pub mod extract;
pub mod index;
pub mod pattern;
mod registry;
pub mod schema;
pub mod sortability;
mod value;

pub use config::CompilerConfig;
pub use convert::{
    convert, convert_from, convert_key_field, ConversionDescriptor, Expression,
    KeyFieldConversion, ValueLookup, ValueSource, WidthSpec,
};
pub use error::{ConversionError, CoreError, CoreResult, EvalError, ExtractError, ParseError};
pub use extract::{ExtractionNode, KeyExtractor};
pub use index::{
    CompiledEntity, CompiledIndex, CompiledKey, ConversionSide, DerivedKey, DerivedKeys,
    EntityDefinition, FieldConversion, IndexCompiler, IndexDefinition, IndexParticipation,
    IndexRole, KeyDefinition, KeyRole,
};
pub use pattern::{parse, FieldRef, PatternSpec, Segment};
pub use registry::IndexRegistry;
pub use schema::{FieldTypeTable, SchemaProvider, SemanticType};
pub use sortability::{check_sort_safety, check_spec, SortabilityDiagnostic, UnsafeCondition};
pub use value::FieldValue;

pub use keyform_attr::{AttributeKind, AttributeMap, AttributeValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
