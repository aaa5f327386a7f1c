//! Index definitions, compilation and maintenance.
//!
//! An entity declares one primary index and any number of secondary
//! indexes. Each index has a partition key and an optional sort key, and
//! each key is an attribute name plus a pattern.
//!
//! [`IndexCompiler`] checks the patterns against a schema and produces a
//! [`CompiledEntity`], which can then
//! - render keys from typed values ([`CompiledKey::render`]), and
//! - derive all key attributes of a stored record
//!   ([`CompiledEntity::derive_keys`]).
//!
//! # Sparse indexes
//!
//! A record that lacks a field a secondary index needs is simply absent
//! from that index. The same gap in the primary index is an error, since
//! every record must have a primary key.

mod compiler;
mod maintenance;

pub use compiler::{
    CompiledEntity, CompiledIndex, CompiledKey, ConversionSide, FieldConversion, IndexCompiler,
    KeyPart,
};
pub use maintenance::{DerivedKey, DerivedKeys, IndexParticipation};

use keyform_attr::AttributeKind;
use std::fmt;

/// Whether an index is the entity's primary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRole {
    /// The primary index; every record must have its keys.
    Primary,
    /// A sparse secondary index.
    Secondary,
}

impl fmt::Display for IndexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexRole::Primary => f.write_str("primary"),
            IndexRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// The position of a key within its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Partition (hash) key.
    Partition,
    /// Sort (range) key; collates byte-wise.
    Sort,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Partition => f.write_str("partition"),
            KeyRole::Sort => f.write_str("sort"),
        }
    }
}

/// One key attribute and the pattern that builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    /// Name of the stored attribute.
    pub attribute: String,
    /// Key pattern, e.g. `ORDER#{id}`.
    pub pattern: String,
    /// Attribute kind; `None` uses the compiler's default.
    pub kind: Option<AttributeKind>,
}

impl KeyDefinition {
    /// Creates a key definition with the default attribute kind.
    pub fn new(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            pattern: pattern.into(),
            kind: None,
        }
    }

    /// Sets the attribute kind.
    #[must_use]
    pub fn with_kind(mut self, kind: AttributeKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A named index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Index name, unique within the entity.
    pub name: String,
    /// Partition key.
    pub partition: KeyDefinition,
    /// Optional sort key.
    pub sort: Option<KeyDefinition>,
}

impl IndexDefinition {
    /// Creates an index with only a partition key.
    pub fn new(name: impl Into<String>, partition: KeyDefinition) -> Self {
        Self {
            name: name.into(),
            partition,
            sort: None,
        }
    }

    /// Adds a sort key.
    #[must_use]
    pub fn with_sort(mut self, sort: KeyDefinition) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// An entity's key layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinition {
    /// Entity label, e.g. `Order`.
    pub label: String,
    /// Primary index.
    pub primary: IndexDefinition,
    /// Secondary indexes.
    pub secondaries: Vec<IndexDefinition>,
}

impl EntityDefinition {
    /// Creates an entity with only a primary index.
    pub fn new(label: impl Into<String>, primary: IndexDefinition) -> Self {
        Self {
            label: label.into(),
            primary,
            secondaries: Vec::new(),
        }
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn with_secondary(mut self, index: IndexDefinition) -> Self {
        self.secondaries.push(index);
        self
    }
}
