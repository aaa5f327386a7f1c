//! Index compilation.

use super::{EntityDefinition, IndexDefinition, IndexRole, KeyDefinition, KeyRole};
use crate::config::CompilerConfig;
use crate::convert::{convert_key_field, ConversionDescriptor, ValueLookup};
use crate::error::{CoreError, CoreResult, ExtractError};
use crate::extract::KeyExtractor;
use crate::pattern::{FieldRef, PatternSpec, Segment};
use crate::schema::{SchemaProvider, SemanticType};
use crate::sortability::{check_sort_safety, SortabilityDiagnostic};
use keyform_attr::{AttributeKind, AttributeMap, AttributeValue};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Which descriptor of a field conversion to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionSide {
    /// Values are looked up by parameter name.
    Parameter,
    /// Values are looked up by field path.
    Entity,
}

/// A field reference with both of its conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConversion {
    /// The reference.
    pub field: FieldRef,
    /// Type of the referenced field.
    pub semantic_type: SemanticType,
    /// Conversion reading a named parameter.
    pub parameter: ConversionDescriptor,
    /// Conversion reading a record field.
    pub entity: ConversionDescriptor,
}

impl FieldConversion {
    /// Returns the descriptor for `side`.
    #[must_use]
    pub fn descriptor(&self, side: ConversionSide) -> &ConversionDescriptor {
        match side {
            ConversionSide::Parameter => &self.parameter,
            ConversionSide::Entity => &self.entity,
        }
    }
}

/// One compiled piece of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    /// Verbatim text.
    Literal(String),
    /// A converted field reference.
    Field(FieldConversion),
}

/// A compiled key attribute.
#[derive(Debug, Clone)]
pub struct CompiledKey {
    attribute: String,
    role: KeyRole,
    spec: PatternSpec,
    parts: Vec<KeyPart>,
    extractor: KeyExtractor,
}

impl CompiledKey {
    /// Returns the stored attribute name.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns the key's position in its index.
    #[must_use]
    pub fn role(&self) -> KeyRole {
        self.role
    }

    /// Returns the parsed pattern.
    #[must_use]
    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    /// Returns the attribute kind produced.
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.spec.attribute_kind()
    }

    /// Returns the compiled parts in pattern order.
    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Iterates over the field conversions in pattern order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldConversion> {
        self.parts.iter().filter_map(|part| match part {
            KeyPart::Field(conversion) => Some(conversion),
            KeyPart::Literal(_) => None,
        })
    }

    /// Returns the extractor deriving this key from stored records.
    #[must_use]
    pub fn extractor(&self) -> &KeyExtractor {
        &self.extractor
    }

    /// Returns the begins-with prefix for range queries on this key.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.spec.leading_literal_prefix()
    }

    /// Builds the key attribute from typed values.
    ///
    /// Number keys must render to a decimal number string.
    pub fn render(&self, side: ConversionSide, lookup: &dyn ValueLookup) -> CoreResult<AttributeValue> {
        let mut text = String::new();
        for part in &self.parts {
            match part {
                KeyPart::Literal(value) => text.push_str(value),
                KeyPart::Field(conversion) => {
                    text.push_str(&conversion.descriptor(side).evaluate(lookup)?);
                }
            }
        }

        Ok(match self.kind() {
            AttributeKind::String => AttributeValue::S(text),
            AttributeKind::Number => AttributeValue::try_number(text)?,
            AttributeKind::Binary => AttributeValue::B(text.into_bytes().into()),
        })
    }
}

/// A compiled index.
#[derive(Debug, Clone)]
pub struct CompiledIndex {
    name: String,
    role: IndexRole,
    partition: CompiledKey,
    sort: Option<CompiledKey>,
}

impl CompiledIndex {
    /// Returns the index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this is the primary index.
    #[must_use]
    pub fn role(&self) -> IndexRole {
        self.role
    }

    /// Returns the partition key.
    #[must_use]
    pub fn partition(&self) -> &CompiledKey {
        &self.partition
    }

    /// Returns the sort key, if any.
    #[must_use]
    pub fn sort(&self) -> Option<&CompiledKey> {
        self.sort.as_ref()
    }

    /// Iterates over the partition key and then the sort key.
    pub fn keys(&self) -> impl Iterator<Item = &CompiledKey> {
        std::iter::once(&self.partition).chain(self.sort.as_ref())
    }

    /// Derives this index's key attributes from a stored record.
    pub fn extract(&self, record: &AttributeMap) -> Result<Vec<(String, AttributeValue)>, ExtractError> {
        self.keys()
            .map(|key| Ok((key.attribute.clone(), key.extractor.apply(record)?)))
            .collect()
    }
}

/// An entity whose indexes have been compiled.
#[derive(Debug, Clone)]
pub struct CompiledEntity {
    label: String,
    primary: CompiledIndex,
    secondaries: Vec<CompiledIndex>,
    diagnostics: Vec<SortabilityDiagnostic>,
}

impl CompiledEntity {
    /// Returns the entity label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the primary index.
    #[must_use]
    pub fn primary(&self) -> &CompiledIndex {
        &self.primary
    }

    /// Returns the secondary indexes in declaration order.
    #[must_use]
    pub fn secondaries(&self) -> &[CompiledIndex] {
        &self.secondaries
    }

    /// Iterates over all indexes, primary first.
    pub fn indexes(&self) -> impl Iterator<Item = &CompiledIndex> {
        std::iter::once(&self.primary).chain(self.secondaries.iter())
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&CompiledIndex> {
        self.indexes().find(|index| index.name == name)
    }

    /// Returns the sortability diagnostics found while compiling.
    #[must_use]
    pub fn diagnostics(&self) -> &[SortabilityDiagnostic] {
        &self.diagnostics
    }
}

/// Compiles entity definitions against a schema.
#[derive(Debug, Clone, Default)]
pub struct IndexCompiler {
    config: CompilerConfig,
}

impl IndexCompiler {
    /// Creates a compiler.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles every index of `definition`.
    ///
    /// Either all patterns compile or nothing does. Keys of different indexes
    /// may share an attribute only with the same pattern and kind.
    pub fn compile(
        &self,
        definition: &EntityDefinition,
        schema: &dyn SchemaProvider,
    ) -> CoreResult<CompiledEntity> {
        let label = definition.label.as_str();

        let mut names = HashSet::new();
        for index in std::iter::once(&definition.primary).chain(&definition.secondaries) {
            if !names.insert(index.name.as_str()) {
                return Err(CoreError::duplicate_index(label, &index.name));
            }
        }

        let mut diagnostics = Vec::new();
        let primary = self.compile_index(
            label,
            &definition.primary,
            IndexRole::Primary,
            schema,
            &mut diagnostics,
        )?;
        let secondaries = definition
            .secondaries
            .iter()
            .map(|index| {
                self.compile_index(label, index, IndexRole::Secondary, schema, &mut diagnostics)
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let mut attributes: HashMap<&str, &CompiledKey> = HashMap::new();
        for key in std::iter::once(&primary)
            .chain(&secondaries)
            .flat_map(|index| index.keys())
        {
            match attributes.get(key.attribute()) {
                Some(first) if first.spec.raw() != key.spec.raw() || first.kind() != key.kind() => {
                    return Err(CoreError::duplicate_key_attribute(
                        label,
                        key.attribute(),
                        first.spec.raw(),
                        key.spec.raw(),
                    ));
                }
                Some(_) => {}
                None => {
                    attributes.insert(key.attribute(), key);
                }
            }
        }

        if self.config.log_diagnostics {
            for diagnostic in &diagnostics {
                warn!(
                    entity = %diagnostic.entity,
                    field = %diagnostic.field,
                    condition = %diagnostic.condition,
                    suggestion = %diagnostic.suggestion,
                    "sort key will not collate in value order: {}",
                    diagnostic.cause
                );
            }
        }

        Ok(CompiledEntity {
            label: label.to_string(),
            primary,
            secondaries,
            diagnostics,
        })
    }

    fn compile_index(
        &self,
        label: &str,
        index: &IndexDefinition,
        role: IndexRole,
        schema: &dyn SchemaProvider,
        diagnostics: &mut Vec<SortabilityDiagnostic>,
    ) -> CoreResult<CompiledIndex> {
        let partition = self.compile_key(label, &index.partition, KeyRole::Partition, schema, diagnostics)?;
        let sort = index
            .sort
            .as_ref()
            .map(|key| self.compile_key(label, key, KeyRole::Sort, schema, diagnostics))
            .transpose()?;

        debug!(
            entity = label,
            index = %index.name,
            role = %role,
            partition = %partition.spec.raw(),
            sort = sort.as_ref().map(|key| key.spec.raw()),
            "compiled index"
        );

        Ok(CompiledIndex {
            name: index.name.clone(),
            role,
            partition,
            sort,
        })
    }

    fn compile_key(
        &self,
        label: &str,
        key: &KeyDefinition,
        role: KeyRole,
        schema: &dyn SchemaProvider,
        diagnostics: &mut Vec<SortabilityDiagnostic>,
    ) -> CoreResult<CompiledKey> {
        let kind = key.kind.unwrap_or(self.config.default_attribute_kind);
        let spec = PatternSpec::parse_with_kind(&key.pattern, kind)?;

        let mut parts = Vec::with_capacity(spec.segments().len());
        for segment in spec.segments() {
            let field = match segment {
                Segment::Literal { value, .. } => {
                    parts.push(KeyPart::Literal(value.clone()));
                    continue;
                }
                Segment::Field(field) => field,
            };

            let semantic_type = schema
                .field_type(field.path())
                .ok_or_else(|| CoreError::unknown_field(label, field.path()))?;
            let conversion = convert_key_field(field, &semantic_type)?;

            if role == KeyRole::Sort && self.config.check_sortability {
                diagnostics.extend(check_sort_safety(field, &semantic_type, label));
            }

            parts.push(KeyPart::Field(FieldConversion {
                field: field.clone(),
                semantic_type,
                parameter: conversion.parameter,
                entity: conversion.entity,
            }));
        }

        Ok(CompiledKey {
            attribute: key.attribute.clone(),
            role,
            extractor: KeyExtractor::build(&spec),
            spec,
            parts,
        })
    }
}
