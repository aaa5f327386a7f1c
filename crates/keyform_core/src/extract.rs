//! Key derivation from stored records.
//!
//! Stored items are self-describing, so extraction needs no schema: an
//! [`ExtractionNode`] tree built once from a pattern walks each record's
//! attributes directly. Trees hold no mutable state and can be shared freely
//! across threads.

use crate::error::ExtractError;
use crate::pattern::{PatternSpec, Segment};
use keyform_attr::{is_number_string, AttributeKind, AttributeMap, AttributeValue};

/// A node of the derivation tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtractionNode {
    /// Fixed text.
    Literal(String),
    /// A field access path into nested maps.
    FieldPath(Vec<String>),
    /// The string forms of the children, joined.
    Concat(Vec<ExtractionNode>),
}

impl ExtractionNode {
    /// Builds the tree for a pattern.
    #[must_use]
    pub fn build(spec: &PatternSpec) -> Self {
        let mut children: Vec<Self> = spec
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal { value, .. } => ExtractionNode::Literal(value.clone()),
                Segment::Field(field) => ExtractionNode::FieldPath(
                    field.path_components().into_iter().map(str::to_string).collect(),
                ),
            })
            .collect();

        if children.len() == 1 {
            children.remove(0)
        } else {
            ExtractionNode::Concat(children)
        }
    }

    /// Derives an attribute of `kind` from `record`.
    pub fn apply(&self, kind: AttributeKind, record: &AttributeMap) -> Result<AttributeValue, ExtractError> {
        match self {
            ExtractionNode::FieldPath(path) => {
                let value = resolve(path, record)?;
                coerce_leaf(kind, path, value)
            }
            _ => coerce_text(kind, self.text(record)?),
        }
    }

    /// Returns the field paths this tree reads, in order.
    #[must_use]
    pub fn field_paths(&self) -> Vec<String> {
        match self {
            ExtractionNode::Literal(_) => Vec::new(),
            ExtractionNode::FieldPath(path) => vec![path.join(".")],
            ExtractionNode::Concat(children) => {
                children.iter().flat_map(ExtractionNode::field_paths).collect()
            }
        }
    }

    fn text(&self, record: &AttributeMap) -> Result<String, ExtractError> {
        match self {
            ExtractionNode::Literal(value) => Ok(value.clone()),
            ExtractionNode::FieldPath(path) => stringify(path, resolve(path, record)?),
            ExtractionNode::Concat(children) => children
                .iter()
                .map(|child| child.text(record))
                .collect::<Result<String, _>>(),
        }
    }
}

/// A derivation tree bound to the attribute kind it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyExtractor {
    kind: AttributeKind,
    root: ExtractionNode,
}

impl KeyExtractor {
    /// Builds an extractor for a pattern, producing the pattern's attribute kind.
    #[must_use]
    pub fn build(spec: &PatternSpec) -> Self {
        Self {
            kind: spec.attribute_kind(),
            root: ExtractionNode::build(spec),
        }
    }

    /// Returns the attribute kind produced.
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Returns the derivation tree.
    #[must_use]
    pub fn root(&self) -> &ExtractionNode {
        &self.root
    }

    /// Derives the key attribute from a stored record.
    pub fn apply(&self, record: &AttributeMap) -> Result<AttributeValue, ExtractError> {
        self.root.apply(self.kind, record)
    }
}

/// Walks nested maps. A null counts as absent.
fn resolve<'a>(path: &[String], record: &'a AttributeMap) -> Result<&'a AttributeValue, ExtractError> {
    let not_found = || ExtractError::field_not_found(path.join("."));
    let (last, parents) = path.split_last().ok_or_else(not_found)?;

    let mut map = record;
    for component in parents {
        map = map
            .get(component)
            .and_then(AttributeValue::as_m)
            .ok_or_else(not_found)?;
    }

    match map.get(last) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(not_found()),
    }
}

fn stringify(path: &[String], value: &AttributeValue) -> Result<String, ExtractError> {
    let unstringifiable = || ExtractError::UnstringifiableValue {
        path: path.join("."),
        actual: value.type_tag(),
    };
    match value {
        AttributeValue::S(s) | AttributeValue::N(s) => Ok(s.clone()),
        AttributeValue::Bool(b) => Ok(b.to_string()),
        AttributeValue::B(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| unstringifiable()),
        _ => Err(unstringifiable()),
    }
}

fn coerce_leaf(
    kind: AttributeKind,
    path: &[String],
    value: &AttributeValue,
) -> Result<AttributeValue, ExtractError> {
    match (kind, value) {
        (AttributeKind::Number, AttributeValue::N(_)) => Ok(value.clone()),
        (AttributeKind::Binary, AttributeValue::B(_)) => Ok(value.clone()),
        (AttributeKind::Binary, AttributeValue::S(s)) => Ok(AttributeValue::B(s.clone().into_bytes().into())),
        (AttributeKind::Binary, other) => Err(ExtractError::IncompatibleBinaryValue {
            path: path.join("."),
            actual: other.type_tag(),
        }),
        (kind, value) => coerce_text(kind, stringify(path, value)?),
    }
}

fn coerce_text(kind: AttributeKind, text: String) -> Result<AttributeValue, ExtractError> {
    match kind {
        AttributeKind::String => Ok(AttributeValue::S(text)),
        AttributeKind::Number if is_number_string(&text) => Ok(AttributeValue::N(text)),
        AttributeKind::Number => Err(ExtractError::IncompatibleNumberValue { value: text }),
        AttributeKind::Binary => Ok(AttributeValue::B(text.into_bytes().into())),
    }
}
