//! Deriving index keys from stored records.

use super::{CompiledEntity, IndexRole};
use crate::error::{CoreError, CoreResult, ExtractError};
use keyform_attr::{AttributeMap, AttributeValue};
use tracing::trace;

/// Whether a record appears in an index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexParticipation {
    /// The record is indexed under these key attributes.
    Included(Vec<(String, AttributeValue)>),
    /// The record lacks a field the index needs.
    Excluded {
        /// Dotted path of the missing field.
        missing: String,
    },
}

impl IndexParticipation {
    /// Returns true if the record is indexed.
    #[must_use]
    pub fn is_included(&self) -> bool {
        matches!(self, IndexParticipation::Included(_))
    }
}

/// The outcome for one index.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedKey {
    /// Index name.
    pub index: String,
    /// Index role.
    pub role: IndexRole,
    /// Whether and how the record is indexed.
    pub participation: IndexParticipation,
}

/// The key attributes of one record across all indexes of its entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedKeys {
    keys: Vec<DerivedKey>,
}

impl DerivedKeys {
    /// Returns the per-index outcomes, primary first.
    #[must_use]
    pub fn keys(&self) -> &[DerivedKey] {
        &self.keys
    }

    /// Returns the outcome for an index.
    #[must_use]
    pub fn get(&self, index: &str) -> Option<&DerivedKey> {
        self.keys.iter().find(|key| key.index == index)
    }

    /// Returns the names of indexes the record is excluded from.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|key| !key.participation.is_included())
            .map(|key| key.index.as_str())
    }

    /// Returns every key attribute to merge into the stored item.
    ///
    /// The compiler rejects entities whose keys write one attribute with
    /// different patterns, so no index overwrites another here.
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        self.keys
            .iter()
            .filter_map(|key| match &key.participation {
                IndexParticipation::Included(attributes) => Some(attributes.iter().cloned()),
                IndexParticipation::Excluded { .. } => None,
            })
            .flatten()
            .collect()
    }
}

impl CompiledEntity {
    /// Derives the key attributes of every index for a stored record.
    ///
    /// A missing field excludes the record from a secondary index; any other
    /// failure, and any failure on the primary index, is an error.
    pub fn derive_keys(&self, record: &AttributeMap) -> CoreResult<DerivedKeys> {
        let primary = self.primary();
        let attributes = primary.extract(record).map_err(|error| CoreError::PrimaryKey {
            entity: self.label().to_string(),
            error,
        })?;

        let mut keys = Vec::with_capacity(1 + self.secondaries().len());
        keys.push(DerivedKey {
            index: primary.name().to_string(),
            role: IndexRole::Primary,
            participation: IndexParticipation::Included(attributes),
        });

        for index in self.secondaries() {
            let participation = match index.extract(record) {
                Ok(attributes) => IndexParticipation::Included(attributes),
                Err(ExtractError::FieldNotFound { path }) => {
                    trace!(
                        entity = self.label(),
                        index = index.name(),
                        missing = %path,
                        "record excluded from sparse index"
                    );
                    IndexParticipation::Excluded { missing: path }
                }
                Err(error) => return Err(error.into()),
            };
            keys.push(DerivedKey {
                index: index.name().to_string(),
                role: IndexRole::Secondary,
                participation,
            });
        }

        Ok(DerivedKeys { keys })
    }
}
