//! Registry of compiled entities.
//!
//! The registry is an explicit context object. Assemble it at startup,
//! register every entity, then [`seal`](IndexRegistry::seal) it; after that
//! it is read-only and lookups never contend with writers.

use crate::error::{CoreError, CoreResult};
use crate::index::CompiledEntity;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Compiled entities keyed by label.
///
/// Many readers may look up entities concurrently; registrations are
/// serialized by the write lock.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    entities: RwLock<BTreeMap<String, Arc<CompiledEntity>>>,
    sealed: AtomicBool,
}

impl IndexRegistry {
    /// Creates an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled entity under its label.
    ///
    /// # Errors
    ///
    /// Returns `RegistrySealed` after [`seal`](Self::seal) and
    /// `DuplicateEntity` if the label is taken.
    pub fn register(&self, entity: CompiledEntity) -> CoreResult<Arc<CompiledEntity>> {
        let mut entities = self.entities.write();
        if self.sealed.load(Ordering::Acquire) {
            return Err(CoreError::RegistrySealed);
        }
        if entities.contains_key(entity.label()) {
            return Err(CoreError::duplicate_entity(entity.label()));
        }

        let label = entity.label().to_string();
        let entity = Arc::new(entity);
        entities.insert(label.clone(), Arc::clone(&entity));

        debug!(
            entity = %label,
            indexes = entity.indexes().count(),
            diagnostics = entity.diagnostics().len(),
            "registered entity"
        );
        Ok(entity)
    }

    /// Returns the entity registered under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Arc<CompiledEntity>> {
        self.entities.read().get(label).cloned()
    }

    /// Returns the entity registered under `label`, or `EntityNotFound`.
    pub fn require(&self, label: &str) -> CoreResult<Arc<CompiledEntity>> {
        self.get(label)
            .ok_or_else(|| CoreError::entity_not_found(label))
    }

    /// Returns all registered labels in sorted order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.entities.read().keys().cloned().collect()
    }

    /// Stops accepting registrations. Idempotent.
    pub fn seal(&self) {
        let entities = self.entities.write();
        if !self.sealed.swap(true, Ordering::AcqRel) {
            debug!(entities = entities.len(), "registry sealed");
        }
    }

    /// Returns true once the registry is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntityDefinition, IndexCompiler, IndexDefinition, KeyDefinition};
    use crate::schema::FieldTypeTable;

    fn compiled(label: &str) -> CompiledEntity {
        let schema: FieldTypeTable = [("id", "string")].into_iter().collect();
        let definition = EntityDefinition::new(
            label,
            IndexDefinition::new("primary", KeyDefinition::new("pk", "{id}")),
        );
        IndexCompiler::default().compile(&definition, &schema).unwrap()
    }

    #[test]
    fn register_and_get() {
        let registry = IndexRegistry::new();
        assert!(registry.is_empty());

        registry.register(compiled("User")).unwrap();
        registry.register(compiled("Order")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.labels(), ["Order", "User"]);
        assert_eq!(registry.get("User").unwrap().label(), "User");
        assert!(registry.get("Nope").is_none());
        assert!(matches!(
            registry.require("Nope"),
            Err(CoreError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_labels_rejected() {
        let registry = IndexRegistry::new();
        registry.register(compiled("User")).unwrap();
        assert!(matches!(
            registry.register(compiled("User")),
            Err(CoreError::DuplicateEntity { ref entity }) if entity == "User"
        ));
    }

    #[test]
    fn sealed_registry_rejects_registration() {
        let registry = IndexRegistry::new();
        registry.register(compiled("User")).unwrap();
        registry.seal();
        registry.seal();

        assert!(registry.is_sealed());
        assert!(matches!(
            registry.register(compiled("Order")),
            Err(CoreError::RegistrySealed)
        ));
        assert!(registry.get("User").is_some());
    }
}
