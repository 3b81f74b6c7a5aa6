mod column;
pub use column::Column;

mod entity;
pub use entity::{Attributes, Entity, EntityBuilder, EntityId, EntityKind, InitHook};

mod property;
pub use property::{Composite, Constructor, Property, PropertyTy};

use crate::Result;
use indexmap::IndexMap;
use std::sync::Arc;

/// Owns every registered entity descriptor.
///
/// Descriptors are validated when registered and immutable afterwards. The
/// registry hands out `Arc` handles so the engine can hold on to a descriptor
/// for the duration of a query execution without borrowing the registry.
#[derive(Debug, Default)]
pub struct Registry {
    entities: IndexMap<EntityId, Arc<Entity>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers an entity definition.
    pub fn register(&mut self, builder: EntityBuilder) -> Result<Arc<Entity>> {
        if self.entity_by_name(builder.name()).is_some() {
            return Err(crate::Error::invalid_schema(format!(
                "entity `{}` is already registered",
                builder.name()
            )));
        }

        let entity = Arc::new(builder.build()?);

        tracing::debug!(
            entity = %entity.name,
            id = ?entity.id,
            properties = entity.properties.len(),
            "registered entity"
        );

        self.entities.insert(entity.id, entity.clone());
        Ok(entity)
    }

    pub fn entity(&self, id: impl Into<EntityId>) -> Option<&Arc<Entity>> {
        self.entities.get(&id.into())
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Arc<Entity>> {
        self.entities.values().find(|entity| entity.name == name)
    }

    /// Iterates entities in registration order.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = &Arc<Entity>> + '_ {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
