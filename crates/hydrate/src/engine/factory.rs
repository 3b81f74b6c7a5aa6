use crate::Instance;

use hydrate_core::{schema::Entity, Error, Result};
use std::sync::Arc;

/// Allocates blank instances for the engine to populate.
///
/// Allocation must not run any user construction logic: materialized
/// instances represent rows that already exist.
pub trait Allocate {
    fn allocate(&self, entity: &Arc<Entity>) -> Result<Instance>;

    /// Checks up front that `entity` can be allocated, so that a
    /// configuration error is reported before any row is read.
    fn can_allocate(&self, entity: &Arc<Entity>) -> Result<()> {
        self.allocate(entity).map(drop)
    }
}

impl<T: Allocate + ?Sized> Allocate for &T {
    fn allocate(&self, entity: &Arc<Entity>) -> Result<Instance> {
        (**self).allocate(entity)
    }

    fn can_allocate(&self, entity: &Arc<Entity>) -> Result<()> {
        (**self).can_allocate(entity)
    }
}

/// The default factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstanceFactory;

impl Allocate for InstanceFactory {
    fn allocate(&self, entity: &Arc<Entity>) -> Result<Instance> {
        self.can_allocate(entity)?;
        Ok(Instance::blank(entity.clone()))
    }

    fn can_allocate(&self, entity: &Arc<Entity>) -> Result<()> {
        if entity.is_abstract() {
            return Err(Error::allocation(&entity.name, "entity is abstract"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_core::{
        schema::{Entity, Property},
        stmt::Type,
        Registry,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn allocation_skips_the_construction_hook() {
        static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = Registry::new();
        let user = registry
            .register(
                Entity::builder("User")
                    .property(Property::column("id", Type::I64))
                    .primary_key(["id"])
                    .on_init(|_| {
                        HOOK_CALLS.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    }),
            )
            .unwrap();

        let instance = InstanceFactory.allocate(&user).unwrap();

        assert_eq!(HOOK_CALLS.load(Ordering::Relaxed), 0);
        assert!(!instance.is_loaded("id"));
        assert!(!instance.is_dirty());
    }

    #[test]
    fn abstract_entities_cannot_be_allocated() {
        let mut registry = Registry::new();
        let shape = registry
            .register(
                Entity::builder("Shape")
                    .property(Property::column("id", Type::I64))
                    .primary_key(["id"])
                    .abstract_entity(),
            )
            .unwrap();

        let err = InstanceFactory.allocate(&shape).unwrap_err();
        assert!(err.is_allocation());
        assert_eq!(
            err.to_string(),
            "cannot allocate instance of `Shape`: entity is abstract"
        );
        assert!(InstanceFactory.can_allocate(&shape).is_err());
    }
}
