use crate::{Instance, InstanceRef};

use hydrate_core::{schema::EntityId, stmt::Value, Result};
use indexmap::{map::Entry, IndexMap};

/// The identity of one entity instance: its entity and primary-key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub entity: EntityId,

    /// Decoded key values, in primary-key order.
    pub values: Vec<Value>,
}

/// Whether [`IdentityMap::resolve_or_insert`] found an existing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hit,
    Miss,
}

/// Instances loaded within one unit of work, by identity.
///
/// Holds at most one instance per [`EntityKey`]. Instances are kept until
/// the map is cleared or dropped; iteration follows load order.
#[derive(Debug, Default)]
pub struct IdentityMap {
    instances: IndexMap<EntityKey, InstanceRef>,
}

impl EntityKey {
    pub fn new(entity: impl Into<EntityId>, values: Vec<Value>) -> EntityKey {
        EntityKey {
            entity: entity.into(),
            values,
        }
    }
}

impl Resolution {
    pub fn is_hit(self) -> bool {
        matches!(self, Resolution::Hit)
    }

    pub fn is_miss(self) -> bool {
        matches!(self, Resolution::Miss)
    }
}

impl IdentityMap {
    pub fn new() -> IdentityMap {
        IdentityMap::default()
    }

    /// Returns the instance registered under `key`, building and registering
    /// one with `build` if there is none.
    ///
    /// `build` is not called on a hit. If it fails, nothing is registered
    /// and the error is returned.
    pub fn resolve_or_insert<F>(&mut self, key: EntityKey, build: F) -> Result<(InstanceRef, Resolution)>
    where
        F: FnOnce(&EntityKey) -> Result<Instance>,
    {
        match self.instances.entry(key) {
            Entry::Occupied(entry) => Ok((entry.get().clone(), Resolution::Hit)),
            Entry::Vacant(entry) => {
                let instance = InstanceRef::new(build(entry.key())?);
                entry.insert(instance.clone());
                Ok((instance, Resolution::Miss))
            }
        }
    }

    pub fn get(&self, key: &EntityKey) -> Option<&InstanceRef> {
        self.instances.get(key)
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.instances.contains_key(key)
    }

    /// Iterates instances in the order they were loaded.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&EntityKey, &InstanceRef)> + '_ {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Releases every instance. Called when the unit of work ends.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_core::{
        err,
        schema::{Entity, Property},
        stmt::Type,
        Registry,
    };
    use std::{cell::Cell, sync::Arc};

    fn user(registry: &mut Registry) -> Arc<Entity> {
        registry
            .register(
                Entity::builder("User")
                    .property(Property::column("id", Type::I64))
                    .primary_key(["id"]),
            )
            .unwrap()
    }

    #[test]
    fn hit_returns_the_registered_instance_without_building() {
        let mut registry = Registry::new();
        let user = user(&mut registry);
        let mut map = IdentityMap::new();
        let builds = Cell::new(0);

        let build = |_: &EntityKey| {
            builds.set(builds.get() + 1);
            Ok(Instance::blank(user.clone()))
        };

        let key = EntityKey::new(&user, vec![Value::I64(1)]);
        let (first, resolution) = map.resolve_or_insert(key.clone(), build).unwrap();
        assert!(resolution.is_miss());

        let (second, resolution) = map.resolve_or_insert(key.clone(), build).unwrap();
        assert!(resolution.is_hit());

        assert!(first.ptr_eq(&second));
        assert_eq!(builds.get(), 1);
        assert_eq!(map.len(), 1);
        assert!(map.contains(&key));
    }

    #[test]
    fn failed_build_registers_nothing() {
        let mut registry = Registry::new();
        let user = user(&mut registry);
        let mut map = IdentityMap::new();
        let key = EntityKey::new(&user, vec![Value::I64(1)]);

        let err = map
            .resolve_or_insert(key.clone(), |_| Err(err!("bad row")))
            .unwrap_err();
        assert_eq!(err.to_string(), "bad row");
        assert!(map.is_empty());

        let (_, resolution) = map
            .resolve_or_insert(key, |_| Ok(Instance::blank(user.clone())))
            .unwrap();
        assert!(resolution.is_miss());
    }

    #[test]
    fn keys_are_scoped_to_the_entity() {
        let mut registry = Registry::new();
        let user = user(&mut registry);
        let mut map = IdentityMap::new();

        map.resolve_or_insert(EntityKey::new(&user, vec![Value::I64(1)]), |_| {
            Ok(Instance::blank(user.clone()))
        })
        .unwrap();

        let other = EntityKey::new(EntityId(user.id.0 + 1000), vec![Value::I64(1)]);
        assert!(map.get(&other).is_none());

        map.clear();
        assert!(map.is_empty());
    }
}
