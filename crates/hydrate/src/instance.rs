use crate::{engine::EntityKey, Load};

use by_address::ByAddress;
use hydrate_core::{
    bail,
    schema::{Attributes, Entity, PropertyTy},
    stmt::Value,
    Error, Result,
};
use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
    sync::Arc,
};

/// A domain-object instance of a mapped entity.
///
/// Every attribute slot starts out unset. Slots written by the engine while
/// materializing a row are loaded but not dirty; slots written by the
/// application through [`Instance::set`] are dirty.
pub struct Instance {
    entity: Arc<Entity>,

    /// One slot per property, in declaration order. `None` means the slot
    /// was never loaded or set.
    attrs: Vec<Option<Value>>,

    /// Tracks the slots written by the application.
    dirty: Vec<bool>,
}

/// A shared handle to an [`Instance`].
///
/// Handles compare and hash by address: two handles are equal only when they
/// refer to the same in-memory instance.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef(ByAddress<Rc<RefCell<Instance>>>);

impl Instance {
    /// Creates an instance the way application code does: the entity's
    /// construction hook runs and every attribute it sets is dirty.
    pub fn new(entity: &Arc<Entity>) -> Result<Instance> {
        if entity.is_abstract() {
            return Err(Error::allocation(&entity.name, "entity is abstract"));
        }

        let mut instance = Instance::blank(entity.clone());

        if let Some(on_init) = entity.on_init() {
            on_init(&mut instance)?;
        }

        Ok(instance)
    }

    /// Allocates an instance with every slot unset, running no user logic.
    pub(crate) fn blank(entity: Arc<Entity>) -> Instance {
        let len = entity.properties.len();

        Instance {
            entity,
            attrs: vec![None; len],
            dirty: vec![false; len],
        }
    }

    pub fn entity(&self) -> &Arc<Entity> {
        &self.entity
    }

    /// Reads an attribute. Returns `Ok(None)` if the attribute was never
    /// loaded or set.
    pub fn get<T: Load>(&self, name: &str) -> Result<Option<T>> {
        let index = self.index_of(name)?;

        match &self.attrs[index] {
            Some(value) => T::load(value.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the raw attribute value, if loaded or set.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        let index = self.entity.property_index(name)?;
        self.attrs[index].as_ref()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Assigns an attribute and records the change.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(name)?;
        let value = value.into();
        let property = self.entity.property(index);

        if let PropertyTy::Simple(column) = &property.ty {
            if value.is_null() && !column.nullable {
                bail!(
                    "property `{}.{}` is not nullable",
                    self.entity.name,
                    property.name
                );
            }

            if !column.ty.accepts(&value) {
                bail!(
                    "cannot assign {:?} to `{}.{}` of type {:?}",
                    value.infer_ty(),
                    self.entity.name,
                    property.name,
                    column.ty
                );
            }
        }

        self.attrs[index] = Some(value);
        self.dirty[index] = true;
        Ok(())
    }

    /// Returns `true` if the application changed any attribute.
    pub fn is_dirty(&self) -> bool {
        self.dirty.iter().any(|dirty| *dirty)
    }

    pub fn is_attr_dirty(&self, name: &str) -> bool {
        self.entity
            .property_index(name)
            .is_some_and(|index| self.dirty[index])
    }

    /// Names of the properties changed by the application, in declaration
    /// order.
    pub fn dirty_properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.entity
            .properties
            .iter()
            .zip(&self.dirty)
            .filter(|(_, dirty)| **dirty)
            .map(|(property, _)| property.name.as_str())
    }

    /// The identity key of the instance, if every key attribute is set.
    pub fn key(&self) -> Option<EntityKey> {
        let values = self
            .entity
            .primary_key
            .iter()
            .map(|index| self.attrs[*index].clone())
            .collect::<Option<Vec<_>>>()?;

        Some(EntityKey::new(self.entity.id, values))
    }

    /// Writes a slot on behalf of the engine. The slot is not marked dirty,
    /// and any pending application change to it is discarded.
    pub(crate) fn load_attr(&mut self, index: usize, value: Value) {
        self.attrs[index] = Some(value);
        self.dirty[index] = false;
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        match self.entity.property_index(name) {
            Some(index) => Ok(index),
            None => bail!("`{}` has no property `{name}`", self.entity.name),
        }
    }
}

impl Attributes for Instance {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.attr(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        Instance::set(self, name, value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(&self.entity.name);
        let mut unloaded = false;

        for (property, attr) in self.entity.properties.iter().zip(&self.attrs) {
            match attr {
                Some(value) => {
                    s.field(&property.name, value);
                }
                None => unloaded = true,
            }
        }

        if unloaded {
            s.finish_non_exhaustive()
        } else {
            s.finish()
        }
    }
}

impl InstanceRef {
    pub(crate) fn new(instance: Instance) -> InstanceRef {
        InstanceRef(ByAddress(Rc::new(RefCell::new(instance))))
    }

    /// Immutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, Instance> {
        self.0.borrow()
    }

    /// Mutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, Instance> {
        self.0.borrow_mut()
    }

    pub(crate) fn try_borrow_mut(&self) -> Option<RefMut<'_, Instance>> {
        self.0.try_borrow_mut().ok()
    }

    /// Returns `true` if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &InstanceRef) -> bool {
        Rc::ptr_eq(&self.0 .0, &other.0 .0)
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(instance) => fmt::Debug::fmt(&*instance, f),
            Err(_) => f.write_str("InstanceRef(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_core::{
        schema::{Column, Property},
        stmt::Type,
        Registry,
    };
    use pretty_assertions::assert_eq;

    fn user(registry: &mut Registry) -> Arc<Entity> {
        registry
            .register(
                Entity::builder("User")
                    .property(Property::column("id", Type::I64))
                    .property(Property::simple(
                        "nickname",
                        Column::new("nickname", Type::String).nullable(),
                    ))
                    .primary_key(["id"])
                    .on_init(|attrs| attrs.set("nickname", Value::from("anonymous"))),
            )
            .unwrap()
    }

    #[test]
    fn new_runs_the_construction_hook() {
        let mut registry = Registry::new();
        let user = user(&mut registry);

        let instance = Instance::new(&user).unwrap();

        assert_eq!(
            instance.get::<String>("nickname").unwrap().as_deref(),
            Some("anonymous")
        );
        assert!(instance.is_attr_dirty("nickname"));
        assert!(!instance.is_loaded("id"));
        assert_eq!(instance.key(), None);
    }

    #[test]
    fn blank_instances_are_clean() {
        let mut registry = Registry::new();
        let user = user(&mut registry);

        let mut instance = Instance::blank(user.clone());
        assert!(!instance.is_dirty());
        assert_eq!(instance.get::<String>("nickname").unwrap(), None);

        instance.load_attr(0, Value::I64(7));
        assert!(!instance.is_dirty());
        assert_eq!(instance.key(), Some(EntityKey::new(user.id, vec![Value::I64(7)])));
    }

    #[test]
    fn set_checks_type_and_nullability() {
        let mut registry = Registry::new();
        let user = user(&mut registry);
        let mut instance = Instance::blank(user);

        assert!(instance.set("id", "seven").is_err());
        assert!(instance.set("id", Value::Null).is_err());
        assert!(instance.set("missing", 1_i64).is_err());

        instance.set("nickname", Value::Null).unwrap();
        instance.set("id", 7_i64).unwrap();

        assert_eq!(instance.dirty_properties().collect::<Vec<_>>(), ["id", "nickname"]);
    }

    #[test]
    fn handles_compare_by_address() {
        let mut registry = Registry::new();
        let user = user(&mut registry);

        let a = InstanceRef::new(Instance::blank(user.clone()));
        let b = InstanceRef::new(Instance::blank(user));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn debug_lists_loaded_attributes() {
        let mut registry = Registry::new();
        let user = user(&mut registry);
        let mut instance = Instance::blank(user);
        instance.load_attr(0, Value::I64(1));

        assert_eq!(format!("{instance:?}"), "User { id: I64(1), .. }");
    }
}
