use super::{Property, PropertyTy};
use crate::{stmt::Value, Error, Result};

use std::{
    collections::HashSet,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// User construction logic, run when the application creates a new
/// instance. Never run for instances materialized from rows.
pub type InitHook = Arc<dyn Fn(&mut dyn Attributes) -> Result<()> + Send + Sync>;

/// Static mapping metadata for one entity type.
pub struct Entity {
    /// Uniquely identifies the entity within the process.
    pub id: EntityId,

    /// Name of the entity
    pub name: String,

    /// Name of the table storing the entity
    pub table: String,

    /// Mapped properties, in declaration order.
    pub properties: Vec<Property>,

    /// Indices into `properties` of the fields forming the identity key.
    pub primary_key: Vec<usize>,

    pub kind: EntityKind,

    on_init: Option<InitHook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Can be instantiated.
    Concrete,

    /// Describes shared mapping only; instances cannot be allocated.
    Abstract,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// The application-facing view of an instance's attributes.
///
/// Writes through this trait are tracked as changes.
pub trait Attributes {
    /// The descriptor of the instance's entity.
    fn entity(&self) -> &Entity;

    /// Returns the attribute's value, or `None` if it has not been loaded or
    /// set.
    fn get(&self, name: &str) -> Option<&Value>;

    /// Assigns an attribute and marks it as changed.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;
}

pub struct EntityBuilder {
    name: String,
    table: Option<String>,
    properties: Vec<Property>,
    primary_key: Vec<String>,
    kind: EntityKind,
    on_init: Option<InitHook>,
}

impl Entity {
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder {
            name: name.into(),
            table: None,
            properties: vec![],
            primary_key: vec![],
            kind: EntityKind::Concrete,
            on_init: None,
        }
    }

    #[track_caller]
    pub fn property(&self, index: usize) -> &Property {
        &self.properties[index]
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|property| property.name == name)
    }

    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.name == name)
    }

    /// Iterate over the properties forming the identity key.
    pub fn primary_key_properties(&self) -> impl ExactSizeIterator<Item = &'_ Property> {
        self.primary_key
            .iter()
            .map(|index| &self.properties[*index])
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, EntityKind::Abstract)
    }

    pub fn on_init(&self) -> Option<&InitHook> {
        self.on_init.as_ref()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("table", &self.table)
            .field("properties", &self.properties)
            .field("primary_key", &self.primary_key)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl EntityId {
    /// Generate a process-wide unique entity ID.
    fn next() -> EntityId {
        static NEXT_ENTITY_ID: AtomicUsize = AtomicUsize::new(0);

        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl From<&Self> for EntityId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&Entity> for EntityId {
    fn from(value: &Entity) -> Self {
        value.id
    }
}

impl From<&Arc<Entity>> for EntityId {
    fn from(value: &Arc<Entity>) -> Self {
        value.id
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "EntityId({})", self.0)
    }
}

impl EntityBuilder {
    pub(super) fn name(&self) -> &str {
        &self.name
    }

    /// Set the table name. Defaults to the entity name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Names the properties forming the identity key, in key order.
    pub fn primary_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn abstract_entity(mut self) -> Self {
        self.kind = EntityKind::Abstract;
        self
    }

    /// Construction logic run by `Instance::new`.
    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn Attributes) -> Result<()> + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(f));
        self
    }

    pub(super) fn build(self) -> Result<Entity> {
        let invalid = |message: String| Err(Error::invalid_schema(message));

        let mut property_names = HashSet::new();
        let mut column_names = HashSet::new();

        for property in &self.properties {
            if !property_names.insert(property.name.as_str()) {
                return invalid(format!(
                    "property `{}.{}` is declared twice",
                    self.name, property.name
                ));
            }

            if let PropertyTy::Composite(composite) = &property.ty {
                if composite.columns.is_empty() || composite.columns.len() != composite.arity {
                    return invalid(format!(
                        "composite property `{}.{}` maps {} columns but its constructor takes {} arguments",
                        self.name,
                        property.name,
                        composite.columns.len(),
                        composite.arity
                    ));
                }
            }

            for column in property.columns() {
                if !column.ty.is_scalar() {
                    return invalid(format!(
                        "column `{}` of `{}.{}` must have a scalar type; ty={:?}",
                        column.name, self.name, property.name, column.ty
                    ));
                }

                if !column_names.insert(column.name.as_str()) {
                    return invalid(format!(
                        "column `{}` is mapped twice in `{}`",
                        column.name, self.name
                    ));
                }
            }
        }

        if self.primary_key.is_empty() {
            return invalid(format!("entity `{}` has no primary key", self.name));
        }

        let mut primary_key = Vec::with_capacity(self.primary_key.len());

        for name in &self.primary_key {
            let Some(index) = self.properties.iter().position(|p| &p.name == name) else {
                return invalid(format!(
                    "primary key of `{}` references unknown property `{name}`",
                    self.name
                ));
            };

            let property = &self.properties[index];

            match &property.ty {
                PropertyTy::Composite(_) => {
                    return invalid(format!(
                        "primary key property `{}.{name}` must be simple",
                        self.name
                    ))
                }
                PropertyTy::Simple(column) if column.nullable => {
                    return invalid(format!(
                        "primary key property `{}.{name}` must not be nullable",
                        self.name
                    ))
                }
                PropertyTy::Simple(_) if property.deferred => {
                    return invalid(format!(
                        "primary key property `{}.{name}` cannot be deferred",
                        self.name
                    ))
                }
                PropertyTy::Simple(_) => {}
            }

            if primary_key.contains(&index) {
                return invalid(format!(
                    "primary key of `{}` lists `{name}` twice",
                    self.name
                ));
            }

            primary_key.push(index);
        }

        let table = self.table.unwrap_or_else(|| self.name.clone());

        Ok(Entity {
            id: EntityId::next(),
            name: self.name,
            table,
            properties: self.properties,
            primary_key,
            kind: self.kind,
            on_init: self.on_init,
        })
    }
}
