use crate::schema::{Entity, EntityId};

use std::{collections::BTreeSet, fmt};

/// The ordered list of columns a compiled query selects.
///
/// Each position is already resolved to the entity column it carries, so
/// the engine only has to look columns up, never to interpret the query.
/// Together with the entity it is the key under which quick-populator plans
/// are memoized.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ColumnLayout {
    columns: Vec<ColumnRef>,

    /// Properties the query explicitly left out.
    deferred: BTreeSet<String>,
}

/// A selected column, resolved to the entity and storage column it belongs to.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub entity: EntityId,
    pub name: String,
}

impl ColumnLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every column of `entity`, in property declaration order,
    /// skipping deferred properties.
    pub fn for_entity(entity: &Entity) -> Self {
        let mut layout = Self::new();

        for property in entity.properties.iter().filter(|p| !p.deferred) {
            for column in property.columns() {
                layout.push(ColumnRef::new(entity.id, &column.name));
            }
        }

        layout
    }

    /// Appends a selected column.
    pub fn column(mut self, entity: impl Into<EntityId>, name: impl Into<String>) -> Self {
        self.push(ColumnRef::new(entity, name));
        self
    }

    pub fn push(&mut self, column: ColumnRef) {
        self.columns.push(column);
    }

    /// Leaves the named property out of this query.
    pub fn defer(mut self, property: impl Into<String>) -> Self {
        self.deferred.insert(property.into());
        self
    }

    pub fn is_deferred(&self, property: &str) -> bool {
        self.deferred.contains(property)
    }

    /// Returns the position of the entity column in the row.
    pub fn position(&self, entity: EntityId, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.entity == entity && column.name == name)
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ColumnRef {
    pub fn new(entity: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
        }
    }
}

impl fmt::Debug for ColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entries(&self.columns);

        if !self.deferred.is_empty() {
            list.entry(&format_args!("deferred={:?}", self.deferred));
        }

        list.finish()
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity.0, self.name)
    }
}
