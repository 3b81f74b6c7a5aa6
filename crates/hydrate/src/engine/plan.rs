use hydrate_core::{
    driver::ColumnLayout,
    schema::{Entity, EntityId},
    Error, Result,
};
use std::{collections::HashMap, sync::Arc};

/// The resolved mapping from a query's column layout to an entity's
/// properties.
///
/// Built once per (entity, layout) pair and shared by every row of the
/// execution.
#[derive(Debug)]
pub struct QuickPopulators {
    entity: EntityId,

    /// Row positions of the identity key columns, in key order.
    key: Vec<usize>,

    /// Selected properties, in declaration order.
    entries: Vec<PlanEntry>,
}

/// One property to populate and where its columns are in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Index of the property in the entity descriptor.
    pub property: usize,

    /// Row positions of the property's columns, in column declaration order.
    pub positions: Vec<usize>,

    /// Set when the property is part of the identity key: its index in the
    /// key tuple.
    pub key_slot: Option<usize>,
}

/// Plans memoized for one query execution.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: HashMap<EntityId, HashMap<ColumnLayout, Arc<QuickPopulators>>>,
    builds: usize,
}

impl QuickPopulators {
    /// Resolves every property of `entity` against `layout`.
    pub fn build(entity: &Entity, layout: &ColumnLayout) -> Result<QuickPopulators> {
        let fail = |message: String| Err(Error::plan_resolution(&entity.name, message));

        if entity.primary_key.is_empty() {
            return fail("entity has no primary key columns".to_string());
        }

        let mut entries = Vec::with_capacity(entity.properties.len());

        for (index, property) in entity.properties.iter().enumerate() {
            let key_slot = entity.primary_key.iter().position(|pk| *pk == index);

            if layout.is_deferred(&property.name) {
                if key_slot.is_some() {
                    return fail(format!(
                        "primary key property `{}` cannot be deferred",
                        property.name
                    ));
                }

                continue;
            }

            let positions = property
                .columns()
                .iter()
                .map(|column| layout.position(entity.id, &column.name))
                .collect::<Vec<_>>();

            let selected = positions.iter().flatten().count();

            if selected == 0 {
                if key_slot.is_some() {
                    return fail(format!(
                        "primary key column `{}` is not selected",
                        property.columns()[0].name
                    ));
                }

                // Deferred by the mapping and left out by the query
                if property.deferred {
                    continue;
                }

                return fail(format!(
                    "no column selected for property `{}`",
                    property.name
                ));
            }

            if selected < positions.len() {
                let missing = property
                    .columns()
                    .iter()
                    .zip(&positions)
                    .filter(|(_, position)| position.is_none())
                    .map(|(column, _)| column.name.as_str())
                    .collect::<Vec<_>>();

                return fail(format!(
                    "composite property `{}` is only partially selected; missing {missing:?}",
                    property.name
                ));
            }

            entries.push(PlanEntry {
                property: index,
                positions: positions.into_iter().flatten().collect(),
                key_slot,
            });
        }

        let key = entity
            .primary_key
            .iter()
            .filter_map(|pk| entries.iter().find(|entry| entry.property == *pk))
            .map(|entry| entry.positions[0])
            .collect::<Vec<_>>();

        debug_assert_eq!(key.len(), entity.primary_key.len());

        Ok(QuickPopulators {
            entity: entity.id,
            key,
            entries,
        })
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Row positions of the key columns, in key order.
    pub fn key_positions(&self) -> &[usize] {
        &self.key
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Returns `true` if the property at `index` is populated by this plan.
    pub fn populates(&self, index: usize) -> bool {
        self.entries.iter().any(|entry| entry.property == index)
    }
}

impl PlanCache {
    pub fn new() -> PlanCache {
        PlanCache::default()
    }

    /// Returns the plan for `entity` and `layout`, building it on first use.
    pub fn get_or_build(
        &mut self,
        entity: &Entity,
        layout: &ColumnLayout,
    ) -> Result<Arc<QuickPopulators>> {
        let plans = self.plans.entry(entity.id).or_default();

        if let Some(plan) = plans.get(layout) {
            tracing::trace!(entity = %entity.name, "reusing quick populators");
            return Ok(plan.clone());
        }

        let plan = Arc::new(QuickPopulators::build(entity, layout)?);
        self.builds += 1;

        tracing::debug!(
            entity = %entity.name,
            layout = ?layout,
            populated = plan.entries.len(),
            "built quick populators"
        );

        plans.insert(layout.clone(), plan.clone());
        Ok(plan)
    }

    /// Number of plans built since the cache was created.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }
}
