mod builder;
pub use builder::Builder;

use crate::{
    engine::{
        Allocate, ColumnDecoder, Decode, IdentityMap, InstanceFactory, LoadOptions, Materialize,
        PlanCache, RowProcessor,
    },
    Cursor,
};

use hydrate_core::{
    driver::{ColumnLayout, RowStream, Rows},
    schema::Entity,
    Result,
};
use std::sync::Arc;

/// Runs the materialization of one query execution.
///
/// Owns the injected decoder and factory and memoizes quick-populator plans
/// per (entity, column layout) pair, so that every call after the first for
/// a given layout skips plan resolution. Drop the materializer when the
/// execution ends to discard its plans.
#[derive(Debug, Default)]
pub struct Materializer<D = ColumnDecoder, F = InstanceFactory> {
    decoder: D,
    factory: F,
    plans: PlanCache,
}

impl Materializer {
    pub fn new() -> Materializer {
        Materializer::default()
    }

    pub fn builder() -> Builder {
        Builder::default()
    }
}

impl<D: Decode, F: Allocate> Materializer<D, F> {
    /// Materializes `rows` into instances of `entity`, resolving identities
    /// through `identity_map`.
    ///
    /// Fails before reading any row if the entity cannot be allocated or
    /// `layout` does not cover the entity's properties.
    pub fn materialize<'a>(
        &'a mut self,
        rows: impl Into<Rows>,
        entity: &Arc<Entity>,
        layout: &ColumnLayout,
        identity_map: &'a mut IdentityMap,
    ) -> Result<Materialize<'a, D, F>> {
        self.materialize_with(rows, entity, layout, identity_map, LoadOptions::default())
    }

    /// Like [`materialize`](Self::materialize), with explicit load options.
    pub fn materialize_with<'a>(
        &'a mut self,
        rows: impl Into<Rows>,
        entity: &Arc<Entity>,
        layout: &ColumnLayout,
        identity_map: &'a mut IdentityMap,
        options: LoadOptions,
    ) -> Result<Materialize<'a, D, F>> {
        let processor = self.processor(entity, layout, options)?;
        Ok(Materialize::new(rows.into(), processor, identity_map))
    }

    /// Materializes rows fetched from an asynchronous source.
    pub fn cursor<'a>(
        &'a mut self,
        rows: impl Into<RowStream>,
        entity: &Arc<Entity>,
        layout: &ColumnLayout,
        identity_map: &'a mut IdentityMap,
        options: LoadOptions,
    ) -> Result<Cursor<'a, D, F>> {
        let processor = self.processor(entity, layout, options)?;
        Ok(Cursor::new(rows.into(), processor, identity_map))
    }

    /// Plans built so far by this materializer.
    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn processor(
        &mut self,
        entity: &Arc<Entity>,
        layout: &ColumnLayout,
        options: LoadOptions,
    ) -> Result<RowProcessor<'_, D, F>> {
        self.factory.can_allocate(entity)?;
        let plan = self.plans.get_or_build(entity, layout)?;

        Ok(RowProcessor::new(
            &self.decoder,
            &self.factory,
            entity.clone(),
            plan,
            options,
        ))
    }
}
