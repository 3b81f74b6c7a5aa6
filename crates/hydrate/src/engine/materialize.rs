use super::{
    Allocate, ColumnDecoder, Decode, IdentityMap, InstanceFactory, Populator, QuickPopulators,
};
use crate::InstanceRef;

use hydrate_core::{
    bail,
    driver::Rows,
    schema::Entity,
    stmt::ValueRecord,
    Error, Result,
};
use std::{fmt, iter::FusedIterator, sync::Arc};

/// Per-call switches for a materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    populate_existing: bool,
}

/// Processes rows one at a time: key extraction, identity resolution and,
/// on a miss, allocation and population.
pub(crate) struct RowProcessor<'a, D, F> {
    decoder: &'a D,
    factory: &'a F,
    entity: Arc<Entity>,
    plan: Arc<QuickPopulators>,
    options: LoadOptions,
}

/// The sequence of instances materialized from a row source.
///
/// Each element corresponds to one row. A row that fails to decode yields
/// an error for that row only; the sequence continues with the next row.
/// Rows with an identity already present in the identity map yield the
/// existing instance.
pub struct Materialize<'a, D = ColumnDecoder, F = InstanceFactory> {
    rows: Rows,
    processor: RowProcessor<'a, D, F>,
    identity_map: &'a mut IdentityMap,
    state: State,
    emitted: usize,
    failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingRow,
    Exhausted,
}

impl LoadOptions {
    pub fn new() -> LoadOptions {
        LoadOptions::default()
    }

    /// When set, a row whose identity is already loaded overwrites the
    /// loaded instance's attributes. By default the first loaded values win.
    pub fn populate_existing(mut self, populate_existing: bool) -> LoadOptions {
        self.populate_existing = populate_existing;
        self
    }

    pub fn is_populate_existing(&self) -> bool {
        self.populate_existing
    }
}

impl<'a, D: Decode, F: Allocate> RowProcessor<'a, D, F> {
    pub(crate) fn new(
        decoder: &'a D,
        factory: &'a F,
        entity: Arc<Entity>,
        plan: Arc<QuickPopulators>,
        options: LoadOptions,
    ) -> Self {
        RowProcessor {
            decoder,
            factory,
            entity,
            plan,
            options,
        }
    }

    pub(crate) fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Turns one row into an instance.
    ///
    /// On error nothing is registered in the identity map.
    pub(crate) fn process(
        &self,
        row: ValueRecord,
        identity_map: &mut IdentityMap,
    ) -> Result<InstanceRef> {
        let populator = Populator::new(self.decoder, &self.entity, &self.plan);
        let entity = &self.entity.name;

        let key = populator.decode_key(&row)?;
        tracing::trace!(state = "key_extracted", entity = %entity, key = ?key.values);

        let (instance, resolution) = identity_map.resolve_or_insert(key, |key| {
            tracing::trace!(state = "cache_miss", entity = %entity, key = ?key.values);
            let mut instance = self.factory.allocate(&self.entity)?;

            tracing::trace!(state = "populating", entity = %entity, key = ?key.values);
            populator.populate(&mut instance, &row, key)?;

            Ok(instance)
        })?;

        if resolution.is_hit() {
            tracing::trace!(state = "cache_hit", entity = %entity);

            if self.options.populate_existing {
                let Some(mut existing) = instance.try_borrow_mut() else {
                    bail!("cannot refresh a borrowed instance of `{entity}`");
                };
                populator.refresh(&mut existing, &row)?;
            }
        }

        tracing::trace!(state = "emitted", entity = %entity);
        Ok(instance)
    }
}

impl<'a, D: Decode, F: Allocate> Materialize<'a, D, F> {
    pub(crate) fn new(
        rows: Rows,
        processor: RowProcessor<'a, D, F>,
        identity_map: &'a mut IdentityMap,
    ) -> Self {
        tracing::debug!(
            entity = %processor.entity().name,
            populate_existing = processor.options.populate_existing,
            "materializing rows"
        );

        Materialize {
            rows,
            processor,
            identity_map,
            state: State::AwaitingRow,
            emitted: 0,
            failed: 0,
        }
    }

    /// Returns the instance of the first row, or `None` if there are no
    /// rows. Remaining rows are not processed.
    pub fn first(mut self) -> Result<Option<InstanceRef>> {
        self.next().transpose()
    }

    /// Returns the instance of the only row, or `None` if there are no rows.
    ///
    /// Fails if the source produces more than one row.
    pub fn one_or_none(mut self) -> Result<Option<InstanceRef>> {
        let Some(first) = self.next().transpose()? else {
            return Ok(None);
        };

        if self.rows.next().is_some() {
            return Err(Error::too_many_records(format!(
                "expected at most one `{}` row, found more",
                self.processor.entity().name
            )));
        }

        Ok(Some(first))
    }

    /// Materializes every remaining row, failing on the first error.
    pub fn collect_all(self) -> Result<Vec<InstanceRef>> {
        self.collect()
    }
}

impl<D: Decode, F: Allocate> Iterator for Materialize<'_, D, F> {
    type Item = Result<InstanceRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Exhausted {
            return None;
        }

        let entity = &self.processor.entity().name;

        let row = match self.rows.next() {
            Some(Ok(row)) => row,
            Some(Err(err)) => {
                self.failed += 1;
                tracing::warn!(entity = %entity, error = %err, "row source failed");
                return Some(Err(err));
            }
            None => {
                self.state = State::Exhausted;
                tracing::debug!(
                    state = "exhausted",
                    entity = %entity,
                    emitted = self.emitted,
                    failed = self.failed,
                    "row source exhausted"
                );
                return None;
            }
        };

        match self.processor.process(row, self.identity_map) {
            Ok(instance) => {
                self.emitted += 1;
                Some(Ok(instance))
            }
            Err(err) => {
                self.failed += 1;
                tracing::warn!(entity = %entity, error = %err, "skipping row");
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            State::Exhausted => (0, Some(0)),
            State::AwaitingRow => self.rows.size_hint(),
        }
    }
}

impl<D: Decode, F: Allocate> FusedIterator for Materialize<'_, D, F> {}

impl<D, F> fmt::Debug for Materialize<'_, D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materialize")
            .field("entity", &self.processor.entity.name)
            .field("rows", &self.rows)
            .field("state", &self.state)
            .field("emitted", &self.emitted)
            .field("failed", &self.failed)
            .finish()
    }
}
