pub mod cursor;
pub use cursor::Cursor;

pub mod engine;
pub use engine::{
    Allocate, ColumnDecoder, Decode, EntityKey, IdentityMap, InstanceFactory, LoadOptions,
    Materialize, Resolution,
};

mod instance;
pub use instance::{Instance, InstanceRef};

mod load;
pub use load::Load;

pub mod materializer;
pub use materializer::Materializer;

pub use hydrate_core::{
    bail,
    driver::{self, ColumnLayout, RowStream, Rows},
    err, record,
    schema::{self, Column, Entity, Property},
    stmt::{self, Type, Value, ValueRecord},
    Error, Registry, Result,
};

use engine::{QuickPopulators, RowProcessor};
use std::sync::Arc;

/// Materializes `rows` into instances of `entity` with the default column
/// decoder and instance factory.
///
/// The quick-populator plan is built once for this call. Use a
/// [`Materializer`] to inject a decoder or factory, or to reuse plans across
/// several calls of the same query execution.
///
/// Fails before pulling any row if the entity cannot be allocated or the
/// layout does not cover the entity's properties.
pub fn materialize<'a>(
    rows: impl Into<Rows>,
    entity: &Arc<Entity>,
    layout: &ColumnLayout,
    identity_map: &'a mut IdentityMap,
) -> Result<Materialize<'a>> {
    static DECODER: ColumnDecoder = ColumnDecoder;
    static FACTORY: InstanceFactory = InstanceFactory;

    FACTORY.can_allocate(entity)?;
    let plan = Arc::new(QuickPopulators::build(entity, layout)?);

    let processor = RowProcessor::new(
        &DECODER,
        &FACTORY,
        entity.clone(),
        plan,
        LoadOptions::default(),
    );

    Ok(Materialize::new(rows.into(), processor, identity_map))
}
