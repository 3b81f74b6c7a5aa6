//! The row-to-instance pipeline.
//!
//! A query execution resolves a [`QuickPopulators`] plan once per distinct
//! (entity, column layout) pair. Each row then flows through the
//! [`Materialize`] iterator: the key columns are decoded, the identity map is
//! consulted, and only on a miss is an instance allocated and populated.

mod decode;
pub use decode::{ColumnDecoder, Decode};

mod factory;
pub use factory::{Allocate, InstanceFactory};

mod identity;
pub use identity::{EntityKey, IdentityMap, Resolution};

mod materialize;
pub use materialize::{LoadOptions, Materialize};
pub(crate) use materialize::RowProcessor;

mod plan;
pub use plan::{PlanCache, PlanEntry, QuickPopulators};

mod populate;
use populate::Populator;
