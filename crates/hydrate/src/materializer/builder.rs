use super::Materializer;
use crate::engine::{Allocate, ColumnDecoder, Decode, InstanceFactory, PlanCache};

/// Configures a [`Materializer`].
#[derive(Debug, Default)]
pub struct Builder<D = ColumnDecoder, F = InstanceFactory> {
    decoder: D,
    factory: F,
}

impl<D, F> Builder<D, F> {
    /// Use `decoder` to extract values from raw rows.
    pub fn decoder<D2: Decode>(self, decoder: D2) -> Builder<D2, F> {
        Builder {
            decoder,
            factory: self.factory,
        }
    }

    /// Use `factory` to allocate instances.
    pub fn factory<F2: Allocate>(self, factory: F2) -> Builder<D, F2> {
        Builder {
            decoder: self.decoder,
            factory,
        }
    }

    pub fn build(self) -> Materializer<D, F> {
        Materializer {
            decoder: self.decoder,
            factory: self.factory,
            plans: PlanCache::new(),
        }
    }
}
