use crate::{
    engine::{Allocate, ColumnDecoder, Decode, IdentityMap, InstanceFactory, RowProcessor},
    InstanceRef, Result,
};

use hydrate_core::driver::RowStream;

/// Materializes rows from an asynchronous row source.
///
/// Fetching the next row is the only suspension point; each fetched row is
/// processed exactly as [`Materialize`](crate::Materialize) does.
pub struct Cursor<'a, D = ColumnDecoder, F = InstanceFactory> {
    rows: RowStream,
    processor: RowProcessor<'a, D, F>,
    identity_map: &'a mut IdentityMap,
    done: bool,
}

pub trait FromCursor<A>: Extend<A> + Default {}

impl<A, T: Extend<A> + Default> FromCursor<A> for T {}

impl<'a, D: Decode, F: Allocate> Cursor<'a, D, F> {
    pub(crate) fn new(
        rows: RowStream,
        processor: RowProcessor<'a, D, F>,
        identity_map: &'a mut IdentityMap,
    ) -> Self {
        Cursor {
            rows,
            processor,
            identity_map,
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<InstanceRef>> {
        if self.done {
            return None;
        }

        let Some(row) = self.rows.next().await else {
            self.done = true;
            tracing::debug!(
                state = "exhausted",
                entity = %self.processor.entity().name,
                "row stream exhausted"
            );
            return None;
        };

        let res = row.and_then(|row| self.processor.process(row, self.identity_map));

        if let Err(err) = &res {
            tracing::warn!(
                entity = %self.processor.entity().name,
                error = %err,
                "skipping row"
            );
        }

        Some(res)
    }

    /// Collect all instances, failing on the first error.
    pub async fn collect<B>(mut self) -> Result<B>
    where
        B: FromCursor<InstanceRef>,
    {
        let mut ret = B::default();

        while let Some(res) = self.next().await {
            ret.extend(Some(res?));
        }

        Ok(ret)
    }
}
