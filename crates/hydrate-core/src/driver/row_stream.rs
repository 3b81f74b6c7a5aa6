use crate::{stmt::ValueRecord, Result};

use std::{
    collections::VecDeque,
    fmt,
    pin::Pin,
    task::{Context, Poll},
};
use tokio_stream::{Stream, StreamExt};

/// An asynchronous, forward-only source of raw rows.
///
/// This is the async counterpart of [`Rows`](super::Rows), for drivers that
/// fetch rows over the network. The only suspension point is fetching the
/// next row.
#[derive(Default)]
pub struct RowStream {
    buffer: VecDeque<ValueRecord>,
    stream: Option<DynStream>,
}

#[derive(Debug)]
struct Iter<I> {
    iter: I,
}

type DynStream = Pin<Box<dyn Stream<Item = Result<ValueRecord>> + Send + 'static>>;

impl RowStream {
    pub fn from_stream<T>(stream: T) -> Self
    where
        T: Stream<Item = Result<ValueRecord>> + Send + 'static,
    {
        Self {
            buffer: VecDeque::new(),
            stream: Some(Box::pin(stream)),
        }
    }

    pub fn from_vec(rows: Vec<ValueRecord>) -> Self {
        Self {
            buffer: rows.into(),
            stream: None,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<T, I>(iter: I) -> Self
    where
        T: Into<ValueRecord>,
        I: Iterator<Item = Result<T>> + Send + 'static,
    {
        Self::from_stream(Iter { iter })
    }

    /// Returns the next row in the stream
    pub async fn next(&mut self) -> Option<Result<ValueRecord>> {
        StreamExt::next(self).await
    }

    /// The stream will contain at least this number of rows
    pub fn min_len(&self) -> usize {
        let (ret, _) = self.size_hint();
        ret
    }

    pub async fn collect(mut self) -> Result<Vec<ValueRecord>> {
        let mut ret = Vec::with_capacity(self.min_len());

        while let Some(res) = self.next().await {
            ret.push(res?);
        }

        Ok(ret)
    }
}

impl Stream for RowStream {
    type Item = Result<ValueRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(next) = self.buffer.pop_front() {
            Poll::Ready(Some(Ok(next)))
        } else if let Some(stream) = self.stream.as_mut() {
            Pin::new(stream).poll_next(cx)
        } else {
            Poll::Ready(None)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (mut low, mut high) = match &self.stream {
            Some(stream) => stream.size_hint(),
            None => (0, Some(0)),
        };

        let buffered = self.buffer.len();

        low += buffered;

        if let Some(high) = high.as_mut() {
            *high += buffered;
        }

        (low, high)
    }
}

impl From<Vec<ValueRecord>> for RowStream {
    fn from(value: Vec<ValueRecord>) -> Self {
        Self::from_vec(value)
    }
}

impl<I> Unpin for Iter<I> {}

impl<T, I> Stream for Iter<I>
where
    I: Iterator<Item = Result<T>>,
    T: Into<ValueRecord>,
{
    type Item = Result<ValueRecord>;

    fn poll_next(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.iter.next().map(|res| res.map(|item| item.into())))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Value;

    #[tokio::test]
    async fn buffered_rows_then_stream() {
        let stream = RowStream::from_vec(vec![record![1_i64], record![2_i64]]);
        assert_eq!(stream.min_len(), 2);

        let rows = stream.collect().await.unwrap();
        assert_eq!(rows, vec![record![1_i64], record![2_i64]]);
    }

    #[tokio::test]
    async fn iterator_backed_stream() {
        let iter = (1_i64..=3).map(|i| Ok(vec![Value::I64(i)]));
        let mut stream = RowStream::from_iter(iter);

        let mut seen = vec![];
        while let Some(row) = stream.next().await {
            seen.push(row.unwrap()[0].clone());
        }

        assert_eq!(seen, vec![Value::I64(1), Value::I64(2), Value::I64(3)]);
    }
}
