use crate::{stmt::ValueRecord, Result};

use std::{collections::VecDeque, fmt};

/// A forward-only, non-restartable source of raw rows.
///
/// Rows are either buffered up front or pulled lazily from an iterator
/// supplied by the driver. Pulling may block inside the driver; nothing else
/// in the engine does.
#[derive(Default)]
pub struct Rows {
    buffer: VecDeque<ValueRecord>,
    source: Option<DynIter>,
}

type DynIter = Box<dyn Iterator<Item = Result<ValueRecord>>>;

impl Rows {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vec(rows: Vec<ValueRecord>) -> Self {
        Self {
            buffer: rows.into(),
            source: None,
        }
    }

    /// Pulls rows lazily from `iter`. An `Err` item is a failure of the
    /// source, reported for that row only.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<T, I>(iter: I) -> Self
    where
        T: Into<ValueRecord>,
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: 'static,
    {
        Self {
            buffer: VecDeque::new(),
            source: Some(Box::new(
                iter.into_iter().map(|res| res.map(Into::into)),
            )),
        }
    }

    /// The source will yield at least this number of rows
    pub fn min_len(&self) -> usize {
        let (ret, _) = self.size_hint();
        ret
    }
}

impl Iterator for Rows {
    type Item = Result<ValueRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.buffer.pop_front() {
            return Some(Ok(row));
        }

        let next = self.source.as_mut()?.next();

        if next.is_none() {
            // Release the driver's iterator as soon as it is drained.
            self.source = None;
        }

        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (mut low, mut high) = match &self.source {
            Some(source) => source.size_hint(),
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

impl From<Vec<ValueRecord>> for Rows {
    fn from(rows: Vec<ValueRecord>) -> Self {
        Self::from_vec(rows)
    }
}

impl From<ValueRecord> for Rows {
    fn from(row: ValueRecord) -> Self {
        Self::from_vec(vec![row])
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("buffered", &self.buffer.len())
            .field("streaming", &self.source.is_some())
            .finish()
    }
}
