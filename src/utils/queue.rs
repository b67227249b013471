use core::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::Timestamped;

/// A min-priority queue of candidate entries, keyed by timestamp.
///
/// Holds at most one pending candidate per still-populated source at
/// steady state. Entries with equal timestamps are ordered by source
/// index, then by insertion order, so the merge output is deterministic
/// even though `BinaryHeap` itself is unstable.
pub(crate) struct OrderedQueue<T>
where
    T: Timestamped,
{
    heap: BinaryHeap<Reverse<QueueItem<T>>>,
    seq: u64,
}

/// An entry tagged with its source of origin.
///
/// The ordering key is cached at insertion so comparisons don't re-derive
/// it, and so non-`Copy` keys are computed exactly once per entry.
struct QueueItem<T>
where
    T: Timestamped,
{
    entry: T,
    source: usize,
    key: T::Timestamp,
    seq: u64,
}

impl<T> OrderedQueue<T>
where
    T: Timestamped,
{
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Insert an entry produced by `source`.
    pub(crate) fn push(&mut self, entry: T, source: usize) {
        let key = entry.timestamp();
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Reverse(QueueItem {
            entry,
            source,
            key,
            seq,
        }));
    }

    /// Remove and return the entry with the smallest timestamp, along
    /// with the index of the source that produced it.
    pub(crate) fn pop(&mut self) -> Option<(T, usize)> {
        let Reverse(item) = self.heap.pop()?;
        Some((item.entry, item.source))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> PartialEq for QueueItem<T>
where
    T: Timestamped,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for QueueItem<T> where T: Timestamped {}

impl<T> PartialOrd for QueueItem<T>
where
    T: Timestamped,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueueItem<T>
where
    T: Timestamped,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then(self.source.cmp(&other.source))
            .then(self.seq.cmp(&other.seq))
    }
}
