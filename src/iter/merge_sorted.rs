use core::fmt;

use crate::utils::{Liveness, OrderedQueue};
use crate::Timestamped;

use super::MergeSorted as MergeSortedTrait;

/// An iterator that merges multiple sorted iterators into a single
/// sorted iterator.
///
/// This `struct` is created by the [`merge_sorted`] method on the
/// [`MergeSorted`] trait. See its documentation for more.
///
/// [`merge_sorted`]: trait.MergeSorted.html#tymethod.merge_sorted
/// [`MergeSorted`]: trait.MergeSorted.html
pub struct Merge<I>
where
    I: Iterator,
    I::Item: Timestamped,
{
    sources: Vec<I>,
    live: Liveness,
    queue: OrderedQueue<I::Item>,
}

impl<I> Merge<I>
where
    I: Iterator,
    I::Item: Timestamped,
{
    pub(crate) fn new(sources: Vec<I>) -> Self {
        let mut this = Self {
            live: Liveness::new(sources.len()),
            queue: OrderedQueue::new(),
            sources,
        };
        // Seed the queue with the head entry of every source so the
        // global minimum is known before the first emission.
        for index in 0..this.sources.len() {
            this.fetch(index);
        }
        this
    }

    /// Fetch the next entry from `index`, either queueing it or marking
    /// the source as drained.
    fn fetch(&mut self, index: usize) {
        match self.sources[index].next() {
            Some(entry) => self.queue.push(entry, index),
            None => self.live.set_drained(index),
        }
    }
}

impl<I> Iterator for Merge<I>
where
    I: Iterator,
    I::Item: Timestamped,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, source) = self.queue.pop()?;
        // Replace the emitted candidate before the next pop; a live
        // source must always be represented in the queue for the
        // minimum to be safe to emit.
        if self.live.is_live(source) {
            self.fetch(source);
        }
        Some(entry)
    }
}

impl<I> fmt::Debug for Merge<I>
where
    I: Iterator + fmt::Debug,
    I::Item: Timestamped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<I> MergeSortedTrait for Vec<I>
where
    I: IntoIterator,
    I::Item: Timestamped,
{
    type Item = I::Item;
    type Iter = Merge<I::IntoIter>;

    fn merge_sorted(self) -> Self::Iter {
        Merge::new(self.into_iter().map(|i| i.into_iter()).collect())
    }
}
