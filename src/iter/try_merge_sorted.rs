use core::fmt;

use crate::utils::{Liveness, OrderedQueue};
use crate::Timestamped;

use super::TryMergeSorted as TryMergeSortedTrait;

/// An iterator that merges multiple sorted fallible iterators into a
/// single sorted iterator, short-circuiting on the first error.
///
/// This `struct` is created by the [`try_merge_sorted`] method on the
/// [`TryMergeSorted`] trait. See its documentation for more.
///
/// [`try_merge_sorted`]: trait.TryMergeSorted.html#tymethod.try_merge_sorted
/// [`TryMergeSorted`]: trait.TryMergeSorted.html
pub struct TryMerge<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
    T: Timestamped,
{
    sources: Vec<I>,
    live: Liveness,
    queue: OrderedQueue<T>,
    error: Option<E>,
    done: bool,
}

impl<I, T, E> TryMerge<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
    T: Timestamped,
{
    pub(crate) fn new(sources: Vec<I>) -> Self {
        let mut this = Self {
            live: Liveness::new(sources.len()),
            queue: OrderedQueue::new(),
            sources,
            error: None,
            done: false,
        };
        for index in 0..this.sources.len() {
            this.fetch(index);
            if this.error.is_some() {
                break;
            }
        }
        this
    }

    fn fetch(&mut self, index: usize) {
        match self.sources[index].next() {
            Some(Ok(entry)) => self.queue.push(entry, index),
            Some(Err(err)) => self.error = Some(err),
            None => self.live.set_drained(index),
        }
    }
}

impl<I, T, E> Iterator for TryMerge<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
    T: Timestamped,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // A fetch failure aborts the merge; queued entries are dropped
        // along with `self` rather than emitted out of context.
        if let Some(err) = self.error.take() {
            self.done = true;
            return Some(Err(err));
        }
        match self.queue.pop() {
            Some((entry, source)) => {
                if self.live.is_live(source) {
                    self.fetch(source);
                }
                Some(Ok(entry))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<I, T, E> fmt::Debug for TryMerge<I, T, E>
where
    I: Iterator<Item = Result<T, E>> + fmt::Debug,
    T: Timestamped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<I, T, E> TryMergeSortedTrait for Vec<I>
where
    I: IntoIterator<Item = Result<T, E>>,
    T: Timestamped,
{
    type Item = T;
    type Error = E;
    type Iter = TryMerge<I::IntoIter, T, E>;

    fn try_merge_sorted(self) -> Self::Iter {
        TryMerge::new(self.into_iter().map(|i| i.into_iter()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ok_merges_in_order() {
        let a: Vec<Result<u64, &str>> = vec![Ok(1), Ok(4)];
        let b: Vec<Result<u64, &str>> = vec![Ok(2), Ok(3)];

        let out: Result<Vec<_>, _> = vec![a, b].try_merge_sorted().collect();
        assert_eq!(out, Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn first_error_aborts_the_merge() {
        let a: Vec<Result<u64, &str>> = vec![Ok(1), Err("boom"), Ok(9)];
        let b: Vec<Result<u64, &str>> = vec![Ok(2), Ok(3)];

        let mut merged = vec![a, b].try_merge_sorted();
        assert_eq!(merged.next(), Some(Ok(1)));
        assert_eq!(merged.next(), Some(Err("boom")));
        assert_eq!(merged.next(), None);
        assert_eq!(merged.next(), None);
    }

    #[test]
    fn error_during_initial_fill_surfaces_first() {
        let a: Vec<Result<u64, &str>> = vec![Err("down")];
        let b: Vec<Result<u64, &str>> = vec![Ok(2)];

        let mut merged = vec![a, b].try_merge_sorted();
        assert_eq!(merged.next(), Some(Err("down")));
        assert_eq!(merged.next(), None);
    }
}
