//! Ordered merging of synchronous sources.
//!
//! Each source is an `IntoIterator` trusted to yield its entries in
//! non-decreasing timestamp order; exhaustion is signalled by `None`.
//! Fetches are sequential and blocking: after every emission the merge
//! performs exactly one replacement fetch from the source that was just
//! drained, so at most one candidate per live source is resident at any
//! time.
//!
//! # Examples
//!
//! ```
//! use sorted_merge::prelude::*;
//!
//! let a = vec![1u64, 4, 7];
//! let b = vec![2, 5, 8];
//! let c = vec![3, 6, 9];
//!
//! let out: Vec<_> = vec![a, b, c].merge_sorted().collect();
//! assert_eq!(out, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! ```

use crate::Timestamped;

pub use merge_sorted::Merge;
pub use try_merge_sorted::TryMerge;

pub(crate) mod merge_sorted;
pub(crate) mod try_merge_sorted;

/// Combines multiple sorted iterators into a single sorted iterator.
///
/// Entries are emitted in globally non-decreasing timestamp order,
/// provided every source is itself sorted. Ties on equal timestamps go
/// to the source with the lower index, then to arrival order.
pub trait MergeSorted {
    /// The timestamped entry type.
    type Item: Timestamped;

    /// The iterator type produced by the merge.
    type Iter: Iterator<Item = Self::Item>;

    /// Combine multiple sorted iterators into a single sorted iterator.
    fn merge_sorted(self) -> Self::Iter;
}

/// Combines multiple sorted fallible iterators into a single sorted
/// iterator, short-circuiting on the first error.
///
/// The fallible counterpart to [`MergeSorted`]: sources yield
/// `Result<T, E>`, and the first `Err` observed aborts the merge. Any
/// entries still queued at that point are discarded.
pub trait TryMergeSorted {
    /// The timestamped entry type.
    type Item: Timestamped;

    /// The error type produced by a failing source.
    type Error;

    /// The iterator type produced by the merge.
    type Iter: Iterator<Item = Result<Self::Item, Self::Error>>;

    /// Combine multiple sorted fallible iterators into a single sorted
    /// iterator.
    fn try_merge_sorted(self) -> Self::Iter;
}
