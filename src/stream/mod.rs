//! Ordered merging of asynchronous streams.
//!
//! Each source is a [`Stream`] trusted to yield its entries in
//! non-decreasing timestamp order; `Poll::Ready(None)` is the exhaustion
//! signal and `Poll::Pending` models an in-flight fetch. Fetches to
//! distinct sources are outstanding concurrently, but every completion
//! is serialized through the merge's own `poll_next`, so no queue state
//! is ever touched from more than one logical flow.
//!
//! After every emission the merge first re-fetches from the source that
//! was just drained until it is represented in the queue again (or
//! reports exhaustion), then tops up all live sources in one batch —
//! unless the queue has grown past its advisory
//! [limit](MergeSorted::merge_sorted). The batch is a join point: the
//! next entry is only emitted once every fetch issued in the batch has
//! settled.
//!
//! # Examples
//!
//! ```
//! use futures_lite::future::block_on;
//! use futures_lite::{stream, StreamExt};
//! use sorted_merge::prelude::*;
//!
//! block_on(async {
//!     let a = stream::iter(vec![1u64, 4, 7]);
//!     let b = stream::iter(vec![2, 5, 8]);
//!     let c = stream::iter(vec![3, 6, 9]);
//!     let mut s = vec![a, b, c].merge_sorted();
//!
//!     let mut out = vec![];
//!     while let Some(entry) = s.next().await {
//!         out.push(entry);
//!     }
//!     assert_eq!(out, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! })
//! ```

use futures_core::Stream;

use crate::Timestamped;

pub use merge_sorted::Merge;
pub use try_merge_sorted::TryMerge;

pub(crate) mod merge_sorted;
pub(crate) mod try_merge_sorted;

/// The default advisory limit on the number of queued candidates.
pub const DEFAULT_QUEUE_LIMIT: usize = 100_000;

/// Combines multiple sorted streams into a single sorted stream.
///
/// Entries are emitted in globally non-decreasing timestamp order,
/// provided every source is itself sorted. Ties on equal timestamps go
/// to the source with the lower index, then to arrival order.
pub trait MergeSorted {
    /// The timestamped entry type.
    type Item: Timestamped;

    /// The stream type produced by the merge.
    type Stream: Stream<Item = Self::Item>;

    /// Combine multiple sorted streams into a single sorted stream.
    ///
    /// The returned stream refills its queue with
    /// [`DEFAULT_QUEUE_LIMIT`] as the advisory ceiling; use
    /// [`Merge::with_queue_limit`] to change it.
    fn merge_sorted(self) -> Self::Stream;
}

/// Combines multiple sorted fallible streams into a single sorted
/// stream, short-circuiting on the first error.
///
/// The fallible counterpart to [`MergeSorted`]: sources yield
/// `Result<T, E>`, and the first `Err` observed aborts the merge. Any
/// entries still queued at that point are discarded.
pub trait TryMergeSorted {
    /// The timestamped entry type.
    type Item: Timestamped;

    /// The error type produced by a failing source.
    type Error;

    /// The stream type produced by the merge.
    type Stream: Stream<Item = Result<Self::Item, Self::Error>>;

    /// Combine multiple sorted fallible streams into a single sorted
    /// stream.
    fn try_merge_sorted(self) -> Self::Stream;
}
