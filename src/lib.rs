//! Memory-bounded k-way ordered merging for iterators and streams.
//!
//! This crate interleaves N independently-sorted sources of timestamped
//! records into one globally time-ordered sequence, emitted
//! incrementally rather than materialized in full. Sources are trusted
//! to yield entries in non-decreasing timestamp order and to eventually
//! report exhaustion; the merge keeps at most a bounded set of candidate
//! entries resident, no matter how large the sources are.
//!
//! Two orchestrators share the same data structures:
//!
//! - [`iter::MergeSorted`]: synchronous, for `Vec`s of iterators.
//!   Fetches are sequential and blocking; exactly one candidate per
//!   live source is held.
//! - [`stream::MergeSorted`]: asynchronous, for `Vec`s of streams.
//!   Fetches to different sources are outstanding concurrently and
//!   batched refills respect an advisory queue limit.
//!
//! The fallible counterparts [`iter::TryMergeSorted`] and
//! [`stream::TryMergeSorted`] short-circuit on the first source error.
//! The [`sink`] module drives a merged sequence into an output and
//! signals end-of-stream exactly once.
//!
//! # Examples
//!
//! Merge three sorted streams into one sorted stream:
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
//!
//! # Ordering guarantees
//!
//! Output timestamps are non-decreasing, conditioned on each source
//! being sorted. Entries with equal timestamps are ordered by source
//! index first, then by arrival order within the source; the merge
//! never leaves tie-breaking to queue internals.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod entry;
mod utils;

pub mod iter;
pub mod sink;
pub mod stream;

pub use entry::{Entry, Timestamped};
pub use sink::Sink;

/// The sorted-merge prelude.
pub mod prelude {
    pub use super::iter::MergeSorted as _;
    pub use super::iter::TryMergeSorted as _;
    pub use super::stream::MergeSorted as _;
    pub use super::stream::TryMergeSorted as _;

    pub use super::Timestamped;
}
