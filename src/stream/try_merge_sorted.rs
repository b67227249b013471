use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use fixedbitset::FixedBitSet;
use futures_core::Stream;

use crate::utils::{self, Liveness, OrderedQueue, WakerVec};
use crate::Timestamped;

use super::TryMergeSorted as TryMergeSortedTrait;
use super::DEFAULT_QUEUE_LIMIT;

/// A stream that merges multiple sorted fallible streams into a single
/// sorted stream, short-circuiting on the first error.
///
/// This `struct` is created by the [`try_merge_sorted`] method on the
/// [`TryMergeSorted`] trait. See its documentation for more.
///
/// [`try_merge_sorted`]: trait.TryMergeSorted.html#tymethod.try_merge_sorted
/// [`TryMergeSorted`]: trait.TryMergeSorted.html
#[pin_project::pin_project]
pub struct TryMerge<S, T, E>
where
    S: Stream<Item = Result<T, E>>,
    T: Timestamped,
{
    #[pin]
    sources: Vec<S>,
    wakers: WakerVec,
    pending: FixedBitSet,
    guard: Option<usize>,
    live: Liveness,
    inventory: Vec<usize>,
    queue: OrderedQueue<T>,
    queue_limit: usize,
    done: bool,
}

impl<S, T, E> TryMerge<S, T, E>
where
    S: Stream<Item = Result<T, E>>,
    T: Timestamped,
{
    pub(crate) fn new(sources: Vec<S>) -> Self {
        let len = sources.len();
        let mut pending = FixedBitSet::with_capacity(len);
        pending.set_range(.., true);
        Self {
            wakers: WakerVec::new(len),
            pending,
            guard: None,
            live: Liveness::new(len),
            inventory: vec![0; len],
            queue: OrderedQueue::new(),
            queue_limit: DEFAULT_QUEUE_LIMIT,
            sources,
            done: false,
        }
    }

    /// Set the advisory limit on the number of queued candidates.
    ///
    /// See [`Merge::with_queue_limit`][crate::stream::Merge::with_queue_limit].
    pub fn with_queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = limit;
        self
    }

    /// The number of candidate entries currently queued.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }
}

enum Fetched {
    Entry,
    Drained,
}

/// Poll source `index` for its next entry. A fetch error is returned to
/// the caller instead of being queued.
fn fetch<S, T, E>(
    sources: Pin<&mut Vec<S>>,
    index: usize,
    waker: &Waker,
    queue: &mut OrderedQueue<T>,
    inventory: &mut [usize],
    live: &mut Liveness,
) -> Poll<Result<Fetched, E>>
where
    S: Stream<Item = Result<T, E>>,
    T: Timestamped,
{
    let mut cx = Context::from_waker(waker);
    let source = utils::get_pin_mut_from_vec(sources, index).unwrap();
    match source.poll_next(&mut cx) {
        Poll::Ready(Some(Ok(entry))) => {
            queue.push(entry, index);
            inventory[index] += 1;
            Poll::Ready(Ok(Fetched::Entry))
        }
        Poll::Ready(Some(Err(err))) => Poll::Ready(Err(err)),
        Poll::Ready(None) => {
            live.set_drained(index);
            Poll::Ready(Ok(Fetched::Drained))
        }
        Poll::Pending => Poll::Pending,
    }
}

impl<S, T, E> Stream for TryMerge<S, T, E>
where
    S: Stream<Item = Result<T, E>>,
    T: Timestamped,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        this.wakers.readiness().lock().unwrap().set_waker(cx.waker());

        loop {
            if let Some(index) = *this.guard {
                if this.live.is_live(index) && this.inventory[index] == 0 {
                    this.wakers.readiness().lock().unwrap().clear_ready(index);
                    match fetch(
                        this.sources.as_mut(),
                        index,
                        this.wakers.get(index).unwrap(),
                        this.queue,
                        this.inventory,
                        this.live,
                    ) {
                        Poll::Ready(Ok(Fetched::Entry)) => {
                            this.wakers.readiness().lock().unwrap().set_ready(index);
                        }
                        Poll::Ready(Ok(Fetched::Drained)) => {}
                        // A failed fetch aborts the merge; queued
                        // entries are dropped with `self`.
                        Poll::Ready(Err(err)) => {
                            *this.done = true;
                            return Poll::Ready(Some(Err(err)));
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                    continue;
                }
                *this.guard = None;

                if this.queue.len() <= *this.queue_limit {
                    for index in this.live.iter() {
                        this.pending.insert(index);
                    }
                }
            }

            while !this.pending.is_clear() {
                let mut progress = false;
                for index in 0..this.sources.len() {
                    if !this.pending.contains(index) {
                        continue;
                    }
                    if !this.wakers.readiness().lock().unwrap().clear_ready(index) {
                        continue;
                    }
                    match fetch(
                        this.sources.as_mut(),
                        index,
                        this.wakers.get(index).unwrap(),
                        this.queue,
                        this.inventory,
                        this.live,
                    ) {
                        Poll::Ready(Ok(outcome)) => {
                            if let Fetched::Entry = outcome {
                                this.wakers.readiness().lock().unwrap().set_ready(index);
                            }
                            this.pending.set(index, false);
                            progress = true;
                        }
                        Poll::Ready(Err(err)) => {
                            *this.done = true;
                            return Poll::Ready(Some(Err(err)));
                        }
                        Poll::Pending => {}
                    }
                }
                if !progress && !this.pending.is_clear() {
                    return Poll::Pending;
                }
            }

            debug_assert!(this.queue.len() <= *this.queue_limit + this.live.live_count());

            match this.queue.pop() {
                Some((entry, source)) => {
                    this.inventory[source] -= 1;
                    *this.guard = Some(source);
                    return Poll::Ready(Some(Ok(entry)));
                }
                None => {
                    debug_assert_eq!(this.live.live_count(), 0);
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S, T, E> fmt::Debug for TryMerge<S, T, E>
where
    S: Stream<Item = Result<T, E>> + fmt::Debug,
    T: Timestamped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<S, T, E> TryMergeSortedTrait for Vec<S>
where
    S: Stream<Item = Result<T, E>>,
    T: Timestamped,
{
    type Item = T;
    type Error = E;
    type Stream = TryMerge<S, T, E>;

    fn try_merge_sorted(self) -> Self::Stream {
        TryMerge::new(self)
    }
}
