use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use fixedbitset::FixedBitSet;
use futures_core::Stream;

use crate::utils::{self, Liveness, OrderedQueue, WakerVec};
use crate::Timestamped;

use super::MergeSorted as MergeSortedTrait;
use super::DEFAULT_QUEUE_LIMIT;

/// A stream that merges multiple sorted streams into a single sorted
/// stream.
///
/// This `struct` is created by the [`merge_sorted`] method on the
/// [`MergeSorted`] trait. See its documentation for more.
///
/// [`merge_sorted`]: trait.MergeSorted.html#tymethod.merge_sorted
/// [`MergeSorted`]: trait.MergeSorted.html
#[pin_project::pin_project]
pub struct Merge<S>
where
    S: Stream,
    S::Item: Timestamped,
{
    #[pin]
    sources: Vec<S>,
    wakers: WakerVec,
    /// Fetches issued for the current refill cycle and not yet settled.
    pending: FixedBitSet,
    /// Source drained by the previous pop, owed a catch-up fetch.
    guard: Option<usize>,
    live: Liveness,
    /// Per-source count of entries currently resident in the queue.
    inventory: Vec<usize>,
    queue: OrderedQueue<S::Item>,
    queue_limit: usize,
    done: bool,
}

impl<S> Merge<S>
where
    S: Stream,
    S::Item: Timestamped,
{
    pub(crate) fn new(sources: Vec<S>) -> Self {
        let len = sources.len();
        // The initial refill cycle runs unconditionally so every source
        // contributes a candidate (or reports exhaustion) before the
        // first pop.
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
    /// The limit is checked once per refill cycle, not per fetch: when
    /// the queue is over it, the batch top-up is skipped, but the
    /// catch-up fetch for a just-drained source always runs. The queue
    /// may therefore transiently hold up to `limit` plus one entry per
    /// live source.
    pub fn with_queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = limit;
        self
    }

    /// The number of candidate entries currently queued.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }
}

/// The settled outcome of fetching one entry from one source.
enum Fetched {
    /// The source produced an entry; it is now queued.
    Entry,
    /// The source reported exhaustion and left the live set.
    Drained,
}

/// Poll source `index` for its next entry. On success the entry is
/// queued and the source's inventory bumped; on exhaustion the source is
/// marked drained.
fn fetch<S>(
    sources: Pin<&mut Vec<S>>,
    index: usize,
    waker: &Waker,
    queue: &mut OrderedQueue<S::Item>,
    inventory: &mut [usize],
    live: &mut Liveness,
) -> Poll<Fetched>
where
    S: Stream,
    S::Item: Timestamped,
{
    let mut cx = Context::from_waker(waker);
    let source = utils::get_pin_mut_from_vec(sources, index).unwrap();
    match source.poll_next(&mut cx) {
        Poll::Ready(Some(entry)) => {
            queue.push(entry, index);
            inventory[index] += 1;
            Poll::Ready(Fetched::Entry)
        }
        Poll::Ready(None) => {
            live.set_drained(index);
            Poll::Ready(Fetched::Drained)
        }
        Poll::Pending => Poll::Pending,
    }
}

impl<S> Stream for Merge<S>
where
    S: Stream,
    S::Item: Timestamped,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        this.wakers.readiness().lock().unwrap().set_waker(cx.waker());

        loop {
            // Catch-up fetch for the source drained by the previous
            // pop: it must be represented in the queue again, or be
            // confirmed exhausted, before the next minimum is final.
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
                        Poll::Ready(Fetched::Entry) => {
                            this.wakers.readiness().lock().unwrap().set_ready(index);
                        }
                        Poll::Ready(Fetched::Drained) => {}
                        Poll::Pending => return Poll::Pending,
                    }
                    continue;
                }
                *this.guard = None;

                // Top up all live sources in one batch, unless the
                // queue has grown past the advisory limit.
                if this.queue.len() <= *this.queue_limit {
                    for index in this.live.iter() {
                        this.pending.insert(index);
                    }
                }
            }

            // Drive the refill cycle to completion. This is a join
            // point: popping resumes only once every fetch issued for
            // the cycle has settled.
            while !this.pending.is_clear() {
                let mut progress = false;
                for index in 0..this.sources.len() {
                    if !this.pending.contains(index) {
                        continue;
                    }
                    // Only poll sources whose fetch was woken.
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
                        Poll::Ready(outcome) => {
                            if let Fetched::Entry = outcome {
                                this.wakers.readiness().lock().unwrap().set_ready(index);
                            }
                            this.pending.set(index, false);
                            progress = true;
                        }
                        Poll::Pending => {}
                    }
                }
                if !progress && !this.pending.is_clear() {
                    return Poll::Pending;
                }
            }

            // A completed cycle leaves at most one extra candidate per
            // live source above the advisory limit.
            debug_assert!(this.queue.len() <= *this.queue_limit + this.live.live_count());

            match this.queue.pop() {
                Some((entry, source)) => {
                    this.inventory[source] -= 1;
                    *this.guard = Some(source);
                    return Poll::Ready(Some(entry));
                }
                // An empty queue after a completed cycle means every
                // source is exhausted.
                None => {
                    debug_assert_eq!(this.live.live_count(), 0);
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S> fmt::Debug for Merge<S>
where
    S: Stream + fmt::Debug,
    S::Item: Timestamped,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<S> MergeSortedTrait for Vec<S>
where
    S: Stream,
    S::Item: Timestamped,
{
    type Item = S::Item;
    type Stream = Merge<S>;

    fn merge_sorted(self) -> Self::Stream {
        Merge::new(self)
    }
}
