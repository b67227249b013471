use core::task::Waker;
use fixedbitset::FixedBitSet;

/// Tracks which source fetches have been woken and may make progress.
///
/// All sources start out ready so the initial refill cycle polls each of
/// them once.
#[derive(Debug)]
pub(crate) struct Readiness {
    ready_count: usize,
    ready: FixedBitSet,
    parent_waker: Option<Waker>,
}

impl Readiness {
    /// Create a new instance with all `len` sources marked ready.
    pub(crate) fn new(len: usize) -> Self {
        let mut ready = FixedBitSet::with_capacity(len);
        ready.set_range(.., true);
        Self {
            ready_count: len,
            ready,
            parent_waker: None,
        }
    }

    /// Set the ready state to `true` for the given source.
    ///
    /// Returns the previous ready state.
    pub(crate) fn set_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            true
        } else {
            self.ready_count += 1;
            self.ready.set(index, true);
            false
        }
    }

    /// Set the ready state to `false` for the given source.
    ///
    /// Returns whether the source was previously ready.
    pub(crate) fn clear_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            self.ready_count -= 1;
            self.ready.set(index, false);
            true
        } else {
            false
        }
    }

    /// Access the waker of the task driving the merge.
    pub(crate) fn parent_waker(&self) -> Option<&Waker> {
        self.parent_waker.as_ref()
    }

    /// Set the parent `Waker`. Must be called at the start of every poll
    /// of the merge so late wakes reach the current task.
    pub(crate) fn set_waker(&mut self, parent_waker: &Waker) {
        match &mut self.parent_waker {
            Some(prev) => prev.clone_from(parent_waker),
            None => self.parent_waker = Some(parent_waker.clone()),
        }
    }
}
