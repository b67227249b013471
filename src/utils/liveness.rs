use fixedbitset::FixedBitSet;

/// Tracks which sources have not yet reported exhaustion.
///
/// The set starts full and only ever shrinks; a source is marked drained
/// exactly once, the moment it signals exhaustion instead of an entry.
/// Drained sources are never polled again.
#[derive(Debug)]
pub(crate) struct Liveness {
    live: FixedBitSet,
    count: usize,
}

impl Liveness {
    /// Create a new tracker with all `len` sources live.
    pub(crate) fn new(len: usize) -> Self {
        let mut live = FixedBitSet::with_capacity(len);
        live.set_range(.., true);
        Self { live, count: len }
    }

    pub(crate) fn is_live(&self, index: usize) -> bool {
        self.live[index]
    }

    /// Mark a source as drained. Idempotent.
    pub(crate) fn set_drained(&mut self, index: usize) {
        if self.live[index] {
            self.live.set(index, false);
            self.count -= 1;
        }
    }

    /// Number of sources still live.
    pub(crate) fn live_count(&self) -> usize {
        self.count
    }

    /// Snapshot iterator over the indexes of live sources.
    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.live.ones()
    }
}
