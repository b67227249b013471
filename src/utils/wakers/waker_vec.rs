use std::sync::{Arc, Mutex};
use std::task::{Wake, Waker};

use super::Readiness;

/// One waker per source, all funneling readiness into a shared set.
///
/// The number of sources is fixed at construction; the merge never grows
/// its source list.
#[derive(Debug)]
pub(crate) struct WakerVec {
    wakers: Vec<Waker>,
    readiness: Arc<Mutex<Readiness>>,
}

/// Marks its source ready when woken, then passes the wake on to the
/// task driving the merge. A source that is already marked ready has a
/// wake in flight, so the parent is not woken again.
#[derive(Debug)]
struct SourceWaker {
    index: usize,
    readiness: Arc<Mutex<Readiness>>,
}

impl Wake for SourceWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let mut readiness = self.readiness.lock().unwrap();
        let was_ready = readiness.set_ready(self.index);
        if was_ready {
            return;
        }
        match readiness.parent_waker() {
            Some(parent) => parent.wake_by_ref(),
            None => panic!("a source woke before the merge was first polled"),
        }
    }
}

impl WakerVec {
    /// Create a new instance of `WakerVec`.
    pub(crate) fn new(len: usize) -> Self {
        let readiness = Arc::new(Mutex::new(Readiness::new(len)));
        let wakers = (0..len)
            .map(|index| {
                Waker::from(Arc::new(SourceWaker {
                    index,
                    readiness: Arc::clone(&readiness),
                }))
            })
            .collect();
        Self { wakers, readiness }
    }

    /// The waker to poll source `index` with.
    pub(crate) fn get(&self, index: usize) -> Option<&Waker> {
        self.wakers.get(index)
    }

    /// Access the shared `Readiness` set.
    pub(crate) fn readiness(&self) -> &Mutex<Readiness> {
        self.readiness.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WakeCount(AtomicUsize);

    impl Wake for WakeCount {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn wake_marks_the_source_and_reaches_the_parent_once() {
        let wakers = WakerVec::new(2);
        let count = Arc::new(WakeCount(AtomicUsize::new(0)));
        {
            let mut readiness = wakers.readiness().lock().unwrap();
            readiness.set_waker(&Waker::from(count.clone()));
            readiness.clear_ready(0);
            readiness.clear_ready(1);
        }

        // The second wake lands while the first is still in flight.
        wakers.get(1).unwrap().wake_by_ref();
        wakers.get(1).unwrap().wake_by_ref();

        assert_eq!(count.0.load(Ordering::SeqCst), 1);
        let mut readiness = wakers.readiness().lock().unwrap();
        assert!(readiness.clear_ready(1));
        assert!(!readiness.clear_ready(0));
    }
}
