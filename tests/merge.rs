use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use futures_core::Stream;
use futures_lite::future::block_on;
use futures_lite::prelude::*;
use futures_lite::stream;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sorted_merge::prelude::*;
use sorted_merge::sink::{self, Sink};

#[derive(Default)]
struct Recording {
    entries: Vec<u64>,
    done_calls: usize,
}

impl Sink<u64> for Recording {
    fn print(&mut self, entry: u64) {
        assert_eq!(self.done_calls, 0, "print after done");
        self.entries.push(entry);
    }

    fn done(&mut self) {
        self.done_calls += 1;
    }
}

struct SharedSink(Rc<RefCell<Recording>>);

impl Sink<u64> for SharedSink {
    fn print(&mut self, entry: u64) {
        self.0.borrow_mut().print(entry);
    }

    fn done(&mut self) {
        self.0.borrow_mut().done();
    }
}

#[test]
fn three_interleaved_sources_sync() {
    let sources = vec![vec![1u64, 4, 7], vec![2, 5, 8], vec![3, 6, 9]];

    let mut sink = Recording::default();
    sink::drain(sources.merge_sorted(), &mut sink);

    assert_eq!(sink.entries, (1..=9).collect::<Vec<_>>());
    assert_eq!(sink.done_calls, 1);
}

#[test]
fn three_interleaved_sources_async() {
    block_on(async {
        let a = stream::iter(vec![1u64, 4, 7]);
        let b = stream::iter(vec![2, 5, 8]);
        let c = stream::iter(vec![3, 6, 9]);

        let mut sink = Recording::default();
        sink::drain_async(vec![a, b, c].merge_sorted(), &mut sink).await;

        assert_eq!(sink.entries, (1..=9).collect::<Vec<_>>());
        assert_eq!(sink.done_calls, 1);
    })
}

#[test]
fn empty_source_is_not_a_failure() {
    let sources = vec![vec![1u64, 3, 5], vec![], vec![2, 4, 6]];

    let mut sink = Recording::default();
    sink::drain(sources.merge_sorted(), &mut sink);

    assert_eq!(sink.entries, (1..=6).collect::<Vec<_>>());
    assert_eq!(sink.done_calls, 1);
}

#[test]
fn tiny_queue_limit_exercises_the_skip_path() {
    block_on(async {
        let sources: Vec<_> = (0..5u64)
            .map(|src| stream::iter((0..10).map(move |n| n * 5 + src).collect::<Vec<_>>()))
            .collect();

        let mut sink = Recording::default();
        sink::drain_async(sources.merge_sorted().with_queue_limit(1), &mut sink).await;

        assert_eq!(sink.entries, (0..50).collect::<Vec<_>>());
        assert_eq!(sink.done_calls, 1);
    })
}

/// A source whose fetch never resolves holds the whole merge back:
/// nothing is emitted past the join point and `done()` is never called.
#[test]
fn stalled_source_never_reaches_done() {
    let mut pool = LocalPool::new();

    let recording = Rc::new(RefCell::new(Recording::default()));
    let recording2 = recording.clone();

    pool.spawner()
        .spawn_local(async move {
            let sources: Vec<Pin<Box<dyn Stream<Item = u64>>>> = vec![
                Box::pin(stream::pending()),
                Box::pin(stream::iter(vec![1u64, 2, 3])),
            ];
            let mut sink = SharedSink(recording2);
            sink::drain_async(sources.merge_sorted(), &mut sink).await;
        })
        .unwrap();

    pool.run_until_stalled();

    assert_eq!(recording.borrow().entries, Vec::<u64>::new());
    assert_eq!(recording.borrow().done_calls, 0);
}

#[test]
fn matches_kmerge_on_random_input() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..32 {
        let k = rng.gen_range(1..8);
        let sources: Vec<Vec<u64>> = (0..k)
            .map(|_| {
                let len = rng.gen_range(0..64);
                let mut ts = 0u64;
                (0..len)
                    .map(|_| {
                        ts += rng.gen_range(0..4);
                        ts
                    })
                    .collect()
            })
            .collect();

        let expected: Vec<u64> = sources.clone().into_iter().kmerge().collect();
        let out: Vec<u64> = sources.merge_sorted().collect();
        assert_eq!(out, expected);
    }
}

/// Equal timestamps go to the lower source index, then to arrival order
/// within the source, for both orchestrators.
#[test]
fn deterministic_tie_break_on_duplicate_timestamps() {
    let mut rng = StdRng::seed_from_u64(0xdeadbeef);

    for round in 0..16 {
        let k = rng.gen_range(1..6);
        let mut sources: Vec<Vec<(u64, (usize, usize))>> = vec![];
        let mut expected = vec![];
        for src in 0..k {
            let len = rng.gen_range(0..32);
            let mut ts = 0u64;
            let entries: Vec<_> = (0..len)
                .map(|pos| {
                    ts += rng.gen_range(0..3);
                    (ts, (src, pos))
                })
                .collect();
            expected.extend(entries.iter().cloned());
            sources.push(entries);
        }
        expected.sort_by_key(|&(ts, (src, pos))| (ts, src, pos));

        let out: Vec<_> = sources.clone().merge_sorted().collect();
        assert_eq!(out, expected, "sync, round {round}");

        let out: Vec<_> = block_on(async {
            let sources: Vec<_> = sources.into_iter().map(stream::iter).collect();
            let limit = rng.gen_range(1..8);
            let mut s = sources.merge_sorted().with_queue_limit(limit);
            let mut out = vec![];
            while let Some(entry) = s.next().await {
                out.push(entry);
            }
            out
        });
        assert_eq!(out, expected, "async, round {round}");
    }
}

#[test]
fn completeness_every_entry_exactly_once() {
    let sources: Vec<Vec<u64>> = vec![
        (0..100).map(|n| n * 3).collect(),
        (0..50).map(|n| n * 7).collect(),
        (0..25).map(|n| n * 11).collect(),
    ];
    let total: usize = sources.iter().map(Vec::len).sum();

    let mut sink = Recording::default();
    sink::drain(sources.clone().merge_sorted(), &mut sink);

    assert_eq!(sink.entries.len(), total);
    assert!(sink.entries.windows(2).all(|w| w[0] <= w[1]));

    let mut expected: Vec<u64> = sources.into_iter().flatten().collect();
    expected.sort_unstable();
    assert_eq!(sink.entries, expected);
}

#[tokio::test]
async fn merges_sources_that_suspend_on_a_real_timer() {
    fn delayed(entries: Vec<u64>) -> impl Stream<Item = u64> {
        stream::unfold(entries.into_iter(), |mut entries| async move {
            let entry = entries.next()?;
            tokio::time::sleep(std::time::Duration::from_millis(entry % 3)).await;
            Some((entry, entries))
        })
    }

    let a = delayed(vec![1, 4, 7]);
    let b = delayed(vec![2, 5, 8]);
    let c = delayed(vec![3, 6, 9]);

    let mut s = std::pin::pin!(vec![a, b, c].merge_sorted());
    let mut out = vec![];
    while let Some(entry) = s.next().await {
        out.push(entry);
    }
    assert_eq!(out, (1..=9).collect::<Vec<_>>());
}
