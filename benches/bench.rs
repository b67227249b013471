use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use futures_lite::future::block_on;
use futures_lite::prelude::*;
use futures_lite::stream;
use std::hint::black_box;

use sorted_merge::prelude::*;

const ENTRIES_PER_SOURCE: usize = 1000;

fn interleaved(sources: usize) -> Vec<Vec<u64>> {
    (0..sources)
        .map(|src| {
            (0..ENTRIES_PER_SOURCE)
                .map(|n| (n * sources + src) as u64)
                .collect()
        })
        .collect()
}

fn iter_merge_sorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter::merge_sorted");
    for sources in [2usize, 8, 32] {
        group.throughput(Throughput::Elements((sources * ENTRIES_PER_SOURCE) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sources),
            &sources,
            |b, &sources| {
                b.iter(|| {
                    let merged = interleaved(sources).merge_sorted();
                    black_box(merged.count())
                })
            },
        );
    }
    group.finish();
}

fn stream_merge_sorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream::merge_sorted");
    for sources in [2usize, 8, 32] {
        group.throughput(Throughput::Elements((sources * ENTRIES_PER_SOURCE) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sources),
            &sources,
            |b, &sources| {
                b.iter(|| {
                    block_on(async {
                        let sources: Vec<_> =
                            interleaved(sources).into_iter().map(stream::iter).collect();
                        let mut merged = sources.merge_sorted();
                        let mut count = 0;
                        while merged.next().await.is_some() {
                            count += 1;
                        }
                        black_box(count)
                    })
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, iter_merge_sorted, stream_merge_sorted);
criterion_main!(benches);
