//! Checksum and batch ingestion benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cloudfiles::ingest_in_transaction;
use cloudfiles_core::{Checksum, OwnerId};
use cloudfiles_store::{MemoryStore, SqliteStore};
use cloudfiles_testkit::fixtures::file;

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");

    for size in [64usize, 4 * 1024, 1024 * 1024] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(Checksum::compute(data)));
        });
    }

    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    let owner = OwnerId::new("bench");

    for count in [1usize, 16, 128] {
        let batch: Vec<_> = (0..count)
            .map(|i| file(&format!("file-{}", i), "benchmark contents"))
            .collect();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("memory", count), &batch, |b, batch| {
            b.iter(|| {
                let store = MemoryStore::new();
                black_box(ingest_in_transaction(&store, &owner, batch.clone(), None).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("sqlite", count), &batch, |b, batch| {
            b.iter(|| {
                let store = SqliteStore::open_memory().unwrap();
                black_box(ingest_in_transaction(&store, &owner, batch.clone(), None).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_checksum, bench_ingest);
criterion_main!(benches);
