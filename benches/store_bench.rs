//! Performance benchmarks for the sparse store hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sparray::SparseStore;

const LENGTH: i64 = 1 << 20;
const ENTRIES: i64 = 10_000;

fn scattered_indices() -> Vec<i64> {
    // Deterministic scatter across the logical range.
    (0..ENTRIES)
        .map(|i| (i.wrapping_mul(2654435761)) % LENGTH)
        .collect()
}

fn populated_store(indices: &[i64]) -> SparseStore<f64, f64> {
    let store = SparseStore::<f64, f64>::new(0.0, LENGTH).expect("valid length");
    for &i in indices {
        store.set(i, &(i as f64 + 0.5)).expect("in-bounds set");
    }
    store
}

fn benchmark_set(c: &mut Criterion) {
    let indices = scattered_indices();

    c.bench_function("set_insert_10k", |b| {
        b.iter(|| {
            let store = SparseStore::<f64, f64>::new(0.0, LENGTH).expect("valid length");
            for &i in &indices {
                store.set(black_box(i), &1.5).expect("set");
            }
            black_box(store.entry_count())
        });
    });

    c.bench_function("set_overwrite_10k", |b| {
        let store = populated_store(&indices);
        b.iter(|| {
            for &i in &indices {
                store.set(black_box(i), &2.5).expect("set");
            }
        });
    });
}

fn benchmark_get(c: &mut Criterion) {
    let indices = scattered_indices();
    let store = populated_store(&indices);

    c.bench_function("get_10k_hits", |b| {
        b.iter(|| {
            let mut out = 0.0;
            for &i in &indices {
                store.get(black_box(i), &mut out).expect("get");
            }
            black_box(out)
        });
    });

    c.bench_function("get_10k_absent", |b| {
        b.iter(|| {
            let mut out = 0.0;
            for i in 0..ENTRIES {
                // Odd offsets miss the scatter pattern almost always.
                store.get(black_box(i * 2 + 1), &mut out).expect("get");
            }
            black_box(out)
        });
    });
}

fn benchmark_duplicate(c: &mut Criterion) {
    let indices = scattered_indices();
    let store = populated_store(&indices);

    c.bench_function("duplicate_10k_entries", |b| {
        b.iter(|| black_box(store.deep_copy().entry_count()));
    });
}

criterion_group!(benches, benchmark_set, benchmark_get, benchmark_duplicate);
criterion_main!(benches);
