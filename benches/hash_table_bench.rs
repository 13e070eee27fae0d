use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use partition_affinity::HashTable;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = i64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s as i64)
    })
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::insert_fresh_100k", |b| {
        b.iter_batched(
            || HashTable::with_capacity(20480).unwrap(),
            |mut t| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    let _ = t.put(k, (i % 4) as u32).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_from_one_bucket_100k(c: &mut Criterion) {
    c.bench_function("table::insert_from_one_bucket_100k", |b| {
        b.iter_batched(
            || HashTable::with_capacity(1).unwrap(),
            |mut t| {
                for (i, k) in lcg(2).take(100_000).enumerate() {
                    let _ = t.put(k, i as u32).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("table::get_hit_10k_on_100k", |b| {
        let mut t = HashTable::with_capacity(20480).unwrap();
        let keys: Vec<i64> = lcg(7).take(100_000).collect();
        for (i, &k) in keys.iter().enumerate() {
            let _ = t.put(k, i as u32).unwrap();
        }
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<i64> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n]
            })
            .collect();
        b.iter(|| {
            for &k in &queries {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        let mut t = HashTable::with_capacity(20480).unwrap();
        for (i, k) in lcg(11).take(100_000).enumerate() {
            let _ = t.put(k, i as u32).unwrap();
        }
        let misses: Vec<i64> = lcg(0xdead_beef).take(10_000).collect();
        b.iter(|| {
            for &k in &misses {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_remove_reinsert_10k(c: &mut Criterion) {
    c.bench_function("table::remove_reinsert_10k_of_100k", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::with_capacity(20480).unwrap();
                let keys: Vec<i64> = lcg(5).take(100_000).collect();
                for &k in &keys {
                    let _ = t.put(k, 1).unwrap();
                }
                (t, keys[..10_000].to_vec())
            },
            |(mut t, keys)| {
                for &k in &keys {
                    black_box(t.remove(k));
                }
                for &k in &keys {
                    let _ = t.put(k, 2).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_from_one_bucket_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_reinsert_10k
}
criterion_main!(benches_insert, benches_ops);
