use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use keytable::{KeyTable, TagRegistry};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("key_table_set_10k", |b| {
        b.iter_batched(
            || {
                let keys: Vec<String> = lcg(1).take(10_000).map(key).collect();
                (KeyTable::<u64>::new(), keys)
            },
            |(mut t, keys)| {
                for (i, k) in keys.iter().enumerate() {
                    t.set(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("key_table_get_hit", |b| {
        let mut t = KeyTable::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            t.set(k, i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("key_table_get_miss", |b| {
        let mut t = KeyTable::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            t.set(&key(x), i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // keys from a disjoint stream, almost surely absent
            let k = key(miss.next().unwrap());
            black_box(t.get(&k));
        })
    });
}

fn bench_overwrite(c: &mut Criterion) {
    c.bench_function("key_table_overwrite", |b| {
        let mut t = KeyTable::new();
        t.set("field", 0u64).unwrap();
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            black_box(t.set("field", n).unwrap());
        })
    });
}

fn bench_registry_intern(c: &mut Criterion) {
    c.bench_function("tag_registry_intern_warm", |b| {
        let mut r = TagRegistry::new();
        let names: Vec<_> = (0..64).map(|i| format!("field_{i}")).collect();
        for n in &names {
            r.tag_for(n).unwrap();
        }
        let mut it = names.iter().cycle();
        b.iter(|| {
            let n = it.next().unwrap();
            black_box(r.tag_for(n).unwrap());
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_set, bench_get_hit, bench_get_miss, bench_overwrite, bench_registry_intern
}
criterion_main!(benches);
