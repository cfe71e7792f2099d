// Transform engine benchmarks
//
// - typing: append-only inserts, one range that keeps growing
// - backspacing: repeated deletes that coalesce into one run
// - scattered: typing at spread-out positions, so the list grows with N
// - random: the fuzz generator's default op mix

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use mako::fuzz::{self, FuzzConfig};
use mako::ot::transform;
use mako::ot::{Op, RangeList};

const SIZES: [usize; 3] = [100, 1_000, 5_000];

fn typing_ops(n: usize) -> Vec<Op> {
    return (0..n).map(|i| Op::insert(10 + i as i64, 1)).collect();
}

fn backspace_ops(n: usize) -> Vec<Op> {
    let start = n as i64 + 10;
    return (0..n).map(|i| Op::delete(start - i as i64, 1)).collect();
}

fn scattered_ops(n: usize, rng: &mut StdRng) -> Vec<Op> {
    let mut ops = Vec::with_capacity(n);
    let mut doc_len: i64 = 4 * n as i64;
    for _ in 0..n {
        let pos = rng.gen_range(0..=doc_len);
        ops.push(Op::insert(pos, 1));
        doc_len += 1;
    }
    return ops;
}

fn bench_apply(c: &mut Criterion, name: &str, make: impl Fn(usize) -> Vec<Op>) {
    let mut group = c.benchmark_group(name);
    for size in SIZES {
        let ops = make(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("incremental", size), &ops, |b, ops| {
            b.iter(|| {
                let mut list = RangeList::new();
                for op in ops {
                    list.apply(std::slice::from_ref(op)).unwrap();
                }
                black_box(list)
            });
        });
        group.bench_with_input(BenchmarkId::new("derive", size), &ops, |b, ops| {
            b.iter(|| black_box(transform::derive(ops).unwrap()));
        });
    }
    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    bench_apply(c, "typing", typing_ops);
}

fn bench_backspacing(c: &mut Criterion) {
    bench_apply(c, "backspacing", backspace_ops);
}

fn bench_scattered(c: &mut Criterion) {
    bench_apply(c, "scattered", |n| scattered_ops(n, &mut StdRng::seed_from_u64(42)));
}

fn bench_random(c: &mut Criterion) {
    bench_apply(c, "random", |n| {
        let config = FuzzConfig {
            num_tests: n,
            max_insert_pos: 200,
            ..FuzzConfig::default()
        };
        fuzz::generate(&config, &mut StdRng::seed_from_u64(42))
    });
}

criterion_group!(benches, bench_typing, bench_backspacing, bench_scattered, bench_random);
criterion_main!(benches);
