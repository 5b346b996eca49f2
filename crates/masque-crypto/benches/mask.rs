//! Masking throughput for typical identifier batches

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use masque_core::Element;
use masque_crypto::MaskKey;

fn bench_mask_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_all");
    for size in [100usize, 1_000, 10_000] {
        let elements: Vec<Element> = (0..size)
            .map(|i| Element::from(format!("user-{i:08}@example.com")))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &elements, |b, elements| {
            let key = MaskKey::generate().unwrap();
            b.iter(|| black_box(key.mask_all(elements)));
        });
    }
    group.finish();
}

fn bench_remask(c: &mut Criterion) {
    let key = MaskKey::generate().unwrap();
    let masked = key.mask_all(
        &(0..1_000)
            .map(|i| Element::from(format!("id-{i}")))
            .collect::<Vec<_>>(),
    );
    c.bench_function("remask_all_1000", |b| {
        b.iter(|| black_box(key.remask_all(masked.clone())));
    });
}

criterion_group!(benches, bench_mask_all, bench_remask);
criterion_main!(benches);
