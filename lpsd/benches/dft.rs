use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lpsd::kernel::KernelLifecycle;
use lpsd::signal::traits::{CrossSegmentDft1D, SegmentDft1D};
use lpsd::signal::{
    dft_basis, smooth, CrossSegmentDftKernel, SegmentDftConfig, SegmentDftKernel, SmoothMethod,
};
use rand::rngs::ThreadRng;
use std::num::NonZeroUsize;

/// Get a drifting noisy tone from instance of `rng`.
fn randomized_signal(mut rng: ThreadRng, num_data_points: NonZeroUsize) -> Vec<f64> {
    use rand::Rng;

    let n: usize = num_data_points.into();
    let phase = rng.random_range(0.0..std::f64::consts::PI);
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            (2.0 * std::f64::consts::PI * 37.0 * t + phase).sin()
                + 0.3 * t
                + rng.random_range(-0.5..0.5)
        })
        .collect()
}

fn dft_overlap_order(c: &mut Criterion) {
    let n = NonZeroUsize::new(1 << 16).unwrap();
    let x = randomized_signal(rand::rng(), n);
    let seg_len = 1024;
    let (cr, ci) = dft_basis(seg_len, 37.0, 1024.0).unwrap();

    let mut group = c.benchmark_group("dft");
    for order in [-1, 0, 1, 4, 10] {
        let kernel = SegmentDftKernel::try_new(SegmentDftConfig {
            seg_len,
            overlap: 50.0,
            order,
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::new("order", order), &order, |b, _| {
            b.iter(|| kernel.run(black_box(&x), &cr, &ci).unwrap())
        });
    }
    group.finish();
}

fn xdft_overlap(c: &mut Criterion) {
    let n = NonZeroUsize::new(1 << 16).unwrap();
    let x = randomized_signal(rand::rng(), n);
    let y = randomized_signal(rand::rng(), n);
    let seg_len = 1024;
    let (cr, ci) = dft_basis(seg_len, 37.0, 1024.0).unwrap();

    let mut group = c.benchmark_group("xdft");
    for overlap in [0.0, 50.0, 75.0] {
        let kernel = CrossSegmentDftKernel::try_new(SegmentDftConfig {
            seg_len,
            overlap,
            order: 1,
        })
        .unwrap();
        group.bench_with_input(
            BenchmarkId::new("overlap", overlap as u32),
            &overlap,
            |b, _| b.iter(|| kernel.run(black_box(&x), black_box(&y), &cr, &ci).unwrap()),
        );
    }
    group.finish();
}

fn smooth_bandwidth(c: &mut Criterion) {
    let n = NonZeroUsize::new(1 << 14).unwrap();
    let x = randomized_signal(rand::rng(), n);

    let mut group = c.benchmark_group("smooth");
    for bandwidth in [4usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("median", bandwidth),
            &bandwidth,
            |b, &bw| b.iter(|| smooth(black_box(&x), bw, 0.7, SmoothMethod::Median).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, dft_overlap_order, xdft_overlap, smooth_bandwidth);
criterion_main!(benches);
