//! # Perception Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, GrayImage, Luma};

use percept_lib::{
    binary_image::BinaryImage,
    percept::{Params, Percept},
    preproc::{binarise, PreprocParams},
};
use util::module::State;

fn percept_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic 640x480 frame ----

    // Lane surface in a band which bends to the right towards the bottom of the image, with the
    // track edge above row 120
    let gray = GrayImage::from_fn(640, 480, |x, y| {
        let left = 120 + y / 4;
        let right = 420 + y / 3;
        if y > 120 && x >= left && x < right {
            Luma([230])
        } else {
            Luma([40])
        }
    });
    let frame = DynamicImage::ImageLuma8(gray);

    let preproc_params = PreprocParams::default();
    let binary: BinaryImage = binarise(&frame, &preproc_params);

    c.bench_function("preproc::binarise", |b| {
        b.iter(|| binarise(black_box(&frame), &preproc_params))
    });

    let mut percept = Percept::default();
    percept.init(Params::default()).unwrap();

    // Warm the tracker up so the benchmark measures the per-frame path
    percept.proc(&binary).unwrap();

    c.bench_function("Percept::proc", |b| {
        b.iter(|| percept.proc(black_box(&binary)).unwrap())
    });
}

criterion_group!(benches, percept_benchmark);
criterion_main!(benches);
