//! Benchmarks for the reshade variant pipeline.
//!
//! Run with: cargo bench -p reshade-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reshade_core::config::{LimitsConfig, VariantConfig};
use reshade_core::pipeline::decode::{ImageDecoder, SourceInput};
use reshade_core::pipeline::{color, geometry, noise, VariantGenerator};
use std::io::Cursor;

fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    })
}

fn benchmark_generate_variant(c: &mut Criterion) {
    let mut png = Cursor::new(Vec::new());
    test_image(800, 600)
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();
    let source = ImageDecoder::new(LimitsConfig::default())
        .decode(SourceInput::new("bench.png", png.into_inner()))
        .unwrap();
    let generator = VariantGenerator::new(VariantConfig::default());
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("generate_variant_800x600", |b| {
        b.iter(|| {
            let _ = generator.generate(black_box(&source), 0, &mut rng);
        })
    });
}

fn benchmark_rotate(c: &mut Criterion) {
    let img = test_image(800, 600);

    c.bench_function("rotate_800x600", |b| {
        b.iter(|| {
            let _ = geometry::rotate(black_box(&img), 1.1);
        })
    });
}

fn benchmark_shear(c: &mut Criterion) {
    let img = test_image(800, 600);

    c.bench_function("shear_800x600", |b| {
        b.iter(|| {
            let _ = geometry::shear(black_box(&img), 0.005, 0.004);
        })
    });
}

fn benchmark_color_shift(c: &mut Criterion) {
    let mut img = test_image(800, 600);
    let mut rng = StdRng::seed_from_u64(2);

    c.bench_function("color_shift_800x600", |b| {
        b.iter(|| color::apply(black_box(&mut img), &mut rng))
    });
}

fn benchmark_noise(c: &mut Criterion) {
    let mut img = test_image(800, 600);
    let mut rng = StdRng::seed_from_u64(3);

    c.bench_function("noise_800x600", |b| {
        b.iter(|| noise::apply(black_box(&mut img), &mut rng))
    });
}

criterion_group!(
    benches,
    benchmark_generate_variant,
    benchmark_rotate,
    benchmark_shear,
    benchmark_color_shift,
    benchmark_noise,
);
criterion_main!(benches);
