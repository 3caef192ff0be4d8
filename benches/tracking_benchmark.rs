//! Benchmarks for the native tracking paths

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use image::RgbImage;
use ndarray::Array2;

use roitrack::flow::{corners, lk, CornerConfig, LkParams, Pyramid};
use roitrack::medianflow::MedianFlowTracker;
use roitrack::{BoundingBox, ObjectTracker};

fn textured_plane(w: usize, h: usize, ox: usize, oy: usize, size: usize) -> Array2<f32> {
    let mut img = Array2::from_elem((h, w), 25.0);
    for y in oy..(oy + size).min(h) {
        for x in ox..(ox + size).min(w) {
            let lx = x - ox;
            let ly = y - oy;
            img[(y, x)] = 90.0 + ((lx * 37 + ly * 59) % 113) as f32;
        }
    }
    img
}

fn textured_frame(w: u32, h: u32, ox: u32, oy: u32, size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(w, h, image::Rgb([25, 25, 25]));
    for y in oy..(oy + size).min(h) {
        for x in ox..(ox + size).min(w) {
            let lx = x - ox;
            let ly = y - oy;
            let v = (90 + (lx * 37 + ly * 59) % 113) as u8;
            img.put_pixel(x, y, image::Rgb([v, v, v]));
        }
    }
    img
}

fn bench_pyramid_build(c: &mut Criterion) {
    let plane = textured_plane(320, 240, 80, 60, 100);
    c.bench_function("pyramid_build_320x240", |b| {
        b.iter(|| Pyramid::build(black_box(plane.clone()), 3))
    });
}

fn bench_corner_detection(c: &mut Criterion) {
    let plane = textured_plane(320, 240, 80, 60, 100);
    let region = BoundingBox::new(80.0, 60.0, 100.0, 100.0);
    let config = CornerConfig::default();
    c.bench_function("corners_in_100px_region", |b| {
        b.iter(|| corners::detect_in_region(black_box(&plane), &region, &config))
    });
}

fn bench_lk_point_tracking(c: &mut Criterion) {
    let prev = Pyramid::build(textured_plane(320, 240, 80, 60, 100), 3);
    let curr = Pyramid::build(textured_plane(320, 240, 83, 62, 100), 3);
    let region = BoundingBox::new(80.0, 60.0, 100.0, 100.0);
    let points = corners::detect_in_region(&prev.levels[0], &region, &CornerConfig::default());
    let params = LkParams::default();
    c.bench_function("lk_track_points", |b| {
        b.iter(|| lk::track_points(black_box(&prev), black_box(&curr), &points, &params))
    });
}

fn bench_median_flow_update(c: &mut Criterion) {
    let first = textured_frame(320, 240, 80, 60, 100);
    let second = textured_frame(320, 240, 83, 62, 100);
    let roi = BoundingBox::new(80.0, 60.0, 100.0, 100.0);

    c.bench_function("median_flow_update", |b| {
        b.iter_batched(
            || {
                let mut tracker = MedianFlowTracker::default();
                tracker
                    .init(&first, roi)
                    .expect("init on textured frame succeeds");
                tracker
            },
            |mut tracker| tracker.update(black_box(&second)),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_pyramid_build,
    bench_corner_detection,
    bench_lk_point_tracking,
    bench_median_flow_update
);
criterion_main!(benches);
