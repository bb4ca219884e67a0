use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use geo_rtree::{Rect, RTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::{GeomWithData, Rectangle};

fn random_boxes(count: usize) -> Vec<([f64; 2], [f64; 2])> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(-1000.0..1000.0);
            let y = rng.gen_range(-1000.0..1000.0);
            let w = rng.gen_range(0.0..10.0);
            let h = rng.gen_range(0.0..10.0);
            ([x, y], [x + w, y + h])
        })
        .collect()
}

fn construct_geo_rtree(boxes: &[([f64; 2], [f64; 2])]) -> RTree<Rect<f64, 2>, usize> {
    let mut tree = RTree::new();
    for (value, (min, max)) in boxes.iter().enumerate() {
        tree.insert(Rect::new(*min, *max), value);
    }
    tree
}

fn construct_rstar(
    boxes: &[([f64; 2], [f64; 2])],
) -> rstar::RTree<GeomWithData<Rectangle<[f64; 2]>, usize>> {
    let rects = boxes
        .iter()
        .enumerate()
        .map(|(value, (min, max))| GeomWithData::new(Rectangle::from_corners(*min, *max), value))
        .collect();
    rstar::RTree::bulk_load(rects)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let boxes = random_boxes(1000);

    c.bench_function("construct (1000 incremental inserts): geo-rtree", |b| {
        b.iter(|| construct_geo_rtree(black_box(&boxes)))
    });
    c.bench_function("construct (1000 boxes, bulk): rstar", |b| {
        b.iter(|| construct_rstar(black_box(&boxes)))
    });

    let tree = construct_geo_rtree(&boxes);
    let query = Rect::new([0.0, 0.0], [100.0, 100.0]);
    c.bench_function("search intersects: geo-rtree", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            tree.search_intersects(black_box(&query), |_, _| hits += 1);
            black_box(hits)
        })
    });

    let rstar_tree = construct_rstar(&boxes);
    let envelope = rstar::AABB::from_corners([0.0, 0.0], [100.0, 100.0]);
    c.bench_function("search intersects: rstar", |b| {
        b.iter(|| {
            rstar_tree
                .locate_in_envelope_intersecting(black_box(&envelope))
                .count()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
