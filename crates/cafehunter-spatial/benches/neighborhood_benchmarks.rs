//! Benchmarks for geohash encoding and neighbourhood search.
//!
//! The store holds a grid of cafes spread over central Taipei, roughly the
//! density of the public cafe dataset. Set `BENCH_FULL_SCALE=1` to use a
//! grid ten times denser.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cafehunter_core::types::{Cafe, CafeRatings, Coordinate};
use cafehunter_spatial::{encode, neighborhood, MemoryCafeStore, NeighborhoodSearch};

/// Grid side length for CI benchmarks (side * side cafes).
const CI_GRID_SIDE: usize = 40;

const FULL_SCALE_GRID_SIDE: usize = 400;

fn grid_side() -> usize {
    if std::env::var("BENCH_FULL_SCALE").is_ok() {
        FULL_SCALE_GRID_SIDE
    } else {
        CI_GRID_SIDE
    }
}

/// Cafes on a regular grid between 24.98..25.10 N and 121.45..121.62 E.
fn build_store(side: usize) -> MemoryCafeStore {
    let lat_step = 0.12 / side as f64;
    let lon_step = 0.17 / side as f64;
    let mut store = MemoryCafeStore::new();
    for row in 0..side {
        for col in 0..side {
            let location = Coordinate::new(
                24.98 + row as f64 * lat_step,
                121.45 + col as f64 * lon_step,
            );
            let geohash = match encode(location, 8) {
                Ok(hash) => hash,
                Err(_) => continue,
            };
            store.insert(Cafe {
                id: format!("cafe-{}-{}", row, col),
                name: format!("Grid Cafe {} {}", row, col),
                city: "taipei".to_string(),
                address: String::new(),
                url: String::new(),
                location,
                geohash,
                ratings: CafeRatings::default(),
                time_limited: String::new(),
                plug: String::new(),
            });
        }
    }
    store
}

fn bench_encode(c: &mut Criterion) {
    let point = Coordinate::new(25.0421, 121.5074);
    c.bench_function("geohash_encode_p8", |b| {
        b.iter(|| encode(black_box(point), 8))
    });
    c.bench_function("geohash_neighborhood_p6", |b| {
        b.iter(|| neighborhood(black_box(point), 6))
    });
}

fn bench_find_nearby(c: &mut Criterion) {
    let store = Arc::new(build_store(grid_side()));
    let search = NeighborhoodSearch::new(store, 6);
    let point = Coordinate::new(25.0421, 121.5074);

    c.bench_function("find_nearby_p6", |b| {
        b.iter(|| search.find_nearby(black_box(point)))
    });
}

criterion_group!(benches, bench_encode, bench_find_nearby);
criterion_main!(benches);
