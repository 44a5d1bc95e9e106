//! Benchmarks for the cube engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cubie::grid::{Layer, LayerTable};
use cubie::notation::parse_sequence;
use cubie::Cube;

const SUPERFLIP: &str = "U R2 F B R B2 R U2 L B2 R U' D' R2 F R' L B2 U2 F2";

/// Benchmark one committed quarter turn, including the layer rebuild.
fn bench_rotate(c: &mut Criterion) {
    let mut cube = Cube::default();

    c.bench_function("rotate_layer", |b| {
        b.iter(|| cube.rotate(black_box(Layer::Right), 1))
    });
}

/// Benchmark recomputing layer membership from scratch.
fn bench_rebuild(c: &mut Criterion) {
    let cube = Cube::default();

    c.bench_function("rebuild_layers", |b| {
        b.iter(|| LayerTable::rebuild(black_box(cube.cubies())))
    });
}

/// Benchmark parsing a 20-move sequence.
fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_sequence", |b| {
        b.iter(|| parse_sequence(black_box(SUPERFLIP)))
    });
}

/// Benchmark extracting the facelet string of a scrambled cube.
fn bench_facelets(c: &mut Criterion) {
    let mut cube = Cube::default();
    if let Ok(moves) = parse_sequence(SUPERFLIP) {
        cube.apply_all(&moves);
    }

    c.bench_function("facelets", |b| b.iter(|| black_box(&cube).facelets()));
}

criterion_group!(
    benches,
    bench_rotate,
    bench_rebuild,
    bench_parse,
    bench_facelets
);
criterion_main!(benches);
