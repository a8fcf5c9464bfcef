//! Benchmark for surface meshing.
//!
//! TARGET: meshing a generated 16x128x16 chunk with all four neighbors
//! fits comfortably next to its generation inside one tick.
//!
//! Run with: cargo bench --package lithos_rendering --bench mesher_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lithos_procedural::{ChunkCoord, ChunkGenerator, WorldConfig, WorldSeed};
use lithos_rendering::{MeshNeighbors, SurfaceMesher};

fn benchmark_isolated_chunk(c: &mut Criterion) {
    let gen = ChunkGenerator::new(WorldSeed::new(42), &WorldConfig::default());
    let grid = gen.generate(ChunkCoord::new(0, 0));
    let mesher = SurfaceMesher::new();

    c.bench_function("mesh_isolated_chunk", |b| {
        b.iter(|| black_box(mesher.mesh(&MeshNeighbors::isolated(black_box(&grid)))));
    });
}

fn benchmark_chunk_with_neighbors(c: &mut Criterion) {
    let gen = ChunkGenerator::new(WorldSeed::new(42), &WorldConfig::default());
    let center = ChunkCoord::new(0, 0);
    let grid = gen.generate(center);
    let [pos_x, neg_x, pos_z, neg_z] = center.neighbors().map(|coord| gen.generate(coord));
    let mesher = SurfaceMesher::new();

    c.bench_function("mesh_chunk_with_neighbors", |b| {
        b.iter(|| {
            let neighbors = MeshNeighbors {
                center: &grid,
                pos_x: Some(&pos_x),
                neg_x: Some(&neg_x),
                pos_z: Some(&pos_z),
                neg_z: Some(&neg_z),
            };
            let meshes = mesher.mesh(black_box(&neighbors));
            black_box(meshes.solid.quad_count() + meshes.water.quad_count())
        });
    });
}

criterion_group!(
    benches,
    benchmark_isolated_chunk,
    benchmark_chunk_with_neighbors
);
criterion_main!(benches);
