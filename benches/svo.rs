use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::IVec3;
use svoxel::scene::populate_pastel_cube;
use svoxel::voxel::svo::{decode, Octree};
use svoxel::voxel::Voxel;

fn pastel_cube(size: u32) -> Octree {
    let mut octree = Octree::new();
    populate_pastel_cube(&mut octree, size, 12345);
    octree
}

fn bench_insert_cube_16(c: &mut Criterion) {
    c.bench_function("insert_cube_16", |b| {
        b.iter(|| pastel_cube(black_box(16)));
    });
}

fn bench_insert_with_growth(c: &mut Criterion) {
    c.bench_function("insert_with_growth", |b| {
        b.iter(|| {
            let mut octree = Octree::with_depth(1).unwrap();
            for i in 0..20 {
                let edge = 1i32 << i;
                octree.insert(black_box(IVec3::new(edge, -edge, edge / 2)), Voxel::opaque(1, 2, 3));
            }
            octree
        });
    });
}

fn bench_lookup(c: &mut Criterion) {
    let octree = pastel_cube(16);

    c.bench_function("lookup_cube_16", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for x in -8..8 {
                for y in -8..8 {
                    if octree.at(black_box(IVec3::new(x, y, 0))).is_ok() {
                        hits += 1;
                    }
                }
            }
            hits
        });
    });
}

fn bench_flatten_32(c: &mut Criterion) {
    let octree = pastel_cube(32);
    let mut buffer = Vec::new();

    c.bench_function("flatten_cube_32", |b| {
        b.iter(|| {
            octree.flatten_into(black_box(&mut buffer)).unwrap();
        });
    });
}

fn bench_decode_32(c: &mut Criterion) {
    let buffer = pastel_cube(32).flatten().unwrap();

    c.bench_function("decode_cube_32", |b| {
        b.iter(|| decode(black_box(&buffer)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_insert_cube_16,
    bench_insert_with_growth,
    bench_lookup,
    bench_flatten_32,
    bench_decode_32,
);
criterion_main!(benches);
