//! Benchmarks for mirror map construction and shape key transfer.

use criterion::{criterion_group, criterion_main, Criterion};
use shapemirror::prelude::*;
use nalgebra::Point3;

/// Triangulated grid of `n x n` cells centred on the YZ plane.
///
/// With `split`, the middle column is dropped so the two halves form separate
/// components and every match needs the global search.
fn create_symmetric_grid(n: usize, split: bool) -> EdgeMesh {
    let half = (n / 2) as f64;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64 - half, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            if split && (i + 1 == n / 2 || i == n / 2) {
                continue;
            }
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    EdgeMesh::from_triangles(vertices, &faces).unwrap()
}

/// An object whose "Wave" key displaces the negative side only.
fn create_object(n: usize) -> MeshObject {
    let mesh = create_symmetric_grid(n, false);
    let base = mesh.positions().to_vec();

    let mut keys = ShapeKeySet::with_basis(base.clone());
    let wave = base
        .iter()
        .map(|p| {
            if p.x < 0.0 {
                Point3::new(p.x, p.y, (p.x * 0.3).sin() * (p.y * 0.2).cos())
            } else {
                *p
            }
        })
        .collect();
    keys.add_key("Wave", wave, keys.basis()).unwrap();

    MeshObject::new(mesh).with_shape_keys(keys)
}

fn bench_components(c: &mut Criterion) {
    let mesh = create_symmetric_grid(100, true);

    c.bench_function("connected_components_100x100", |b| {
        b.iter(|| connected_components(&mesh))
    });
}

fn bench_mirror_map(c: &mut Criterion) {
    let joined = create_symmetric_grid(50, false);
    let split = create_symmetric_grid(50, true);

    c.bench_function("mirror_map_joined_50x50", |b| {
        let options = MirrorOptions::default();
        b.iter(|| build_mirror_map(&joined, &options))
    });

    c.bench_function("mirror_map_split_50x50_sequential", |b| {
        let options = MirrorOptions::default().sequential();
        b.iter(|| build_mirror_map(&split, &options))
    });

    c.bench_function("mirror_map_split_50x50_parallel", |b| {
        let options = MirrorOptions::default();
        b.iter(|| build_mirror_map(&split, &options))
    });
}

fn bench_symmetry_check(c: &mut Criterion) {
    let mesh = create_symmetric_grid(100, false);
    let map = build_mirror_map(&mesh, &MirrorOptions::default());

    c.bench_function("is_symmetric_100x100", |b| {
        b.iter(|| is_symmetric(mesh.positions(), &map, Axis::X, 1e-4))
    });
}

fn bench_transfer(c: &mut Criterion) {
    let object = create_object(50);

    c.bench_function("symmetrize_50x50", |b| {
        let options = MirrorOptions::default();
        b.iter(|| {
            let mut object = object.clone();
            symmetrize(&mut object, "Wave", &options).unwrap()
        })
    });

    c.bench_function("swap_50x50", |b| {
        let options = MirrorOptions::default();
        b.iter(|| {
            let mut object = object.clone();
            swap(&mut object, "Wave", &options).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_components,
    bench_mirror_map,
    bench_symmetry_check,
    bench_transfer
);
criterion_main!(benches);
