// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csgvr::csg::{VertexArena, VertexStatus};
use csgvr::geometry::{BooleanOp, Primitive};
use csgvr::{perform_boolean_operation_with_config, CsgConfig};
use nalgebra::{Point3, Vector3};

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    let config = CsgConfig::seeded(1);

    let cube1 = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh();
    let mut cube2 = Primitive::cube(Vector3::new(8.0, 8.0, 8.0), false).to_mesh();
    cube2.translate(Vector3::new(5.0, 5.0, 5.0));

    for op in [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Difference] {
        group.bench_with_input(BenchmarkId::new("cube_cube", op), &op, |b, &op| {
            b.iter(|| perform_boolean_operation_with_config(&cube1, black_box(&cube2), op, &config).unwrap());
        });
    }

    for segments in [8u32, 16, 32] {
        let sphere = Primitive::sphere(6.0, segments).to_mesh();
        group.bench_with_input(BenchmarkId::new("cube_minus_sphere", segments), &sphere, |b, sphere| {
            b.iter(|| {
                perform_boolean_operation_with_config(&cube1, black_box(sphere), BooleanOp::Difference, &config)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_mark(c: &mut Criterion) {
    let mut group = c.benchmark_group("mark");

    for size in [1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut arena = VertexArena::new();
                    let mut previous = arena.push(csgvr::csg::Vertex::new(Point3::origin(), Default::default()));
                    let first = previous;
                    for i in 1..size {
                        let id = arena.push(csgvr::csg::Vertex::new(
                            Point3::new(i as f64, 0.0, 0.0),
                            Default::default(),
                        ));
                        arena.connect(previous, id);
                        previous = id;
                    }
                    (arena, first)
                },
                |(mut arena, first)| arena.mark(first, VertexStatus::Inside),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_boolean_ops, bench_mark);
criterion_main!(benches);
