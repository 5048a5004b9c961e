//! Draw-plan construction benchmarks.
//!
//! Measures the per-frame CPU cost of the batching path at stress-demo
//! scale: submitting instances into buckets and packing them into a plan.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Mat4;

use spriteflow::{AtlasGrid, AtlasId, BatchKind, SpriteBatcher, SpriteInstance};

fn submit_and_drain(c: &mut Criterion) {
    let grid = AtlasGrid::from_tile_counts(1024, 1280, 16, 20).unwrap();
    let atlases = [AtlasId::from_raw(0), AtlasId::from_raw(1)];

    let mut group = c.benchmark_group("submit_and_drain");
    for &count in &[10_000usize, 100_000, 250_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut batcher = SpriteBatcher::new();
            b.iter(|| {
                batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
                for i in 0..count {
                    let x = (i % 500) as f32 * 32.0;
                    let y = (i / 500) as f32 * 32.0;
                    batcher.submit(
                        Some(atlases[i & 1]),
                        SpriteInstance::new(
                            [x, y],
                            [64.0, 64.0],
                            grid.tile_rect((i % 16) as u32),
                        ),
                    );
                }
                black_box(batcher.drain(200_000))
            });
        });
    }
    group.finish();
}

fn drain_chunking(c: &mut Criterion) {
    c.bench_function("drain_250k_into_2_chunks", |b| {
        let mut batcher = SpriteBatcher::new();
        let instance = SpriteInstance::full([0.0, 0.0], [64.0, 64.0]);
        b.iter(|| {
            batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
            for _ in 0..250_000 {
                batcher.submit(Some(AtlasId::from_raw(0)), instance);
            }
            black_box(batcher.drain(200_000))
        });
    });
}

criterion_group!(benches, submit_and_drain, drain_chunking);
criterion_main!(benches);
