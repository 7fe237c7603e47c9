//! Path: native/game_combat/benches/spatial_grid_bench.rs
//! Summary: 空間インデックスの再構築・矩形クエリのベンチマーク

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use game_combat::physics::spatial_grid::{Obstacle, ObstacleHits, ObstacleKind, SpatialIndex};
use game_combat::physics::Rect;

/// レベル生成物に近い形状セットを作る（床ブロック + 浮遊足場 + ハザード帯）
fn make_shapes(n: usize) -> (Vec<Obstacle>, Vec<Rect>, Vec<Rect>) {
    let mut obstacles = Vec::with_capacity(n);
    let mut spikes = Vec::new();
    let mut lava = Vec::new();
    for i in 0..n {
        let x = (i as f32 * 173.0) % 5000.0;
        let kind = if i % 3 == 0 { ObstacleKind::OneWay } else { ObstacleKind::Solid };
        let y = if i % 3 == 0 { 300.0 - (i % 5) as f32 * 40.0 } else { 400.0 };
        obstacles.push(Obstacle { rect: Rect::new(x, y, 160.0, 20.0), kind });
        if i % 7 == 0 {
            spikes.push(Rect::new(x + 60.0, 380.0, 40.0, 20.0));
        }
        if i % 11 == 0 {
            lava.push(Rect::new(x + 20.0, 440.0, 80.0, 40.0));
        }
    }
    (obstacles, spikes, lava)
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_grid_rebuild");
    for &n in &[64usize, 256, 1024] {
        let (obstacles, spikes, lava) = make_shapes(n);
        group.bench_function(format!("{n}_shapes"), |b| {
            b.iter(|| {
                let mut idx = SpatialIndex::new();
                idx.rebuild(
                    black_box(obstacles.clone()),
                    black_box(spikes.clone()),
                    black_box(lava.clone()),
                    5129.0,
                    480.0,
                );
                idx
            })
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_grid_query");
    for &n in &[64usize, 256, 1024] {
        let (obstacles, spikes, lava) = make_shapes(n);
        let mut idx = SpatialIndex::new();
        idx.rebuild(obstacles, spikes, lava, 5129.0, 480.0);
        let mut hits = ObstacleHits::new();
        group.bench_function(format!("{n}_shapes"), |b| {
            b.iter(|| {
                // 典型的なフレーム: エンティティ矩形 + 前方プローブ数回
                for k in 0..16u32 {
                    let x = (k as f32 * 311.0) % 4800.0;
                    idx.query_box_into(&Rect::new(x, 340.0, 30.0, 60.0), &mut hits);
                    black_box(hits.blocking.len());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_query);
criterion_main!(benches);
