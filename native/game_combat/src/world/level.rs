//! Path: native/game_combat/src/world/level.rs
//! Summary: レベルデータ（静的形状・スポーン地点・チェックポイント）

use crate::entity_params::Archetype;
use crate::physics::spatial_grid::Obstacle;
use crate::physics::Rect;

#[derive(Clone, Copy, Debug)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    pub archetype: Archetype,
}

/// ロード時にワールドへ渡すレベル 1 面ぶんのデータ。
/// ワールドは中身を値でコピーし、参照をリロード跨ぎで保持しない。
#[derive(Clone, Debug)]
pub struct LevelData {
    pub width:  f32,
    pub height: f32,
    pub obstacles: Vec<Obstacle>,
    pub spikes:    Vec<Rect>,
    pub lava:      Vec<Rect>,
    pub spawns:    Vec<SpawnPoint>,
    pub checkpoint: Rect,
    pub player_start: (f32, f32),
}
