//! Path: native/game_combat/src/physics/spatial_grid.rs
//! Summary: 静的レベル形状の一様グリッド索引（SpatialIndex）

use super::Rect;
use crate::constants::GRID_CELL_SIZE;

/// 足場の種別
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    /// 四方向とも通れない（地形ブロック）
    Solid,
    /// 上からのみ乗れる一方通行足場
    OneWay,
}

#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
}

/// クエリ結果の再利用バッファ（毎フレームのヒープアロケーションを回避）。
/// 中身はレイヤー別のインデックスリストで、呼び出し元が所有する。
#[derive(Clone, Debug, Default)]
pub struct ObstacleHits {
    pub blocking: Vec<usize>,
    pub spikes:   Vec<usize>,
    pub lava:     Vec<usize>,
}

impl ObstacleHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.blocking.clear();
        self.spikes.clear();
        self.lava.clear();
    }
}

#[derive(Clone, Debug, Default)]
struct Cell {
    blocking: Vec<u32>,
    spikes:   Vec<u32>,
    lava:     Vec<u32>,
}

/// 静的形状（足場・トゲ・溶岩）の一様グリッド索引。
/// レベルロード時に一括再構築し、フレーム中は不変。
pub struct SpatialIndex {
    obstacles: Vec<Obstacle>,
    spikes:    Vec<Rect>,
    lava:      Vec<Rect>,
    cells:     Vec<Cell>,
    cols:      i32,
    rows:      i32,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            spikes:    Vec::new(),
            lava:      Vec::new(),
            cells:     Vec::new(),
            cols:      0,
            rows:      0,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn spikes(&self) -> &[Rect] {
        &self.spikes
    }

    pub fn lava(&self) -> &[Rect] {
        &self.lava
    }

    /// レベルの静的形状から索引を再構築する。
    /// 形状は値で受け取り保持する（参照をリロード跨ぎで持たない）。
    pub fn rebuild(
        &mut self,
        obstacles: Vec<Obstacle>,
        spikes: Vec<Rect>,
        lava: Vec<Rect>,
        level_w: f32,
        level_h: f32,
    ) {
        self.obstacles = obstacles;
        self.spikes = spikes;
        self.lava = lava;

        // 床下プローブ（足元 +18px 程度）がグリッド外に出ないよう下方向に余白を取る
        self.cols = ((level_w / GRID_CELL_SIZE).ceil() as i32 + 1).max(1);
        self.rows = (((level_h + 200.0) / GRID_CELL_SIZE).ceil() as i32 + 1).max(1);
        self.cells.clear();
        self.cells
            .resize_with((self.cols * self.rows) as usize, Cell::default);

        for (i, o) in self.obstacles.iter().enumerate() {
            let r = o.rect;
            for c in Self::cell_span(self.cols, self.rows, &r) {
                self.cells[c].blocking.push(i as u32);
            }
        }
        for (i, r) in self.spikes.iter().enumerate() {
            for c in Self::cell_span(self.cols, self.rows, r) {
                self.cells[c].spikes.push(i as u32);
            }
        }
        for (i, r) in self.lava.iter().enumerate() {
            for c in Self::cell_span(self.cols, self.rows, r) {
                self.cells[c].lava.push(i as u32);
            }
        }

        log::debug!(
            "spatial_grid rebuilt: {}x{} cells, {} obstacles, {} spikes, {} lava",
            self.cols,
            self.rows,
            self.obstacles.len(),
            self.spikes.len(),
            self.lava.len()
        );
    }

    /// 矩形に交差する形状インデックスをレイヤー別に収集する。
    /// 複数セルに跨る形状はインデックスで重複排除する。
    pub fn query_box_into(&self, query: &Rect, hits: &mut ObstacleHits) {
        hits.clear();
        if self.cells.is_empty() {
            return;
        }

        let x0 = ((query.x / GRID_CELL_SIZE).floor() as i32).clamp(0, self.cols - 1);
        let x1 = (((query.x + query.w) / GRID_CELL_SIZE).floor() as i32).clamp(0, self.cols - 1);
        let y0 = ((query.y / GRID_CELL_SIZE).floor() as i32).clamp(0, self.rows - 1);
        let y1 = (((query.y + query.h) / GRID_CELL_SIZE).floor() as i32).clamp(0, self.rows - 1);

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let cell = &self.cells[(cy * self.cols + cx) as usize];
                for &i in &cell.blocking {
                    let i = i as usize;
                    if self.obstacles[i].rect.overlaps(query) && !hits.blocking.contains(&i) {
                        hits.blocking.push(i);
                    }
                }
                for &i in &cell.spikes {
                    let i = i as usize;
                    if self.spikes[i].overlaps(query) && !hits.spikes.contains(&i) {
                        hits.spikes.push(i);
                    }
                }
                for &i in &cell.lava {
                    let i = i as usize;
                    if self.lava[i].overlaps(query) && !hits.lava.contains(&i) {
                        hits.lava.push(i);
                    }
                }
            }
        }
    }

    /// 指定 X の直下にある最上段の足場上端を返す（落雷の着弾高さ算出用）
    pub fn topmost_surface_under(&self, x: f32) -> Option<f32> {
        self.obstacles
            .iter()
            .filter(|o| o.rect.x <= x && x <= o.rect.x + o.rect.w)
            .map(|o| o.rect.y)
            .fold(None, |acc, y| match acc {
                Some(best) if best <= y => Some(best),
                _ => Some(y),
            })
    }

    fn cell_span(cols: i32, rows: i32, r: &Rect) -> impl Iterator<Item = usize> {
        let x0 = ((r.x / GRID_CELL_SIZE).floor() as i32).clamp(0, cols - 1);
        let x1 = (((r.x + r.w) / GRID_CELL_SIZE).floor() as i32).clamp(0, cols - 1);
        let y0 = ((r.y / GRID_CELL_SIZE).floor() as i32).clamp(0, rows - 1);
        let y1 = (((r.y + r.h) / GRID_CELL_SIZE).floor() as i32).clamp(0, rows - 1);
        (y0..=y1).flat_map(move |cy| (x0..=x1).map(move |cx| (cy * cols + cx) as usize))
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
