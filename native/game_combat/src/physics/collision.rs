//! Path: native/game_combat/src/physics/collision.rs
//! Summary: 足場解決（一方通行 + 四方向押し出し）と前方ハザードプローブ

use super::spatial_grid::{ObstacleHits, ObstacleKind, SpatialIndex};
use super::{Body, Rect};
use crate::constants::{PIT_SCAN_MAX, PIT_SCAN_START, PIT_SCAN_STEP, PROBE_LEAD_X};

/// 一方通行足場の食い込み許容量（vy に加算）
const ONE_WAY_TOLERANCE: f32 = 6.0;

/// 移動後の剛体を足場に対して解決する。`on_ground` はここで毎回確定する。
///
/// - 一方通行: 下向き（vy >= 0）かつ食い込みが `vy + 6` 以下のときだけ上面で停止。
///   すり抜け降下中は無視。
/// - ソリッド: 四方向の食い込み深さの最小方向へ押し出し、その軸の速度を殺す。
pub fn resolve_platforms(index: &SpatialIndex, body: &mut Body, hits: &mut ObstacleHits) {
    body.on_ground = false;

    // 足元の一方通行判定が拾えるよう、下方向へ余分に広げて候補を取る
    let query = Rect::new(
        body.x - 2.0,
        body.y - 2.0,
        body.w + 4.0,
        body.h + body.vy.max(0.0) + ONE_WAY_TOLERANCE + 4.0,
    );
    index.query_box_into(&query, hits);

    for &i in &hits.blocking {
        let o = &index.obstacles()[i];
        let p = o.rect;
        match o.kind {
            ObstacleKind::OneWay => {
                if body.vy < 0.0 || body.dropping_through {
                    continue;
                }
                let horizontal = body.x < p.x + p.w && body.x + body.w > p.x;
                if !horizontal {
                    continue;
                }
                let overlap_top = body.foot_y() - p.y;
                if overlap_top > 0.0 && overlap_top <= body.vy + ONE_WAY_TOLERANCE {
                    body.y = p.y - body.h;
                    body.vy = 0.0;
                    body.on_ground = true;
                }
            }
            ObstacleKind::Solid => {
                // 前の候補で押し出された後の位置で交差を取り直す
                if !body.rect().overlaps(&p) {
                    continue;
                }
                let from_top = body.foot_y() - p.y;
                let from_bottom = p.y + p.h - body.y;
                let from_left = body.x + body.w - p.x;
                let from_right = p.x + p.w - body.x;

                let min = from_top.min(from_bottom).min(from_left).min(from_right);
                if min == from_top {
                    body.y = p.y - body.h;
                    if body.vy > 0.0 {
                        body.vy = 0.0;
                    }
                    body.on_ground = true;
                } else if min == from_bottom {
                    body.y = p.y + p.h;
                    if body.vy < 0.0 {
                        body.vy = 0.0;
                    }
                } else if min == from_left {
                    body.x = p.x - body.w;
                    body.vx = 0.0;
                } else {
                    body.x = p.x + p.w;
                    body.vx = 0.0;
                }
            }
        }
    }
}

fn spike_probe(body: &Body, dir: f32) -> Rect {
    let probe_x = body.center_x() + dir * (body.w * 0.5 + PROBE_LEAD_X);
    Rect::new(probe_x - 6.0, body.foot_y() - 16.0, 12.0, 20.0)
}

fn ground_probe(body: &Body, dir: f32) -> Rect {
    let probe_x = body.center_x() + dir * (body.w * 0.5 + PROBE_LEAD_X);
    Rect::new(probe_x - 4.0, body.foot_y() + 2.0, 8.0, 16.0)
}

/// 進行方向の一歩先が危険かどうか。トゲ・溶岩、および接地中なら床の途切れ（穴）を見る。
pub fn hazard_ahead(index: &SpatialIndex, body: &Body, dir: f32, hits: &mut ObstacleHits) -> bool {
    if deadly_hazard_ahead(index, body, dir, hits) {
        return true;
    }
    if body.on_ground {
        index.query_box_into(&ground_probe(body, dir), hits);
        if hits.blocking.is_empty() {
            return true; // 足場が無い = 穴
        }
    }
    false
}

/// 進行方向の一歩先に致死ハザード（トゲ・溶岩）があるか。穴は見ない。
pub fn deadly_hazard_ahead(
    index: &SpatialIndex,
    body: &Body,
    dir: f32,
    hits: &mut ObstacleHits,
) -> bool {
    index.query_box_into(&spike_probe(body, dir), hits);
    !hits.spikes.is_empty() || !hits.lava.is_empty()
}

/// 進行方向の穴の幅を測る。6px 刻みで最大 300px まで走査し、床が
/// 途切れた地点から再開する地点までの距離を返す。
/// 途切れなければ 0、再開しなければ 300。
pub fn measure_pit_ahead(
    index: &SpatialIndex,
    body: &Body,
    dir: f32,
    hits: &mut ObstacleHits,
) -> f32 {
    let start = body.center_x() + dir * (body.w * 0.5 + PIT_SCAN_START);
    let foot = body.foot_y();
    let mut pit_start = None;
    let mut d = 0.0;
    while d <= PIT_SCAN_MAX {
        let px = start + dir * d;
        index.query_box_into(&Rect::new(px - 3.0, foot + 2.0, 6.0, 20.0), hits);
        match (hits.blocking.is_empty(), pit_start) {
            (true, None) => pit_start = Some(d),
            (false, Some(s)) => return d - s,
            _ => {}
        }
        d += PIT_SCAN_STEP;
    }
    if pit_start.is_some() { PIT_SCAN_MAX } else { 0.0 }
}
