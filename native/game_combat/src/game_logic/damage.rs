//! Path: native/game_combat/src/game_logic/damage.rs
//! Summary: ダメージパイプライン（レアリティ式・軽減・オーバーシールド・死亡漏斗）

use crate::constants::{
    BLOCKING_REDUCTION, DIFFICULTY_SCALE, FORTIFY_REDUCTION, INVINCIBLE_FRAMES, RARITY_STEP,
    RESPAWN_FRAMES, REVIVE_INVINCIBLE_FRAMES,
};
use crate::physics::spatial_grid::ObstacleKind;
use crate::world::{DamageSource, DeathCause, FrameEvent, GameWorld};

/// 難易度 d の共通スケール係数 1.2^(d-1)
pub fn difficulty_scale(difficulty: u32) -> f32 {
    DIFFICULTY_SCALE.powi(difficulty.max(1) as i32 - 1)
}

/// 与ダメージの基本式: round(基礎値 × (1 + (レアリティ−1) × 0.2)) × 倍率。
/// 丸めは倍率適用の前
pub fn compute_damage(base: f32, rarity: u8, mult: f32) -> f32 {
    let tier = rarity.max(1) as f32;
    (base * (1.0 + (tier - 1.0) * RARITY_STEP)).round() * mult
}

/// プレイヤー被弾の唯一の入口。
/// 軽減は加算合成（固定値 + 堅牢 0.25 + ブロック 0.10）で [0,1] に丸め、
/// 残りをオーバーシールド → HP の順で吸収する。
pub fn apply_damage_to_player(w: &mut GameWorld, amount: f32, source: DamageSource) {
    if w.player.dead || w.player.invincible_timer > 0.0 {
        return;
    }

    let p = &mut w.player;
    let mut reduction = p.damage_reduction;
    if p.fortified {
        reduction += FORTIFY_REDUCTION;
    }
    if p.blocking {
        reduction += BLOCKING_REDUCTION;
    }
    let reduction = reduction.clamp(0.0, 1.0);
    let total = (amount * (1.0 - reduction)).round().max(0.0);

    let mut remaining = total;
    if p.overshield > 0.0 {
        let absorbed = p.overshield.min(remaining);
        p.overshield -= absorbed;
        remaining -= absorbed;
    }
    p.hp -= remaining;
    p.invincible_timer = INVINCIBLE_FRAMES;
    p.last_damage_source = Some(source);

    let (cx, cy) = (p.body.center_x(), p.body.center_y());
    w.frame_events.push(FrameEvent::PlayerDamaged { damage: total });
    w.frame_events
        .push(FrameEvent::Vfx { x: cx, y: cy, color: [1.0, 0.15, 0.15, 1.0], count: 6 });
    w.frame_events.push(FrameEvent::HudDirty);

    if w.player.hp <= 0.0 {
        kill_player(w, DeathCause::Damage);
    }
}

/// プレイヤー死亡の唯一の漏斗。既に死亡していれば何もしない。
/// 復活の加護があれば消費して接地履歴の位置へ戻す。
pub fn kill_player(w: &mut GameWorld, cause: DeathCause) {
    if w.player.dead {
        return;
    }

    if w.player.revive_ward {
        w.player.revive_ward = false;
        let pos = w.player.revive_position().or_else(|| nearest_ground_top(w));
        if let Some((x, y)) = pos {
            w.player.body.x = x;
            w.player.body.y = y;
        }
        w.player.body.vx = 0.0;
        w.player.body.vy = 0.0;
        w.player.hp = (w.player.max_hp * 0.5).round();
        w.player.invincible_timer = REVIVE_INVINCIBLE_FRAMES;
        let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
        w.frame_events
            .push(FrameEvent::Vfx { x: cx, y: cy, color: [1.0, 0.9, 0.3, 1.0], count: 16 });
        w.frame_events.push(FrameEvent::AudioCue { name: "revive" });
        w.frame_events.push(FrameEvent::HudDirty);
        log::debug!("revive ward consumed ({cause:?})");
        return;
    }

    w.player.dead = true;
    w.player.hp = 0.0;
    w.player.respawn_timer = RESPAWN_FRAMES;
    w.frame_events.push(FrameEvent::AudioCue { name: "player_death" });
    w.frame_events.push(FrameEvent::HudDirty);
    log::debug!("player died: {cause:?}");
    w.hooks.fire_player_death(cause);
}

/// 接地履歴が空のときの戻り先: 最寄りのソリッド足場の上面中央
fn nearest_ground_top(w: &GameWorld) -> Option<(f32, f32)> {
    let px = w.player.body.center_x();
    let ph = w.player.body.h;
    w.index
        .obstacles()
        .iter()
        .filter(|o| o.kind == ObstacleKind::Solid)
        .min_by(|a, b| {
            let da = (a.rect.center_x() - px).abs();
            let db = (b.rect.center_x() - px).abs();
            da.total_cmp(&db)
        })
        .map(|o| (o.rect.center_x(), o.rect.y - ph))
}

/// 敵へのダメージ適用。死亡したら true
pub fn apply_damage_to_enemy(w: &mut GameWorld, idx: usize, amount: f32) -> bool {
    let Some(e) = w.enemies.get_mut(idx) else {
        return false;
    };
    e.hp -= amount;
    if e.hp <= 0.0 {
        kill_enemy(w, idx);
        true
    } else {
        false
    }
}

/// 敵死亡の唯一の漏斗。アリーナの生存フラグで冪等。
/// 敵対ユニットのみルートを落とす
pub fn kill_enemy(w: &mut GameWorld, idx: usize) {
    let Some(e) = w.enemies.get(idx) else {
        return;
    };
    let (x, y) = (e.body.center_x(), e.body.center_y());
    let archetype = e.archetype;
    let friendly = e.friendly;

    w.frame_events
        .push(FrameEvent::Vfx { x, y, color: [0.75, 0.1, 0.1, 1.0], count: 10 });
    w.frame_events.push(FrameEvent::EnemyKilled { archetype, friendly, x, y });
    if !friendly {
        w.frame_events.push(FrameEvent::LootDrop { x, y });
    }
    w.enemies.kill(idx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_params::Archetype;

    fn world() -> GameWorld {
        GameWorld::new(1)
    }

    #[test]
    fn rarity_ladder() {
        assert_eq!(compute_damage(30.0, 1, 1.0), 30.0);
        assert_eq!(compute_damage(30.0, 2, 1.0), 36.0);
        assert_eq!(compute_damage(30.0, 3, 1.0), 42.0);
        assert_eq!(compute_damage(30.0, 5, 1.0), 54.0);
    }

    #[test]
    fn rounding_precedes_multiplier() {
        // round(35 * 1.4) = 49 → 49 * 1.5 = 73.5（73.5 を 74 に丸めない）
        assert_eq!(compute_damage(35.0, 3, 1.5), 73.5);
    }

    #[test]
    fn reductions_are_additive() {
        let mut w = world();
        w.player.damage_reduction = 0.20;
        w.player.fortified = true;
        w.player.blocking = true;
        // 100 * (1 - 0.55) = 45
        apply_damage_to_player(&mut w, 100.0, DamageSource::Environment);
        assert_eq!(w.player.hp, 55.0);
    }

    #[test]
    fn overshield_absorbs_before_hp() {
        let mut w = world();
        w.player.overshield = 30.0;
        apply_damage_to_player(&mut w, 50.0, DamageSource::Environment);
        assert_eq!(w.player.overshield, 0.0);
        assert_eq!(w.player.hp, 80.0);
        // 被弾イベントは 1 件で、表示ダメージは軽減後の総量
        let dmg_events: Vec<_> = w
            .frame_events
            .iter()
            .filter(|e| matches!(e, FrameEvent::PlayerDamaged { .. }))
            .collect();
        assert_eq!(dmg_events.len(), 1);
        assert_eq!(dmg_events[0], &FrameEvent::PlayerDamaged { damage: 50.0 });
    }

    #[test]
    fn small_hit_fully_absorbed() {
        let mut w = world();
        w.player.overshield = 30.0;
        apply_damage_to_player(&mut w, 10.0, DamageSource::Environment);
        assert_eq!(w.player.overshield, 20.0);
        assert_eq!(w.player.hp, 100.0);
    }

    #[test]
    fn invincibility_rejects_hits() {
        let mut w = world();
        apply_damage_to_player(&mut w, 10.0, DamageSource::Environment);
        assert_eq!(w.player.hp, 90.0);
        apply_damage_to_player(&mut w, 10.0, DamageSource::Environment);
        assert_eq!(w.player.hp, 90.0, "無敵時間中は弾かれる");
    }

    #[test]
    fn lethal_hit_kills_once() {
        let mut w = world();
        let deaths = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let d = deaths.clone();
        w.hooks.set_on_player_death(move |_| {
            d.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        apply_damage_to_player(&mut w, 500.0, DamageSource::Environment);
        kill_player(&mut w, DeathCause::Damage); // 二重通知されない

        assert!(w.player.dead);
        assert_eq!(w.player.hp, 0.0);
        assert_eq!(deaths.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn revive_ward_consumes_and_restores() {
        let mut w = world();
        w.player.revive_ward = true;
        w.player.body.x = 500.0;
        w.player.body.y = 100.0;
        w.player.record_grounded();
        w.player.body.x = 800.0;

        apply_damage_to_player(&mut w, 500.0, DamageSource::Environment);

        assert!(!w.player.dead);
        assert!(!w.player.revive_ward, "加護は一度きり");
        assert_eq!(w.player.hp, 50.0);
        assert_eq!(w.player.body.x, 500.0, "接地履歴の位置へ戻る");
        assert_eq!(w.player.invincible_timer, REVIVE_INVINCIBLE_FRAMES);
    }

    #[test]
    fn enemy_kill_emits_loot_for_hostile_only() {
        let mut w = world();
        let hostile = w.spawn_enemy(0.0, 0.0, Archetype::GroundMelee, false);
        let friendly = w.spawn_enemy(50.0, 0.0, Archetype::GroundMelee, true);

        kill_enemy(&mut w, hostile);
        kill_enemy(&mut w, friendly);
        kill_enemy(&mut w, hostile); // 冪等

        let loot = w
            .frame_events
            .iter()
            .filter(|e| matches!(e, FrameEvent::LootDrop { .. }))
            .count();
        let kills = w
            .frame_events
            .iter()
            .filter(|e| matches!(e, FrameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(loot, 1, "ルートは敵対ユニットのみ");
        assert_eq!(kills, 2);
        assert_eq!(w.enemies.count, 0);
    }
}
