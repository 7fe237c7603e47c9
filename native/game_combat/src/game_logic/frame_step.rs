//! Path: native/game_combat/src/game_logic/frame_step.rs
//! Summary: フレームステップ内部実装（固定順序・dt クランプ・予算監視）

use super::enemy_ai::update_enemies;
use super::player_update::update_player;
use super::projectiles::update_projectiles;
use crate::constants::{FRAME_BUDGET_MS, MAX_DT};
use crate::world::GameWorld;

/// フレーム更新の入口。ホストが描画フレームごとに一度呼ぶ。
/// 順序は常に プレイヤー → 敵 → 飛翔体 で固定（並列化しない）。
pub fn frame_step_inner(w: &mut GameWorld, delta_ms: f64) {
    // trace にしておき、RUST_LOG=trace のときだけ毎フレーム出力
    log::trace!("frame_step: delta={}ms frame_id={}", delta_ms, w.frame_id);
    let t_start = std::time::Instant::now();

    w.frame_id += 1;

    // dt は 60Hz フレーム単位。タブ復帰などの巨大 delta は 4 フレームで打ち切る
    let dt = ((delta_ms * 60.0 / 1000.0) as f32).min(MAX_DT);
    w.elapsed_frames += dt;

    update_player(w, dt);
    update_enemies(w, dt);
    update_projectiles(w, dt);

    let elapsed = t_start.elapsed().as_secs_f64() * 1000.0;
    w.last_frame_ms = elapsed;
    if elapsed > FRAME_BUDGET_MS {
        eprintln!(
            "frame budget exceeded: {elapsed:.2}ms (frame {})",
            w.frame_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_params::Archetype;
    use crate::physics::spatial_grid::{Obstacle, ObstacleKind};
    use crate::physics::Rect;
    use crate::world::{EnemyState, FrameEvent, LevelData, Loadout, SpawnPoint};

    fn solid(x: f32, y: f32, w: f32, h: f32) -> Obstacle {
        Obstacle { rect: Rect::new(x, y, w, h), kind: ObstacleKind::Solid }
    }

    fn run(w: &mut GameWorld, frames: u32) {
        // RUST_LOG=trace でフレームごとのログを拾えるようにしておく
        let _ = env_logger::builder().is_test(true).try_init();
        for _ in 0..frames {
            frame_step_inner(w, 16.666);
        }
    }

    #[test]
    fn dt_is_clamped() {
        let mut w = GameWorld::new(1);
        frame_step_inner(&mut w, 250.0); // 15 フレームぶんの delta
        assert_eq!(w.elapsed_frames, MAX_DT);
        assert_eq!(w.frame_id, 1);
    }

    #[test]
    fn same_seed_same_world() {
        let level = LevelData {
            width: 1800.0,
            height: 480.0,
            obstacles: vec![solid(0.0, 400.0, 1800.0, 80.0)],
            spikes: vec![],
            lava: vec![],
            spawns: vec![
                SpawnPoint { x: 400.0, y: 356.0, archetype: Archetype::GroundMelee },
                SpawnPoint { x: 700.0, y: 356.0, archetype: Archetype::RangedCaster },
                SpawnPoint { x: 500.0, y: 200.0, archetype: Archetype::FlyingHoming },
            ],
            checkpoint: Rect::new(1760.0, 320.0, 40.0, 80.0),
            player_start: (100.0, 356.0),
        };
        let mut a = GameWorld::new(2024);
        let mut b = GameWorld::new(2024);
        a.load_level(&level, 2);
        b.load_level(&level, 2);
        a.input.move_dir = 1.0;
        b.input.move_dir = 1.0;

        run(&mut a, 240);
        run(&mut b, 240);

        assert_eq!(a.player.body.x, b.player.body.x);
        assert_eq!(a.player.hp, b.player.hp);
        assert_eq!(a.enemies.count, b.enemies.count);
        for i in 0..a.enemies.len() {
            assert_eq!(a.enemies.slots[i].body.x, b.enemies.slots[i].body.x);
            assert_eq!(a.enemies.slots[i].hp, b.enemies.slots[i].hp);
        }
    }

    // 追跡中の近接は穴を跳び越えてプレイヤーへ到達する
    #[test]
    fn aggro_melee_jumps_pit_toward_player() {
        let level = LevelData {
            width: 1200.0,
            height: 480.0,
            // 400..520 が幅 120 の穴
            obstacles: vec![solid(0.0, 400.0, 400.0, 80.0), solid(520.0, 400.0, 680.0, 80.0)],
            spikes: vec![],
            lava: vec![],
            spawns: vec![SpawnPoint { x: 350.0, y: 356.0, archetype: Archetype::GroundMelee }],
            checkpoint: Rect::new(1160.0, 320.0, 40.0, 80.0),
            player_start: (530.0, 356.0),
        };
        let mut w = GameWorld::new(5);
        w.load_level(&level, 1);
        w.enemies.slots[0].state = EnemyState::Aggro;

        run(&mut w, 240);

        assert!(w.enemies.is_alive(0), "穴に落ちず生きている");
        let e = &w.enemies.slots[0];
        assert!(e.body.center_x() > 500.0, "穴を越えた: x={}", e.body.x);
        assert!(e.body.y < 420.0, "落下していない: y={}", e.body.y);
    }

    // 杖オーブで敵を倒すと、死亡イベントとルートが丁度一度ずつ出る
    #[test]
    fn orb_kill_chain_emits_once() {
        let level = LevelData {
            width: 1800.0,
            height: 480.0,
            obstacles: vec![solid(0.0, 400.0, 1800.0, 80.0)],
            spikes: vec![],
            lava: vec![],
            spawns: vec![SpawnPoint { x: 260.0, y: 356.0, archetype: Archetype::GroundMelee }],
            checkpoint: Rect::new(1760.0, 320.0, 40.0, 80.0),
            player_start: (100.0, 356.0),
        };
        let mut w = GameWorld::new(9);
        w.load_level(&level, 1);
        w.player.loadout = Loadout::Staff;
        w.player.staff_rarity = 5;
        w.enemies.slots[0].hp = 20.0; // round(18*1.8)=32 で一撃圏内
        w.enemies.slots[0].idle_timer = 1e9; // その場に留める
        w.input.primary = true;
        w.input.aim_x = 275.0;
        w.input.aim_y = 378.0;

        let mut events = Vec::new();
        for _ in 0..120 {
            frame_step_inner(&mut w, 16.666);
            events.extend(w.drain_events());
            if w.enemies.count == 0 {
                break;
            }
        }
        run(&mut w, 5);
        events.extend(w.drain_events());

        assert_eq!(w.enemies.count, 0, "敵は倒れている");
        let kills = events
            .iter()
            .filter(|e| matches!(e, FrameEvent::EnemyKilled { .. }))
            .count();
        let loot = events
            .iter()
            .filter(|e| matches!(e, FrameEvent::LootDrop { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(loot, 1);
    }

    // 詠唱型のオーブをブロックで反射し、撃った本人に当てる
    #[test]
    fn blocked_orb_returns_to_caster() {
        let level = LevelData {
            width: 1800.0,
            height: 480.0,
            obstacles: vec![solid(0.0, 400.0, 1800.0, 80.0)],
            spikes: vec![],
            lava: vec![],
            // オーブは放物線を描くので、床に刺さる前に届く距離に置く
            spawns: vec![SpawnPoint { x: 220.0, y: 356.0, archetype: Archetype::RangedCaster }],
            checkpoint: Rect::new(1760.0, 320.0, 40.0, 80.0),
            player_start: (100.0, 356.0),
        };
        let mut w = GameWorld::new(13);
        w.load_level(&level, 1);
        w.player.loadout = Loadout::Sword;
        w.input.block = true;
        w.enemies.slots[0].state = EnemyState::Aggro;
        w.enemies.slots[0].fire_timer = 0.0;
        let caster_hp = w.enemies.slots[0].hp;

        run(&mut w, 300);

        assert_eq!(w.player.hp, 100.0, "ブロック中はオーブを受けない");
        assert!(
            w.enemies.count == 0 || w.enemies.slots[0].hp < caster_hp,
            "反射オーブが詠唱者に刺さる"
        );
    }

    #[test]
    fn dead_player_freezes_combat_progress() {
        let level = LevelData {
            width: 1800.0,
            height: 480.0,
            obstacles: vec![solid(0.0, 400.0, 1800.0, 80.0)],
            spikes: vec![],
            lava: vec![],
            spawns: vec![SpawnPoint { x: 400.0, y: 356.0, archetype: Archetype::GroundMelee }],
            checkpoint: Rect::new(1760.0, 320.0, 40.0, 80.0),
            player_start: (100.0, 356.0),
        };
        let mut w = GameWorld::new(17);
        w.load_level(&level, 1);
        w.player.body.y = 700.0; // 落下死させる
        run(&mut w, 2);
        assert!(w.player.dead);

        // 死後は敵が索敵対象を失い、誰もプレイヤーを殴らない
        run(&mut w, 120);
        assert_eq!(w.player.hp, 0.0);
        assert_ne!(w.enemies.slots[0].state, EnemyState::Aggro);
    }
}
