//! Path: native/game_combat/src/world/mod.rs
//! Summary: ワールド本体（GameWorld）。全状態を所有し、グローバルを持たない

pub mod enemy;
pub mod frame_event;
pub mod level;
pub mod player;
pub mod projectile;

pub use enemy::{Enemy, EnemyArena, EnemyState};
pub use frame_event::{DamageSource, DeathCause, FrameEvent, HostHooks};
pub use level::{LevelData, SpawnPoint};
pub use player::{AbilityMod, Loadout, PlayerInput, PlayerState};
pub use projectile::{Projectile, ProjectileKind, ProjectilePhase, ProjectilePool, Trail};

use crate::constants::{
    ENEMY_SPEED_BASE, ENEMY_SPEED_JITTER, LEVEL_WIDTH, SCREEN_H, SCREEN_W,
};
use crate::entity_params::{Archetype, ParamTable};
use crate::game_logic::damage::difficulty_scale;
use crate::physics::rng::SimpleRng;
use crate::physics::spatial_grid::{ObstacleHits, SpatialIndex};
use crate::physics::{Body, Rect};

/// シミュレーション全状態。更新関数はすべて `&mut GameWorld` を受け取る
pub struct GameWorld {
    pub frame_id:       u64,
    pub elapsed_frames: f32,
    pub difficulty:   u32,
    pub level_width:  f32,
    pub level_height: f32,
    pub camera_x:     f32,
    pub player: PlayerState,
    pub input:  PlayerInput,
    pub enemies:     EnemyArena,
    pub projectiles: ProjectilePool,
    pub index: SpatialIndex,
    pub checkpoint:         Rect,
    pub checkpoint_reached: bool,
    pub params: ParamTable,
    pub rng:    SimpleRng,
    pub frame_events: Vec<FrameEvent>,
    pub hooks: HostHooks,
    /// 足場・ハザードクエリの再利用バッファ
    pub obstacle_hits: ObstacleHits,
    pub last_frame_ms: f64,
}

impl GameWorld {
    pub fn new(seed: u32) -> Self {
        Self {
            frame_id:       0,
            elapsed_frames: 0.0,
            difficulty:   1,
            level_width:  LEVEL_WIDTH,
            level_height: SCREEN_H,
            camera_x:     0.0,
            player: PlayerState::new(),
            input:  PlayerInput::default(),
            enemies:     EnemyArena::new(),
            projectiles: ProjectilePool::new(),
            index: SpatialIndex::new(),
            checkpoint:         Rect::default(),
            checkpoint_reached: false,
            params: ParamTable::default(),
            rng:    SimpleRng::new(seed),
            frame_events: Vec::new(),
            hooks: HostHooks::new(),
            obstacle_hits: ObstacleHits::new(),
            last_frame_ms: 0.0,
        }
    }

    /// レベルを張り替える。静的索引の再構築・敵の再配置・飛翔体とイベントの
    /// 全消去を行い、前レベルへの参照は一切残さない。
    pub fn load_level(&mut self, level: &LevelData, difficulty: u32) {
        self.difficulty = difficulty.clamp(1, 5);
        self.level_width = level.width;
        self.level_height = level.height;
        self.index.rebuild(
            level.obstacles.clone(),
            level.spikes.clone(),
            level.lava.clone(),
            level.width,
            level.height,
        );
        self.checkpoint = level.checkpoint;
        self.checkpoint_reached = false;

        self.projectiles.clear();
        self.enemies.clear();
        self.frame_events.clear();

        for sp in &level.spawns {
            self.spawn_enemy(sp.x, sp.y, sp.archetype, false);
        }

        self.reset_player_at(level.player_start.0, level.player_start.1);
        self.camera_x = (self.player.body.x - SCREEN_W / 3.0)
            .clamp(0.0, (self.level_width - SCREEN_W).max(0.0));

        log::debug!(
            "level loaded: difficulty={} enemies={} obstacles={}",
            self.difficulty,
            self.enemies.count,
            self.index.obstacles().len()
        );
    }

    /// 敵を 1 体スポーンする。HP は難易度スケール、速度は個体ジッター付き
    pub fn spawn_enemy(&mut self, x: f32, y: f32, archetype: Archetype, friendly: bool) -> usize {
        let p = self.params.get(archetype).clone();
        let hp = (p.base_hp * difficulty_scale(self.difficulty)).round();
        let speed = ENEMY_SPEED_BASE + self.rng.next_f32() * ENEMY_SPEED_JITTER;
        let patrol_dir = if self.rng.chance(0.5) { 1.0 } else { -1.0 };
        let sine_offset = self.rng.next_f32() * std::f32::consts::TAU;

        self.enemies.spawn(Enemy {
            body: Body {
                x,
                y,
                w: p.width,
                h: p.height,
                ..Body::default()
            },
            archetype,
            friendly,
            hp,
            max_hp: hp,
            speed,
            facing: patrol_dir,
            spawn_x: x,
            spawn_y: y,
            idle_timer: 60.0,
            patrol_dir,
            sine_offset,
            ..Enemy::default()
        })
    }

    /// プレイヤーを指定位置へフル回復で戻す（ロード・リスポーン共通）
    pub fn reset_player_at(&mut self, x: f32, y: f32) {
        let p = &mut self.player;
        p.body.x = x;
        p.body.y = y;
        p.body.vx = 0.0;
        p.body.vy = 0.0;
        p.body.on_ground = false;
        p.body.dropping_through = false;
        p.hp = p.max_hp;
        p.overshield = 0.0;
        p.dead = false;
        p.respawn_timer = 0.0;
        p.invincible_timer = 0.0;
        p.blocking = false;
        p.drop_timer = 0.0;
        p.ground_history.clear();
        p.last_damage_source = None;
    }

    /// 場に居る味方召喚ユニット数
    pub fn summon_count(&self) -> usize {
        self.enemies.iter_alive().filter(|(_, e)| e.friendly).count()
    }

    /// フレームイベントをホスト側へ引き渡す
    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.frame_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::spatial_grid::{Obstacle, ObstacleKind};

    fn flat_level() -> LevelData {
        LevelData {
            width:  1800.0,
            height: 480.0,
            obstacles: vec![Obstacle {
                rect: Rect::new(0.0, 400.0, 1800.0, 80.0),
                kind: ObstacleKind::Solid,
            }],
            spikes: vec![],
            lava:   vec![],
            spawns: vec![
                SpawnPoint { x: 600.0, y: 356.0, archetype: Archetype::GroundMelee },
                SpawnPoint { x: 900.0, y: 200.0, archetype: Archetype::FlyingHoming },
            ],
            checkpoint: Rect::new(1700.0, 320.0, 40.0, 80.0),
            player_start: (100.0, 356.0),
        }
    }

    #[test]
    fn load_level_populates_and_clears() {
        let mut w = GameWorld::new(42);
        w.projectiles.spawn(Projectile::default());
        w.frame_events.push(FrameEvent::HudDirty);

        w.load_level(&flat_level(), 2);

        assert_eq!(w.enemies.count, 2);
        assert_eq!(w.projectiles.count, 0, "ロードで飛翔体は全消去");
        assert!(w.frame_events.is_empty());
        assert!(!w.checkpoint_reached);
        assert_eq!(w.player.hp, w.player.max_hp);
    }

    #[test]
    fn spawn_scales_hp_with_difficulty() {
        let mut w = GameWorld::new(42);
        w.load_level(&flat_level(), 3);
        let melee = w
            .enemies
            .iter_alive()
            .find(|(_, e)| e.archetype == Archetype::GroundMelee)
            .map(|(_, e)| e.max_hp);
        // 80 * 1.2^2 = 115.2 → 115
        assert_eq!(melee, Some(115.0));
    }

    #[test]
    fn reload_resets_difficulty_scaling() {
        let mut w = GameWorld::new(42);
        w.load_level(&flat_level(), 5);
        w.load_level(&flat_level(), 1);
        let melee = w
            .enemies
            .iter_alive()
            .find(|(_, e)| e.archetype == Archetype::GroundMelee)
            .map(|(_, e)| e.max_hp);
        assert_eq!(melee, Some(80.0));
    }
}
