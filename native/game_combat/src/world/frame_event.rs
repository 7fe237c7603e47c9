//! Path: native/game_combat/src/world/frame_event.rs
//! Summary: フレームイベントバスとホストコールバック（HostHooks）

use crate::entity_params::Archetype;

/// 被弾ダメージの出どころ。死亡通知とノックバック方向の決定に使う
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageSource {
    Enemy(Archetype),
    Projectile,
    Environment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    /// 画面下への落下
    Pit,
    /// HP が尽きた
    Damage,
}

/// シミュレーションがフレーム中に積み、ホストが毎フレーム吸い出すイベント。
/// シミュレーション自身はこれを一切読み返さない。
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    PlayerDamaged { damage: f32 },
    EnemyKilled { archetype: Archetype, friendly: bool, x: f32, y: f32 },
    LootDrop { x: f32, y: f32 },
    Vfx { x: f32, y: f32, color: [f32; 4], count: u32 },
    AudioCue { name: &'static str },
    HudDirty,
    CheckpointReached,
    /// リスポーンタイマー満了。レベルの再ロードはホストの責務
    RespawnReady,
}

/// ホストが一度だけ登録するコールバック群。
/// 遅延束縛のグローバル登録ではなく、ワールド構築時に注入する。
#[derive(Default)]
pub struct HostHooks {
    on_player_death: Option<Box<dyn FnMut(DeathCause) + Send>>,
    on_checkpoint:   Option<Box<dyn FnMut() + Send>>,
}

impl HostHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_player_death(&mut self, f: impl FnMut(DeathCause) + Send + 'static) {
        self.on_player_death = Some(Box::new(f));
    }

    pub fn set_on_checkpoint(&mut self, f: impl FnMut() + Send + 'static) {
        self.on_checkpoint = Some(Box::new(f));
    }

    pub fn fire_player_death(&mut self, cause: DeathCause) {
        if let Some(f) = self.on_player_death.as_mut() {
            f(cause);
        }
    }

    pub fn fire_checkpoint(&mut self) {
        if let Some(f) = self.on_checkpoint.as_mut() {
            f();
        }
    }
}
