//! Path: native/game_combat/src/world/player.rs
//! Summary: プレイヤー状態（装備・バフ・被弾・接地履歴）と入力スナップショット

use std::collections::VecDeque;

use super::frame_event::DamageSource;
use crate::constants::{GROUND_HISTORY_LEN, MANA_MAX};
use crate::physics::Body;

/// 装備中の主武器
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Loadout {
    #[default]
    Sword,
    Bow,
    Crossbow,
    Staff,
}

/// 任意のアビリティ改造。攻撃の発射物・詠唱先を差し替える
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AbilityMod {
    #[default]
    None,
    /// オーブ→スパーク、火球→落雷
    StormCaller,
    /// ボルトが運動弾（貫通 + ノックバック）になる
    DeadEye,
    /// 発射の代わりに味方ユニットを召喚する
    GraveCaller,
}

/// 入力レイヤーから毎フレーム渡される意図のスナップショット。
/// 照準はワールド座標
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerInput {
    /// -1 / 0 / +1
    pub move_dir:  f32,
    pub jump:      bool,
    /// 一方通行足場のすり抜け降下
    pub drop:      bool,
    pub primary:   bool,
    pub secondary: bool,
    pub block:     bool,
    pub aim_x:     f32,
    pub aim_y:     f32,
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub body:   Body,
    pub facing: f32,
    pub hp:             f32,
    pub max_hp:         f32,
    /// HP より先に削られる吸収バリア
    pub overshield:     f32,
    pub max_overshield: f32,
    pub mana:  f32,
    pub bombs: u32,
    pub loadout: Loadout,
    pub ability: AbilityMod,
    pub sword_rarity: u8,
    pub bow_rarity:   u8,
    pub staff_rarity: u8,
    pub damage_mult: f32,
    /// 装備由来の固定軽減率 [0,1]
    pub damage_reduction: f32,
    pub fortified: bool,
    pub blocking:  bool,
    /// 致死ダメージを一度だけ肩代わりする復活の加護
    pub revive_ward: bool,
    pub invincible_timer: f32,
    pub dead:          bool,
    pub respawn_timer: f32,
    // ── 武器クールダウン（ms 建て、16*dt/frame で減算） ──────────
    pub sword_timer:     f32,
    pub shot_timer:      f32,
    pub bomb_timer:      f32,
    pub orb_timer:       f32,
    pub fireball_timer:  f32,
    pub lightning_timer: f32,
    pub summon_timer:    f32,
    // ── バフ（フレーム建て） ─────────────────────────────────────
    pub attack_speed_timer: f32,
    pub speed_boost_timer:  f32,
    pub jump_cooldown: f32,
    /// ジャンプのエッジトリガー用ラッチ
    pub jump_held:  bool,
    pub drop_timer: f32,
    /// 接地位置の履歴リング。復活の加護の戻り先
    pub ground_history: VecDeque<(f32, f32)>,
    pub last_damage_source: Option<DamageSource>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            body: Body {
                x: 100.0,
                y: 300.0,
                w: 30.0,
                h: 44.0,
                ..Body::default()
            },
            facing:           1.0,
            hp:               100.0,
            max_hp:           100.0,
            overshield:       0.0,
            max_overshield:   50.0,
            mana:             MANA_MAX,
            bombs:            5,
            loadout:          Loadout::default(),
            ability:          AbilityMod::default(),
            sword_rarity:     1,
            bow_rarity:       1,
            staff_rarity:     1,
            damage_mult:      1.0,
            damage_reduction: 0.0,
            fortified:        false,
            blocking:         false,
            revive_ward:      false,
            invincible_timer: 0.0,
            dead:             false,
            respawn_timer:    0.0,
            sword_timer:      0.0,
            shot_timer:       0.0,
            bomb_timer:       0.0,
            orb_timer:        0.0,
            fireball_timer:   0.0,
            lightning_timer:  0.0,
            summon_timer:     0.0,
            attack_speed_timer: 0.0,
            speed_boost_timer:  0.0,
            jump_cooldown:    0.0,
            jump_held:        false,
            drop_timer:       0.0,
            ground_history:   VecDeque::with_capacity(GROUND_HISTORY_LEN),
            last_damage_source: None,
        }
    }

    /// 接地フレームの位置を履歴リングに積む
    pub fn record_grounded(&mut self) {
        if self.ground_history.len() == GROUND_HISTORY_LEN {
            self.ground_history.pop_front();
        }
        self.ground_history.push_back((self.body.x, self.body.y));
    }

    /// 復活の戻り先。履歴の最古 = 崖際より十分手前の位置
    pub fn revive_position(&self) -> Option<(f32, f32)> {
        self.ground_history.front().copied()
    }

    /// 現在の装備で武器レアリティを引く
    pub fn weapon_rarity(&self) -> u8 {
        match self.loadout {
            Loadout::Sword => self.sword_rarity,
            Loadout::Bow | Loadout::Crossbow => self.bow_rarity,
            Loadout::Staff => self.staff_rarity,
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
