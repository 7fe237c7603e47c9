//! Path: native/game_combat/src/constants.rs
//! Summary: ワールド全体のチューニング定数（座標は px、速度は 60Hz フレーム単位）

// ── 画面・レベル寸法 ─────────────────────────────────────────────
pub const SCREEN_W:    f32 = 900.0;
pub const SCREEN_H:    f32 = 480.0;
pub const LEVEL_WIDTH: f32 = 5129.0;

// ── 時間モデル ───────────────────────────────────────────────────
/// dt の上限（フレーム単位）。タブ復帰などの巨大 delta を抑える
pub const MAX_DT: f32 = 4.0;
/// ms 建てクールダウンの 1 フレームあたり減算量（16ms/frame 換算）
pub const MS_PER_FRAME: f32 = 16.0;
/// フレーム処理の予算（超過すると警告を出す）
pub const FRAME_BUDGET_MS: f64 = 4.0;

// ── プレイヤー運動 ───────────────────────────────────────────────
pub const GRAVITY:         f32 = 0.27;
pub const PLAYER_SPEED:    f32 = 3.0625;
pub const JUMP_FORCE:      f32 = -8.2;
pub const JUMP_COOLDOWN:   f32 = 30.0;
pub const FRICTION:        f32 = 0.75;
pub const DROP_THROUGH_VY: f32 = 4.0;
/// 接地履歴リングの長さ（復活位置の参照元）
pub const GROUND_HISTORY_LEN: usize = 120;

// ── 空間インデックス ─────────────────────────────────────────────
pub const GRID_CELL_SIZE: f32 = 120.0;

// ── 前方プローブ・穴スキャン ─────────────────────────────────────
pub const PROBE_LEAD_X:  f32 = 10.0;
pub const PIT_SCAN_START: f32 = 8.0;
pub const PIT_SCAN_STEP:  f32 = 6.0;
pub const PIT_SCAN_MAX:   f32 = 300.0;

// ── 敵チューニング ───────────────────────────────────────────────
pub const ENEMY_SPEED_BASE:   f32 = 0.63;
pub const ENEMY_SPEED_JITTER: f32 = 0.35;
/// HP・接触ダメージの難易度スケール（1.2^(difficulty-1)）
pub const DIFFICULTY_SCALE:   f32 = 1.2;
pub const ENRAGE_HP_RATIO:      f32 = 0.30;
pub const ENRAGE_SPEED_MULT:    f32 = 1.5;
pub const ENRAGE_COOLDOWN_MULT: f32 = 0.7;
pub const KNOCKBACK_DECAY:        f32 = 0.85;
pub const KNOCKBACK_DECAY_FLIER:  f32 = 0.82;
pub const ENEMY_JUMP_COOLDOWN:    f32 = 70.0;
pub const ENEMY_DESPAWN_MARGIN:   f32 = 100.0;

// ── 武器クールダウン（ms） ───────────────────────────────────────
pub const SWORD_COOLDOWN:     f32 = 720.0;
pub const ARROW_COOLDOWN:     f32 = 720.0;
pub const CROSSBOW_COOLDOWN:  f32 = 1000.0;
pub const FIREBALL_COOLDOWN:  f32 = 1100.0;
pub const STAFF_ORB_COOLDOWN: f32 = 600.0;
pub const LIGHTNING_COOLDOWN: f32 = 3000.0;
pub const SUMMON_COOLDOWN:    f32 = 1200.0;
pub const BOMB_COOLDOWN:      f32 = 900.0;
/// 攻撃速度バフ中のクールダウン倍率
pub const ATTACK_SPEED_MULT:  f32 = 0.8;

// ── 基礎ダメージ ─────────────────────────────────────────────────
pub const BASE_SWORD_DAMAGE:    f32 = 40.0;
pub const BASE_ARROW_DAMAGE:    f32 = 30.0;
pub const BASE_CROSSBOW_DAMAGE: f32 = 40.0;
pub const BASE_FIREBALL_DAMAGE: f32 = 35.0;
pub const BASE_ORB_DAMAGE:      f32 = 18.0;
pub const BASE_BOMB_DAMAGE:     f32 = 30.0;
pub const SPARK_DAMAGE:         f32 = 24.0;
pub const LIGHTNING_DAMAGE:     f32 = 45.0;
/// レアリティ 1 段あたりの加算率
pub const RARITY_STEP: f32 = 0.2;

// ── 近接（剣） ──────────────────────────────────────────────────
pub const SWORD_RANGE:           f32 = 60.0;
pub const SWORD_KNOCKBACK_VX:    f32 = 6.0;
pub const SWORD_KNOCKBACK_LOCK:  f32 = 18.0;

// ── 飛翔体 ───────────────────────────────────────────────────────
pub const ARROW_SPEED:    f32 = 10.0;
pub const ARROW_GRAVITY:  f32 = 0.08;
pub const ARROW_LIFETIME: f32 = 140.0;
pub const BOLT_SPEED:    f32 = 11.0;
pub const BOLT_GRAVITY:  f32 = 0.06;
pub const BOLT_RADIUS:         f32 = 5.0;
pub const BOLT_RADIUS_KINETIC: f32 = 15.0;
pub const BOLT_KNOCKBACK_FORCE: f32 = 8.0;
pub const BOLT_KNOCKBACK_LOCK:  f32 = 12.0;
pub const BOLT_BLEED_CHANCE:    f32 = 0.25;
pub const ORB_SPEED:    f32 = 6.5;
pub const ORB_GRAVITY:  f32 = 0.05;
pub const ORB_RADIUS:   f32 = 7.0;
pub const ORB_LIFETIME: f32 = 100.0;
pub const SPARK_SPEED:      f32 = 9.0;
pub const SPARK_RADIUS:     f32 = 5.0;
/// スパークの最大飛距離（画面幅の 2/3）
pub const SPARK_MAX_TRAVEL: f32 = SCREEN_W * 2.0 / 3.0;
pub const FIREBALL_SPEED:    f32 = 5.408;
pub const FIREBALL_GRAVITY:  f32 = 0.0575;
pub const FIREBALL_RADIUS:   f32 = 10.0;
pub const FIREBALL_LIFETIME: f32 = 220.0;
pub const FIREBALL_TRAIL_LEN: usize = 18;
pub const LIGHTNING_RADIUS:     f32 = 30.0;
pub const LIGHTNING_FALL_SPEED: f32 = 18.0;
pub const BOMB_GRAVITY:        f32 = 0.207;
pub const BOMB_DRAG:           f32 = 0.995;
pub const BOMB_LIFETIME:       f32 = 240.0;
pub const BOMB_EXPLODE_RADIUS: f32 = 60.0;
pub const BOMB_TRAIL_LEN:      usize = 14;
pub const HOSTILE_ORB_SPEED:        f32 = 5.0;
pub const HOSTILE_ORB_BASE_DAMAGE:  f32 = 18.0;
pub const ORB_BLOCK_RANGE:          f32 = 60.0;
pub const ORB_REFLECT_SPEED:        f32 = 7.0;
/// 反射時に与え直す寿命
pub const ORB_REFLECT_LIFE:         f32 = 120.0;
pub const ORB_REVERSE_MULT:         f32 = 1.5;
pub const REFLECTED_ORB_DAMAGE:     f32 = 18.0;

// ── 継続ダメージ（DOT） ──────────────────────────────────────────
pub const BURN_DURATION:    f32 = 300.0;
pub const BURN_TOTAL:       f32 = 20.0;
pub const BLEED_DURATION:   f32 = 300.0;
pub const BLEED_BASE_TOTAL: f32 = 20.0;
pub const BLEED_RARITY_STEP: f32 = 4.0;

// ── プレイヤー被弾・死亡 ─────────────────────────────────────────
pub const INVINCIBLE_FRAMES:        f32 = 60.0;
pub const REVIVE_INVINCIBLE_FRAMES: f32 = 180.0;
pub const RESPAWN_FRAMES:           f32 = 180.0;
pub const FORTIFY_REDUCTION:  f32 = 0.25;
pub const BLOCKING_REDUCTION: f32 = 0.10;
pub const SPIKE_DAMAGE:       f32 = 35.0;
pub const LAVA_DAMAGE_PLAYER: f32 = 2.0;
pub const LAVA_DAMAGE_ENEMY:  f32 = 9999.0;

// ── リソース ─────────────────────────────────────────────────────
pub const MANA_MAX:          f32 = 25.0;
pub const MANA_REGEN:        f32 = 0.5 / 60.0;
pub const FIREBALL_MANA_COST: f32 = 5.0;
pub const SUMMON_CAP: usize = 3;
