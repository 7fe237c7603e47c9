//! Path: native/game_combat/src/entity_params.rs
//! Summary: 敵アーキタイプ別パラメータテーブル（ホスト側から差し替え可能）

/// 敵アーキタイプ。閉じた列挙で、不明種別は存在しない
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Archetype {
    /// 地上近接: 巡回し、索敵したら追跡して殴る
    #[default]
    GroundMelee,
    /// 遠隔詠唱: 間合いを保ち敵弾オーブを撃つ
    RangedCaster,
    /// 飛行追尾: スポーン周辺を正弦浮遊し、索敵したら体当たり
    FlyingHoming,
}

/// アーキタイプ 1 種ぶんのチューニング値。
/// 距離・速度はフレーム単位系（60Hz、px/frame）。
#[derive(Clone, Debug)]
pub struct ArchetypeParams {
    pub base_hp:        f32,
    pub width:          f32,
    pub height:         f32,
    /// 索敵半径。解除はこれにヒステリシス幅を足した距離
    pub aggro_range:      f32,
    pub aggro_hysteresis: f32,
    /// 近接の攻撃発動距離 / 飛行の接触距離
    pub strike_range:   f32,
    /// 攻撃間隔（フレーム）
    pub attack_cooldown: f32,
    pub base_damage:    f32,
    /// 詠唱型のみ: 近すぎ/遠すぎの間合いしきい値
    pub near_range:     f32,
    pub far_range:      f32,
    pub fire_cooldown:  f32,
    /// 飛行型のみ: 追跡速度と跳ね返り
    pub chase_speed:    f32,
    pub bounce_speed:   f32,
    pub bounce_frames:  f32,
}

impl ArchetypeParams {
    fn ground_melee() -> Self {
        Self {
            base_hp:          80.0,
            width:            30.0,
            height:           44.0,
            aggro_range:      180.0,
            aggro_hysteresis: 40.0,
            strike_range:     42.0,
            attack_cooldown:  112.0,
            base_damage:      12.0,
            near_range:       0.0,
            far_range:        0.0,
            fire_cooldown:    0.0,
            chase_speed:      0.0,
            bounce_speed:     0.0,
            bounce_frames:    0.0,
        }
    }

    fn ranged_caster() -> Self {
        Self {
            base_hp:          60.0,
            width:            26.0,
            height:           44.0,
            aggro_range:      500.0,
            aggro_hysteresis: 40.0,
            strike_range:     0.0,
            attack_cooldown:  0.0,
            base_damage:      18.0,
            near_range:       150.0,
            far_range:        300.0,
            fire_cooldown:    150.0,
            chase_speed:      0.0,
            bounce_speed:     0.0,
            bounce_frames:    0.0,
        }
    }

    fn flying_homing() -> Self {
        Self {
            base_hp:          40.0,
            width:            28.0,
            height:           28.0,
            aggro_range:      300.0,
            aggro_hysteresis: 60.0,
            strike_range:     36.0,
            attack_cooldown:  90.0,
            base_damage:      8.0,
            near_range:       0.0,
            far_range:        0.0,
            fire_cooldown:    0.0,
            chase_speed:      3.5,
            bounce_speed:     5.5,
            bounce_frames:    45.0,
        }
    }
}

/// ワールドが保持するテーブル。ホストがロード時に差し替えてチューニングできる
#[derive(Clone, Debug)]
pub struct ParamTable {
    pub ground_melee:  ArchetypeParams,
    pub ranged_caster: ArchetypeParams,
    pub flying_homing: ArchetypeParams,
}

impl ParamTable {
    pub fn get(&self, a: Archetype) -> &ArchetypeParams {
        match a {
            Archetype::GroundMelee => &self.ground_melee,
            Archetype::RangedCaster => &self.ranged_caster,
            Archetype::FlyingHoming => &self.flying_homing,
        }
    }
}

impl Default for ParamTable {
    fn default() -> Self {
        Self {
            ground_melee:  ArchetypeParams::ground_melee(),
            ranged_caster: ArchetypeParams::ranged_caster(),
            flying_homing: ArchetypeParams::flying_homing(),
        }
    }
}
