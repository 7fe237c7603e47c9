//! Path: native/game_combat/src/game_logic/mod.rs
//! Summary: フレーム更新ロジックのサブモジュール公開

pub mod damage;
pub mod enemy_ai;
pub mod frame_step;
pub mod player_update;
pub mod projectiles;
