//! Path: native/game_combat/src/lib.rs
//! Summary: 横スクロール戦闘シミュレーションコアのクレートルート

pub mod constants;
pub mod entity_params;
pub mod game_logic;
pub mod physics;
pub mod world;

pub use game_logic::frame_step::frame_step_inner;
pub use world::GameWorld;
