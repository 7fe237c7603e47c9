//! Path: native/game_combat/src/physics/rng.rs
//! Summary: ワールド所有のシード付き線形合同乱数（OS エントロピー非依存）

/// シード付き LCG。ワールドが所有し、シードが同じなら列も同じ
#[derive(Clone, Debug)]
pub struct SimpleRng {
    seed: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            seed: seed % 233_280,
        }
    }

    /// [0, 1) の一様乱数
    pub fn next_f32(&mut self) -> f32 {
        self.seed = (self.seed.wrapping_mul(9301).wrapping_add(49_297)) % 233_280;
        self.seed as f32 / 233_280.0
    }

    /// [min, max) の一様乱数
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// 確率 p で true
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}
