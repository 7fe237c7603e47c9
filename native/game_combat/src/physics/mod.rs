//! Path: native/game_combat/src/physics/mod.rs
//! Summary: 物理プリミティブ（矩形・剛体）とサブモジュール公開

pub mod collision;
pub mod rng;
pub mod spatial_grid;

/// 軸平行矩形。判定は厳密な `<` 比較（辺が接しているだけでは非交差）
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn overlaps(&self, o: &Rect) -> bool {
        self.x < o.x + o.w && self.x + self.w > o.x && self.y < o.y + o.h && self.y + self.h > o.y
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }
}

/// プレイヤー・敵が共有する運動状態。衝突解決はこの構造体だけを見る
#[derive(Clone, Copy, Debug, Default)]
pub struct Body {
    pub x:  f32,
    pub y:  f32,
    pub w:  f32,
    pub h:  f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground:        bool,
    /// すり抜け降下中は一方通行足場を無視する
    pub dropping_through: bool,
}

impl Body {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }

    pub fn foot_y(&self) -> f32 {
        self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0); // 辺が接しているだけ
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b), "接触のみでは非交差");
        assert!(a.overlaps(&c));
    }
}
