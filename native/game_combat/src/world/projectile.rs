//! Path: native/game_combat/src/world/projectile.rs
//! Summary: 飛翔体とスロットプール（ProjectilePool、全フィールドリセット方式）

/// 飛翔体の種別。閉じた列挙
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectileKind {
    #[default]
    Arrow,
    Bolt,
    /// デッドアイ変種: 重力なし・大判定・貫通・ノックバック
    KineticBolt,
    StaffOrb,
    /// ストームコーラー変種: 直進・最大飛距離あり
    Spark,
    Fireball,
    /// ストームコーラー変種: 垂直落雷カラム
    LightningBolt,
    Bomb,
    /// 敵弾。ブロックで反射できる
    HostileOrb,
}

/// 種別内のサブ状態
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectilePhase {
    #[default]
    Flying,
    /// 火球・落雷の消散演出（縮小しながら phase_timer を減算）
    Dissipating,
    /// 爆弾の爆発後（当たり判定なし、演出のみ）
    Exploded,
}

/// 軌跡リング。描画専用で、シミュレーションは読み返さない
#[derive(Clone, Debug, Default)]
pub struct Trail {
    pts: Vec<(f32, f32)>,
    cap: usize,
}

impl Trail {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            pts: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, x: f32, y: f32) {
        if self.cap == 0 {
            return;
        }
        if self.pts.len() == self.cap {
            self.pts.remove(0);
        }
        self.pts.push((x, y));
    }

    pub fn points(&self) -> &[(f32, f32)] {
        &self.pts
    }
}

#[derive(Clone, Debug, Default)]
pub struct Projectile {
    pub kind:  ProjectileKind,
    pub phase: ProjectilePhase,
    pub x:      f32,
    pub y:      f32,
    pub vx:     f32,
    pub vy:     f32,
    pub radius: f32,
    /// 残り寿命（フレーム）
    pub life: f32,
    /// 発射時に解決済みのダメージ
    pub damage: f32,
    /// DOT のスケール元レアリティ
    pub rarity: u8,
    pub friendly:  bool,
    /// 敵弾オーブがブロックで反射された後か
    pub reflected: bool,
    pub bleed_chance: f32,
    /// 貫通弾が既に命中した敵スロット。スロットはレベル再ロードまで
    /// 再割当されないため、このインデックスで同一性を判定できる
    pub pierce_hits: Vec<usize>,
    /// サブ状態の残りフレーム（消散・爆発後）
    pub phase_timer: f32,
    /// 落雷のみ: 事前計算した着弾高さ
    pub impact_y: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub trail: Trail,
}

/// 飛翔体プール。spawn はスロット取得と同時に全フィールドを上書きし、
/// 解放済みスロットのヒープ確保（貫通リスト）は回収して使い回す。
#[derive(Default)]
pub struct ProjectilePool {
    pub slots: Vec<Projectile>,
    pub alive: Vec<bool>,
    pub count: usize,
    free_list: Vec<usize>,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_alive(&self, i: usize) -> bool {
        self.alive.get(i).copied().unwrap_or(false)
    }

    pub fn spawn(&mut self, mut p: Projectile) -> usize {
        self.count += 1;
        if let Some(i) = self.free_list.pop() {
            // 旧スロットの貫通リストを空にして引き継ぐ
            let mut recycled = std::mem::take(&mut self.slots[i].pierce_hits);
            recycled.clear();
            if p.pierce_hits.is_empty() {
                p.pierce_hits = recycled;
            }
            self.slots[i] = p;
            self.alive[i] = true;
            i
        } else {
            self.slots.push(p);
            self.alive.push(true);
            self.slots.len() - 1
        }
    }

    pub fn kill(&mut self, i: usize) {
        if self.is_alive(i) {
            self.alive[i] = false;
            self.count = self.count.saturating_sub(1);
            self.free_list.push(i);
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.alive.clear();
        self.free_list.clear();
        self.count = 0;
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &Projectile)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.alive[*i])
    }
}
