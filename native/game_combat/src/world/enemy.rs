//! Path: native/game_combat/src/world/enemy.rs
//! Summary: 敵エンティティとスロットアリーナ（EnemyArena）

use crate::entity_params::Archetype;
use crate::physics::Body;

/// AI 状態。常にこのうち丁度ひとつ
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnemyState {
    #[default]
    Idle,
    Aggro,
    /// 飛行型の接触後リコイル
    Bouncing,
    /// ノックバック硬直中は他の AI を停止
    KnockbackLocked,
}

#[derive(Clone, Debug, Default)]
pub struct Enemy {
    pub body:      Body,
    pub archetype: Archetype,
    /// 召喚された味方ユニットか（ルートを落とさず、プレイヤー弾を受けない）
    pub friendly:  bool,
    pub hp:     f32,
    pub max_hp: f32,
    pub speed:  f32,
    pub state:  EnemyState,
    pub facing: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub idle_timer:      f32,
    pub patrol_dir:      f32,
    pub attack_timer:    f32,
    pub fire_timer:      f32,
    pub jump_cooldown:   f32,
    pub knockback_timer: f32,
    pub bounce_timer:    f32,
    pub sine_time:   f32,
    pub sine_offset: f32,
    /// HP 30% 以下で永続化する激昂フラグ
    pub enraged: bool,
    pub burn_timer: f32,
    pub burn_dps:   f32,
    pub bleed_timer: f32,
    pub bleed_dps:   f32,
}

/// スロット再利用型の敵アリーナ。kill は冪等で、空きスロットは O(1) で回収する
#[derive(Default)]
pub struct EnemyArena {
    pub slots: Vec<Enemy>,
    pub alive: Vec<bool>,
    pub count: usize,
    free_list: Vec<usize>,
}

impl EnemyArena {
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

    pub fn get(&self, i: usize) -> Option<&Enemy> {
        if self.is_alive(i) {
            self.slots.get(i)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut Enemy> {
        if self.is_alive(i) {
            self.slots.get_mut(i)
        } else {
            None
        }
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &Enemy)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.alive[*i])
    }

    /// スロットを確保して敵を配置する（空きがあれば再利用）
    pub fn spawn(&mut self, enemy: Enemy) -> usize {
        self.count += 1;
        if let Some(i) = self.free_list.pop() {
            self.slots[i] = enemy;
            self.alive[i] = true;
            i
        } else {
            self.slots.push(enemy);
            self.alive.push(true);
            self.slots.len() - 1
        }
    }

    /// 冪等な kill。2 回呼んでも count が負にならない
    pub fn kill(&mut self, i: usize) {
        if self.is_alive(i) {
            self.alive[i] = false;
            self.count = self.count.saturating_sub(1);
            self.free_list.push(i);
        }
    }

    /// レベル再ロード時に全消去する
    pub fn clear(&mut self) {
        self.slots.clear();
        self.alive.clear();
        self.free_list.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_enemy(x: f32) -> Enemy {
        Enemy {
            hp: 50.0,
            max_hp: 50.0,
            body: Body {
                x,
                y: 0.0,
                w: 30.0,
                h: 44.0,
                ..Body::default()
            },
            ..Enemy::default()
        }
    }

    #[test]
    fn spawn_increases_count() {
        let mut arena = EnemyArena::new();
        arena.spawn(some_enemy(0.0));
        arena.spawn(some_enemy(10.0));
        assert_eq!(arena.count, 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn kill_decreases_count() {
        let mut arena = EnemyArena::new();
        arena.spawn(some_enemy(0.0));
        arena.spawn(some_enemy(10.0));

        arena.kill(0);

        assert_eq!(arena.count, 1, "kill 後の count は 1 であるべき");
        assert!(!arena.is_alive(0));
        assert!(arena.get(0).is_none(), "死亡スロットは取得できない");
    }

    #[test]
    fn kill_idempotent() {
        let mut arena = EnemyArena::new();
        arena.spawn(some_enemy(0.0));
        arena.kill(0);
        arena.kill(0); // 2 回 kill しても count が負にならない
        assert_eq!(arena.count, 0);
    }

    #[test]
    fn spawn_reuses_free_slot() {
        let mut arena = EnemyArena::new();
        arena.spawn(some_enemy(0.0));
        arena.kill(0);

        let len_before = arena.len();
        let i = arena.spawn(some_enemy(99.0));

        // free_list のスロットを再利用するため配列長は変わらない
        assert_eq!(arena.len(), len_before, "free_list 再利用時は配列が伸長しないべき");
        assert_eq!(i, 0);
        assert_eq!(arena.count, 1);
        assert!((arena.slots[0].body.x - 99.0).abs() < 0.001);
    }
}
