//! Path: native/game_combat/src/game_logic/enemy_ai.rs
//! Summary: 敵 AI（地上近接・遠隔詠唱・飛行追尾の状態機械と DOT・ハザード処理）

use super::damage::{apply_damage_to_enemy, apply_damage_to_player, difficulty_scale, kill_enemy};
use crate::constants::{
    ENEMY_DESPAWN_MARGIN, ENEMY_JUMP_COOLDOWN, ENRAGE_COOLDOWN_MULT, ENRAGE_HP_RATIO,
    ENRAGE_SPEED_MULT, GRAVITY, HOSTILE_ORB_SPEED, JUMP_FORCE, KNOCKBACK_DECAY,
    KNOCKBACK_DECAY_FLIER, LAVA_DAMAGE_ENEMY, ORB_LIFETIME, ORB_RADIUS, SCREEN_W, SPIKE_DAMAGE,
};
use crate::entity_params::{Archetype, ArchetypeParams};
use crate::physics::collision::{
    deadly_hazard_ahead, hazard_ahead, measure_pit_ahead, resolve_platforms,
};
use crate::physics::spatial_grid::ObstacleKind;
use crate::physics::Rect;
use crate::world::{
    DamageSource, Enemy, EnemyState, FrameEvent, GameWorld, Projectile, ProjectileKind,
};

/// 地上ユニットの重力は通常の 1.7 倍（足場に吸い付かせる）
const GROUND_GRAVITY_MULT: f32 = 1.7;
/// 飛び越えを諦める穴幅
const MAX_JUMPABLE_PIT: f32 = 250.0;
/// 近接攻撃の縦方向許容量
const STRIKE_VERTICAL_TOLERANCE: f32 = 10.0;

/// 今フレームの狙い先スナップショット
#[derive(Clone, Copy, Debug)]
enum TargetRef {
    Player,
    Enemy(usize),
}

#[derive(Clone, Copy, Debug)]
struct Target {
    x: f32,
    y: f32,
    target: TargetRef,
    /// false なら追うだけで攻撃しない（味方がプレイヤーに随伴するケース）
    attackable: bool,
}

pub fn update_enemies(w: &mut GameWorld, dt: f32) {
    for i in 0..w.enemies.len() {
        if !w.enemies.is_alive(i) {
            continue;
        }
        update_one(w, i, dt);
    }
}

fn update_one(w: &mut GameWorld, i: usize, dt: f32) {
    let target = select_target(w, i);
    // スロットから取り出して更新し、最後に戻す（ワールド可変借用との競合回避）
    let mut e = std::mem::take(&mut w.enemies.slots[i]);

    tick_dots(&mut e, dt);
    if e.hp > 0.0 {
        apply_hazard_contact(w, &mut e);
    }

    if e.hp > 0.0 {
        match e.archetype {
            Archetype::GroundMelee => update_ground_melee(w, &mut e, target, dt),
            Archetype::RangedCaster => update_ranged_caster(w, &mut e, target, dt),
            Archetype::FlyingHoming => update_flying_homing(w, &mut e, target, dt),
        }
    }

    let below = e.body.y > w.level_height + ENEMY_DESPAWN_MARGIN;
    let above = e.archetype == Archetype::FlyingHoming && e.body.y < -200.0;
    let dead = e.hp <= 0.0;
    w.enemies.slots[i] = e;

    if dead {
        kill_enemy(w, i);
    } else if below || above {
        // 場外はイベントなしで回収する
        w.enemies.kill(i);
    }
}

/// 狙い先を決める。敵対近接は射程内の味方召喚を優先し、味方は最寄りの敵対を狙う。
/// 追う相手が居ない場合は None（待機に落ちる）
fn select_target(w: &GameWorld, i: usize) -> Option<Target> {
    let e = w.enemies.get(i)?;
    let (cx, cy) = (e.body.center_x(), e.body.center_y());

    if e.friendly {
        let nearest = w
            .enemies
            .iter_alive()
            .filter(|(j, o)| *j != i && !o.friendly)
            .min_by(|(_, a), (_, b)| {
                let da = (a.body.center_x() - cx).powi(2) + (a.body.center_y() - cy).powi(2);
                let db = (b.body.center_x() - cx).powi(2) + (b.body.center_y() - cy).powi(2);
                da.total_cmp(&db)
            });
        if let Some((j, o)) = nearest {
            return Some(Target {
                x: o.body.center_x(),
                y: o.body.center_y(),
                target: TargetRef::Enemy(j),
                attackable: true,
            });
        }
        if w.player.dead {
            return None;
        }
        // 敵が居なければプレイヤーに随伴（攻撃はしない）
        return Some(Target {
            x: w.player.body.center_x(),
            y: w.player.body.center_y(),
            target: TargetRef::Player,
            attackable: false,
        });
    }

    if e.archetype == Archetype::GroundMelee {
        let strike = w.params.get(e.archetype).strike_range;
        let summon = w
            .enemies
            .iter_alive()
            .filter(|(j, o)| *j != i && o.friendly)
            .find(|(_, o)| {
                (o.body.center_x() - cx).abs() < strike
                    && (o.body.center_y() - cy).abs() < e.body.h
            });
        if let Some((j, o)) = summon {
            return Some(Target {
                x: o.body.center_x(),
                y: o.body.center_y(),
                target: TargetRef::Enemy(j),
                attackable: true,
            });
        }
    }

    if w.player.dead {
        return None;
    }
    Some(Target {
        x: w.player.body.center_x(),
        y: w.player.body.center_y(),
        target: TargetRef::Player,
        attackable: true,
    })
}

fn tick_dots(e: &mut Enemy, dt: f32) {
    if e.burn_timer > 0.0 {
        e.burn_timer -= dt;
        e.hp -= e.burn_dps * dt;
    }
    if e.bleed_timer > 0.0 {
        e.bleed_timer -= dt;
        // 移動中の出血は倍速で滴る
        let mult = if e.body.vx.abs() > 0.1 { 2.0 } else { 1.0 };
        e.hp -= e.bleed_dps * mult * dt;
    }
}

fn apply_hazard_contact(w: &mut GameWorld, e: &mut Enemy) {
    w.index.query_box_into(&e.body.rect(), &mut w.obstacle_hits);
    if !w.obstacle_hits.lava.is_empty() {
        e.hp -= LAVA_DAMAGE_ENEMY;
    } else if !w.obstacle_hits.spikes.is_empty() {
        e.hp -= SPIKE_DAMAGE;
    }
}

fn check_enrage(w: &mut GameWorld, e: &mut Enemy) {
    if !e.enraged && e.hp <= e.max_hp * ENRAGE_HP_RATIO {
        e.enraged = true;
        w.frame_events.push(FrameEvent::AudioCue { name: "enrage" });
        w.frame_events.push(FrameEvent::Vfx {
            x: e.body.center_x(),
            y: e.body.y,
            color: [1.0, 0.3, 0.0, 1.0],
            count: 8,
        });
    }
}

fn on_screen(w: &GameWorld, x: f32) -> bool {
    let sx = x - w.camera_x;
    sx > -100.0 && sx < SCREEN_W + 100.0
}

/// 真下にソリッド地形があるか（穴ジャンプは地面の上からのみ）
fn standing_on_solid(w: &mut GameWorld, e: &Enemy) -> bool {
    let probe = Rect::new(e.body.x, e.body.foot_y() + 2.0, e.body.w, 8.0);
    w.index.query_box_into(&probe, &mut w.obstacle_hits);
    w.obstacle_hits
        .blocking
        .iter()
        .any(|&i| w.index.obstacles()[i].kind == ObstacleKind::Solid)
}

fn deal_melee_damage(w: &mut GameWorld, e: &Enemy, target: &Target, amount: f32) {
    match target.target {
        TargetRef::Player => {
            apply_damage_to_player(w, amount, DamageSource::Enemy(e.archetype));
        }
        TargetRef::Enemy(j) => {
            apply_damage_to_enemy(w, j, amount);
        }
    }
}

fn update_ground_melee(w: &mut GameWorld, e: &mut Enemy, target: Option<Target>, dt: f32) {
    let p: ArchetypeParams = w.params.get(e.archetype).clone();
    e.body.vy += GRAVITY * GROUND_GRAVITY_MULT * dt;
    e.attack_timer = (e.attack_timer - dt).max(0.0);
    e.jump_cooldown = (e.jump_cooldown - dt).max(0.0);

    match e.state {
        EnemyState::KnockbackLocked => {
            e.knockback_timer -= dt;
            e.body.vx *= KNOCKBACK_DECAY.powf(dt);
            if e.knockback_timer <= 0.0 {
                e.state = EnemyState::Aggro;
            }
        }
        EnemyState::Idle => {
            idle_patrol(w, e, dt);
            if let Some(t) = target {
                let dx = t.x - e.body.center_x();
                // 双方が画面内に居るときだけ起きる
                if t.attackable
                    && dx.abs() < p.aggro_range
                    && on_screen(w, e.body.center_x())
                    && on_screen(w, t.x)
                {
                    e.state = EnemyState::Aggro;
                }
            }
        }
        EnemyState::Aggro | EnemyState::Bouncing => {
            check_enrage(w, e);
            let Some(t) = target else {
                e.state = EnemyState::Idle;
                e.idle_timer = 30.0;
                e.body.vx = 0.0;
                integrate_ground(w, e, dt);
                return;
            };
            let dx = t.x - e.body.center_x();
            let dy = t.y - e.body.center_y();
            if dx.abs() > p.aggro_range + p.aggro_hysteresis {
                e.state = EnemyState::Idle;
                e.idle_timer = 30.0;
                e.body.vx = 0.0;
                integrate_ground(w, e, dt);
                return;
            }

            let dir = if dx >= 0.0 { 1.0 } else { -1.0 };
            e.facing = dir;
            let speed_mult = if e.enraged { ENRAGE_SPEED_MULT } else { 1.0 };
            let cd_mult = if e.enraged { ENRAGE_COOLDOWN_MULT } else { 1.0 };

            if !e.body.on_ground {
                // 跳躍・落下中は弾道を維持する（射程内でも足を止めない）
            } else if t.attackable
                && dx.abs() < p.strike_range
                && dy.abs() <= e.body.h * 0.5 + STRIKE_VERTICAL_TOLERANCE
            {
                e.body.vx = 0.0;
                if e.attack_timer <= 0.0 {
                    let dmg = (p.base_damage * difficulty_scale(w.difficulty)).round();
                    deal_melee_damage(w, e, &t, dmg);
                    e.attack_timer = p.attack_cooldown * cd_mult;
                    w.frame_events.push(FrameEvent::AudioCue { name: "enemy_strike" });
                }
            } else if deadly_hazard_ahead(&w.index, &e.body, dir, &mut w.obstacle_hits) {
                // トゲ・溶岩には突っ込まない
                e.body.vx = 0.0;
            } else if hazard_ahead(&w.index, &e.body, dir, &mut w.obstacle_hits) {
                // 追跡中の穴は跳び越える（巡回の反転とは非対称な挙動）
                let pit = measure_pit_ahead(&w.index, &e.body, dir, &mut w.obstacle_hits);
                if pit <= 0.0 {
                    // プローブ幅の差で穴が見えなかった。そのまま進む
                    e.body.vx = dir * e.speed * speed_mult;
                } else if pit < MAX_JUMPABLE_PIT
                    && e.jump_cooldown <= 0.0
                    && standing_on_solid(w, e)
                {
                    let vy = JUMP_FORCE * 0.9;
                    let air_time = 2.0 * vy.abs() / (GRAVITY * GROUND_GRAVITY_MULT);
                    e.body.vy = vy;
                    e.body.vx = dir * (pit * 1.2 / air_time).max(1.0);
                    e.jump_cooldown = ENEMY_JUMP_COOLDOWN;
                } else {
                    e.body.vx = 0.0;
                }
            } else {
                e.body.vx = dir * e.speed * speed_mult;
            }
        }
    }

    integrate_ground(w, e, dt);
}

fn idle_patrol(w: &mut GameWorld, e: &mut Enemy, dt: f32) {
    if e.idle_timer > 0.0 {
        e.idle_timer -= dt;
        e.body.vx *= 0.8_f32.powf(dt);
        return;
    }
    if !e.body.on_ground {
        return;
    }
    if hazard_ahead(&w.index, &e.body, e.patrol_dir, &mut w.obstacle_hits) {
        // 巡回中は穴・ハザードで反転するだけ（跳ばない）
        e.patrol_dir = -e.patrol_dir;
    }
    e.facing = e.patrol_dir;
    e.body.vx = e.patrol_dir * e.speed * 0.45;
}

fn integrate_ground(w: &mut GameWorld, e: &mut Enemy, dt: f32) {
    e.body.x += e.body.vx * dt;
    e.body.y += e.body.vy * dt;
    resolve_platforms(&w.index, &mut e.body, &mut w.obstacle_hits);
}

fn update_ranged_caster(w: &mut GameWorld, e: &mut Enemy, target: Option<Target>, dt: f32) {
    let p: ArchetypeParams = w.params.get(e.archetype).clone();
    e.body.vy += GRAVITY * GROUND_GRAVITY_MULT * dt;
    e.fire_timer = (e.fire_timer - dt).max(0.0);

    match e.state {
        EnemyState::KnockbackLocked => {
            e.knockback_timer -= dt;
            e.body.vx *= KNOCKBACK_DECAY.powf(dt);
            if e.knockback_timer <= 0.0 {
                e.state = EnemyState::Aggro;
            }
        }
        EnemyState::Idle => {
            idle_patrol(w, e, dt);
            if let Some(t) = target {
                let dx = t.x - e.body.center_x();
                let in_range = t.attackable && dx.abs() < p.aggro_range;
                // 詠唱型は互いに画面内に居るときだけ起きる
                if in_range && on_screen(w, e.body.center_x()) && on_screen(w, t.x) {
                    e.state = EnemyState::Aggro;
                    e.fire_timer = p.fire_cooldown * 0.5;
                }
            }
        }
        EnemyState::Aggro | EnemyState::Bouncing => {
            check_enrage(w, e);
            let Some(t) = target else {
                e.state = EnemyState::Idle;
                e.idle_timer = 30.0;
                e.body.vx = 0.0;
                integrate_ground(w, e, dt);
                return;
            };
            let dx = t.x - e.body.center_x();
            if dx.abs() > p.aggro_range + p.aggro_hysteresis {
                e.state = EnemyState::Idle;
                e.idle_timer = 30.0;
                e.body.vx = 0.0;
                integrate_ground(w, e, dt);
                return;
            }

            let speed_mult = if e.enraged { ENRAGE_SPEED_MULT } else { 1.0 };
            let cd_mult = if e.enraged { ENRAGE_COOLDOWN_MULT } else { 1.0 };
            e.facing = if dx >= 0.0 { 1.0 } else { -1.0 };

            // 間合い管理: 近すぎれば離れ、遠すぎれば詰め、適正距離では足を止めて撃つ
            let move_dir = if dx.abs() < p.near_range {
                -e.facing
            } else if dx.abs() > p.far_range {
                e.facing
            } else {
                0.0
            };
            if e.body.on_ground {
                if move_dir != 0.0
                    && !deadly_hazard_ahead(&w.index, &e.body, move_dir, &mut w.obstacle_hits)
                    && !hazard_ahead(&w.index, &e.body, move_dir, &mut w.obstacle_hits)
                {
                    e.body.vx = move_dir * e.speed * speed_mult;
                } else {
                    e.body.vx = 0.0;
                }
            }

            if t.attackable && e.fire_timer <= 0.0 {
                fire_hostile_orb(w, e, &t);
                e.fire_timer = p.fire_cooldown * cd_mult;
            }
        }
    }

    integrate_ground(w, e, dt);
}

fn fire_hostile_orb(w: &mut GameWorld, e: &Enemy, t: &Target) {
    let (cx, cy) = (e.body.center_x(), e.body.center_y());
    let dx = t.x - cx;
    let dy = t.y - cy;
    let len = (dx * dx + dy * dy).sqrt().max(0.001);
    let damage = (crate::constants::HOSTILE_ORB_BASE_DAMAGE * difficulty_scale(w.difficulty)).round();

    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::HostileOrb,
        x: cx,
        y: cy,
        vx: dx / len * HOSTILE_ORB_SPEED,
        vy: dy / len * HOSTILE_ORB_SPEED,
        radius: ORB_RADIUS,
        life: ORB_LIFETIME,
        damage,
        friendly: e.friendly,
        start_x: cx,
        start_y: cy,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "orb_cast" });
}

fn update_flying_homing(w: &mut GameWorld, e: &mut Enemy, target: Option<Target>, dt: f32) {
    let p: ArchetypeParams = w.params.get(e.archetype).clone();
    e.sine_time += dt * 0.04;
    e.attack_timer = (e.attack_timer - dt).max(0.0);

    match e.state {
        EnemyState::KnockbackLocked => {
            e.knockback_timer -= dt;
            e.body.vx *= KNOCKBACK_DECAY_FLIER.powf(dt);
            e.body.vy *= KNOCKBACK_DECAY_FLIER.powf(dt);
            if e.knockback_timer <= 0.0 {
                e.state = EnemyState::Aggro;
            }
        }
        EnemyState::Bouncing => {
            e.bounce_timer -= dt;
            e.body.vx *= 0.88_f32.powf(dt);
            e.body.vy *= 0.88_f32.powf(dt);
            if e.bounce_timer <= 0.0 {
                e.state = EnemyState::Aggro;
            }
        }
        EnemyState::Idle => {
            // スポーン周辺の二重正弦で浮遊する
            let ph = e.sine_time + e.sine_offset;
            let tx = e.spawn_x + ph.sin() * 120.0;
            let ty = e.spawn_y + (ph * 2.0).sin() * 30.0;
            e.body.vx = (tx - e.body.x) * 0.05;
            e.body.vy = (ty - e.body.y) * 0.05;

            if let Some(t) = target {
                let dist = ((t.x - e.body.center_x()).powi(2)
                    + (t.y - e.body.center_y()).powi(2))
                .sqrt();
                if t.attackable && dist < p.aggro_range {
                    e.state = EnemyState::Aggro;
                }
            }
        }
        EnemyState::Aggro => {
            check_enrage(w, e);
            let Some(t) = target else {
                e.state = EnemyState::Idle;
                return_flier_to_hover(e, dt);
                return;
            };
            let dx = t.x - e.body.center_x();
            let dy = t.y - e.body.center_y();
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > p.aggro_range + p.aggro_hysteresis {
                e.state = EnemyState::Idle;
                return_flier_to_hover(e, dt);
                return;
            }

            let speed_mult = if e.enraged { ENRAGE_SPEED_MULT } else { 1.0 };
            let cd_mult = if e.enraged { ENRAGE_COOLDOWN_MULT } else { 1.0 };

            if t.attackable && dist < p.strike_range && e.attack_timer <= 0.0 {
                let dmg = (p.base_damage * difficulty_scale(w.difficulty)).round();
                deal_melee_damage(w, e, &t, dmg);
                e.attack_timer = p.attack_cooldown * cd_mult;
                // 当てたら離脱方向へ跳ね返る
                let len = dist.max(0.001);
                e.body.vx = -dx / len * p.bounce_speed;
                e.body.vy = -dy / len * p.bounce_speed;
                e.state = EnemyState::Bouncing;
                e.bounce_timer = p.bounce_frames;
            } else {
                let len = dist.max(0.001);
                let wobble = (e.sine_time * 3.0 + e.sine_offset).sin() * 0.6;
                e.body.vx = dx / len * p.chase_speed * speed_mult;
                e.body.vy = dy / len * p.chase_speed * speed_mult + wobble;
            }
            e.facing = if dx >= 0.0 { 1.0 } else { -1.0 };
        }
    }

    // 飛行型は地形に干渉しない
    e.body.x += e.body.vx * dt;
    e.body.y += e.body.vy * dt;
}

fn return_flier_to_hover(e: &mut Enemy, dt: f32) {
    e.body.x += e.body.vx * dt;
    e.body.y += e.body.vy * dt;
    e.body.vx *= 0.9_f32.powf(dt);
    e.body.vy *= 0.9_f32.powf(dt);
}
