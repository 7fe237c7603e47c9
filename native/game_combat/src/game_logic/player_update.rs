//! Path: native/game_combat/src/game_logic/player_update.rs
//! Summary: プレイヤー更新（移動・ハザード・チェックポイント・武器/詠唱の発動）

use super::damage::{apply_damage_to_player, compute_damage, kill_player};
use crate::constants::{
    ARROW_COOLDOWN, ARROW_LIFETIME, ARROW_SPEED, ATTACK_SPEED_MULT, BASE_ARROW_DAMAGE,
    BASE_BOMB_DAMAGE, BASE_CROSSBOW_DAMAGE, BASE_FIREBALL_DAMAGE, BASE_ORB_DAMAGE,
    BASE_SWORD_DAMAGE, BOLT_BLEED_CHANCE, BOLT_RADIUS, BOLT_RADIUS_KINETIC, BOLT_SPEED,
    BOMB_COOLDOWN, BOMB_LIFETIME, BOMB_TRAIL_LEN, CROSSBOW_COOLDOWN, DROP_THROUGH_VY,
    FIREBALL_COOLDOWN, FIREBALL_LIFETIME, FIREBALL_MANA_COST, FIREBALL_RADIUS, FIREBALL_SPEED,
    FIREBALL_TRAIL_LEN, FRICTION, GRAVITY, JUMP_COOLDOWN, JUMP_FORCE, LAVA_DAMAGE_PLAYER,
    LIGHTNING_COOLDOWN, LIGHTNING_DAMAGE, LIGHTNING_FALL_SPEED, LIGHTNING_RADIUS, MANA_MAX,
    MANA_REGEN, MS_PER_FRAME, ORB_LIFETIME, ORB_RADIUS, ORB_SPEED, PLAYER_SPEED, SCREEN_W,
    SPARK_DAMAGE, SPARK_RADIUS, SPARK_SPEED, SPIKE_DAMAGE, STAFF_ORB_COOLDOWN, SUMMON_CAP,
    SUMMON_COOLDOWN, SWORD_COOLDOWN, SWORD_KNOCKBACK_LOCK, SWORD_KNOCKBACK_VX, SWORD_RANGE,
};
use crate::entity_params::Archetype;
use crate::physics::collision::resolve_platforms;
use crate::physics::Rect;
use crate::world::{
    AbilityMod, DamageSource, DeathCause, EnemyState, FrameEvent, GameWorld, Loadout, PlayerInput,
    Projectile, ProjectileKind, Trail,
};

pub fn update_player(w: &mut GameWorld, dt: f32) {
    let input = w.input;
    tick_timers(w, dt);

    if w.player.dead {
        return;
    }

    w.player.blocking = w.player.loadout == Loadout::Sword && (input.block || input.secondary);

    apply_movement(w, &input, dt);
    integrate_and_resolve(w, dt);
    apply_environment(w, &input);
    if w.player.dead {
        return;
    }

    update_camera(w);

    if w.player.loadout == Loadout::Staff {
        let before = w.player.mana;
        w.player.mana = (w.player.mana + MANA_REGEN * dt).min(MANA_MAX);
        if w.player.mana != before {
            w.frame_events.push(FrameEvent::HudDirty);
        }
    }

    handle_attacks(w, &input);
}

fn tick_timers(w: &mut GameWorld, dt: f32) {
    let p = &mut w.player;
    let ms = MS_PER_FRAME * dt;
    let attack_buff_was = p.attack_speed_timer > 0.0;
    let speed_buff_was = p.speed_boost_timer > 0.0;
    p.invincible_timer = (p.invincible_timer - dt).max(0.0);
    p.jump_cooldown = (p.jump_cooldown - dt).max(0.0);
    p.drop_timer = (p.drop_timer - dt).max(0.0);
    p.attack_speed_timer = (p.attack_speed_timer - dt).max(0.0);
    p.speed_boost_timer = (p.speed_boost_timer - dt).max(0.0);
    // バフ切れはその瞬間だけ HUD に知らせる
    if (attack_buff_was && p.attack_speed_timer <= 0.0)
        || (speed_buff_was && p.speed_boost_timer <= 0.0)
    {
        w.frame_events.push(FrameEvent::HudDirty);
    }
    let p = &mut w.player;
    p.sword_timer = (p.sword_timer - ms).max(0.0);
    p.shot_timer = (p.shot_timer - ms).max(0.0);
    p.bomb_timer = (p.bomb_timer - ms).max(0.0);
    p.orb_timer = (p.orb_timer - ms).max(0.0);
    p.fireball_timer = (p.fireball_timer - ms).max(0.0);
    p.lightning_timer = (p.lightning_timer - ms).max(0.0);
    p.summon_timer = (p.summon_timer - ms).max(0.0);

    if p.dead && p.respawn_timer > 0.0 {
        p.respawn_timer -= dt;
        if p.respawn_timer <= 0.0 {
            p.respawn_timer = 0.0;
            // リスポーン処理（レベル再ロード）はホストの責務
            w.frame_events.push(FrameEvent::RespawnReady);
        }
    }
}

fn apply_movement(w: &mut GameWorld, input: &PlayerInput, dt: f32) {
    let p = &mut w.player;
    let speed = PLAYER_SPEED * if p.speed_boost_timer > 0.0 { 1.4 } else { 1.0 };

    if input.move_dir != 0.0 {
        p.body.vx = input.move_dir.signum() * speed;
        p.facing = input.move_dir.signum();
    } else {
        p.body.vx *= FRICTION.powf(dt);
    }

    // ジャンプはエッジトリガー（押しっぱなしで連続発動しない）
    if input.jump && !p.jump_held && p.body.on_ground && p.jump_cooldown <= 0.0 {
        p.body.vy = JUMP_FORCE;
        p.body.on_ground = false;
        p.jump_cooldown = JUMP_COOLDOWN;
        w.frame_events.push(FrameEvent::AudioCue { name: "jump" });
    }
    w.player.jump_held = input.jump;

    let p = &mut w.player;
    if input.drop && p.body.on_ground {
        // 一方通行足場のすり抜け降下。ソリッドの上では解決側が止めるだけ
        p.drop_timer = 16.0;
        p.body.vy = DROP_THROUGH_VY;
        p.body.on_ground = false;
    }
    p.body.dropping_through = p.drop_timer > 0.0;

    p.body.vy += GRAVITY * dt;
}

fn integrate_and_resolve(w: &mut GameWorld, dt: f32) {
    let p = &mut w.player;
    p.body.x += p.body.vx * dt;
    p.body.y += p.body.vy * dt;
    p.body.x = p.body.x.clamp(0.0, (w.level_width - p.body.w).max(0.0));

    resolve_platforms(&w.index, &mut p.body, &mut w.obstacle_hits);
    if p.body.on_ground {
        p.record_grounded();
    }
}

fn apply_environment(w: &mut GameWorld, _input: &PlayerInput) {
    // 画面下へ落ちたら即死（加護があれば戻される）
    if w.player.body.y > w.level_height + 100.0 {
        kill_player(w, DeathCause::Pit);
        return;
    }

    w.index
        .query_box_into(&w.player.body.rect(), &mut w.obstacle_hits);
    if !w.obstacle_hits.lava.is_empty() {
        apply_damage_to_player(w, LAVA_DAMAGE_PLAYER, DamageSource::Environment);
    } else if !w.obstacle_hits.spikes.is_empty() {
        apply_damage_to_player(w, SPIKE_DAMAGE, DamageSource::Environment);
    }

    if !w.checkpoint_reached && w.player.body.rect().overlaps(&w.checkpoint) {
        w.checkpoint_reached = true;
        w.frame_events.push(FrameEvent::CheckpointReached);
        w.frame_events.push(FrameEvent::AudioCue { name: "checkpoint" });
        w.hooks.fire_checkpoint();
        log::debug!("checkpoint reached at frame {}", w.frame_id);
    }
}

fn update_camera(w: &mut GameWorld) {
    w.camera_x = (w.player.body.x - SCREEN_W / 3.0)
        .clamp(0.0, (w.level_width - SCREEN_W).max(0.0));
}

fn handle_attacks(w: &mut GameWorld, input: &PlayerInput) {
    let cd = if w.player.attack_speed_timer > 0.0 {
        ATTACK_SPEED_MULT
    } else {
        1.0
    };

    match w.player.loadout {
        Loadout::Sword => {
            if input.primary && w.player.sword_timer <= 0.0 {
                sword_swing(w);
                w.player.sword_timer = SWORD_COOLDOWN * cd;
            }
        }
        Loadout::Bow => {
            if input.primary && w.player.shot_timer <= 0.0 {
                fire_arrow(w, input);
                w.player.shot_timer = ARROW_COOLDOWN * cd;
            }
            if input.secondary && w.player.bomb_timer <= 0.0 && w.player.bombs > 0 {
                throw_bomb(w, input);
                w.player.bombs -= 1;
                w.player.bomb_timer = BOMB_COOLDOWN * cd;
            }
        }
        Loadout::Crossbow => {
            if input.primary && w.player.shot_timer <= 0.0 {
                fire_bolt(w, input);
                w.player.shot_timer = CROSSBOW_COOLDOWN * cd;
            }
            if input.secondary && w.player.bomb_timer <= 0.0 && w.player.bombs > 0 {
                throw_bomb(w, input);
                w.player.bombs -= 1;
                w.player.bomb_timer = BOMB_COOLDOWN * cd;
            }
        }
        Loadout::Staff => {
            if input.primary {
                match w.player.ability {
                    AbilityMod::GraveCaller => {
                        if w.player.summon_timer <= 0.0 && summon(w, Archetype::GroundMelee) {
                            w.player.summon_timer = SUMMON_COOLDOWN * cd;
                        }
                    }
                    AbilityMod::StormCaller => {
                        if w.player.orb_timer <= 0.0 {
                            fire_spark(w, input);
                            w.player.orb_timer = STAFF_ORB_COOLDOWN * cd;
                        }
                    }
                    _ => {
                        if w.player.orb_timer <= 0.0 {
                            fire_staff_orb(w, input);
                            w.player.orb_timer = STAFF_ORB_COOLDOWN * cd;
                        }
                    }
                }
            }
            if input.secondary {
                match w.player.ability {
                    AbilityMod::GraveCaller => {
                        if w.player.summon_timer <= 0.0 && summon(w, Archetype::FlyingHoming) {
                            w.player.summon_timer = SUMMON_COOLDOWN * cd;
                        }
                    }
                    AbilityMod::StormCaller => {
                        if w.player.lightning_timer <= 0.0 && cast_lightning(w, input) {
                            w.player.lightning_timer = LIGHTNING_COOLDOWN * cd;
                        }
                    }
                    _ => {
                        if w.player.fireball_timer <= 0.0
                            && w.player.mana >= FIREBALL_MANA_COST
                        {
                            w.player.mana -= FIREBALL_MANA_COST;
                            w.frame_events.push(FrameEvent::HudDirty);
                            fire_fireball(w, input);
                            w.player.fireball_timer = FIREBALL_COOLDOWN * cd;
                        }
                    }
                }
            }
        }
    }
}

/// 剣の振り。正面の矩形に入った敵対すべてに命中し、ノックバックを与える
fn sword_swing(w: &mut GameWorld) {
    let p = &w.player;
    let hitbox = if p.facing >= 0.0 {
        Rect::new(p.body.x + p.body.w, p.body.y - 10.0, SWORD_RANGE, p.body.h + 20.0)
    } else {
        Rect::new(p.body.x - SWORD_RANGE, p.body.y - 10.0, SWORD_RANGE, p.body.h + 20.0)
    };
    let damage = compute_damage(BASE_SWORD_DAMAGE, p.sword_rarity, p.damage_mult);
    let facing = p.facing;

    w.frame_events.push(FrameEvent::AudioCue { name: "sword" });

    for j in 0..w.enemies.len() {
        let hit = match w.enemies.get(j) {
            Some(e) => !e.friendly && e.body.rect().overlaps(&hitbox),
            None => false,
        };
        if !hit {
            continue;
        }
        if let Some(e) = w.enemies.get_mut(j) {
            e.body.vx = facing * SWORD_KNOCKBACK_VX;
            e.state = EnemyState::KnockbackLocked;
            e.knockback_timer = SWORD_KNOCKBACK_LOCK;
        }
        super::damage::apply_damage_to_enemy(w, j, damage);
    }
}

fn aim_dir(w: &GameWorld, input: &PlayerInput) -> (f32, f32) {
    let dx = input.aim_x - w.player.body.center_x();
    let dy = input.aim_y - w.player.body.center_y();
    let len = (dx * dx + dy * dy).sqrt();
    if len < 0.001 {
        (w.player.facing, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

fn fire_arrow(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let damage = compute_damage(BASE_ARROW_DAMAGE, w.player.bow_rarity, w.player.damage_mult);
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::Arrow,
        x: cx,
        y: cy,
        vx: dx * ARROW_SPEED,
        vy: dy * ARROW_SPEED,
        radius: 4.0,
        life: ARROW_LIFETIME,
        damage,
        friendly: true,
        start_x: cx,
        start_y: cy,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "arrow" });
}

fn fire_bolt(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let kinetic = w.player.ability == AbilityMod::DeadEye;
    let damage = compute_damage(BASE_CROSSBOW_DAMAGE, w.player.bow_rarity, w.player.damage_mult);
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: if kinetic { ProjectileKind::KineticBolt } else { ProjectileKind::Bolt },
        x: cx,
        y: cy,
        vx: dx * BOLT_SPEED,
        vy: dy * BOLT_SPEED,
        radius: if kinetic { BOLT_RADIUS_KINETIC } else { BOLT_RADIUS },
        life: ARROW_LIFETIME,
        damage,
        rarity: w.player.bow_rarity,
        bleed_chance: if kinetic { 0.0 } else { BOLT_BLEED_CHANCE },
        friendly: true,
        start_x: cx,
        start_y: cy,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "crossbow" });
}

fn fire_staff_orb(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let damage = compute_damage(BASE_ORB_DAMAGE, w.player.staff_rarity, w.player.damage_mult);
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::StaffOrb,
        x: cx,
        y: cy,
        vx: dx * ORB_SPEED,
        vy: dy * ORB_SPEED,
        radius: ORB_RADIUS,
        life: ORB_LIFETIME,
        damage,
        friendly: true,
        start_x: cx,
        start_y: cy,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "orb" });
}

/// ストームコーラーのスパーク。直進し、最大飛距離で自壊する
fn fire_spark(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let damage = SPARK_DAMAGE * w.player.damage_mult;
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::Spark,
        x: cx,
        y: cy,
        vx: dx * SPARK_SPEED,
        vy: dy * SPARK_SPEED,
        radius: SPARK_RADIUS,
        life: FIREBALL_LIFETIME,
        damage,
        friendly: true,
        start_x: cx,
        start_y: cy,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "spark" });
}

fn fire_fireball(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let damage = compute_damage(BASE_FIREBALL_DAMAGE, w.player.staff_rarity, w.player.damage_mult);
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::Fireball,
        x: cx,
        y: cy,
        vx: dx * FIREBALL_SPEED,
        vy: dy * FIREBALL_SPEED,
        radius: FIREBALL_RADIUS,
        life: FIREBALL_LIFETIME,
        damage,
        friendly: true,
        start_x: cx,
        start_y: cy,
        trail: Trail::with_cap(FIREBALL_TRAIL_LEN),
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "fireball" });
}

/// 落雷。照準 X の直下にある最上段の足場で炸裂する。
/// 足場が無ければ不発（クールダウンも消費しない）
fn cast_lightning(w: &mut GameWorld, input: &PlayerInput) -> bool {
    let Some(impact_y) = w.index.topmost_surface_under(input.aim_x) else {
        return false;
    };
    let damage = LIGHTNING_DAMAGE * w.player.damage_mult;
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::LightningBolt,
        x: input.aim_x,
        y: -40.0,
        vx: 0.0,
        vy: LIGHTNING_FALL_SPEED,
        radius: LIGHTNING_RADIUS,
        life: 10_000.0,
        damage,
        friendly: true,
        impact_y,
        start_x: input.aim_x,
        start_y: -40.0,
        ..Projectile::default()
    });
    w.frame_events.push(FrameEvent::AudioCue { name: "lightning_cast" });
    true
}

fn throw_bomb(w: &mut GameWorld, input: &PlayerInput) {
    let (dx, dy) = aim_dir(w, input);
    let damage = compute_damage(BASE_BOMB_DAMAGE, w.player.bow_rarity, w.player.damage_mult);
    let (cx, cy) = (w.player.body.center_x(), w.player.body.center_y());
    w.projectiles.spawn(Projectile {
        kind: ProjectileKind::Bomb,
        x: cx,
        y: cy,
        vx: dx * 6.0,
        vy: dy * 6.0 - 2.0, // 山なりに投げる
        radius: 6.0,
        life: BOMB_LIFETIME,
        damage,
        friendly: true,
        start_x: cx,
        start_y: cy,
        trail: Trail::with_cap(BOMB_TRAIL_LEN),
        ..Projectile::default()
    });
    // 残弾が減ったので HUD を更新させる
    w.frame_events.push(FrameEvent::HudDirty);
    w.frame_events.push(FrameEvent::AudioCue { name: "bomb_throw" });
}

/// 召喚。場の味方ユニット数が上限未満のときだけ成立する
fn summon(w: &mut GameWorld, archetype: Archetype) -> bool {
    if w.summon_count() >= SUMMON_CAP {
        return false;
    }
    let x = w.player.body.x + w.player.facing * 40.0;
    let y = w.player.body.y - 10.0;
    let i = w.spawn_enemy(x, y, archetype, true);
    // 召喚は即座に戦闘へ入る
    if let Some(e) = w.enemies.get_mut(i) {
        e.idle_timer = 0.0;
        e.state = EnemyState::Aggro;
    }
    w.frame_events.push(FrameEvent::AudioCue { name: "summon" });
    w.frame_events.push(FrameEvent::Vfx {
        x: x + 15.0,
        y: y + 20.0,
        color: [0.5, 0.9, 0.5, 1.0],
        count: 10,
    });
    true
}
