//! Obstacle combat - AI steering, projectiles, contact damage, pickups
//!
//! Combat systems run only while no encounter is active and the run is
//! live; the scheduler gates them with run conditions so an open quiz
//! freezes every obstacle in place.

mod components;

pub use components::{FireCooldown, HealthPickup, HitPoints, Obstacle, Patrol, Projectile, Stun};

use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;
use crate::events::{DamageSource, EventBus, GameEvent};
use crate::input::PlayerInput;
use crate::player::{Facing, Player, Velocity};
use crate::rooms::{ActiveRoom, RoomEntity, RunOutcome, finish_run};
use crate::run_state::{DamageOutcome, RunState};

/// Steering decision for one obstacle: chase inside the radius, otherwise
/// patrol the lane, reversing at its ends. Returns the new velocity and
/// updates the patrol direction in place.
pub fn steer_obstacle(
    pos: Vec2,
    player_pos: Vec2,
    patrol: &mut Patrol,
    chase_radius: f32,
    chase_speed: f32,
    patrol_speed: f32,
) -> Vec2 {
    if pos.distance(player_pos) < chase_radius {
        return (player_pos - pos).normalize_or_zero() * chase_speed;
    }
    if pos.x <= patrol.min_x {
        patrol.dir = 1.0;
    } else if pos.x >= patrol.max_x {
        patrol.dir = -1.0;
    }
    Vec2::new(patrol.dir * patrol_speed, 0.0)
}

/// Independent heal-drop roll for a defeated obstacle.
pub fn roll_drop<R: Rng>(rng: &mut R, chance: f32) -> bool {
    chance > 0.0 && rng.r#gen::<f32>() < chance
}

/// Decide obstacle velocities. Stunned obstacles stand still.
pub fn obstacle_ai(
    player: Query<&Transform, (With<Player>, Without<Obstacle>)>,
    mut obstacles: Query<(&Transform, &mut Velocity, &mut Patrol, &Stun), With<Obstacle>>,
    room: Res<ActiveRoom>,
) {
    let Ok(player_tf) = player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (transform, mut velocity, mut patrol, stun) in &mut obstacles {
        if stun.is_stunned() {
            velocity.0 = Vec2::ZERO;
            continue;
        }
        velocity.0 = steer_obstacle(
            transform.translation.truncate(),
            player_pos,
            &mut patrol,
            room.0.chase_radius,
            room.0.chase_speed,
            room.0.patrol_speed,
        );
    }
}

pub fn tick_stun(time: Res<Time>, mut query: Query<&mut Stun>) {
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    for mut stun in &mut query {
        stun.0 = (stun.0 - dt).max(0.0);
    }
}

pub fn tick_fire_cooldown(time: Res<Time>, mut cooldown: ResMut<FireCooldown>) {
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    cooldown.0 = (cooldown.0 - dt).max(0.0);
}

/// Spawn a projectile along the player's facing. A press during cooldown is
/// consumed and discarded, not queued.
pub fn player_fire(
    mut commands: Commands,
    mut input: ResMut<PlayerInput>,
    mut cooldown: ResMut<FireCooldown>,
    player: Query<(&Transform, &Facing), With<Player>>,
    room: Res<ActiveRoom>,
) {
    if !input.take_fire() {
        return;
    }
    if cooldown.0 > 0.0 {
        return;
    }
    let Ok((transform, facing)) = player.single() else {
        return;
    };
    cooldown.0 = FIRE_COOLDOWN;
    commands.spawn((
        Projectile {
            ttl: PROJECTILE_TTL,
        },
        Velocity(facing.0.normalize_or_zero() * room.0.projectile_speed),
        Transform::from_translation(transform.translation),
        RoomEntity,
    ));
}

pub fn tick_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Projectile)>,
) {
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    for (entity, mut projectile) in &mut query {
        projectile.ttl -= dt;
        if projectile.ttl <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve projectile-obstacle overlaps. Stunned obstacles are immune and
/// projectiles pass through them; a projectile spends itself on the first
/// obstacle it connects with.
pub fn projectile_hits(
    mut commands: Commands,
    projectiles: Query<(Entity, &Transform), With<Projectile>>,
    mut obstacles: Query<(Entity, &Transform, &mut HitPoints, &mut Stun), With<Obstacle>>,
    mut run_state: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    room: Res<ActiveRoom>,
) {
    let mut rng = rand::thread_rng();

    for (proj_entity, proj_tf) in &projectiles {
        let proj_pos = proj_tf.translation.truncate();
        for (obs_entity, obs_tf, mut hp, mut stun) in &mut obstacles {
            if stun.is_stunned() || hp.0 <= 0 {
                continue;
            }
            let obs_pos = obs_tf.translation.truncate();
            if proj_pos.distance(obs_pos) > HIT_RADIUS {
                continue;
            }

            commands.entity(proj_entity).despawn();
            hp.0 -= 1;
            stun.apply(room.0.hit_stun_secs);
            run_state.add_score(room.0.hit_score);
            bus.emit(GameEvent::ObstacleHit { remaining_hp: hp.0 });

            if hp.0 <= 0 {
                commands.entity(obs_entity).despawn();
                bus.emit(GameEvent::ObstacleDefeated {
                    score: run_state.score(),
                });
                if roll_drop(&mut rng, room.0.drop_chance) {
                    commands.spawn((
                        HealthPickup { ttl: PICKUP_TTL },
                        Transform::from_translation(obs_tf.translation),
                        RoomEntity,
                    ));
                }
            }
            break;
        }
    }
}

/// Un-stunned obstacle contact damages the player and stuns the obstacle
/// for the room's contact window. Lethal contact ends the run.
pub fn contact_damage(
    player: Query<&Transform, (With<Player>, Without<Obstacle>)>,
    mut obstacles: Query<(&Transform, &mut Stun), With<Obstacle>>,
    mut run_state: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut outcome: ResMut<RunOutcome>,
    room: Res<ActiveRoom>,
) {
    let Ok(player_tf) = player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (obs_tf, mut stun) in &mut obstacles {
        if stun.is_stunned() {
            continue;
        }
        if player_pos.distance(obs_tf.translation.truncate()) > CONTACT_RADIUS {
            continue;
        }

        stun.apply(room.0.contact_stun_secs);
        match run_state.apply_damage(CONTACT_DAMAGE) {
            DamageOutcome::Survived { remaining } => {
                bus.emit(GameEvent::DamageTaken {
                    source: DamageSource::Contact,
                    remaining,
                });
            }
            DamageOutcome::Died => {
                bus.emit(GameEvent::DamageTaken {
                    source: DamageSource::Contact,
                    remaining: 0,
                });
                finish_run(&mut outcome, &run_state, &mut bus, false);
                return;
            }
            DamageOutcome::AlreadyDead => return,
        }
    }
}

pub fn tick_pickups(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut HealthPickup)>,
) {
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    for (entity, mut pickup) in &mut query {
        pickup.ttl -= dt;
        if pickup.ttl <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Consume touched pickups. Healing is capped at max health; the pickup is
/// spent either way.
pub fn pickup_heal(
    mut commands: Commands,
    player: Query<&Transform, With<Player>>,
    pickups: Query<(Entity, &Transform), With<HealthPickup>>,
    mut run_state: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
) {
    let Ok(player_tf) = player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (entity, pickup_tf) in &pickups {
        if player_pos.distance(pickup_tf.translation.truncate()) > PICKUP_RADIUS {
            continue;
        }
        commands.entity(entity).despawn();
        run_state.heal(PICKUP_HEAL);
        bus.emit(GameEvent::PickupHeal {
            health: run_state.health(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn steering_chases_inside_the_radius_only() {
        let mut patrol = Patrol {
            min_x: -100.0,
            max_x: 100.0,
            dir: 1.0,
        };
        // Player far away: horizontal patrol
        let v = steer_obstacle(
            Vec2::ZERO,
            Vec2::new(1000.0, 0.0),
            &mut patrol,
            280.0,
            65.0,
            80.0,
        );
        assert_eq!(v, Vec2::new(80.0, 0.0));

        // Player inside the radius: head straight for them
        let v = steer_obstacle(
            Vec2::ZERO,
            Vec2::new(0.0, 100.0),
            &mut patrol,
            280.0,
            65.0,
            80.0,
        );
        assert_eq!(v, Vec2::new(0.0, 65.0));
    }

    #[test]
    fn patrol_reverses_at_lane_ends() {
        let mut patrol = Patrol {
            min_x: -100.0,
            max_x: 100.0,
            dir: 1.0,
        };
        let far = Vec2::new(5000.0, 0.0);

        let v = steer_obstacle(Vec2::new(100.0, 0.0), far, &mut patrol, 280.0, 65.0, 80.0);
        assert_eq!(v.x, -80.0);
        assert_eq!(patrol.dir, -1.0);

        let v = steer_obstacle(Vec2::new(-100.0, 0.0), far, &mut patrol, 280.0, 65.0, 80.0);
        assert_eq!(v.x, 80.0);
        assert_eq!(patrol.dir, 1.0);
    }

    #[test]
    fn drop_roll_boundaries() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(!roll_drop(&mut rng, 0.0));
            assert!(roll_drop(&mut rng, 1.0));
        }
    }

    #[test]
    fn stun_blocks_and_expires() {
        let mut stun = Stun::default();
        assert!(!stun.is_stunned());
        stun.apply(1.5);
        assert!(stun.is_stunned());
        stun.0 = (stun.0 - 2.0).max(0.0);
        assert!(!stun.is_stunned());
    }
}
