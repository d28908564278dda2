//! Player avatar - components and movement
//!
//! `Velocity` and the mover are shared with obstacles and projectiles;
//! everything that moves goes through `apply_velocity`.

use bevy::prelude::*;

use crate::constants::*;
use crate::input::PlayerInput;

/// Marker for the player avatar
#[derive(Component)]
pub struct Player;

/// Units per second, applied by `apply_velocity`
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity(pub Vec2);

/// Last non-zero movement direction; projectiles fire along it.
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        // Rooms are entered from the right
        Self(Vec2::NEG_X)
    }
}

/// Marker for entities clamped inside the walkable room area
#[derive(Component)]
pub struct BoundToRoom;

/// Half-extents of the walkable area inside the walls.
pub fn room_bounds() -> Vec2 {
    Vec2::new(
        ROOM_WIDTH / 2.0 - WALL_MARGIN,
        ROOM_HEIGHT / 2.0 - WALL_MARGIN,
    )
}

/// Translate movement input into player velocity and facing.
pub fn apply_player_input(
    input: Res<PlayerInput>,
    mut query: Query<(&mut Velocity, &mut Facing), With<Player>>,
) {
    for (mut velocity, mut facing) in &mut query {
        velocity.0 = input.move_vec * PLAYER_SPEED;
        if input.move_vec != Vec2::ZERO {
            facing.0 = input.move_vec;
        }
    }
}

/// Shared mover for players, obstacles and projectiles.
pub fn apply_velocity(time: Res<Time>, mut query: Query<(&mut Transform, &Velocity)>) {
    // Minimum dt keeps headless ticks deterministic
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    for (mut transform, velocity) in &mut query {
        transform.translation.x += velocity.0.x * dt;
        transform.translation.y += velocity.0.y * dt;
    }
}

/// Keep walkers inside the walls. Projectiles skip this and expire on TTL.
pub fn clamp_to_bounds(mut query: Query<&mut Transform, With<BoundToRoom>>) {
    let bounds = room_bounds();
    for mut transform in &mut query {
        transform.translation.x = transform.translation.x.clamp(-bounds.x, bounds.x);
        transform.translation.y = transform.translation.y.clamp(-bounds.y, bounds.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_holds_last_direction_when_idle() {
        let mut facing = Facing::default();
        assert_eq!(facing.0, Vec2::NEG_X);

        let moving = Vec2::new(0.0, 1.0);
        if moving != Vec2::ZERO {
            facing.0 = moving;
        }
        let idle = Vec2::ZERO;
        if idle != Vec2::ZERO {
            facing.0 = idle;
        }
        assert_eq!(facing.0, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn bounds_sit_inside_the_walls() {
        let b = room_bounds();
        assert!(b.x > 0.0 && b.x < ROOM_WIDTH / 2.0);
        assert!(b.y > 0.0 && b.y < ROOM_HEIGHT / 2.0);
    }
}
