//! Combat entity components

use bevy::prelude::*;

/// Marker for a hostile obstacle
#[derive(Component)]
pub struct Obstacle;

/// Remaining hit points; despawned at zero
#[derive(Component, Debug)]
pub struct HitPoints(pub i32);

/// Horizontal patrol lane with a current direction sign
#[derive(Component, Debug)]
pub struct Patrol {
    pub min_x: f32,
    pub max_x: f32,
    pub dir: f32,
}

/// Remaining stun seconds. A stunned obstacle is immobile, deals no contact
/// damage, and lets projectiles pass through it.
#[derive(Component, Default, Debug)]
pub struct Stun(pub f32);

impl Stun {
    pub fn is_stunned(&self) -> bool {
        self.0 > 0.0
    }

    pub fn apply(&mut self, secs: f32) {
        self.0 = secs;
    }
}

/// Player projectile with a hard lifetime
#[derive(Component, Debug)]
pub struct Projectile {
    pub ttl: f32,
}

/// Dropped heal item; expires untouched after its TTL
#[derive(Component, Debug)]
pub struct HealthPickup {
    pub ttl: f32,
}

/// Seconds until the player may fire again
#[derive(Resource, Default, Debug)]
pub struct FireCooldown(pub f32);
