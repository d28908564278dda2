//! Tunable constants for quizcrawl
//!
//! All gameplay values are defined here for easy tweaking.

use bevy::prelude::*;

// =============================================================================
// TEXT/UI COLORS
// =============================================================================

pub const TEXT_PRIMARY: Color = Color::srgb(0.88, 0.88, 0.88); // Soft white
pub const TEXT_ACCENT: Color = Color::srgb(0.0, 0.9, 1.0); // Console cyan
pub const TEXT_GOLD: Color = Color::srgb(1.0, 0.84, 0.0); // Score gold

// =============================================================================
// ROOM DIMENSIONS
// =============================================================================

pub const ROOM_WIDTH: f32 = 960.0;
pub const ROOM_HEIGHT: f32 = 640.0;
pub const WALL_MARGIN: f32 = 80.0; // Top/bottom wall thickness

// =============================================================================
// SIZE CONSTANTS
// =============================================================================

pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 50.0);
pub const OBSTACLE_SIZE: Vec2 = Vec2::new(36.0, 48.0);
pub const PROJECTILE_SIZE: Vec2 = Vec2::new(18.0, 8.0);
pub const PICKUP_SIZE: Vec2 = Vec2::new(22.0, 22.0);

// =============================================================================
// PLAYER MOVEMENT & FIRING
// =============================================================================

pub const PLAYER_SPEED: f32 = 200.0;
pub const FIRE_COOLDOWN: f32 = 0.5; // Seconds between projectiles
pub const PROJECTILE_TTL: f32 = 1.5; // Seconds before a projectile expires
pub const STICK_DEADZONE: f32 = 0.3; // Analog stick deadzone

// =============================================================================
// COMBAT
// =============================================================================

pub const CONTACT_DAMAGE: u32 = 1; // Damage per un-stunned obstacle contact
pub const PICKUP_HEAL: u32 = 1; // Health restored per pickup
pub const PICKUP_TTL: f32 = 10.0; // Seconds before an untouched pickup expires
pub const CONTACT_RADIUS: f32 = 44.0; // Player-obstacle overlap distance
pub const HIT_RADIUS: f32 = 34.0; // Projectile-obstacle overlap distance
pub const PICKUP_RADIUS: f32 = 40.0; // Player-pickup overlap distance

// =============================================================================
// NPC INTERACTION
// =============================================================================

pub const INTERACT_RADIUS: f32 = 180.0; // How close to consult an NPC
pub const EXIT_RADIUS: f32 = 80.0; // How close to the portal to leave a room

// =============================================================================
// QUIZ SCORING
// =============================================================================

pub const FIRST_TRY_POINTS: u32 = 100; // Correct on first attempt
pub const RETRY_POINTS: u32 = 50; // Correct after at least one wrong try
pub const WRONG_ANSWER_DAMAGE: u32 = 1;

// =============================================================================
// FEEDBACK PAUSES (logical ticks at TICK_RATE)
// =============================================================================

pub const TICK_RATE: f64 = 60.0; // FixedUpdate ticks per second
pub const CORRECT_FEEDBACK_TICKS: u64 = 132; // ~2.2 s before advancing
pub const RETRY_FEEDBACK_TICKS: u64 = 120; // ~2.0 s before re-enabling the question

// =============================================================================
// DEFAULT RUN PARAMETERS
// =============================================================================

pub const DEFAULT_MAX_HEALTH: u32 = 5;
pub const DEFAULT_PLAYER_NAME: &str = "Resident";

// =============================================================================
// DATA FILES
// =============================================================================

pub const QUESTIONS_FILE: &str = "assets/questions.json";
pub const ROOMS_FILE: &str = "assets/rooms.json";
