//! Quizcrawl - an arcade quiz dungeon crawl built with Bevy
//!
//! This crate provides the run/encounter engine, combat systems, and HUD
//! organized into modules. The windowed binary and the headless simulator
//! share the same engine schedule.

// Core modules
pub mod constants;
pub mod events;
pub mod questions;
pub mod run_state;
pub mod sim;

// Game logic modules
pub mod combat;
pub mod encounter;
pub mod input;
pub mod player;
pub mod progression;
pub mod rooms;
pub mod ui;

// Re-export commonly used types for convenience
pub use combat::{FireCooldown, HealthPickup, HitPoints, Obstacle, Patrol, Projectile, Stun};
pub use constants::*;
pub use encounter::{
    ActiveEncounter, AnswerFeedback, EncounterMode, EncounterOutcome, EncounterPhase,
    EncounterSession, GameTick, LastAnswerFeedback, StartOutcome, StartRejection, advance_tick,
    encounter_active, no_encounter_active, try_start_encounter,
};
pub use events::{
    AudioCue, BusEvent, DamageSource, EventBus, GameEvent, RunLogConfig, RunLogger,
    flush_event_bus, update_event_bus_time,
};
pub use input::PlayerInput;
pub use player::{BoundToRoom, Facing, Player, Velocity, room_bounds};
pub use progression::{ExitGate, evaluate_exit_gate, exit_unlocked, gate_satisfied};
pub use questions::{NpcProfile, Question, QuestionBank, VoiceHint};
pub use rooms::{
    ActiveRoom, CurrentRoom, ExitPortal, NpcStation, RoomDatabase, RoomDef, RoomEntity, RoomKind,
    RoomProgress, RunOutcome, RunSummary, entrance_done, finish_run, run_live, run_over,
};
pub use run_state::{DamageOutcome, RunState};
pub use sim::{HeadlessAppBuilder, add_engine_systems, insert_engine_resources, sample_bank};
pub use ui::{EncounterView, HudModel};
