//! Event type definitions for the run log and cross-module signals

use serde::{Deserialize, Serialize};

/// Discrete audio/voice notifications for the external audio layer.
/// Emission is fire-and-forget; the engine never waits on playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Correct,
    Incorrect,
    BossIntro,
    Victory,
    Defeat,
}

/// Which pathway dealt damage to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// Wrong answer during a quiz encounter
    Quiz,
    /// Un-stunned obstacle contact
    Contact,
}

/// All engine events that can be emitted and logged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    // === Run Events ===
    /// Run started (once per playthrough)
    RunStart {
        run_id: String, // UUID v4
        max_health: u32,
    },
    /// Run ended, either by winning the final room or by dying anywhere
    RunEnd {
        won: bool,
        score: u32,
        cleared: usize,
    },

    // === Room Events ===
    RoomEnter { room: String },
    /// Exit predicate satisfied (sticky; emitted once per room)
    GateUnlocked { room: String },

    // === Encounter Events ===
    EncounterStart {
        npc: String,
        mode: String,
        batch_len: usize,
    },
    /// Exhausted NPC auto-cleared without presenting a question
    EncounterAutoCleared { npc: String },
    AnswerResolved {
        npc: String,
        correct: bool,
        points: u32,
        damage: u32,
    },
    EncounterEnd { npc: String, cleared: bool },

    // === Combat Events ===
    DamageTaken {
        source: DamageSource,
        remaining: u32,
    },
    ObstacleHit { remaining_hp: i32 },
    ObstacleDefeated { score: u32 },
    PickupHeal { health: u32 },

    // === Presentation Cues ===
    Cue(AudioCue),
}

impl GameEvent {
    /// Get the event type code for compact log lines
    pub fn type_code(&self) -> &'static str {
        match self {
            GameEvent::RunStart { .. } => "RS",
            GameEvent::RunEnd { .. } => "RE",
            GameEvent::RoomEnter { .. } => "RM",
            GameEvent::GateUnlocked { .. } => "GU",
            GameEvent::EncounterStart { .. } => "ES",
            GameEvent::EncounterAutoCleared { .. } => "EA",
            GameEvent::AnswerResolved { .. } => "AR",
            GameEvent::EncounterEnd { .. } => "EE",
            GameEvent::DamageTaken { .. } => "DT",
            GameEvent::ObstacleHit { .. } => "OH",
            GameEvent::ObstacleDefeated { .. } => "OD",
            GameEvent::PickupHeal { .. } => "PH",
            GameEvent::Cue(_) => "CU",
        }
    }
}
