//! Shared run state - the single mutable record for one playthrough
//!
//! Health, score, cleared NPCs, and per-NPC question cursors live here.
//! Every other module reads this resource but mutates it only through the
//! named methods below, so the health/score invariants stay in one place.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::constants::*;

/// Result of routing damage through the run state.
///
/// `AlreadyDead` is the short-circuit that keeps death from being processed
/// twice: once health hits zero, every later damage call is a no-op and both
/// the quiz path and the combat path see the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Damage applied, player still alive
    Survived { remaining: u32 },
    /// This damage event reduced health to exactly zero
    Died,
    /// Health was already zero; nothing was applied
    AlreadyDead,
}

/// The single shared run state, lifetime = one playthrough.
#[derive(Resource, Clone, Debug)]
pub struct RunState {
    health: u32,
    max_health: u32,
    score: u32,
    cleared: HashSet<String>,
    question_cursor: HashMap<String, usize>,
    /// Display name for the HUD greeting (presentation only)
    pub player_name: String,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEALTH)
    }
}

impl RunState {
    pub fn new(max_health: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            health: max_health,
            max_health,
            score: 0,
            cleared: HashSet::new(),
            question_cursor: HashMap::new(),
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Apply damage through the single death-check pathway.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.health == 0 {
            return DamageOutcome::AlreadyDead;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            DamageOutcome::Died
        } else {
            DamageOutcome::Survived {
                remaining: self.health,
            }
        }
    }

    /// Heal up to max health. Has no effect on a dead run.
    pub fn heal(&mut self, amount: u32) {
        if self.health == 0 {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub fn mark_cleared(&mut self, npc_id: &str) {
        self.cleared.insert(npc_id.to_string());
    }

    pub fn is_cleared(&self, npc_id: &str) -> bool {
        self.cleared.contains(npc_id)
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared.len()
    }

    /// Index of the next unseen question for this NPC.
    /// Persists across repeated encounter attempts within the run.
    pub fn question_cursor(&self, npc_id: &str) -> usize {
        self.question_cursor.get(npc_id).copied().unwrap_or(0)
    }

    pub fn advance_question_cursor(&mut self, npc_id: &str, by: usize) {
        *self.question_cursor.entry(npc_id.to_string()).or_insert(0) += by;
    }

    /// Reset for a fresh playthrough (restart after game over).
    pub fn reset(&mut self) {
        self.health = self.max_health;
        self.score = 0;
        self.cleared.clear();
        self.question_cursor.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_stops_at_zero_and_never_double_dies() {
        let mut rs = RunState::new(2);
        assert_eq!(
            rs.apply_damage(1),
            DamageOutcome::Survived { remaining: 1 }
        );
        assert_eq!(rs.apply_damage(1), DamageOutcome::Died);
        assert_eq!(rs.health(), 0);
        // Further damage is a no-op, not a second death
        assert_eq!(rs.apply_damage(1), DamageOutcome::AlreadyDead);
        assert_eq!(rs.health(), 0);
    }

    #[test]
    fn oversized_damage_saturates() {
        let mut rs = RunState::new(3);
        assert_eq!(rs.apply_damage(10), DamageOutcome::Died);
        assert_eq!(rs.health(), 0);
    }

    #[test]
    fn heal_caps_at_max_and_skips_the_dead() {
        let mut rs = RunState::new(5);
        rs.heal(3);
        assert_eq!(rs.health(), 5);
        rs.apply_damage(2);
        rs.heal(1);
        assert_eq!(rs.health(), 4);
        rs.apply_damage(10);
        rs.heal(1);
        assert_eq!(rs.health(), 0);
    }

    #[test]
    fn cursor_persists_and_accumulates() {
        let mut rs = RunState::default();
        assert_eq!(rs.question_cursor("warden"), 0);
        rs.advance_question_cursor("warden", 5);
        rs.advance_question_cursor("warden", 3);
        assert_eq!(rs.question_cursor("warden"), 8);
        assert_eq!(rs.question_cursor("archivist"), 0);
    }

    #[test]
    fn reset_clears_everything_but_max_health() {
        let mut rs = RunState::new(4);
        rs.add_score(250);
        rs.mark_cleared("warden");
        rs.advance_question_cursor("warden", 5);
        rs.apply_damage(2);
        rs.reset();
        assert_eq!(rs.health(), 4);
        assert_eq!(rs.score(), 0);
        assert_eq!(rs.cleared_count(), 0);
        assert_eq!(rs.question_cursor("warden"), 0);
    }
}
