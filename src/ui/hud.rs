//! HUD model and text presentation
//!
//! `HudModel` is a render-free projection of engine state, rebuilt every
//! frame; the Text2d systems below are the only place it turns into pixels.
//! Headless simulation reads the model directly.

use bevy::prelude::*;

use crate::constants::*;
use crate::encounter::{ActiveEncounter, EncounterPhase, LastAnswerFeedback};
use crate::events::EventBus;
use crate::progression::ExitGate;
use crate::questions::QuestionBank;
use crate::rooms::{ActiveRoom, RoomProgress, RunOutcome};
use crate::run_state::RunState;

/// Snapshot of the open encounter for display.
#[derive(Debug, Clone, Default)]
pub struct EncounterView {
    pub npc_name: String,
    pub npc_title: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// Questions completed so far
    pub position: usize,
    pub batch_len: usize,
    /// Derived boss "health" segments
    pub segments_remaining: usize,
    pub accepting: bool,
    pub feedback: Option<String>,
}

/// Everything the HUD shows, rebuilt from engine state each frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct HudModel {
    pub player_name: String,
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
    pub cleared: usize,
    pub room_label: String,
    pub boss_room: bool,
    pub status_line: String,
    pub encounter: Option<EncounterView>,
}

pub fn health_bar(health: u32, max_health: u32) -> String {
    let filled = "#".repeat(health as usize);
    let empty = "-".repeat(max_health.saturating_sub(health) as usize);
    format!("HP [{}{}] {}/{}", filled, empty, health, max_health)
}

pub fn segment_bar(remaining: usize, total: usize) -> String {
    let filled = "#".repeat(remaining);
    let empty = "-".repeat(total.saturating_sub(remaining));
    format!("[{}{}]", filled, empty)
}

/// Rebuild the HUD model. Pure projection; mutates nothing but the model.
#[allow(clippy::too_many_arguments)]
pub fn project_hud(
    run_state: Res<RunState>,
    active: Res<ActiveEncounter>,
    feedback: Res<LastAnswerFeedback>,
    room: Res<ActiveRoom>,
    progress: Res<RoomProgress>,
    gate: Res<ExitGate>,
    outcome: Res<RunOutcome>,
    bank: Res<QuestionBank>,
    bus: Res<EventBus>,
    mut hud: ResMut<HudModel>,
) {
    hud.player_name = run_state.player_name.clone();
    hud.health = run_state.health();
    hud.max_health = run_state.max_health();
    hud.score = run_state.score();
    hud.cleared = run_state.cleared_count();
    hud.room_label = room.0.label.clone();
    hud.boss_room = room.0.kind.is_boss();

    hud.status_line = if let Some(summary) = &outcome.0 {
        if summary.won {
            format!("VICTORY - score {} - press R to run again", summary.score)
        } else {
            format!("DEFEAT - score {} - press R to run again", summary.score)
        }
    } else if !bank.is_available() {
        "Question archive offline - quizzes disabled".to_string()
    } else if progress.entrance_timer > 0.0 {
        format!("Steady... {:.0}s", progress.entrance_timer.ceil())
    } else if gate.unlocked {
        "Exit open - head for the portal".to_string()
    } else {
        format!("{}s elapsed", bus.elapsed_ms() / 1000)
    };

    hud.encounter = active.0.as_ref().map(|session| {
        let question = session.current_question();
        EncounterView {
            npc_name: session.npc_name.clone(),
            npc_title: session.npc_title.clone(),
            prompt: question.map(|q| q.prompt.clone()).unwrap_or_default(),
            options: question.map(|q| q.options.clone()).unwrap_or_default(),
            position: session.position(),
            batch_len: session.batch_len(),
            segments_remaining: session.boss_segments_remaining(),
            accepting: session.accepts_answers(),
            feedback: feedback.0.as_ref().map(|fb| {
                let line = fb.explanation.as_deref().unwrap_or(&fb.flavor_line);
                if fb.correct {
                    format!("Correct! +{}  {}", fb.points, line)
                } else if matches!(session.phase(), EncounterPhase::RetryPermitted) {
                    format!("Wrong, -{} HP. Try again: {}", fb.damage, line)
                } else {
                    format!("Wrong, -{} HP. {}", fb.damage, line)
                }
            }),
        }
    });
}

// =============================================================================
// TEXT PRESENTATION
// =============================================================================

#[derive(Component)]
pub struct StatsText;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct EncounterText;

/// Spawn the fixed HUD text entities.
pub fn setup_hud(mut commands: Commands) {
    let top = ROOM_HEIGHT / 2.0;

    commands.spawn((
        StatsText,
        Text2d::new(""),
        TextFont::from_font_size(22.0),
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(-ROOM_WIDTH / 2.0 + 180.0, top + 30.0, 10.0),
    ));
    commands.spawn((
        StatusText,
        Text2d::new(""),
        TextFont::from_font_size(20.0),
        TextColor(TEXT_ACCENT),
        Transform::from_xyz(ROOM_WIDTH / 2.0 - 220.0, top + 30.0, 10.0),
    ));
    commands.spawn((
        EncounterText,
        Text2d::new(""),
        TextFont::from_font_size(24.0),
        TextColor(TEXT_GOLD),
        Transform::from_xyz(0.0, 0.0, 20.0),
    ));
}

pub fn update_stats_text(hud: Res<HudModel>, mut query: Query<&mut Text2d, With<StatsText>>) {
    for mut text in &mut query {
        text.0 = format!(
            "{}  {}  SCORE {}  CLEARED {}  |  {}",
            hud.player_name,
            health_bar(hud.health, hud.max_health),
            hud.score,
            hud.cleared,
            hud.room_label
        );
    }
}

pub fn update_status_text(hud: Res<HudModel>, mut query: Query<&mut Text2d, With<StatusText>>) {
    for mut text in &mut query {
        text.0 = hud.status_line.clone();
    }
}

/// Render the encounter panel: prompt, numbered options, progress, and the
/// derived boss segment bar in boss rooms.
pub fn update_encounter_text(
    hud: Res<HudModel>,
    mut query: Query<&mut Text2d, With<EncounterText>>,
) {
    for mut text in &mut query {
        let Some(view) = &hud.encounter else {
            text.0.clear();
            continue;
        };

        let mut lines = vec![format!("{}, {}", view.npc_name, view.npc_title)];
        if hud.boss_room {
            lines.push(segment_bar(view.segments_remaining, view.batch_len));
        }
        lines.push(format!(
            "Question {}/{}",
            view.position + 1,
            view.batch_len
        ));
        lines.push(view.prompt.clone());
        for (i, option) in view.options.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, option));
        }
        if let Some(feedback) = &view.feedback {
            lines.push(feedback.clone());
        } else if view.accepting {
            lines.push("Press 1-4 to answer".to_string());
        }
        text.0 = lines.join("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bar_shows_filled_and_empty() {
        assert_eq!(health_bar(3, 5), "HP [###--] 3/5");
        assert_eq!(health_bar(0, 5), "HP [-----] 0/5");
        assert_eq!(health_bar(5, 5), "HP [#####] 5/5");
    }

    #[test]
    fn segment_bar_tracks_batch_progress() {
        assert_eq!(segment_bar(10, 10), "[##########]");
        assert_eq!(segment_bar(4, 10), "[####------]");
        assert_eq!(segment_bar(0, 10), "[----------]");
    }
}
