//! Quiz encounter module
//!
//! `session` holds the pure state machine; this module wires it into the
//! ECS: the logical tick counter, the single active-session slot, the
//! answer-input resolver, and the feedback-pause driver.

mod session;

pub use session::{
    AnswerFeedback, EncounterMode, EncounterOutcome, EncounterPhase, EncounterSession,
    FeedbackStep, StartOutcome, StartRejection,
};

use bevy::prelude::*;

use crate::events::{AudioCue, DamageSource, EventBus, GameEvent};
use crate::input::PlayerInput;
use crate::questions::QuestionBank;
use crate::rooms::{RunOutcome, finish_run};
use crate::run_state::RunState;

/// Logical tick counter. Feedback pauses key off this instead of wall-clock
/// time, so headless simulation stays deterministic.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct GameTick(pub u64);

pub fn advance_tick(mut tick: ResMut<GameTick>) {
    tick.0 += 1;
}

/// The single active-session slot. At most one encounter runs at a time;
/// combat systems gate on this being empty.
#[derive(Resource, Default)]
pub struct ActiveEncounter(pub Option<EncounterSession>);

/// Last answer feedback, retained for the HUD through the feedback pause.
#[derive(Resource, Default)]
pub struct LastAnswerFeedback(pub Option<AnswerFeedback>);

/// Run condition: an encounter is in progress (combat paused).
pub fn encounter_active(active: Res<ActiveEncounter>) -> bool {
    active.0.is_some()
}

/// Run condition: no encounter in progress (combat live).
pub fn no_encounter_active(active: Res<ActiveEncounter>) -> bool {
    active.0.is_none()
}

/// Attempt to start an encounter against `npc_id`. Returns true when the
/// attempt changed state (session started or NPC auto-cleared).
pub fn try_start_encounter(
    bank: &QuestionBank,
    run_state: &mut RunState,
    active: &mut ActiveEncounter,
    bus: &mut EventBus,
    npc_id: &str,
    mode: EncounterMode,
) -> bool {
    if active.0.is_some() {
        return false;
    }
    match EncounterSession::begin(bank, run_state, npc_id, mode) {
        StartOutcome::Started(session) => {
            info!(
                "Encounter started: {} ({}, {} questions)",
                npc_id,
                mode.label(),
                session.batch_len()
            );
            bus.emit(GameEvent::EncounterStart {
                npc: npc_id.to_string(),
                mode: mode.label().to_string(),
                batch_len: session.batch_len(),
            });
            active.0 = Some(session);
            true
        }
        StartOutcome::AutoCleared => {
            info!("Encounter auto-cleared: {} has no questions left", npc_id);
            bus.emit(GameEvent::EncounterAutoCleared {
                npc: npc_id.to_string(),
            });
            true
        }
        StartOutcome::Rejected(reason) => {
            debug!("Encounter rejected for {}: {:?}", npc_id, reason);
            false
        }
    }
}

/// Consume a buffered answer selection and feed it to the active session.
///
/// Death terminates the session in the same tick: the slot empties, the run
/// ends, and the pending clear transition (if any) never fires.
pub fn resolve_answer_input(
    mut input: ResMut<PlayerInput>,
    mut active: ResMut<ActiveEncounter>,
    mut run_state: ResMut<RunState>,
    mut last_feedback: ResMut<LastAnswerFeedback>,
    mut bus: ResMut<EventBus>,
    mut outcome: ResMut<RunOutcome>,
    tick: Res<GameTick>,
) {
    let Some(selected) = input.take_answer() else {
        return;
    };
    let Some(session) = active.0.as_mut() else {
        return;
    };
    let Some(feedback) = session.submit_answer(&mut run_state, selected, tick.0) else {
        return;
    };

    bus.emit(GameEvent::AnswerResolved {
        npc: session.npc_id().to_string(),
        correct: feedback.correct,
        points: feedback.points,
        damage: feedback.damage,
    });
    bus.emit(GameEvent::Cue(if feedback.correct {
        AudioCue::Correct
    } else {
        AudioCue::Incorrect
    }));
    if feedback.damage > 0 {
        bus.emit(GameEvent::DamageTaken {
            source: DamageSource::Quiz,
            remaining: run_state.health(),
        });
    }

    let died = feedback.terminal == Some(EncounterOutcome::PlayerDied);
    let npc = session.npc_id().to_string();
    last_feedback.0 = Some(feedback);

    if died {
        bus.emit(GameEvent::EncounterEnd {
            npc,
            cleared: false,
        });
        active.0 = None;
        finish_run(&mut outcome, &run_state, &mut bus, false);
    }
}

/// Drive feedback pauses from the tick counter; finalize cleared sessions.
pub fn tick_encounter_feedback(
    mut active: ResMut<ActiveEncounter>,
    mut run_state: ResMut<RunState>,
    mut last_feedback: ResMut<LastAnswerFeedback>,
    mut bus: ResMut<EventBus>,
    mut outcome: ResMut<RunOutcome>,
    tick: Res<GameTick>,
) {
    let Some(session) = active.0.as_mut() else {
        return;
    };
    let was_paused = !session.accepts_answers() && !session.is_terminal();

    match session.advance(tick.0) {
        Some(EncounterOutcome::Cleared) => {
            session.finalize_cleared(&mut run_state);
            let npc = session.npc_id().to_string();
            info!(
                "Encounter cleared: {} (score now {})",
                npc,
                run_state.score()
            );
            bus.emit(GameEvent::EncounterEnd { npc, cleared: true });
            active.0 = None;
            last_feedback.0 = None;
        }
        Some(EncounterOutcome::PlayerDied) => {
            let npc = session.npc_id().to_string();
            bus.emit(GameEvent::EncounterEnd {
                npc,
                cleared: false,
            });
            active.0 = None;
            finish_run(&mut outcome, &run_state, &mut bus, false);
        }
        None => {
            // Pause elapsed into a new prompt: drop the stale feedback line
            if was_paused && session.accepts_answers() {
                last_feedback.0 = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{NpcProfile, Question, VoiceHint};

    fn bank() -> QuestionBank {
        QuestionBank::from_npcs(vec![NpcProfile {
            id: "npc".into(),
            name: "NPC".into(),
            title: "Examiner".into(),
            line_correct: "Good.".into(),
            line_wrong: "No.".into(),
            voice: VoiceHint::default(),
            questions: vec![Question {
                prompt: "p".into(),
                options: vec!["a".into(), "b".into()],
                correct: 0,
                explanation: None,
            }],
        }])
    }

    #[test]
    fn start_is_refused_while_a_session_is_active() {
        let bank = bank();
        let mut rs = RunState::new(5);
        let mut active = ActiveEncounter::default();
        let mut bus = EventBus::new();

        assert!(try_start_encounter(
            &bank,
            &mut rs,
            &mut active,
            &mut bus,
            "npc",
            EncounterMode::Normal
        ));
        assert!(active.0.is_some());
        // Second start against any NPC is a no-op while the slot is full
        assert!(!try_start_encounter(
            &bank,
            &mut rs,
            &mut active,
            &mut bus,
            "other",
            EncounterMode::Normal
        ));
    }

    #[test]
    fn auto_clear_emits_its_own_event_and_leaves_the_slot_empty() {
        let bank = bank();
        let mut rs = RunState::new(5);
        rs.advance_question_cursor("npc", 1);
        let mut active = ActiveEncounter::default();
        let mut bus = EventBus::new();

        assert!(try_start_encounter(
            &bank,
            &mut rs,
            &mut active,
            &mut bus,
            "npc",
            EncounterMode::Normal
        ));
        assert!(active.0.is_none());
        assert!(rs.is_cleared("npc"));
        assert!(
            bus.peek()
                .iter()
                .any(|e| matches!(e.event, GameEvent::EncounterAutoCleared { .. }))
        );
    }
}
