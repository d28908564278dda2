//! Encounter session - one quiz interaction from start to a terminal outcome
//!
//! Pure state-machine logic, independent of the ECS. Feedback pauses are
//! explicit transient states keyed to the logical tick counter, so the whole
//! machine is deterministic and testable without wall-clock waits.

use crate::constants::*;
use crate::questions::{Question, QuestionBank, VoiceHint};
use crate::run_state::{DamageOutcome, RunState};

/// Encounter mode - controls batch size; rooms attach their own
/// damage/reward multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterMode {
    Normal,
    Elevated,
    Climactic,
}

impl EncounterMode {
    /// Nominal batch size; the real batch is the min with remaining questions.
    pub fn batch_size(self) -> usize {
        match self {
            EncounterMode::Normal => 5,
            EncounterMode::Elevated | EncounterMode::Climactic => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EncounterMode::Normal => "normal",
            EncounterMode::Elevated => "elevated",
            EncounterMode::Climactic => "climactic",
        }
    }
}

/// Terminal outcome of an encounter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    Cleared,
    PlayerDied,
}

/// What happens when a feedback pause elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStep {
    NextQuestion,
    Retry,
    Finish(EncounterOutcome),
}

/// Phase of the encounter state machine.
///
/// `QuestionPresented` and `RetryPermitted` both accept answer submissions;
/// `ShowingFeedback` accepts nothing until its deadline tick passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterPhase {
    QuestionPresented,
    RetryPermitted,
    ShowingFeedback { until_tick: u64, then: FeedbackStep },
    Terminal(EncounterOutcome),
}

/// Feedback signal returned to the caller on every submission.
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub points: u32,
    pub damage: u32,
    pub explanation: Option<String>,
    /// NPC flavor line matching the result, for the TTS layer
    pub flavor_line: String,
    pub voice: VoiceHint,
    /// Set when this submission terminated the session
    pub terminal: Option<EncounterOutcome>,
}

/// Why an encounter could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    AlreadyCleared,
    BankUnavailable,
}

/// Result of attempting to start an encounter.
#[derive(Debug)]
pub enum StartOutcome {
    Started(EncounterSession),
    /// All questions already exhausted - cleared with no score and no session
    AutoCleared,
    Rejected(StartRejection),
}

/// Ephemeral state for one quiz encounter. Created per encounter, dropped on
/// a terminal outcome or on room teardown.
#[derive(Debug, Clone)]
pub struct EncounterSession {
    npc_id: String,
    pub npc_name: String,
    pub npc_title: String,
    line_correct: String,
    line_wrong: String,
    voice: VoiceHint,
    mode: EncounterMode,
    batch: Vec<Question>,
    position: usize,
    first_attempt: bool,
    phase: EncounterPhase,
}

impl EncounterSession {
    /// Start an encounter against `npc_id`.
    ///
    /// Re-checks the cleared set and bank availability even when the caller
    /// already has; an NPC with zero remaining questions auto-clears
    /// immediately (no score, no session). The no-other-session-active
    /// precondition is enforced by the caller, which owns the slot.
    pub fn begin(
        bank: &QuestionBank,
        run_state: &mut RunState,
        npc_id: &str,
        mode: EncounterMode,
    ) -> StartOutcome {
        if run_state.is_cleared(npc_id) {
            return StartOutcome::Rejected(StartRejection::AlreadyCleared);
        }
        if !bank.is_available() {
            return StartOutcome::Rejected(StartRejection::BankUnavailable);
        }

        let cursor = run_state.question_cursor(npc_id);
        let total = bank.question_count(npc_id);
        let remaining = total.saturating_sub(cursor);
        if remaining == 0 {
            // Exhausted (or missing from the bank entirely): indistinguishable
            // in effect from a normal clear, except it awards nothing.
            run_state.mark_cleared(npc_id);
            return StartOutcome::AutoCleared;
        }

        // remaining > 0 implies the profile exists; a miss still falls back
        // to the exhausted rule.
        let Some(profile) = bank.get(npc_id) else {
            run_state.mark_cleared(npc_id);
            return StartOutcome::AutoCleared;
        };

        let take = mode.batch_size().min(remaining);
        let batch = profile.questions[cursor..cursor + take].to_vec();

        StartOutcome::Started(Self {
            npc_id: npc_id.to_string(),
            npc_name: profile.name.clone(),
            npc_title: profile.title.clone(),
            line_correct: profile.line_correct.clone(),
            line_wrong: profile.line_wrong.clone(),
            voice: profile.voice,
            mode,
            batch,
            position: 0,
            first_attempt: true,
            phase: EncounterPhase::QuestionPresented,
        })
    }

    pub fn npc_id(&self) -> &str {
        &self.npc_id
    }

    pub fn mode(&self) -> EncounterMode {
        self.mode
    }

    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Zero-based position in the batch (questions completed so far).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.batch.get(self.position)
    }

    /// Boss "health segments" remaining. Purely a derived, presentational
    /// view of batch progress - not separate truth.
    pub fn boss_segments_remaining(&self) -> usize {
        self.batch.len() - self.position
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, EncounterPhase::Terminal(_))
    }

    /// Whether a submission would currently be accepted.
    pub fn accepts_answers(&self) -> bool {
        matches!(
            self.phase,
            EncounterPhase::QuestionPresented | EncounterPhase::RetryPermitted
        )
    }

    /// Submit an answer for the current question.
    ///
    /// Returns `None` when the session is not accepting input (feedback pause
    /// or terminal state) or the option index is out of range - stale UI
    /// input is a no-op, never an error.
    pub fn submit_answer(
        &mut self,
        run_state: &mut RunState,
        selected: usize,
        now_tick: u64,
    ) -> Option<AnswerFeedback> {
        if !self.accepts_answers() {
            return None;
        }
        let question = self.batch.get(self.position)?;
        if selected >= question.options.len() {
            return None;
        }

        if selected == question.correct {
            let points = if self.first_attempt {
                FIRST_TRY_POINTS
            } else {
                RETRY_POINTS
            };
            run_state.add_score(points);

            let last = self.position + 1 >= self.batch.len();
            let then = if last {
                FeedbackStep::Finish(EncounterOutcome::Cleared)
            } else {
                FeedbackStep::NextQuestion
            };
            self.phase = EncounterPhase::ShowingFeedback {
                until_tick: now_tick + CORRECT_FEEDBACK_TICKS,
                then,
            };
            Some(AnswerFeedback {
                correct: true,
                points,
                damage: 0,
                explanation: question.explanation.clone(),
                flavor_line: self.line_correct.clone(),
                voice: self.voice,
                terminal: last.then_some(EncounterOutcome::Cleared),
            })
        } else {
            self.first_attempt = false;
            let explanation = question.explanation.clone();
            let outcome = run_state.apply_damage(WRONG_ANSWER_DAMAGE);
            match outcome {
                DamageOutcome::Died | DamageOutcome::AlreadyDead => {
                    // Death terminates synchronously - no further question
                    // access, preempting any pending transition.
                    self.phase = EncounterPhase::Terminal(EncounterOutcome::PlayerDied);
                    Some(AnswerFeedback {
                        correct: false,
                        points: 0,
                        damage: WRONG_ANSWER_DAMAGE,
                        explanation,
                        flavor_line: self.line_wrong.clone(),
                        voice: self.voice,
                        terminal: Some(EncounterOutcome::PlayerDied),
                    })
                }
                DamageOutcome::Survived { .. } => {
                    self.phase = EncounterPhase::ShowingFeedback {
                        until_tick: now_tick + RETRY_FEEDBACK_TICKS,
                        then: FeedbackStep::Retry,
                    };
                    Some(AnswerFeedback {
                        correct: false,
                        points: 0,
                        damage: WRONG_ANSWER_DAMAGE,
                        explanation,
                        flavor_line: self.line_wrong.clone(),
                        voice: self.voice,
                        terminal: None,
                    })
                }
            }
        }
    }

    /// Drive feedback pauses from the tick loop. Returns the terminal
    /// outcome when a `Finish` step lands, so the caller can finalize.
    pub fn advance(&mut self, now_tick: u64) -> Option<EncounterOutcome> {
        let EncounterPhase::ShowingFeedback { until_tick, then } = self.phase else {
            return None;
        };
        if now_tick < until_tick {
            return None;
        }
        match then {
            FeedbackStep::NextQuestion => {
                self.position += 1;
                self.first_attempt = true;
                self.phase = EncounterPhase::QuestionPresented;
                None
            }
            FeedbackStep::Retry => {
                self.phase = EncounterPhase::RetryPermitted;
                None
            }
            FeedbackStep::Finish(outcome) => {
                // The last question is done; derived batch progress hits zero.
                self.position = self.batch.len();
                self.phase = EncounterPhase::Terminal(outcome);
                Some(outcome)
            }
        }
    }

    /// Apply the cleared-session effects to the run state: the NPC joins the
    /// cleared set and its cursor advances past this batch.
    pub fn finalize_cleared(&self, run_state: &mut RunState) {
        run_state.mark_cleared(&self.npc_id);
        run_state.advance_question_cursor(&self.npc_id, self.batch.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::NpcProfile;

    fn question(correct: usize) -> Question {
        Question {
            prompt: "prompt".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            explanation: Some("because".into()),
        }
    }

    fn bank_with(id: &str, count: usize) -> QuestionBank {
        QuestionBank::from_npcs(vec![NpcProfile {
            id: id.into(),
            name: "Test NPC".into(),
            title: "Examiner".into(),
            line_correct: "Good.".into(),
            line_wrong: "No.".into(),
            voice: VoiceHint::default(),
            questions: (0..count).map(|i| question(i % 4)).collect(),
        }])
    }

    fn start(bank: &QuestionBank, rs: &mut RunState, mode: EncounterMode) -> EncounterSession {
        match EncounterSession::begin(bank, rs, "npc", mode) {
            StartOutcome::Started(s) => s,
            other => panic!("expected session, got {other:?}"),
        }
    }

    /// Answer the current question correctly and ride out the feedback pause.
    fn answer_correct(s: &mut EncounterSession, rs: &mut RunState, tick: &mut u64) {
        let q = s.current_question().expect("question present").clone();
        let fb = s.submit_answer(rs, q.correct, *tick).expect("accepted");
        assert!(fb.correct);
        *tick += CORRECT_FEEDBACK_TICKS;
        s.advance(*tick);
    }

    #[test]
    fn all_first_try_correct_scores_100_per_question() {
        let bank = bank_with("npc", 5);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Normal);
        let mut tick = 0;
        for _ in 0..5 {
            answer_correct(&mut s, &mut rs, &mut tick);
        }
        assert!(s.is_terminal());
        assert_eq!(rs.score(), 500);
        assert_eq!(rs.health(), 5); // no damage, no retries
    }

    #[test]
    fn scenario_450_points_with_one_retry() {
        let bank = bank_with("npc", 5);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Normal);
        let mut tick = 0;

        // Q1 correct first try (+100)
        answer_correct(&mut s, &mut rs, &mut tick);

        // Q2 incorrect, then correct (+50)
        let correct = s.current_question().unwrap().correct;
        let wrong = (correct + 1) % 4;
        let fb = s.submit_answer(&mut rs, wrong, tick).unwrap();
        assert!(!fb.correct);
        assert_eq!(fb.damage, 1);
        tick += RETRY_FEEDBACK_TICKS;
        s.advance(tick);
        assert_eq!(s.phase(), EncounterPhase::RetryPermitted);
        answer_correct(&mut s, &mut rs, &mut tick);

        // Q3-Q5 correct first try (+300)
        for _ in 0..3 {
            answer_correct(&mut s, &mut rs, &mut tick);
        }

        assert!(s.is_terminal());
        assert_eq!(rs.score(), 450);
        assert_eq!(rs.health(), 4);

        s.finalize_cleared(&mut rs);
        assert!(rs.is_cleared("npc"));
        assert_eq!(rs.question_cursor("npc"), 5);
    }

    #[test]
    fn max_health_wrong_answers_kill_exactly_on_the_last() {
        let bank = bank_with("npc", 5);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Normal);
        let mut tick = 0;
        let correct = s.current_question().unwrap().correct;
        let wrong = (correct + 1) % 4;

        for i in 1..=5u32 {
            let fb = s.submit_answer(&mut rs, wrong, tick).expect("accepted");
            assert!(!fb.correct);
            assert_eq!(rs.health(), 5 - i);
            if i < 5 {
                assert_eq!(fb.terminal, None);
                tick += RETRY_FEEDBACK_TICKS;
                s.advance(tick);
            } else {
                assert_eq!(fb.terminal, Some(EncounterOutcome::PlayerDied));
            }
        }

        assert_eq!(rs.health(), 0);
        assert!(s.is_terminal());
        // Further submissions are rejected outright
        assert!(s.submit_answer(&mut rs, wrong, tick).is_none());
        assert_eq!(rs.health(), 0);
    }

    #[test]
    fn feedback_pause_rejects_input_until_deadline() {
        let bank = bank_with("npc", 2);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Normal);
        let correct = s.current_question().unwrap().correct;

        s.submit_answer(&mut rs, correct, 10).unwrap();
        // Mid-pause: no input accepted, no phase change
        assert!(s.submit_answer(&mut rs, correct, 20).is_none());
        assert!(s.advance(10 + CORRECT_FEEDBACK_TICKS - 1).is_none());
        assert!(!s.accepts_answers());
        // Deadline reached: next question presented
        s.advance(10 + CORRECT_FEEDBACK_TICKS);
        assert_eq!(s.phase(), EncounterPhase::QuestionPresented);
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn exhausted_npc_auto_clears_idempotently() {
        let bank = bank_with("npc", 5);
        let mut rs = RunState::new(5);
        rs.advance_question_cursor("npc", 5);

        for _ in 0..3 {
            // AutoCleared the first time, AlreadyCleared rejections after
            match EncounterSession::begin(&bank, &mut rs, "npc", EncounterMode::Normal) {
                StartOutcome::AutoCleared => {}
                StartOutcome::Rejected(StartRejection::AlreadyCleared) => {}
                other => panic!("unexpected: {other:?}"),
            }
            assert!(rs.is_cleared("npc"));
            assert_eq!(rs.score(), 0);
        }
    }

    #[test]
    fn missing_npc_is_treated_as_exhausted() {
        let bank = bank_with("npc", 3);
        let mut rs = RunState::new(5);
        match EncounterSession::begin(&bank, &mut rs, "ghost", EncounterMode::Normal) {
            StartOutcome::AutoCleared => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert!(rs.is_cleared("ghost"));
    }

    #[test]
    fn unavailable_bank_rejects_start() {
        let bank = QuestionBank::unavailable();
        let mut rs = RunState::new(5);
        match EncounterSession::begin(&bank, &mut rs, "npc", EncounterMode::Normal) {
            StartOutcome::Rejected(StartRejection::BankUnavailable) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!rs.is_cleared("npc"));
    }

    #[test]
    fn batch_is_min_of_mode_size_and_remaining() {
        let bank = bank_with("npc", 7);
        let mut rs = RunState::new(5);
        let s = start(&bank, &mut rs, EncounterMode::Normal);
        assert_eq!(s.batch_len(), 5);
        drop(s);

        // Second attempt sees only the 2 remaining questions
        rs.advance_question_cursor("npc", 5);
        let s = start(&bank, &mut rs, EncounterMode::Normal);
        assert_eq!(s.batch_len(), 2);

        // Elevated mode takes up to 10
        let mut rs2 = RunState::new(5);
        let s2 = start(&bank, &mut rs2, EncounterMode::Elevated);
        assert_eq!(s2.batch_len(), 7);
    }

    #[test]
    fn boss_segments_derive_from_batch_progress() {
        let bank = bank_with("npc", 3);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Elevated);
        let mut tick = 0;
        assert_eq!(s.boss_segments_remaining(), 3);
        answer_correct(&mut s, &mut rs, &mut tick);
        assert_eq!(s.boss_segments_remaining(), 2);
        answer_correct(&mut s, &mut rs, &mut tick);
        assert_eq!(s.boss_segments_remaining(), 1);
        answer_correct(&mut s, &mut rs, &mut tick);
        assert_eq!(s.boss_segments_remaining(), 0);
        assert!(s.is_terminal());
    }

    #[test]
    fn out_of_range_option_is_a_no_op() {
        let bank = bank_with("npc", 1);
        let mut rs = RunState::new(5);
        let mut s = start(&bank, &mut rs, EncounterMode::Normal);
        assert!(s.submit_answer(&mut rs, 99, 0).is_none());
        assert_eq!(rs.health(), 5);
        assert!(s.accepts_answers());
    }
}
