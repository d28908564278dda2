//! Question bank - loading and storage
//!
//! The bank is loaded once per run from a JSON document keyed by NPC id.
//! A load failure degrades to an unavailable bank (quiz encounters cannot
//! start) rather than crashing; malformed questions are dropped at parse
//! time with a warning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;

/// One multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// A question needs at least two options and an in-range answer index.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() >= 2 && self.correct < self.options.len()
    }
}

/// Voice hints for the external TTS layer (consumed fire-and-forget).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VoiceHint {
    #[serde(default = "default_voice_scale")]
    pub rate: f32,
    #[serde(default = "default_voice_scale")]
    pub pitch: f32,
}

fn default_voice_scale() -> f32 {
    1.0
}

impl Default for VoiceHint {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// One quiz-administering NPC: display metadata plus its ordered questions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Flavor line spoken on a correct answer
    pub line_correct: String,
    /// Flavor line spoken on a wrong answer
    pub line_wrong: String,
    #[serde(default)]
    pub voice: VoiceHint,
    pub questions: Vec<Question>,
}

/// Top-level document shape of the questions file.
#[derive(Deserialize)]
struct BankDocument {
    npcs: Vec<NpcProfile>,
}

/// Database of all loaded NPCs and their questions. Immutable after load.
#[derive(Resource, Default)]
pub struct QuestionBank {
    npcs: Vec<NpcProfile>,
    available: bool,
}

impl QuestionBank {
    /// Load the bank from file; degrades to an unavailable bank on error.
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(bank) => {
                    info!("Loaded {} NPCs from {}", bank.npcs.len(), path);
                    bank
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, quiz encounters disabled", path, e);
                    Self::unavailable()
                }
            },
            Err(e) => {
                warn!("Failed to load {}: {}, quiz encounters disabled", path, e);
                Self::unavailable()
            }
        }
    }

    /// Parse a bank document, dropping malformed questions with a warning.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let doc: BankDocument = serde_json::from_str(content)?;
        let mut npcs = doc.npcs;
        for npc in &mut npcs {
            let before = npc.questions.len();
            npc.questions.retain(Question::is_well_formed);
            let dropped = before - npc.questions.len();
            if dropped > 0 {
                warn!("Dropped {} malformed question(s) for NPC '{}'", dropped, npc.id);
            }
        }
        Ok(Self {
            npcs,
            available: true,
        })
    }

    /// Build a bank directly from profiles (tests and the simulate binary).
    pub fn from_npcs(npcs: Vec<NpcProfile>) -> Self {
        Self {
            npcs,
            available: true,
        }
    }

    /// Bank for the degraded mode where loading failed.
    pub fn unavailable() -> Self {
        Self {
            npcs: Vec::new(),
            available: false,
        }
    }

    /// Whether question data was loaded at all. When false, encounters
    /// cannot start (the offline notice is a UI concern).
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn get(&self, npc_id: &str) -> Option<&NpcProfile> {
        self.npcs.iter().find(|n| n.id == npc_id)
    }

    /// Total questions authored for an NPC (0 for unknown ids, which feeds
    /// the exhausted-auto-clear rule).
    pub fn question_count(&self, npc_id: &str) -> usize {
        self.get(npc_id).map(|n| n.questions.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "npcs": [
            {
                "id": "warden",
                "name": "The Warden",
                "title": "Keeper of the First Gate",
                "line_correct": "Sharp thinking.",
                "line_wrong": "Back to the books.",
                "questions": [
                    {
                        "prompt": "2 + 2 = ?",
                        "options": ["3", "4"],
                        "correct": 1,
                        "explanation": "Basic arithmetic."
                    },
                    {
                        "prompt": "broken",
                        "options": ["only one"],
                        "correct": 0
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_and_drops_malformed_questions() {
        let bank = QuestionBank::parse(SAMPLE).unwrap();
        assert!(bank.is_available());
        assert_eq!(bank.len(), 1);
        // The single-option question was dropped
        assert_eq!(bank.question_count("warden"), 1);
        let npc = bank.get("warden").unwrap();
        assert_eq!(npc.questions[0].correct, 1);
        assert_eq!(npc.voice.rate, 1.0);
    }

    #[test]
    fn unknown_npc_has_zero_questions() {
        let bank = QuestionBank::parse(SAMPLE).unwrap();
        assert_eq!(bank.question_count("nobody"), 0);
        assert!(bank.get("nobody").is_none());
    }

    #[test]
    fn garbage_input_is_an_error_not_a_panic() {
        assert!(QuestionBank::parse("not json").is_err());
        let bank = QuestionBank::unavailable();
        assert!(!bank.is_available());
        assert!(bank.is_empty());
    }
}
