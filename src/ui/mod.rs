//! HUD and text presentation

mod hud;

pub use hud::{
    EncounterText, EncounterView, HudModel, StatsText, StatusText, health_bar, project_hud,
    segment_bar, setup_hud, update_encounter_text, update_stats_text, update_status_text,
};
