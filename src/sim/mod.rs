//! Headless simulation support
//!
//! The engine schedule is assembled here once and shared by the windowed
//! binary (on `FixedUpdate`) and the headless simulator (on `Update`, one
//! deterministic tick per `app.update()`). Nothing in the engine schedule
//! touches rendering or OS input.

use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use std::time::Duration;

use crate::combat::{
    FireCooldown, contact_damage, obstacle_ai, pickup_heal, player_fire, projectile_hits,
    tick_fire_cooldown, tick_pickups, tick_projectiles, tick_stun,
};
use crate::constants::*;
use crate::encounter::{
    ActiveEncounter, GameTick, LastAnswerFeedback, advance_tick, no_encounter_active,
    resolve_answer_input, tick_encounter_feedback,
};
use crate::events::{EventBus, RunLogConfig, RunLogger, flush_event_bus, update_event_bus_time};
use crate::input::PlayerInput;
use crate::player::{
    BoundToRoom, Facing, Player, Velocity, apply_player_input, apply_velocity, clamp_to_bounds,
    room_bounds,
};
use crate::progression::{ExitGate, evaluate_exit_gate, exit_unlocked};
use crate::questions::{NpcProfile, Question, QuestionBank, VoiceHint};
use crate::rooms::{
    ActiveRoom, CurrentRoom, RoomDatabase, RoomProgress, RunOutcome, award_boss_bonus,
    close_run_log, entrance_done, exit_transition, npc_interaction, respawn_trickle, run_live,
    run_over, start_run, sync_room, tick_entrance,
};
use crate::run_state::RunState;
use crate::ui::{HudModel, project_hud};

/// Insert every engine resource. The event bus and log config are inserted
/// by the caller, which decides whether logging is live.
pub fn insert_engine_resources(
    app: &mut App,
    bank: QuestionBank,
    rooms: RoomDatabase,
    max_health: u32,
) {
    let first = rooms
        .get(0)
        .cloned()
        .unwrap_or_else(|| RoomDatabase::standard().rooms[0].clone());

    app.insert_resource(RunState::new(max_health))
        .insert_resource(bank)
        .insert_resource(rooms)
        .insert_resource(ActiveRoom(first))
        .init_resource::<CurrentRoom>()
        .init_resource::<RoomProgress>()
        .init_resource::<ExitGate>()
        .init_resource::<RunOutcome>()
        .init_resource::<ActiveEncounter>()
        .init_resource::<LastAnswerFeedback>()
        .init_resource::<GameTick>()
        .init_resource::<FireCooldown>()
        .init_resource::<PlayerInput>()
        .init_resource::<RunLogger>()
        .init_resource::<HudModel>();
}

/// Spawn the player avatar. Rooms reposition it on entry.
pub fn spawn_player(mut commands: Commands) {
    commands.spawn((
        Player,
        Velocity::default(),
        Facing::default(),
        BoundToRoom,
        Transform::from_xyz(room_bounds().x - 30.0, 0.0, 0.0),
    ));
}

/// Register the engine systems on the given schedule, in tick order.
/// Combat is gated behind "no encounter, run live, entrance over".
pub fn add_engine_systems<S: ScheduleLabel + Clone>(app: &mut App, schedule: S) {
    app.add_systems(Startup, (spawn_player, start_run));
    app.add_systems(
        schedule.clone(),
        (advance_tick, update_event_bus_time, sync_room, tick_entrance).chain(),
    );
    app.add_systems(
        schedule.clone(),
        (
            npc_interaction.run_if(no_encounter_active.and(run_live).and(entrance_done)),
            resolve_answer_input.run_if(run_live),
            tick_encounter_feedback.run_if(run_live),
        )
            .chain()
            .after(sync_room),
    );
    app.add_systems(
        schedule.clone(),
        (
            apply_player_input,
            obstacle_ai,
            player_fire,
            tick_fire_cooldown,
            apply_velocity,
            clamp_to_bounds,
            tick_stun,
            tick_projectiles,
            projectile_hits,
            contact_damage,
            tick_pickups,
            pickup_heal,
            respawn_trickle,
        )
            .chain()
            .run_if(no_encounter_active.and(run_live).and(entrance_done))
            .after(tick_encounter_feedback),
    );
    app.add_systems(
        schedule.clone(),
        (
            award_boss_bonus.run_if(run_live),
            evaluate_exit_gate.run_if(run_live),
            exit_transition.run_if(exit_unlocked.and(run_live).and(no_encounter_active)),
            project_hud,
            flush_event_bus,
            close_run_log.run_if(run_over),
        )
            .chain()
            .after(contact_damage),
    );
}

/// Deterministic question bank for simulations: small arithmetic prompts
/// with a known correct index, matching the standard room NPCs.
pub fn sample_bank() -> QuestionBank {
    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| {
                let (a, b) = (i + 1, i + 2);
                let correct = i % 4;
                let base = (a + b) as i64 - correct as i64;
                Question {
                    prompt: format!("{} + {} = ?", a, b),
                    options: (0..4).map(|k| (base + k).to_string()).collect(),
                    correct,
                    explanation: None,
                }
            })
            .collect()
    }

    fn npc(id: &str, name: &str, title: &str, count: usize) -> NpcProfile {
        NpcProfile {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            line_correct: "Well reasoned.".into(),
            line_wrong: "Think again.".into(),
            voice: VoiceHint::default(),
            questions: questions(count),
        }
    }

    QuestionBank::from_npcs(vec![
        npc("archivist", "Mira", "the Archivist", 5),
        npc("quartermaster", "Oren", "the Quartermaster", 5),
        npc("warden", "Tess", "the Warden", 5),
        npc("overseer", "Halvard", "the Overseer", 10),
        npc("chancellor", "Ysolde", "the Chancellor", 10),
    ])
}

/// Builder for a windowless engine instance. Each `app.update()` advances
/// exactly one logical tick.
pub struct HeadlessAppBuilder {
    bank: QuestionBank,
    rooms: RoomDatabase,
    max_health: u32,
    log_runs: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    pub fn new() -> Self {
        Self {
            bank: sample_bank(),
            rooms: RoomDatabase::standard(),
            max_health: DEFAULT_MAX_HEALTH,
            log_runs: false,
        }
    }

    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    pub fn with_rooms(mut self, rooms: RoomDatabase) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_run_log(mut self, enabled: bool) -> Self {
        self.log_runs = enabled;
        self
    }

    pub fn build(self) -> App {
        let mut app = App::new();
        app.add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICK_RATE,
            ))),
        );
        app.insert_resource(EventBus::new());
        app.insert_resource(RunLogConfig {
            enabled: self.log_runs,
            ..Default::default()
        });
        insert_engine_resources(&mut app, self.bank, self.rooms, self.max_health);
        add_engine_systems(&mut app, Update);
        app
    }
}
