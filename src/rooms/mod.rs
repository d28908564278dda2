//! Rooms and run lifecycle
//!
//! Owns the room sequence, per-room entity spawning/teardown, the entrance
//! hold in boss rooms, boss clear bonuses, the corridor respawn trickle,
//! NPC interaction, and run start/end bookkeeping.

mod database;

pub use database::{RoomDatabase, RoomDef, RoomKind};

use bevy::prelude::*;

use crate::combat::{HitPoints, Obstacle, Stun};
use crate::constants::*;
use crate::encounter::{ActiveEncounter, try_start_encounter};
use crate::events::{AudioCue, EventBus, GameEvent, RunLogConfig, RunLogger};
use crate::input::PlayerInput;
use crate::player::{BoundToRoom, Player, Velocity, room_bounds};
use crate::progression::ExitGate;
use crate::questions::QuestionBank;
use crate::run_state::RunState;

/// Index into the room sequence. Writing to it triggers a room transition
/// through change detection.
#[derive(Resource, Default, Debug)]
pub struct CurrentRoom(pub usize);

/// Definition of the room currently loaded, cloned on entry so combat
/// systems read parameters without indexing the database every frame.
#[derive(Resource, Debug)]
pub struct ActiveRoom(pub RoomDef);

/// Per-room transient state, reset on every entry.
#[derive(Resource, Default, Debug)]
pub struct RoomProgress {
    /// Seconds left in the non-interactive entrance hold
    pub entrance_timer: f32,
    pub bonus_awarded: bool,
    pub respawn_timer: f32,
    /// Monotonic counter deciding obstacle spawn slots
    pub spawn_serial: usize,
}

impl RoomProgress {
    fn on_entry(def: &RoomDef) -> Self {
        Self {
            entrance_timer: def.entrance_secs,
            bonus_awarded: false,
            respawn_timer: def.respawn_secs,
            spawn_serial: 0,
        }
    }
}

/// Final summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub won: bool,
    pub score: u32,
    pub cleared: usize,
}

/// Empty while the run is live; set exactly once when it ends.
#[derive(Resource, Default, Debug)]
pub struct RunOutcome(pub Option<RunSummary>);

/// Run condition: the run is still in progress.
pub fn run_live(outcome: Res<RunOutcome>) -> bool {
    outcome.0.is_none()
}

/// Run condition: the run has ended (win or death).
pub fn run_over(outcome: Res<RunOutcome>) -> bool {
    outcome.0.is_some()
}

/// Run condition: the entrance hold has elapsed and the room is interactive.
pub fn entrance_done(progress: Res<RoomProgress>) -> bool {
    progress.entrance_timer <= 0.0
}

/// Marker for entities torn down on room transition
#[derive(Component)]
pub struct RoomEntity;

/// Quiz NPC standing in the room
#[derive(Component)]
pub struct NpcStation {
    pub id: String,
}

/// Walk-through exit, active only once the gate is unlocked
#[derive(Component)]
pub struct ExitPortal;

/// End the run exactly once. Later callers in the same tick lose the race
/// and return without effect.
pub fn finish_run(outcome: &mut RunOutcome, run_state: &RunState, bus: &mut EventBus, won: bool) {
    if outcome.0.is_some() {
        return;
    }
    let summary = RunSummary {
        won,
        score: run_state.score(),
        cleared: run_state.cleared_count(),
    };
    info!(
        "Run over: won={} score={} cleared={}",
        summary.won, summary.score, summary.cleared
    );
    bus.emit(GameEvent::RunEnd {
        won,
        score: summary.score,
        cleared: summary.cleared,
    });
    bus.emit(GameEvent::Cue(if won {
        AudioCue::Victory
    } else {
        AudioCue::Defeat
    }));
    outcome.0 = Some(summary);
}

/// Open the run log and announce the run.
pub fn start_run(
    config: Res<RunLogConfig>,
    mut logger: ResMut<RunLogger>,
    run_state: Res<RunState>,
    mut bus: ResMut<EventBus>,
) {
    let run_id = logger.start_run(&config);
    bus.emit(GameEvent::RunStart {
        run_id,
        max_health: run_state.max_health(),
    });
}

/// Close the run log after the final events have been flushed.
pub fn close_run_log(mut logger: ResMut<RunLogger>) {
    logger.end_run();
}

fn spawn_obstacle(commands: &mut Commands, def: &RoomDef, serial: usize) {
    let bounds = room_bounds();
    let cols = 4;
    let col = (serial % cols) as f32;
    let row = ((serial / cols) % 3) as f32;
    let x = -bounds.x + 100.0 + col * (bounds.x * 2.0 - 200.0) / (cols - 1) as f32;
    let y = -bounds.y + 80.0 + row * (bounds.y * 2.0 - 160.0) / 2.0;
    let dir = if serial % 2 == 0 { 1.0 } else { -1.0 };

    commands.spawn((
        Obstacle,
        HitPoints(def.enemy_hp),
        crate::combat::Patrol {
            min_x: -bounds.x + 40.0,
            max_x: bounds.x - 40.0,
            dir,
        },
        Stun::default(),
        Velocity::default(),
        BoundToRoom,
        RoomEntity,
        Transform::from_xyz(x, y, 0.0),
    ));
}

fn spawn_room(commands: &mut Commands, def: &RoomDef, progress: &mut RoomProgress) {
    let bounds = room_bounds();

    // NPC stations spread along the back wall
    let ids = def.kind.npc_ids();
    let count = ids.len();
    for (i, id) in ids.into_iter().enumerate() {
        let x = if count == 1 {
            0.0
        } else {
            -bounds.x + 120.0 + i as f32 * (bounds.x * 2.0 - 240.0) / (count - 1) as f32
        };
        commands.spawn((
            NpcStation { id: id.to_string() },
            RoomEntity,
            Transform::from_xyz(x, bounds.y - 40.0, 0.0),
        ));
    }

    for _ in 0..def.enemy_count {
        spawn_obstacle(commands, def, progress.spawn_serial);
        progress.spawn_serial += 1;
    }

    // The final room has no exit; clearing its boss ends the run instead
    if !def.kind.is_terminal() {
        commands.spawn((
            ExitPortal,
            RoomEntity,
            Transform::from_xyz(-bounds.x + 20.0, 0.0, 0.0),
        ));
    }
}

/// Load the room the `CurrentRoom` index points at. Runs on startup (the
/// resource counts as changed when first added) and on every transition.
#[allow(clippy::too_many_arguments)]
pub fn sync_room(
    mut commands: Commands,
    db: Res<RoomDatabase>,
    current: Res<CurrentRoom>,
    mut active: ResMut<ActiveRoom>,
    mut progress: ResMut<RoomProgress>,
    mut gate: ResMut<ExitGate>,
    mut input: ResMut<PlayerInput>,
    mut bus: ResMut<EventBus>,
    stale: Query<Entity, With<RoomEntity>>,
    mut player: Query<(&mut Transform, &mut Velocity), With<Player>>,
) {
    if !current.is_changed() {
        return;
    }
    let Some(def) = db.get(current.0) else {
        warn!("Room index {} out of range", current.0);
        return;
    };

    for entity in &stale {
        commands.entity(entity).despawn();
    }

    active.0 = def.clone();
    *progress = RoomProgress::on_entry(def);
    gate.unlocked = false;
    input.clear();

    // Rooms are entered from the right, facing in
    let bounds = room_bounds();
    for (mut transform, mut velocity) in &mut player {
        transform.translation = Vec3::new(bounds.x - 30.0, 0.0, 0.0);
        velocity.0 = Vec2::ZERO;
    }

    spawn_room(&mut commands, def, &mut progress);

    info!("Entered room: {} ({})", def.id, def.label);
    bus.emit(GameEvent::RoomEnter {
        room: def.id.clone(),
    });
    if def.kind.is_boss() {
        bus.emit(GameEvent::Cue(AudioCue::BossIntro));
    }
}

/// Count down the boss entrance hold.
pub fn tick_entrance(time: Res<Time>, mut progress: ResMut<RoomProgress>) {
    if progress.entrance_timer <= 0.0 {
        return;
    }
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    progress.entrance_timer -= dt;
    if progress.entrance_timer <= 0.0 {
        info!("Entrance sequence over, room is live");
    }
}

/// Corridor respawn trickle: a small wave every interval, never past the cap.
pub fn respawn_trickle(
    time: Res<Time>,
    mut commands: Commands,
    room: Res<ActiveRoom>,
    mut progress: ResMut<RoomProgress>,
    obstacles: Query<(), With<Obstacle>>,
) {
    if room.0.respawn_secs <= 0.0 {
        return;
    }
    let dt = time.delta_secs().max(1.0 / TICK_RATE as f32);
    progress.respawn_timer -= dt;
    if progress.respawn_timer > 0.0 {
        return;
    }
    progress.respawn_timer = room.0.respawn_secs;

    let live = obstacles.iter().count();
    let headroom = room.0.enemy_cap.saturating_sub(live);
    let wave = room.0.respawn_batch.min(headroom);
    for _ in 0..wave {
        spawn_obstacle(&mut commands, &room.0, progress.spawn_serial);
        progress.spawn_serial += 1;
    }
    if wave > 0 {
        info!("Respawn wave: +{} ({} live)", wave, live + wave);
    }
}

/// Consume the interact intent against the nearest NPC in range.
#[allow(clippy::too_many_arguments)]
pub fn npc_interaction(
    mut input: ResMut<PlayerInput>,
    player: Query<&Transform, With<Player>>,
    stations: Query<(&NpcStation, &Transform)>,
    bank: Res<QuestionBank>,
    mut run_state: ResMut<RunState>,
    mut active: ResMut<ActiveEncounter>,
    mut bus: ResMut<EventBus>,
    room: Res<ActiveRoom>,
) {
    if !input.take_interact() {
        return;
    }
    let Ok(player_tf) = player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    let nearest = stations
        .iter()
        .map(|(station, tf)| (station, player_pos.distance(tf.translation.truncate())))
        .filter(|(_, dist)| *dist <= INTERACT_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((station, _)) = nearest {
        try_start_encounter(
            &bank,
            &mut run_state,
            &mut active,
            &mut bus,
            &station.id,
            room.0.encounter_mode,
        );
    }
}

/// Award the boss clear bonus once, and end the run as a win in the final
/// room.
pub fn award_boss_bonus(
    mut run_state: ResMut<RunState>,
    room: Res<ActiveRoom>,
    mut progress: ResMut<RoomProgress>,
    mut bus: ResMut<EventBus>,
    mut outcome: ResMut<RunOutcome>,
) {
    if progress.bonus_awarded || !room.0.kind.is_boss() {
        return;
    }
    let boss = match &room.0.kind {
        RoomKind::MiniBoss { boss } | RoomKind::FinalBoss { boss } => boss,
        RoomKind::Corridor { .. } => return,
    };
    if !run_state.is_cleared(boss) {
        return;
    }

    progress.bonus_awarded = true;
    run_state.add_score(room.0.clear_bonus);
    info!(
        "Boss cleared: {} (+{} bonus, score {})",
        boss,
        room.0.clear_bonus,
        run_state.score()
    );
    if room.0.kind.is_terminal() {
        finish_run(&mut outcome, &run_state, &mut bus, true);
    }
}

/// Walk through an unlocked exit portal to advance to the next room.
/// Scheduled behind the `exit_unlocked` condition.
pub fn exit_transition(
    player: Query<&Transform, With<Player>>,
    portals: Query<&Transform, With<ExitPortal>>,
    db: Res<RoomDatabase>,
    mut current: ResMut<CurrentRoom>,
) {
    let Ok(player_tf) = player.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for portal_tf in &portals {
        if player_pos.distance(portal_tf.translation.truncate()) <= EXIT_RADIUS
            && current.0 + 1 < db.len()
        {
            current.0 += 1;
            return;
        }
    }
}

/// Restart a finished run from the first room with fresh run state.
#[allow(clippy::too_many_arguments)]
pub fn restart_run(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<RunLogConfig>,
    mut logger: ResMut<RunLogger>,
    mut run_state: ResMut<RunState>,
    mut outcome: ResMut<RunOutcome>,
    mut current: ResMut<CurrentRoom>,
    mut active: ResMut<ActiveEncounter>,
    mut feedback: ResMut<crate::encounter::LastAnswerFeedback>,
    mut cooldown: ResMut<crate::combat::FireCooldown>,
    mut bus: ResMut<EventBus>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    run_state.reset();
    outcome.0 = None;
    active.0 = None;
    feedback.0 = None;
    cooldown.0 = 0.0;
    // Writing the index marks it changed, so sync_room reloads room 0
    current.0 = 0;

    let run_id = logger.start_run(&config);
    info!("Run restarted");
    bus.emit(GameEvent::RunStart {
        run_id,
        max_health: run_state.max_health(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_run_is_idempotent_and_first_outcome_wins() {
        let mut outcome = RunOutcome::default();
        let mut rs = RunState::new(5);
        rs.add_score(300);
        let mut bus = EventBus::new();

        finish_run(&mut outcome, &rs, &mut bus, false);
        finish_run(&mut outcome, &rs, &mut bus, true);

        let summary = outcome.0.expect("run ended");
        assert!(!summary.won);
        assert_eq!(summary.score, 300);
        let ends = bus
            .peek()
            .iter()
            .filter(|e| matches!(e.event, GameEvent::RunEnd { .. }))
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn room_progress_entry_resets_timers() {
        let db = RoomDatabase::standard();
        let boss = &db.rooms[1];
        let progress = RoomProgress::on_entry(boss);
        assert_eq!(progress.entrance_timer, boss.entrance_secs);
        assert!(!progress.bonus_awarded);
        assert_eq!(progress.respawn_timer, boss.respawn_secs);
    }
}
