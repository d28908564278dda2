//! Headless smoke run: an autopilot plays a full run and prints the outcome.
//!
//! Usage: simulate [--ticks <max>] [--log]

use bevy::prelude::*;
use quizcrawl::{
    ActiveEncounter, ExitGate, ExitPortal, FireCooldown, HeadlessAppBuilder, NpcStation, Player,
    PlayerInput, QuestionBank, RoomDatabase, RoomProgress, RunOutcome, RunState, constants::*,
    sample_bank,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let log_runs = args.iter().any(|a| a == "--log");
    let max_ticks = args
        .iter()
        .position(|a| a == "--ticks")
        .and_then(|i| args.get(i + 1).and_then(|s| s.parse::<usize>().ok()))
        .unwrap_or(60 * 600);

    let bank = QuestionBank::load_from_file(QUESTIONS_FILE);
    let bank = if bank.is_available() {
        bank
    } else {
        sample_bank()
    };
    let rooms = RoomDatabase::load_from_file(ROOMS_FILE);

    let mut app = HeadlessAppBuilder::new()
        .with_bank(bank)
        .with_rooms(rooms)
        .with_run_log(log_runs)
        .build();
    app.add_systems(Update, autopilot);

    let mut ticks = 0;
    while ticks < max_ticks {
        app.update();
        ticks += 1;
        if app.world().resource::<RunOutcome>().0.is_some() {
            // One more tick so the final events reach the log
            app.update();
            break;
        }
    }

    let run_state = app.world().resource::<RunState>();
    match &app.world().resource::<RunOutcome>().0 {
        Some(summary) => println!(
            "Run finished after {} ticks: {} | score {} | npcs cleared {}",
            ticks,
            if summary.won { "VICTORY" } else { "DEFEAT" },
            summary.score,
            summary.cleared
        ),
        None => println!(
            "Run still in progress after {} ticks (score {}, health {}/{})",
            ticks,
            run_state.score(),
            run_state.health(),
            run_state.max_health()
        ),
    }
}

/// Scripted player: walk to the nearest uncleared NPC, answer correctly,
/// then head for the portal. Fires while moving to thin out obstacles.
fn autopilot(
    mut input: ResMut<PlayerInput>,
    active: Res<ActiveEncounter>,
    outcome: Res<RunOutcome>,
    run_state: Res<RunState>,
    gate: Res<ExitGate>,
    progress: Res<RoomProgress>,
    cooldown: Res<FireCooldown>,
    player: Query<&Transform, With<Player>>,
    stations: Query<(&NpcStation, &Transform)>,
    portals: Query<&Transform, With<ExitPortal>>,
) {
    if outcome.0.is_some() || progress.entrance_timer > 0.0 {
        return;
    }
    if let Some(session) = &active.0 {
        if session.accepts_answers()
            && let Some(question) = session.current_question()
        {
            input.select_answer(question.correct);
        }
        return;
    }
    let Ok(player_tf) = player.single() else {
        return;
    };
    let pos = player_tf.translation.truncate();

    let target = stations
        .iter()
        .filter(|(station, _)| !run_state.is_cleared(&station.id))
        .map(|(_, tf)| tf.translation.truncate())
        .min_by(|a, b| pos.distance(*a).total_cmp(&pos.distance(*b)));

    match target {
        Some(goal) if pos.distance(goal) <= INTERACT_RADIUS * 0.5 => {
            input.move_vec = Vec2::ZERO;
            input.request_interact();
        }
        Some(goal) => {
            input.move_vec = (goal - pos).normalize_or_zero();
        }
        None if gate.unlocked => {
            if let Some(portal_tf) = portals.iter().next() {
                input.move_vec = (portal_tf.translation.truncate() - pos).normalize_or_zero();
            }
        }
        None => {
            input.move_vec = Vec2::ZERO;
        }
    }

    if cooldown.0 <= 0.0 && input.move_vec != Vec2::ZERO {
        input.request_fire();
    }
}
