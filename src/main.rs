//! Quizcrawl - an arcade quiz dungeon crawl built with Bevy
//!
//! Main entry point: window setup, engine schedule on FixedUpdate, and the
//! sprite/text presentation layer the headless simulator does without.

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use quizcrawl::{
    CurrentRoom, EventBus, ExitPortal, HealthPickup, NpcStation, Obstacle, Player, Projectile,
    QuestionBank, RoomDatabase, RunLogConfig, RunState, add_engine_systems, constants::*, input,
    insert_engine_resources, rooms, run_over, ui,
};

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let no_log = args.iter().any(|a| a == "--no-log");

    // Check for --room <index> override (0-indexed)
    let room_override = args
        .iter()
        .position(|a| a == "--room")
        .and_then(|i| args.get(i + 1).and_then(|s| s.parse::<usize>().ok()));

    // Check for --name <player name>
    let player_name = args
        .iter()
        .position(|a| a == "--name")
        .and_then(|i| args.get(i + 1).cloned());

    // Load data files (fall back to built-in defaults on error)
    let bank = QuestionBank::load_from_file(QUESTIONS_FILE);
    let room_db = RoomDatabase::load_from_file(ROOMS_FILE);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            resolution: bevy::window::WindowResolution::new(
                ROOM_WIDTH as u32 + 80,
                ROOM_HEIGHT as u32 + 200,
            )
            .with_scale_factor_override(1.0),
            title: "Quizcrawl".into(),
            resizable: false,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.07, 0.07, 0.10)))
    .insert_resource(EventBus::new())
    .insert_resource(RunLogConfig {
        enabled: !no_log,
        ..default()
    })
    .insert_resource(Time::<Fixed>::from_hz(TICK_RATE));

    insert_engine_resources(&mut app, bank, room_db, DEFAULT_MAX_HEALTH);
    if let Some(index) = room_override {
        app.insert_resource(CurrentRoom(index));
    }
    if let Some(name) = player_name {
        app.world_mut().resource_mut::<RunState>().player_name = name;
    }

    add_engine_systems(&mut app, FixedUpdate);

    app.add_systems(Startup, (setup, ui::setup_hud))
        // Input capture runs on Update so presses between fixed ticks buffer
        .add_systems(
            Update,
            (input::capture_keyboard_input, input::capture_gamepad_input).chain(),
        )
        .add_systems(Update, rooms::restart_run.run_if(run_over))
        .add_systems(
            Update,
            (
                decorate_new_entities,
                ui::update_stats_text,
                ui::update_status_text,
                ui::update_encounter_text,
            ),
        )
        .run();
}

/// Camera setup. The engine spawns everything else.
fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(0.0, 0.0, 0.0),
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: ROOM_HEIGHT + 160.0,
            },
            ..OrthographicProjection::default_2d()
        }),
    ));
}

/// Attach sprites to engine-spawned entities. The engine itself never
/// touches render components, so the headless build skips all of this.
fn decorate_new_entities(
    mut commands: Commands,
    players: Query<Entity, Added<Player>>,
    obstacles: Query<Entity, Added<Obstacle>>,
    projectiles: Query<Entity, Added<Projectile>>,
    pickups: Query<Entity, Added<HealthPickup>>,
    stations: Query<Entity, Added<NpcStation>>,
    portals: Query<Entity, Added<ExitPortal>>,
) {
    for entity in &players {
        commands
            .entity(entity)
            .insert(Sprite::from_color(Color::srgb(0.35, 0.8, 1.0), PLAYER_SIZE));
    }
    for entity in &obstacles {
        commands.entity(entity).insert(Sprite::from_color(
            Color::srgb(0.85, 0.25, 0.25),
            OBSTACLE_SIZE,
        ));
    }
    for entity in &projectiles {
        commands.entity(entity).insert(Sprite::from_color(
            Color::srgb(1.0, 0.9, 0.4),
            PROJECTILE_SIZE,
        ));
    }
    for entity in &pickups {
        commands
            .entity(entity)
            .insert(Sprite::from_color(Color::srgb(0.3, 0.9, 0.4), PICKUP_SIZE));
    }
    for entity in &stations {
        commands.entity(entity).insert(Sprite::from_color(
            Color::srgb(0.6, 0.45, 0.9),
            Vec2::new(44.0, 56.0),
        ));
    }
    for entity in &portals {
        commands.entity(entity).insert(Sprite::from_color(
            Color::srgb(0.2, 0.8, 0.75),
            Vec2::new(36.0, 120.0),
        ));
    }
}
