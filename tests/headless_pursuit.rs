//! End-to-end pursuit runs on the shipped maps, one fixed tick per update.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use wizard_pursuit::PursuitPlugin;
use wizard_pursuit::ai::{WizardBrain, WizardState};
use wizard_pursuit::app_state::AppState;
use wizard_pursuit::components::{GridPosition, Quarry};
use wizard_pursuit::events::GameWon;
use wizard_pursuit::resources::{PursuitConfig, SessionStats};

fn setup_app(maze_file: &str) -> App {
    let config = PursuitConfig {
        maze_file: maze_file.to_string(),
        // Keep taunts out of the way.
        taunt_interval_secs: [600.0, 600.0],
        ..default()
    };
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(PursuitPlugin { config });
    // 64 Hz: exactly one fixed step per update.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(15625)));
    app
}

fn state(app: &App) -> AppState {
    *app.world().resource::<State<AppState>>().get()
}

fn stats(app: &App) -> SessionStats {
    app.world().resource::<SessionStats>().clone()
}

fn wizard(app: &mut App) -> WizardBrain {
    let mut query = app.world_mut().query::<&WizardBrain>();
    query.single(app.world()).unwrap().clone()
}

fn quarry(app: &mut App) -> Entity {
    let mut query = app.world_mut().query_filtered::<Entity, With<Quarry>>();
    query.single(app.world()).unwrap()
}

/// Update until `AppState::InGame` is entered and the actors exist.
fn enter_game(app: &mut App) {
    for _ in 0..5 {
        app.update();
        if state(app) == AppState::InGame {
            return;
        }
    }
    panic!("never reached InGame, stuck in {:?}", state(app));
}

/// Update until GameOver or `max` updates; returns the number of updates run.
fn run_until_game_over(app: &mut App, max: usize) -> usize {
    for n in 1..=max {
        app.update();
        if state(app) == AppState::GameOver {
            return n;
        }
    }
    max
}

#[test]
fn wizard_catches_idle_quarry_on_arena() {
    let mut app = setup_app("assets/maps/arena.txt");
    enter_game(&mut app);

    let updates = run_until_game_over(&mut app, 1000);
    assert_eq!(state(&app), AppState::GameOver, "no catch after {updates} updates");

    let stats = stats(&app);
    assert!(stats.target_defeated);
    assert!(!stats.forced_stop);
    assert_eq!(stats.paths_started, 1);
    assert_eq!(stats.unreachable_alerts, 0);

    let entity = quarry(&mut app);
    assert!(app.world().entity(entity).get::<Quarry>().unwrap().defeated);
    assert_eq!(wizard(&mut app).state(), WizardState::Casting);
}

#[test]
fn sealed_quarry_is_flagged_once() {
    let mut app = setup_app("assets/maps/keep.txt");
    enter_game(&mut app);
    let spawn = wizard(&mut app).position();

    for _ in 0..120 {
        app.update();
    }

    let brain = wizard(&mut app);
    assert_eq!(brain.state(), WizardState::Blocked);
    assert!(brain.is_cheating_detected());
    assert_eq!(brain.position(), spawn);
    assert_eq!(stats(&app).unreachable_alerts, 1);
    assert_eq!(stats(&app).paths_started, 0);
    assert_eq!(state(&app), AppState::InGame);
}

#[test]
fn quarry_moving_away_interrupts_and_replans() {
    let mut app = setup_app("assets/maps/arena.txt");
    enter_game(&mut app);
    for _ in 0..60 {
        app.update();
    }
    assert_eq!(stats(&app).paths_started, 1);

    // Bottom corridor, far from the player spawn.
    let entity = quarry(&mut app);
    app.world_mut()
        .entity_mut(entity)
        .get_mut::<Transform>()
        .unwrap()
        .translation = Vec3::new(5.5, 1.5, 0.0);

    for _ in 0..3 {
        app.update();
    }

    let stats = stats(&app);
    assert_eq!(stats.interrupts, 1);
    assert_eq!(stats.paths_started, 2);
    assert_eq!(
        *app.world().entity(entity).get::<GridPosition>().unwrap(),
        GridPosition::new(5, 1)
    );
    assert!(wizard(&mut app).is_moving());
}

#[test]
fn game_won_stops_every_wizard() {
    let mut app = setup_app("assets/maps/arena.txt");
    enter_game(&mut app);
    for _ in 0..30 {
        app.update();
    }

    app.world_mut().trigger(GameWon);
    app.update();

    assert_eq!(state(&app), AppState::GameOver);
    let stats = stats(&app);
    assert!(stats.forced_stop);
    assert!(!stats.target_defeated);

    let brain = wizard(&mut app);
    assert_eq!(brain.state(), WizardState::Casting);
    assert!(!brain.is_moving());
}
