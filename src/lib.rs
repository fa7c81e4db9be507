pub mod ai;
pub mod app_state;
pub mod components;
pub mod error;
pub mod events;
pub mod navigation;
pub mod plugins;
pub mod resources;

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope};

use app_state::AppState;
use plugins::maze::MazePlugin;
use plugins::player::PlayerPlugin;
use plugins::telemetry::TelemetryPlugin;
use plugins::wizard::WizardPlugin;
use resources::{PursuitConfig, SessionStats};

/// Headless pursuit game: maze, quarry and wizard, stepped on `FixedUpdate`.
///
/// Needs `StatesPlugin` and a time source (`MinimalPlugins` or
/// `DefaultPlugins`) from the host app.
#[derive(Default)]
pub struct PursuitPlugin {
    pub config: PursuitConfig,
}

impl Plugin for PursuitPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());
        app.insert_resource(Time::<Fixed>::from_hz(self.config.fixed_hz));
        app.init_state::<AppState>();
        app.init_resource::<SessionStats>();

        app.add_plugins(MazePlugin);
        app.add_plugins(PlayerPlugin);
        app.add_plugins(WizardPlugin);
        app.add_plugins(TelemetryPlugin);

        // Nothing to load asynchronously: go straight into the game.
        app.add_systems(OnEnter(AppState::Loading), begin_session);
        app.add_systems(OnEnter(AppState::InGame), init_game_session);
    }
}

fn begin_session(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::InGame);
}

/// Reset per-session counters. Runs on each `OnEnter(AppState::InGame)`, and
/// the stats persist through `GameOver` for the host to read.
#[span_fn]
fn init_game_session(mut commands: Commands) {
    info!("pursuit session starting");
    commands.insert_resource(SessionStats::default());
}
