//! Wizard spawning and the fixed-step pursuit loop.
//!
//! Every `FixedUpdate` tick each `WizardBrain` plans and moves once, the wizard
//! is checked against the quarry for a catch, and its `Transform` follows the
//! brain. Brain transitions go out as `PursuitEvent` observer events.

use bevy::prelude::*;
use micromegas_tracing::prelude::{imetric, info, span_fn, span_scope};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::{WizardBrain, WizardEvent};
use crate::app_state::AppState;
use crate::components::{GridPosition, Quarry};
use crate::events::{GameWon, PursuitEvent, QuarryCaught};
use crate::navigation::MovementGrid;
use crate::plugins::maze::{load_maze, MazeLayout};
use crate::plugins::player::QuarryHandle;
use crate::resources::{PursuitConfig, SessionStats};

pub struct WizardPlugin;

impl Plugin for WizardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TauntRng>();
        app.add_systems(OnEnter(AppState::InGame), spawn_wizard.after(load_maze));
        app.add_systems(
            FixedUpdate,
            (
                wizard_pursuit,
                wizard_quarry_collision.after(wizard_pursuit),
                sync_wizard_transform.after(wizard_quarry_collision),
            )
                .run_if(in_state(AppState::InGame)),
        );

        app.add_observer(on_quarry_caught);
        app.add_observer(on_game_won);
        app.add_observer(on_pursuit_event);
    }
}

/// RNG behind taunt timing. Replace with a seeded one for reproducible runs.
#[derive(Resource)]
pub struct TauntRng(pub StdRng);

impl Default for TauntRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Spawn the wizard on the maze's wizard spawn.
#[span_fn]
pub fn spawn_wizard(
    mut commands: Commands,
    maze: Res<MazeLayout>,
    grid: Res<MovementGrid>,
    config: Res<PursuitConfig>,
) {
    let world = grid.transform().cell_to_world(maze.wizard_spawn);
    commands.spawn((
        WizardBrain::new(world, config.wizard_tuning()),
        grid.world_to_grid(world),
        Transform::from_translation(world.as_vec3()),
    ));
}

/// Tick every wizard brain once against the quarry.
#[span_fn]
fn wizard_pursuit(
    time: Res<Time<Fixed>>,
    grid: Option<Res<MovementGrid>>,
    mut rng: ResMut<TauntRng>,
    mut wizards: Query<(Entity, &mut WizardBrain)>,
    mut quarry: Query<(&Transform, &mut Quarry)>,
    mut commands: Commands,
) {
    let Some(grid) = grid else { return };
    let Ok((transform, mut quarry)) = quarry.single_mut() else {
        return;
    };
    let dt = time.timestep().as_secs_f64();

    for (entity, mut brain) in &mut wizards {
        let mut target = QuarryHandle {
            transform,
            quarry: &mut quarry,
        };
        for kind in brain.tick(&grid, &mut target, dt, &mut rng.0) {
            commands.trigger(PursuitEvent {
                wizard: entity,
                kind,
            });
        }
    }
}

/// A wizard within `collision_radius` of an undefeated quarry catches it.
#[span_fn]
fn wizard_quarry_collision(
    config: Res<PursuitConfig>,
    wizards: Query<(Entity, &WizardBrain)>,
    quarry: Query<(&Transform, &Quarry)>,
    mut commands: Commands,
) {
    let Ok((transform, quarry)) = quarry.single() else {
        return;
    };
    if quarry.defeated {
        return;
    }
    let target = transform.translation.as_dvec3();
    for (entity, brain) in &wizards {
        if !brain.is_casting() && brain.position().distance(target) <= config.collision_radius {
            commands.trigger(QuarryCaught { wizard: entity });
        }
    }
}

fn sync_wizard_transform(mut query: Query<(&WizardBrain, &mut Transform)>) {
    for (brain, mut transform) in &mut query {
        let pos = brain.position().as_vec3();
        if transform.translation.truncate() != pos.truncate() {
            transform.translation.x = pos.x;
            transform.translation.y = pos.y;
        }
    }
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

fn on_quarry_caught(
    trigger: On<QuarryCaught>,
    mut wizards: Query<&mut WizardBrain>,
    mut commands: Commands,
) {
    let wizard = trigger.event().wizard;
    let Ok(mut brain) = wizards.get_mut(wizard) else {
        return;
    };
    if let Some(kind) = brain.on_target_collision() {
        commands.trigger(PursuitEvent { wizard, kind });
    }
}

fn on_game_won(
    _trigger: On<GameWon>,
    mut wizards: Query<(Entity, &mut WizardBrain)>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (wizard, mut brain) in &mut wizards {
        if let Some(kind) = brain.force_stop() {
            commands.trigger(PursuitEvent { wizard, kind });
        }
    }
    next_state.set(AppState::GameOver);
}

fn on_pursuit_event(
    trigger: On<PursuitEvent>,
    mut stats: ResMut<SessionStats>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let event = *trigger.event();
    stats.record(event.kind);
    match event.kind {
        WizardEvent::PathStarted { nodes } => {
            imetric!("path_nodes", "count", nodes as u64);
            imetric!("paths_computed", "count", stats.paths_started as u64);
        }
        WizardEvent::TargetUnreachable => {
            imetric!("unreachable_alerts", "count", stats.unreachable_alerts as u64);
        }
        WizardEvent::TargetDefeated => {
            info!("quarry defeated by {:?}", event.wizard);
            next_state.set(AppState::GameOver);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
