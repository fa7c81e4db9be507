//! The quarry: the player-controlled entity the wizard hunts.
//!
//! Input is owned by the host game; it moves the quarry by writing its
//! `Transform`. This plugin only spawns it and exposes it to the wizard as a
//! `PursuitTarget`.

use bevy::math::DVec3;
use bevy::prelude::*;
use micromegas_tracing::prelude::{span_fn, span_scope};

use crate::ai::PursuitTarget;
use crate::app_state::AppState;
use crate::components::{GridPosition, Quarry};
use crate::navigation::MovementGrid;
use crate::plugins::maze::{load_maze, MazeLayout};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_player.after(load_maze));
    }
}

/// Spawn the quarry on the maze's player spawn.
#[span_fn]
pub fn spawn_player(mut commands: Commands, maze: Res<MazeLayout>, grid: Res<MovementGrid>) {
    let world = grid.transform().cell_to_world(maze.player_spawn);
    let pos = grid.world_to_grid(world);
    commands.spawn((
        Quarry::default(),
        pos,
        Transform::from_translation(world.as_vec3()),
    ));
}

/// Borrowed view of the quarry that the wizard brain can read and defeat.
pub struct QuarryHandle<'a> {
    pub transform: &'a Transform,
    pub quarry: &'a mut Quarry,
}

impl PursuitTarget for QuarryHandle<'_> {
    fn world_position(&self) -> DVec3 {
        self.transform.translation.as_dvec3()
    }

    fn is_defeated(&self) -> bool {
        self.quarry.defeated
    }

    fn mark_defeated(&mut self) {
        self.quarry.defeated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_reads_transform_and_flags_defeat() {
        let transform = Transform::from_xyz(2.5, 3.5, 10.0);
        let mut quarry = Quarry::default();
        let mut handle = QuarryHandle {
            transform: &transform,
            quarry: &mut quarry,
        };
        assert_eq!(handle.world_position(), DVec3::new(2.5, 3.5, 10.0));
        assert!(!handle.is_defeated());
        handle.mark_defeated();
        assert!(quarry.defeated);
    }

    #[test]
    fn spawn_player_places_quarry_on_spawn_cell() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let maze = MazeLayout::parse("#####\n#W P#\n#####").unwrap();
        let grid = maze.build_grid(Default::default()).unwrap();
        app.insert_resource(grid);
        app.insert_resource(maze);
        app.add_systems(Update, spawn_player);

        app.update();

        let mut query = app.world_mut().query::<(&Quarry, &GridPosition, &Transform)>();
        let (quarry, pos, transform) = query.single(app.world()).unwrap();
        assert!(!quarry.defeated);
        assert_eq!(*pos, GridPosition::new(3, 1));
        assert_eq!(transform.translation, Vec3::new(3.5, 1.5, 0.0));
    }
}
