//! Maze loading and the movement grid.
//!
//! Parses ASCII map files into a floor layer and a wall layer, then builds the
//! `MovementGrid` the wizards path over. The grid is inserted as a resource on
//! entering `AppState::InGame` and never changes afterwards.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_scope};

use crate::app_state::AppState;
use crate::components::GridPosition;
use crate::error::{GridError, MapError};
use crate::navigation::{MovementGrid, TileLayer, TileTransform};
use crate::resources::PursuitConfig;

pub struct MazePlugin;

impl Plugin for MazePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), load_maze);
        app.add_systems(
            FixedPostUpdate,
            track_grid_positions.run_if(in_state(AppState::InGame)),
        );
    }
}

// ---------------------------------------------------------------------------
// Tile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    /// No floor at all: nothing can stand here.
    Void,
    Floor,
    Wall,
    WizardSpawn,
    PlayerSpawn,
}

impl TileType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '~' => Some(TileType::Void),
            ' ' | '.' => Some(TileType::Floor),
            '#' => Some(TileType::Wall),
            'W' => Some(TileType::WizardSpawn),
            'P' => Some(TileType::PlayerSpawn),
            _ => None,
        }
    }

    /// Walls sit on top of floor tiles; only void has no floor.
    pub fn has_floor(&self) -> bool {
        !matches!(self, TileType::Void)
    }
}

// ---------------------------------------------------------------------------
// Maze layout resource
// ---------------------------------------------------------------------------

/// Parsed map: tile layers plus spawn cells. Row 0 of the text is the top of
/// the map, so tile `y` counts up from the last line.
#[derive(Resource, Debug, Clone)]
pub struct MazeLayout {
    pub width: usize,
    pub height: usize,
    pub floor: TileLayer,
    pub walls: TileLayer,
    pub wizard_spawn: IVec2,
    pub player_spawn: IVec2,
}

impl MazeLayout {
    /// Parse an ASCII maze string. Short rows are padded with void.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = text.lines().collect();
        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }

        let mut floor = TileLayer::new();
        let mut walls = TileLayer::new();
        let mut wizard_spawn = None;
        let mut player_spawn = None;

        for (row, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let tile = TileType::from_char(ch)
                    .ok_or(MapError::UnknownTile { ch, x, y: row })?;
                let cell = IVec2::new(x as i32, (height - 1 - row) as i32);

                let slot = match tile {
                    TileType::WizardSpawn => Some((&mut wizard_spawn, "wizard")),
                    TileType::PlayerSpawn => Some((&mut player_spawn, "player")),
                    _ => None,
                };
                if let Some((slot, what)) = slot {
                    if slot.is_some() {
                        return Err(MapError::DuplicateSpawn { what, x, y: row });
                    }
                    *slot = Some(cell);
                }

                if tile.has_floor() {
                    floor.insert(cell);
                }
                if tile == TileType::Wall {
                    walls.insert(cell);
                }
            }
        }

        Ok(MazeLayout {
            width,
            height,
            floor,
            walls,
            wizard_spawn: wizard_spawn.ok_or(MapError::MissingSpawn("wizard"))?,
            player_spawn: player_spawn.ok_or(MapError::MissingSpawn("player"))?,
        })
    }

    /// Build the movement grid for this layout. Fails when the floor does not
    /// span the full text rectangle.
    pub fn build_grid(&self, transform: TileTransform) -> Result<MovementGrid, GridError> {
        MovementGrid::build(
            &self.floor,
            &self.walls,
            transform,
            UVec2::new(self.width as u32, self.height as u32),
        )
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Load the configured maze and insert `MazeLayout` + `MovementGrid`.
/// A broken map is fatal: nothing downstream can run without a grid.
pub fn load_maze(mut commands: Commands, config: Res<PursuitConfig>) {
    span_scope!("maze_load");
    let path = &config.maze_file;
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read maze file {}: {}", path, e));

    let layout = MazeLayout::parse(&text)
        .unwrap_or_else(|e| panic!("Failed to parse maze file {}: {}", path, e));
    let grid = layout
        .build_grid(config.tile_transform())
        .unwrap_or_else(|e| panic!("Failed to build grid for {}: {}", path, e));

    info!("maze loaded: {} ({}x{})", path, layout.width, layout.height);
    commands.insert_resource(grid);
    commands.insert_resource(layout);
}

/// Keep `GridPosition` in step with `Transform` for anything standing on the
/// grid. Off-grid entities keep their last cell.
#[allow(clippy::type_complexity)]
fn track_grid_positions(
    grid: Option<Res<MovementGrid>>,
    mut query: Query<(&Transform, &mut GridPosition), Changed<Transform>>,
) {
    let Some(grid) = grid else { return };
    for (transform, mut pos) in &mut query {
        if let Some(node) = grid.world_to_node(transform.translation.as_dvec3()) {
            if *pos != node.grid {
                *pos = node.grid;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
