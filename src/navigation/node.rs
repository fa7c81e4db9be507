use bevy::math::DVec3;

use crate::components::GridPosition;

/// One cell of a `MovementGrid`. Immutable once the grid is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub walkable: bool,
    pub world_position: DVec3,
    pub grid: GridPosition,
}

impl Node {
    pub fn new(walkable: bool, world_position: DVec3, grid: GridPosition) -> Self {
        Self {
            walkable,
            world_position,
            grid,
        }
    }

    pub fn grid_x(&self) -> i32 {
        self.grid.x
    }

    pub fn grid_y(&self) -> i32 {
        self.grid.y
    }
}

/// Search scratch for one node, valid only for the duration of a single
/// `find_path` call. `parent` is the flat index of the previous node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCosts {
    pub g_cost: u32,
    pub h_cost: u32,
    pub parent: Option<usize>,
}

impl NodeCosts {
    pub fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}
