use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Grid and spatial
// ---------------------------------------------------------------------------

/// Discrete cell coordinate inside a `MovementGrid`. `(0, 0)` is the
/// bottom-left cell; `y` grows upward like world space.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

/// The entity the wizard hunts. `defeated` is flipped by the wizard once its
/// cast lands.
#[derive(Component, Debug, Default)]
pub struct Quarry {
    pub defeated: bool,
}
