//! Tile-grid navigation: the walkability grid and the A* search over it.
//!
//! The grid is built once from static tile layers and never changes, so the
//! search keeps all of its bookkeeping in per-call scratch and can be run as
//! often as the wizard needs.

pub mod grid;
pub mod node;
pub mod pathfinder;

pub use grid::{MovementGrid, TileLayer, TileTransform};
pub use node::{Node, NodeCosts};
pub use pathfinder::{find_path, heuristic_cost, path_cost, STEP_COST};
