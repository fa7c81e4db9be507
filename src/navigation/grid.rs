//! Walkability grid built from a floor layer and a wall layer.

use std::collections::HashSet;

use bevy::math::DVec3;
use bevy::prelude::*;
use micromegas_tracing::prelude::info;

use crate::components::GridPosition;
use crate::error::GridError;
use crate::navigation::node::Node;

// ---------------------------------------------------------------------------
// Tile layers
// ---------------------------------------------------------------------------

/// Occupied cells of one tilemap layer, in tile-space coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileLayer {
    cells: HashSet<IVec2>,
}

impl TileLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: IVec2) {
        self.cells.insert(cell);
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().copied()
    }

    /// Inclusive `(min, max)` corners of the occupied cells.
    pub fn bounds(&self) -> Option<(IVec2, IVec2)> {
        let mut cells = self.cells.iter();
        let first = *cells.next()?;
        Some(cells.fold((first, first), |(lo, hi), c| (lo.min(*c), hi.max(*c))))
    }
}

impl FromIterator<IVec2> for TileLayer {
    fn from_iter<T: IntoIterator<Item = IVec2>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinate conversion
// ---------------------------------------------------------------------------

/// Maps tile-space cells to world space. A cell's world position is
/// `cell * cell_size + offset`; an offset of half a cell puts it at the
/// tile centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    pub cell_size: f64,
    pub offset: DVec3,
}

impl Default for TileTransform {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            offset: DVec3::new(0.5, 0.5, 0.0),
        }
    }
}

impl TileTransform {
    pub fn cell_to_world(&self, cell: IVec2) -> DVec3 {
        DVec3::new(
            cell.x as f64 * self.cell_size,
            cell.y as f64 * self.cell_size,
            0.0,
        ) + self.offset
    }

    /// Inverse of `cell_to_world`: the cell whose world position is nearest,
    /// each cell owning the half-open span `[centre - size/2, centre + size/2)`.
    pub fn world_to_cell(&self, world: DVec3) -> IVec2 {
        let local = (world - self.offset) / self.cell_size;
        IVec2::new(
            (local.x + 0.5).floor() as i32,
            (local.y + 0.5).floor() as i32,
        )
    }
}

// ---------------------------------------------------------------------------
// Movement grid resource
// ---------------------------------------------------------------------------

/// Read-only node array indexed `[x][y]`. Cells without a floor tile hold
/// no node.
#[derive(Resource, Debug, Clone)]
pub struct MovementGrid {
    width: u32,
    height: u32,
    /// Tile-space cell that maps to grid `(0, 0)`.
    origin: IVec2,
    transform: TileTransform,
    nodes: Vec<Option<Node>>,
}

impl MovementGrid {
    /// Build the grid from the floor and wall layers. `dimensions` must match
    /// the floor layer's extent exactly.
    pub fn build(
        floor: &TileLayer,
        walls: &TileLayer,
        transform: TileTransform,
        dimensions: UVec2,
    ) -> Result<Self, GridError> {
        if !(transform.cell_size.is_finite() && transform.cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(transform.cell_size));
        }
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(GridError::ZeroDimensions {
                width: dimensions.x,
                height: dimensions.y,
            });
        }
        let (min, max) = floor.bounds().ok_or(GridError::EmptyFloor)?;
        let span = (max - min + IVec2::ONE).as_uvec2();
        if span != dimensions {
            return Err(GridError::DimensionMismatch {
                expected: (dimensions.x, dimensions.y),
                found: (span.x, span.y),
            });
        }

        let mut grid = Self {
            width: dimensions.x,
            height: dimensions.y,
            origin: min,
            transform,
            nodes: vec![None; (dimensions.x as usize) * (dimensions.y as usize)],
        };

        for cell in floor.iter() {
            let world_position = transform.cell_to_world(cell);
            // Walls are probed at the floor tile's world position so both
            // layers only need to agree on the transform.
            let walkable = !walls.contains(transform.world_to_cell(world_position));
            let local = cell - min;
            let pos = GridPosition::new(local.x, local.y);
            if let Some(index) = grid.index_of(pos) {
                grid.nodes[index] = Some(Node::new(walkable, world_position, pos));
            }
        }

        info!(
            "movement grid built: {}x{} ({} floor, {} walkable)",
            grid.width,
            grid.height,
            floor.len(),
            grid.walkable_count()
        );
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> TileTransform {
        self.transform
    }

    /// Number of cells (present or not) in the backing array.
    pub fn cell_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Flat index of `pos`, or `None` outside `[0, width) x [0, height)`.
    pub fn index_of(&self, pos: GridPosition) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.x as usize * self.height as usize + pos.y as usize)
    }

    pub fn node(&self, pos: GridPosition) -> Option<&Node> {
        self.index_of(pos).and_then(|i| self.nodes[i].as_ref())
    }

    pub(crate) fn node_at_index(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    pub fn walkable_count(&self) -> usize {
        self.nodes().filter(|n| n.walkable).count()
    }

    /// Grid coordinate containing `world`. May lie outside the grid; far-off
    /// positions saturate instead of wrapping back into it.
    pub fn world_to_grid(&self, world: DVec3) -> GridPosition {
        let cell = self.transform.world_to_cell(world);
        GridPosition::new(
            cell.x.saturating_sub(self.origin.x),
            cell.y.saturating_sub(self.origin.y),
        )
    }

    /// World position of the centre of `pos`, if it lies inside the grid.
    pub fn grid_to_world(&self, pos: GridPosition) -> Option<DVec3> {
        self.in_bounds(pos).then(|| {
            self.transform
                .cell_to_world(self.origin + IVec2::new(pos.x, pos.y))
        })
    }

    /// Node under `world`. `None` both outside the grid and on cells with no
    /// floor; callers treat either as "nothing to path through".
    pub fn world_to_node(&self, world: DVec3) -> Option<&Node> {
        if !world.is_finite() {
            return None;
        }
        self.node(self.world_to_grid(world))
    }

    /// The cardinal neighbours of `node` that exist in the grid, scanned
    /// x-major over the surrounding 3x3 block with the centre and corners
    /// skipped.
    pub fn neighbors(&self, node: &Node) -> Vec<&Node> {
        let mut out = Vec::with_capacity(4);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx == 0) == (dy == 0) {
                    continue;
                }
                let pos = GridPosition::new(node.grid.x + dx, node.grid.y + dy);
                if let Some(n) = self.node(pos) {
                    out.push(n);
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn square_floor(size: i32) -> TileLayer {
        (0..size)
            .flat_map(|x| (0..size).map(move |y| IVec2::new(x, y)))
            .collect()
    }

    fn grid(size: i32, walls: &[(i32, i32)]) -> MovementGrid {
        let walls: TileLayer = walls.iter().map(|&(x, y)| IVec2::new(x, y)).collect();
        MovementGrid::build(
            &square_floor(size),
            &walls,
            TileTransform::default(),
            UVec2::splat(size as u32),
        )
        .unwrap()
    }

    #[test]
    fn walls_mark_nodes_unwalkable() {
        let g = grid(3, &[(1, 1)]);
        assert!(!g.node(GridPosition::new(1, 1)).unwrap().walkable);
        assert!(g.node(GridPosition::new(0, 1)).unwrap().walkable);
        assert_eq!(g.walkable_count(), 8);
    }

    #[test]
    fn world_to_node_roundtrip() {
        let g = grid(4, &[]);
        for node in g.nodes() {
            let found = g.world_to_node(node.world_position).unwrap();
            assert_eq!(found.grid, node.grid);
        }
    }

    #[test]
    fn world_to_node_uses_whole_tile() {
        let g = grid(4, &[]);
        // Tile (2, 1) is centred at (2.5, 1.5) and spans [2.0, 3.0) x [1.0, 2.0).
        let hit = g.world_to_node(DVec3::new(2.01, 1.99, 0.0)).unwrap();
        assert_eq!(hit.grid, GridPosition::new(2, 1));
    }

    #[test]
    fn world_to_node_out_of_bounds_is_none() {
        let g = grid(4, &[]);
        assert!(g.world_to_node(DVec3::new(-0.5, 1.0, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(1.0, 4.2, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(100.0, 100.0, 0.0)).is_none());
    }

    #[test]
    fn missing_floor_is_none() {
        let mut floor = square_floor(3);
        floor.cells.remove(&IVec2::new(1, 1));
        let g = MovementGrid::build(
            &floor,
            &TileLayer::new(),
            TileTransform::default(),
            UVec2::splat(3),
        )
        .unwrap();
        assert!(g.node(GridPosition::new(1, 1)).is_none());
        assert!(g.world_to_node(DVec3::new(1.5, 1.5, 0.0)).is_none());
    }

    #[test]
    fn offset_and_origin_are_honoured() {
        let floor: TileLayer = (-2..1)
            .flat_map(|x| (3..5).map(move |y| IVec2::new(x, y)))
            .collect();
        let transform = TileTransform {
            cell_size: 2.0,
            offset: DVec3::new(1.0, 1.0, 0.0),
        };
        let g = MovementGrid::build(&floor, &TileLayer::new(), transform, UVec2::new(3, 2))
            .unwrap();
        // Tile (-2, 3) is grid (0, 0), world (-3, 7).
        let origin = g.node(GridPosition::new(0, 0)).unwrap();
        assert_eq!(origin.world_position, DVec3::new(-3.0, 7.0, 0.0));
        assert_eq!(
            g.world_to_node(DVec3::new(-3.0, 7.0, 0.0)).unwrap().grid,
            GridPosition::new(0, 0)
        );
        assert_eq!(
            g.grid_to_world(GridPosition::new(2, 1)),
            Some(DVec3::new(1.0, 9.0, 0.0))
        );
    }

    #[test]
    fn far_positions_with_offset_origin_are_none() {
        let floor: TileLayer = (-2..1)
            .flat_map(|x| (3..5).map(move |y| IVec2::new(x, y)))
            .collect();
        let g = MovementGrid::build(
            &floor,
            &TileLayer::new(),
            TileTransform::default(),
            UVec2::new(3, 2),
        )
        .unwrap();
        assert!(g.world_to_node(DVec3::new(1.0e12, 3.5, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(-1.0e12, 3.5, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(-1.5, -1.0e12, 0.0)).is_none());
        assert_eq!(
            g.world_to_grid(DVec3::new(1.0e12, 3.5, 0.0)).x,
            i32::MAX
        );
    }

    #[test]
    fn non_finite_positions_are_none() {
        let g = grid(3, &[]);
        assert!(g.world_to_node(DVec3::new(f64::NAN, f64::NAN, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(0.5, f64::NAN, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(f64::INFINITY, 0.5, 0.0)).is_none());
        assert!(g.world_to_node(DVec3::new(0.5, 0.5, f64::NAN)).is_none());
    }

    #[test]
    fn neighbors_are_cardinal_and_in_bounds() {
        let g = grid(3, &[]);
        let centre = g.node(GridPosition::new(1, 1)).unwrap();
        let got: Vec<_> = g.neighbors(centre).iter().map(|n| n.grid).collect();
        assert_eq!(
            got,
            vec![
                GridPosition::new(0, 1),
                GridPosition::new(1, 0),
                GridPosition::new(1, 2),
                GridPosition::new(2, 1),
            ]
        );

        for node in g.nodes() {
            for n in g.neighbors(node) {
                let dx = (n.grid.x - node.grid.x).abs();
                let dy = (n.grid.y - node.grid.y).abs();
                assert_eq!(dx + dy, 1, "diagonal or self neighbour");
                assert!(g.in_bounds(n.grid));
            }
        }

        let corner = g.node(GridPosition::new(0, 0)).unwrap();
        assert_eq!(g.neighbors(corner).len(), 2);
    }

    #[test]
    fn neighbors_include_walls() {
        // Walkability is the pathfinder's concern.
        let g = grid(3, &[(1, 0)]);
        let corner = g.node(GridPosition::new(0, 0)).unwrap();
        assert!(g.neighbors(corner).iter().any(|n| !n.walkable));
    }

    #[test]
    fn dimension_mismatch_fails() {
        let err = MovementGrid::build(
            &square_floor(3),
            &TileLayer::new(),
            TileTransform::default(),
            UVec2::new(4, 3),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                expected: (4, 3),
                found: (3, 3)
            }
        );
    }

    #[test]
    fn empty_floor_and_bad_sizes_fail() {
        let empty = TileLayer::new();
        assert_eq!(
            MovementGrid::build(&empty, &empty, TileTransform::default(), UVec2::ONE)
                .unwrap_err(),
            GridError::EmptyFloor
        );
        assert!(matches!(
            MovementGrid::build(&square_floor(2), &empty, TileTransform::default(), UVec2::ZERO),
            Err(GridError::ZeroDimensions { .. })
        ));
        let bad = TileTransform {
            cell_size: 0.0,
            ..default()
        };
        assert_eq!(
            MovementGrid::build(&square_floor(2), &empty, bad, UVec2::splat(2)).unwrap_err(),
            GridError::InvalidCellSize(0.0)
        );
    }
}
