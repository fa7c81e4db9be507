//! A* over a `MovementGrid`.
//!
//! Costs use the usual 10/14 integer scale. Only cardinal steps are ever
//! taken, but the heuristic keeps the diagonal-aware form so estimates stay
//! comparable with grids that allow them.

use std::collections::BTreeSet;

use bevy::math::DVec3;
use micromegas_tracing::prelude::span_scope;

use crate::components::GridPosition;
use crate::navigation::grid::MovementGrid;
use crate::navigation::node::{Node, NodeCosts};

/// Cost of one cardinal step.
pub const STEP_COST: u32 = 10;
/// Cost of one diagonal step, used by the heuristic only.
pub const DIAGONAL_COST: u32 = 14;

/// Open-set entry. Field order is the pop order: lowest `f`, then lowest `h`,
/// then lowest `x`, then lowest `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    h: u32,
    x: i32,
    y: i32,
    index: usize,
}

/// Estimated cost between two cells: `14 * min(dx, dy) + 10 * |dx - dy|`.
pub fn heuristic_cost(a: GridPosition, b: GridPosition) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    DIAGONAL_COST * dx.min(dy) + STEP_COST * dx.abs_diff(dy)
}

/// Total step cost of walking `path` starting from `start`. Consecutive
/// cells are expected to be adjacent.
pub fn path_cost(start: GridPosition, path: &[&Node]) -> u32 {
    let mut prev = start;
    let mut total = 0;
    for node in path {
        total += heuristic_cost(prev, node.grid);
        prev = node.grid;
    }
    total
}

/// Shortest walkable path from `start` to `goal`, excluding the start node and
/// including the goal node.
///
/// Returns an empty path when either position has no node, when both resolve
/// to the same node, and when the goal is sealed off. Callers that need to
/// tell those apart check positions themselves.
pub fn find_path<'g>(grid: &'g MovementGrid, start: DVec3, goal: DVec3) -> Vec<&'g Node> {
    span_scope!("astar");

    let Some(goal_node) = grid.world_to_node(goal) else {
        return Vec::new();
    };
    let Some(start_node) = grid.world_to_node(start) else {
        return Vec::new();
    };
    if start_node.grid == goal_node.grid {
        return Vec::new();
    }
    let (Some(start_index), Some(goal_index)) =
        (grid.index_of(start_node.grid), grid.index_of(goal_node.grid))
    else {
        return Vec::new();
    };

    // Absent scratch means "not yet reached" (infinite g).
    let mut costs: Vec<Option<NodeCosts>> = vec![None; grid.cell_count()];
    let mut closed = vec![false; grid.cell_count()];
    let mut open = BTreeSet::new();

    let h = heuristic_cost(start_node.grid, goal_node.grid);
    costs[start_index] = Some(NodeCosts {
        g_cost: 0,
        h_cost: h,
        parent: None,
    });
    open.insert(OpenEntry {
        f: h,
        h,
        x: start_node.grid.x,
        y: start_node.grid.y,
        index: start_index,
    });

    while let Some(entry) = open.pop_first() {
        let current_index = entry.index;
        closed[current_index] = true;

        if current_index == goal_index {
            return retrace(grid, &costs, start_index, goal_index);
        }

        let Some(current) = grid.node_at_index(current_index) else {
            continue;
        };
        let current_g = costs[current_index].map_or(0, |c| c.g_cost);

        for neighbour in grid.neighbors(current) {
            if !neighbour.walkable {
                continue;
            }
            let Some(n_index) = grid.index_of(neighbour.grid) else {
                continue;
            };
            if closed[n_index] {
                continue;
            }

            let tentative = current_g + STEP_COST;
            let previous = costs[n_index];
            if previous.is_some_and(|p| tentative >= p.g_cost) {
                continue;
            }

            if let Some(p) = previous {
                open.remove(&OpenEntry {
                    f: p.f_cost(),
                    h: p.h_cost,
                    x: neighbour.grid.x,
                    y: neighbour.grid.y,
                    index: n_index,
                });
            }
            let next = NodeCosts {
                g_cost: tentative,
                h_cost: heuristic_cost(neighbour.grid, goal_node.grid),
                parent: Some(current_index),
            };
            costs[n_index] = Some(next);
            open.insert(OpenEntry {
                f: next.f_cost(),
                h: next.h_cost,
                x: neighbour.grid.x,
                y: neighbour.grid.y,
                index: n_index,
            });
        }
    }

    Vec::new()
}

fn retrace<'g>(
    grid: &'g MovementGrid,
    costs: &[Option<NodeCosts>],
    start_index: usize,
    goal_index: usize,
) -> Vec<&'g Node> {
    let mut path = Vec::new();
    let mut cursor = goal_index;
    while cursor != start_index {
        let Some(node) = grid.node_at_index(cursor) else {
            debug_assert!(false, "parent chain reached empty cell {cursor}");
            break;
        };
        path.push(node);
        match costs[cursor].and_then(|c| c.parent) {
            Some(parent) => cursor = parent,
            None => {
                debug_assert!(false, "parent chain broken at cell {cursor}");
                break;
            }
        }
    }
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
