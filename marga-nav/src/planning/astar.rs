//! A* path planner over the occupancy grid.
//!
//! Searches the 8-connected grid with fixed motion-model costs and
//! reduces the resulting cell path to a sparse waypoint sequence.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::f32::consts::SQRT_2;

use bhumi_map::{GridCoord, GridMap, Pose2D};

use super::waypoint::{WaypointSeq, reduce};

/// One admissible move of the motion model.
#[derive(Clone, Copy, Debug)]
pub struct MotionStep {
    /// Column delta
    pub dx: i32,
    /// Row delta
    pub dy: i32,
    /// Traversal cost of the move
    pub cost: f32,
}

impl MotionStep {
    const fn new(dx: i32, dy: i32, cost: f32) -> Self {
        Self { dx, dy, cost }
    }
}

/// The default 8-connected motion model: cardinal moves cost 1, diagonal
/// moves √2. These are motion-model weights, independent of resolution.
pub const MOTION_8: [MotionStep; 8] = [
    MotionStep::new(1, 0, 1.0),
    MotionStep::new(0, 1, 1.0),
    MotionStep::new(-1, 0, 1.0),
    MotionStep::new(0, -1, 1.0),
    MotionStep::new(-1, -1, SQRT_2),
    MotionStep::new(-1, 1, SQRT_2),
    MotionStep::new(1, -1, SQRT_2),
    MotionStep::new(1, 1, SQRT_2),
];

/// Node created during the grid search; discarded after backtracking.
#[derive(Clone, Debug)]
struct SearchNode {
    cell: GridCoord,
    /// Accumulated path cost from the start cell.
    cost: f32,
    /// Grid index of the parent node in the closed set.
    parent: Option<usize>,
}

/// Frontier entry ordered by f-score, with an insertion counter as the
/// deterministic tie-break.
struct HeapEntry {
    f: f32,
    order: u64,
    idx: usize,
    g: f32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.order == other.order
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; earlier insertions win ties.
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of the raw grid search, before waypoint reduction.
struct SearchOutcome {
    /// Cell path in backtrack order (goal first, start last). When the
    /// goal was never reached this degenerates to the goal cell alone.
    path: Vec<GridCoord>,
    /// Accumulated cost attached to the goal cell.
    cost: f32,
    /// Whether the search expanded the goal cell.
    reached: bool,
}

/// A* grid planner.
pub struct AStarPlanner {
    motion: Vec<MotionStep>,
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AStarPlanner {
    /// Create a planner with the default 8-connected motion model.
    pub fn new() -> Self {
        Self {
            motion: MOTION_8.to_vec(),
        }
    }

    /// Create a planner with a custom motion model.
    pub fn with_motion(motion: Vec<MotionStep>) -> Self {
        Self { motion }
    }

    /// Plan from `start` to `goal` (world poses) and reduce the result
    /// to a waypoint sequence; `step` selects the reduction mode (see
    /// [`reduce`]).
    ///
    /// An unreachable or out-of-bounds goal yields a degenerate
    /// sequence rather than an error; callers validate with
    /// [`WaypointSeq::reaches`] before tracking it.
    pub fn plan(&self, grid: &GridMap, start: Pose2D, goal: Pose2D, step: usize) -> WaypointSeq {
        let start_px = grid.world_to_grid(start.position());
        let goal_px = grid.world_to_grid(goal.position());

        let outcome = self.search(grid, start_px, goal_px);
        if outcome.reached {
            tracing::debug!(
                "planned {} cells from ({}, {}) to ({}, {}), cost {:.2}",
                outcome.path.len(),
                start_px.x,
                start_px.y,
                goal_px.x,
                goal_px.y,
                outcome.cost
            );
        } else {
            tracing::warn!(
                "no path from ({}, {}) to ({}, {}); returning degenerate sequence",
                start_px.x,
                start_px.y,
                goal_px.x,
                goal_px.y
            );
        }

        let entries = reduce(&outcome.path, step)
            .into_iter()
            .map(|cell| {
                let w = grid.grid_to_world(cell);
                (cell, Pose2D::new(w.x, w.y, goal.theta))
            })
            .collect();
        WaypointSeq::link(entries)
    }

    /// Raw A* search over pixel coordinates.
    fn search(&self, grid: &GridMap, start: GridCoord, goal: GridCoord) -> SearchOutcome {
        let cols = grid.cols();
        let key = |c: GridCoord| c.y as usize * cols + c.x as usize;

        let mut open: HashMap<usize, SearchNode> = HashMap::new();
        let mut closed: HashMap<usize, SearchNode> = HashMap::new();
        let mut frontier = BinaryHeap::new();
        let mut order = 0u64;

        let mut goal_cost = 0.0;
        let mut goal_parent = None;
        let mut reached = false;

        if grid.in_bounds(start) {
            open.insert(
                key(start),
                SearchNode {
                    cell: start,
                    cost: 0.0,
                    parent: None,
                },
            );
            frontier.push(HeapEntry {
                f: heuristic(start, goal),
                order,
                idx: key(start),
                g: 0.0,
            });
        }

        while let Some(entry) = frontier.pop() {
            if closed.contains_key(&entry.idx) {
                continue;
            }
            let current = match open.get(&entry.idx) {
                // A later push superseded this entry with a lower cost.
                Some(node) if entry.g <= node.cost => node.clone(),
                _ => continue,
            };

            if current.cell == goal {
                goal_parent = current.parent;
                goal_cost = current.cost;
                reached = true;
                break;
            }

            open.remove(&entry.idx);
            closed.insert(entry.idx, current.clone());

            for step in &self.motion {
                let next = GridCoord::new(current.cell.x + step.dx, current.cell.y + step.dy);
                if !verify_node(grid, next) {
                    continue;
                }
                let next_key = key(next);
                if closed.contains_key(&next_key) {
                    continue;
                }
                let cost = current.cost + step.cost;
                // Only a strictly better cost replaces an open node.
                if open.get(&next_key).is_some_and(|n| n.cost <= cost) {
                    continue;
                }
                order += 1;
                frontier.push(HeapEntry {
                    f: cost + heuristic(next, goal),
                    order,
                    idx: next_key,
                    g: cost,
                });
                open.insert(
                    next_key,
                    SearchNode {
                        cell: next,
                        cost,
                        parent: Some(entry.idx),
                    },
                );
            }
        }

        // Backtrack from the goal through whatever parent chain was
        // attached to it; an unreached goal yields just the goal cell.
        let mut path = vec![goal];
        let mut parent = goal_parent;
        while let Some(idx) = parent {
            let node = &closed[&idx];
            path.push(node.cell);
            parent = node.parent;
        }

        SearchOutcome {
            path,
            cost: goal_cost,
            reached,
        }
    }
}

/// Whether a cell may be expanded: inside the grid interior (border
/// cells are rejected) and not an obstacle.
fn verify_node(grid: &GridMap, c: GridCoord) -> bool {
    if c.x <= 0 || c.y <= 0 {
        return false;
    }
    if c.x as usize + 1 >= grid.cols() || c.y as usize + 1 >= grid.rows() {
        return false;
    }
    !grid.is_obstacle(c)
}

/// Heuristic: Euclidean cell distance to the goal, weight 1.0.
/// Admissible and consistent on a uniform-cost 8-connected grid.
#[inline]
fn heuristic(from: GridCoord, to: GridCoord) -> f32 {
    from.distance(&to)
}
