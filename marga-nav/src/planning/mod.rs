//! Path planning: grid search and waypoint reduction.

mod astar;
mod waypoint;

pub use astar::{AStarPlanner, MOTION_8, MotionStep};
pub use waypoint::{Iter, Waypoint, WaypointSeq, reduce};

use bhumi_map::{GridMap, Pose2D};
use serde::Deserialize;

/// The available planning algorithms, selected by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlannerKind {
    /// 8-connected A* grid search.
    #[default]
    AStar,
}

impl PlannerKind {
    /// Run the selected planner.
    pub fn plan(self, grid: &GridMap, start: Pose2D, goal: Pose2D, step: usize) -> WaypointSeq {
        match self {
            PlannerKind::AStar => AStarPlanner::new().plan(grid, start, goal, step),
        }
    }
}
