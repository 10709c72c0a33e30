//! # Marga-Nav: Grid Planning and Goal Tracking
//!
//! The navigation core of the Marga stack: turns an occupancy-grid map
//! ([`bhumi_map::GridMap`]) and a goal pose into a sparse waypoint
//! sequence, then supervises its execution against a motion backend
//! until the goal is reached or execution fails.
//!
//! ## Pipeline
//!
//! ```text
//! GridMap + start/goal poses
//!         │  PlannerKind::plan (A*, 8-connected)
//!         ▼
//! WaypointSeq (forward-linked, start → goal)
//!         │  GoalTracker::track_trajectory
//!         ▼
//! ActionStatus (terminal outcome)
//! ```
//!
//! The planner is deterministic for a fixed input and returns a
//! best-effort partial sequence when the goal is unreachable; callers
//! validate with [`WaypointSeq::reaches`]. The tracker dispatches one
//! absolute goal at a time, classifies every backend status as Healthy
//! (keep polling), Abnormal (terminal, surfaced verbatim) or Complete
//! (forward progress), and supports cooperative cancellation from any
//! thread via [`GoalTracker::cancel`].
//!
//! The motion backend and the pose source are trait seams
//! ([`MotionBackend`], [`PoseSource`]); no process-global state is
//! involved, so multiple trackers can run independently.

pub mod config;
pub mod error;
pub mod planning;
pub mod tracking;

pub use config::{NavConfig, PlannerConfig, TrackerConfig};
pub use error::{NavError, Result};
pub use planning::{AStarPlanner, MotionStep, PlannerKind, Waypoint, WaypointSeq};
pub use tracking::{
    ActionStatus, BackendError, GoalRequest, GoalStatusCode, GoalTracker, MotionBackend,
    PoseSource, StatusClass,
};
