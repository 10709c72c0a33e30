//! Boundary traits toward the motion backend and the pose source.

use std::time::Duration;

use thiserror::Error;

use bhumi_map::Pose2D;

use super::status::GoalStatusCode;

/// Errors surfaced by a motion backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("goal dispatch failed: {0}")]
    Dispatch(String),

    #[error("cancel publish failed: {0}")]
    Publish(String),
}

/// A motion goal as handed to the backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalRequest {
    /// Monotonically increasing sequence number within one tracker.
    pub seq: u64,
    /// Absolute target pose in the world frame.
    pub target: Pose2D,
}

/// The motion-execution service that drives the robot.
///
/// Implementations are shared across the tracking thread and callers
/// issuing [`cancel`](crate::tracking::GoalTracker::cancel), so all
/// methods take `&self`; interior mutability is the implementer's
/// concern.
pub trait MotionBackend: Send + Sync {
    /// Dispatch a goal for execution.
    fn send_goal(&self, goal: &GoalRequest) -> Result<(), BackendError>;

    /// Native status of the most recent goal.
    fn status(&self) -> GoalStatusCode;

    /// Block until the outstanding goal completes, up to `timeout`.
    /// Returns `false` when the wait expired first.
    fn wait_for_result(&self, timeout: Duration) -> bool;

    /// Publish a cancellation on the backend's cancel channel.
    fn publish_cancel(&self) -> Result<(), BackendError>;

    /// Direct cancellation of all outstanding goals; the fallback path
    /// when the cancel channel is unavailable.
    fn cancel_all(&self);
}

/// Source of the robot's current pose (a localizer or odometry).
///
/// Returns `None` when no estimate is available yet; an unavailable
/// pose is distinct from a robot standing at the origin.
pub trait PoseSource: Send + Sync {
    fn current_pose(&self) -> Option<Pose2D>;
}
