//! Goal tracker: walks a waypoint sequence against the motion backend.

use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, error, info, warn};

use bhumi_map::{GridMap, Pose2D};

use crate::config::NavConfig;
use crate::error::{NavError, Result};
use crate::planning::WaypointSeq;

use super::backend::{GoalRequest, MotionBackend, PoseSource};
use super::status::{ActionStatus, StatusClass};

/// Mutable goal bookkeeping, guarded by the tracker's single lock.
#[derive(Debug, Default)]
struct GoalState {
    /// The most recently dispatched absolute goal.
    current_goal: Option<GoalRequest>,
    /// Monotone dispatch counter; each goal gets a fresh number.
    action_seq: u64,
}

/// Trajectory execution state machine.
///
/// One tracker is created per navigation request and discarded when the
/// run terminates. The backend and pose source are injected; the map is
/// shared read-only. Cloning is cheap (the clones share goal state), so
/// an asynchronous run can hand a clone to its worker thread.
pub struct GoalTracker<B, L> {
    map: Arc<GridMap>,
    backend: Arc<B>,
    localizer: Arc<L>,
    goal: Arc<Mutex<GoalState>>,
    config: NavConfig,
}

impl<B, L> Clone for GoalTracker<B, L> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
            backend: Arc::clone(&self.backend),
            localizer: Arc::clone(&self.localizer),
            goal: Arc::clone(&self.goal),
            config: self.config.clone(),
        }
    }
}

impl<B, L> GoalTracker<B, L>
where
    B: MotionBackend + 'static,
    L: PoseSource + 'static,
{
    /// Create a tracker for one navigation request.
    pub fn new(map: Arc<GridMap>, backend: Arc<B>, localizer: Arc<L>, config: NavConfig) -> Self {
        Self {
            map,
            backend,
            localizer,
            goal: Arc::new(Mutex::new(GoalState::default())),
            config,
        }
    }

    /// Plan a path to `goal` and drive it to completion.
    ///
    /// The start pose comes from the pose source unless given
    /// explicitly; without either the goal is `Rejected` before
    /// anything is dispatched. With `async_run` the tracking loop is
    /// spawned on a worker thread and `Pending` is returned
    /// immediately; progress is then observable via
    /// [`state`](GoalTracker::state).
    pub fn goto(
        &self,
        goal: Pose2D,
        start: Option<Pose2D>,
        async_run: bool,
    ) -> Result<ActionStatus> {
        let start = match start.or_else(|| self.localizer.current_pose()) {
            Some(pose) => pose,
            None => {
                warn!("no start pose available; rejecting goal");
                return Ok(ActionStatus::Rejected);
            }
        };

        let plan = self
            .config
            .planner
            .kind
            .plan(&self.map, start, goal, self.config.planner.step);

        let goal_px = self.map.world_to_grid(goal.position());
        if !plan.reaches(goal_px) {
            warn!(
                "planned sequence does not reach goal cell ({}, {}); tracking best-effort path",
                goal_px.x, goal_px.y
            );
        }

        let min_gap = self.config.tracker.min_gap;
        if async_run {
            let tracker = self.clone();
            thread::Builder::new()
                .name("goal-tracking".into())
                .spawn(move || match tracker.track_trajectory(plan, min_gap) {
                    Ok(status) => info!("async tracking finished: {:?}", status),
                    Err(e) => error!("async tracking failed: {}", e),
                })
                .map_err(|e| NavError::Tracking(format!("failed to spawn tracking thread: {e}")))?;
            return Ok(ActionStatus::Pending);
        }

        self.track_trajectory(plan, min_gap)
    }

    /// Drive a waypoint sequence to completion.
    ///
    /// Each iteration reads the current pose, advances past every
    /// waypoint within `min_gap`, and dispatches the next one as an
    /// absolute goal. Healthy backend statuses keep the loop polling;
    /// the first Abnormal status is returned verbatim. Exhausting the
    /// sequence reports `Active` — the backend's forward-progress
    /// signal doubles as trajectory completion, so callers test the
    /// Complete classification rather than `Succeeded` equality.
    pub fn track_trajectory(&self, plan: WaypointSeq, min_gap: f32) -> Result<ActionStatus> {
        let gap = min_gap.abs();
        let mut cursor = plan.first();
        let mut cycles: u64 = 0;

        loop {
            if self
                .config
                .tracker
                .max_cycles
                .is_some_and(|max| cycles >= max)
            {
                warn!("tracking stopped after {} cycles without convergence", cycles);
                self.cancel();
                return Ok(ActionStatus::Aborted);
            }
            cycles += 1;

            let Some(current) = self.localizer.current_pose() else {
                error!("pose source has no estimate; abandoning trajectory");
                return Ok(ActionStatus::Lost);
            };

            while let Some(wp) = cursor {
                if current.distance(&wp.pose) > gap {
                    break;
                }
                debug!("waypoint {} reached", wp.seq);
                cursor = wp.next.as_deref();
            }
            let Some(target) = cursor else {
                info!("trajectory execution complete");
                return Ok(ActionStatus::Active);
            };

            let absolute = current.compose(target.pose);
            let status = self.goto_absolute(absolute, false)?;
            match status.classify() {
                StatusClass::Healthy => continue,
                StatusClass::Abnormal => {
                    error!("trajectory execution failed: {:?}", status);
                    return Ok(status);
                }
                StatusClass::Complete | StatusClass::Indeterminate => continue,
            }
        }
    }

    /// Dispatch a single absolute goal to the backend.
    ///
    /// Goal bookkeeping is guarded by one mutex, so dispatches from the
    /// same tracker are strictly sequential and each gets a fresh
    /// sequence number. In synchronous mode the call blocks for
    /// completion up to the configured timeout; an expired wait cancels
    /// the goal and reports `Aborted`. The guard is released on every
    /// path out of this function, panics included.
    pub fn goto_absolute(&self, target: Pose2D, async_run: bool) -> Result<ActionStatus> {
        let mut guard = self
            .goal
            .lock()
            .map_err(|e| NavError::Tracking(format!("goal lock poisoned: {e}")))?;

        guard.action_seq += 1;
        let request = GoalRequest {
            seq: guard.action_seq,
            target,
        };
        guard.current_goal = Some(request);
        info!(
            "dispatching goal #{} -> ({:.2}, {:.2}, {:.2})",
            request.seq, target.x, target.y, target.theta
        );

        if let Err(e) = self.backend.send_goal(&request) {
            error!("goal #{} dispatch failed: {}", request.seq, e);
            return Ok(ActionStatus::Rejected);
        }

        let mut status = ActionStatus::from_code(self.backend.status());
        if !async_run {
            if self.backend.wait_for_result(self.config.tracker.wait_timeout()) {
                status = ActionStatus::from_code(self.backend.status());
            } else {
                error!(
                    "goal #{} did not complete within {:?}; cancelling",
                    request.seq,
                    self.config.tracker.wait_timeout()
                );
                self.cancel();
                status = ActionStatus::Aborted;
            }
        }
        Ok(status)
    }

    /// Best-effort cancellation of outstanding goals.
    ///
    /// Publishes on the backend's cancel channel and falls back to the
    /// direct cancel call when the publish fails. Takes no goal lock,
    /// so it is safe from any thread while a dispatch is blocked, and
    /// safe when nothing is outstanding.
    pub fn cancel(&self) {
        warn!("cancelling outstanding goals");
        if let Err(e) = self.backend.publish_cancel() {
            debug!("cancel publish failed: {}; falling back to direct cancel", e);
            self.backend.cancel_all();
        }
    }

    /// Current backend status, mapped into the tracker vocabulary.
    pub fn state(&self) -> ActionStatus {
        ActionStatus::from_code(self.backend.status())
    }

    /// The most recently dispatched goal, if any.
    pub fn current_goal(&self) -> Result<Option<GoalRequest>> {
        Ok(self
            .goal
            .lock()
            .map_err(|e| NavError::Tracking(format!("goal lock poisoned: {e}")))?
            .current_goal)
    }
}
