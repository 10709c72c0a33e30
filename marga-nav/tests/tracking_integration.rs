//! Integration tests for the goal tracker against mock collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bhumi_map::{CellType, GridCoord, GridMap, GridMeta, Pose2D};
use marga_nav::{
    ActionStatus, BackendError, GoalRequest, GoalStatusCode, GoalTracker, MotionBackend,
    NavConfig, PoseSource, WaypointSeq,
};

/// Backend whose per-goal outcomes are scripted up front.
///
/// Each dispatched goal settles to the next scripted status code;
/// when the script runs dry, `idle` is reported.
struct ScriptedBackend {
    outcomes: Mutex<VecDeque<u8>>,
    current: Mutex<u8>,
    sent: Mutex<Vec<GoalRequest>>,
    wait_ok: bool,
    publish_ok: bool,
    publishes: AtomicUsize,
    direct_cancels: AtomicUsize,
}

impl ScriptedBackend {
    fn new(outcomes: &[u8], idle: u8) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
            current: Mutex::new(idle),
            sent: Mutex::new(Vec::new()),
            wait_ok: true,
            publish_ok: true,
            publishes: AtomicUsize::new(0),
            direct_cancels: AtomicUsize::new(0),
        }
    }

    fn with_wait_timeout(mut self) -> Self {
        self.wait_ok = false;
        self
    }

    fn with_broken_cancel_channel(mut self) -> Self {
        self.publish_ok = false;
        self
    }

    fn sent_goals(&self) -> Vec<GoalRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl MotionBackend for ScriptedBackend {
    fn send_goal(&self, goal: &GoalRequest) -> Result<(), BackendError> {
        self.sent.lock().unwrap().push(*goal);
        if let Some(code) = self.outcomes.lock().unwrap().pop_front() {
            *self.current.lock().unwrap() = code;
        }
        Ok(())
    }

    fn status(&self) -> GoalStatusCode {
        GoalStatusCode(*self.current.lock().unwrap())
    }

    fn wait_for_result(&self, _timeout: Duration) -> bool {
        self.wait_ok
    }

    fn publish_cancel(&self) -> Result<(), BackendError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        if self.publish_ok {
            Ok(())
        } else {
            Err(BackendError::Publish("cancel channel down".into()))
        }
    }

    fn cancel_all(&self) {
        self.direct_cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pose source that replays a script; the final entry repeats forever.
struct ScriptedLocalizer {
    poses: Mutex<VecDeque<Option<Pose2D>>>,
    last: Mutex<Option<Pose2D>>,
}

impl ScriptedLocalizer {
    fn new(poses: &[Option<Pose2D>]) -> Self {
        Self {
            poses: Mutex::new(poses.iter().copied().collect()),
            last: Mutex::new(None),
        }
    }

    fn at(pose: Pose2D) -> Self {
        Self::new(&[Some(pose)])
    }

    fn unavailable() -> Self {
        Self::new(&[None])
    }
}

impl PoseSource for ScriptedLocalizer {
    fn current_pose(&self) -> Option<Pose2D> {
        let mut queue = self.poses.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = queue.pop_front() {
            *last = next;
        }
        *last
    }
}

fn free_map() -> Arc<GridMap> {
    let meta = GridMeta {
        resolution: 0.1,
        origin: [0.0, 0.0, 0.0],
        occupied_thresh: 0.65,
        free_thresh: 0.196,
        negate: false,
    };
    Arc::new(GridMap::from_classified(meta, 20, 20, vec![CellType::Free; 400]).unwrap())
}

fn tracker(
    backend: ScriptedBackend,
    localizer: ScriptedLocalizer,
) -> (
    GoalTracker<ScriptedBackend, ScriptedLocalizer>,
    Arc<ScriptedBackend>,
) {
    let backend = Arc::new(backend);
    let t = GoalTracker::new(
        free_map(),
        Arc::clone(&backend),
        Arc::new(localizer),
        NavConfig::default(),
    );
    (t, backend)
}

fn seq(world: &[(f32, f32)]) -> WaypointSeq {
    WaypointSeq::link(
        world
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (GridCoord::new(i as i32, 0), Pose2D::new(x, y, 0.0)))
            .collect(),
    )
}

#[test]
fn completes_with_zero_dispatches_when_already_at_goal() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[], 0),
        ScriptedLocalizer::at(Pose2D::new(1.0, 1.0, 0.0)),
    );
    // Both waypoints sit within min_gap of the current pose.
    let plan = seq(&[(1.0, 1.0), (1.05, 1.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Active);
    assert_eq!(status.classify(), marga_nav::StatusClass::Complete);
    assert!(backend.sent_goals().is_empty());
}

#[test]
fn walks_waypoints_until_exhaustion() {
    // Pose script: at start, then at wp1, then at wp2.
    let localizer = ScriptedLocalizer::new(&[
        Some(Pose2D::new(0.0, 0.0, 0.0)),
        Some(Pose2D::new(1.0, 0.0, 0.0)),
        Some(Pose2D::new(2.0, 0.0, 0.0)),
    ]);
    // First goal stays Pending (healthy), second one succeeds.
    let (tracker, backend) = tracker(ScriptedBackend::new(&[0, 3], 3), localizer);
    let plan = seq(&[(1.0, 0.0), (2.0, 0.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Active);
    assert_eq!(backend.sent_goals().len(), 2);
}

#[test]
fn sequence_numbers_are_monotone() {
    let localizer = ScriptedLocalizer::new(&[
        Some(Pose2D::new(0.0, 0.0, 0.0)),
        Some(Pose2D::new(1.0, 0.0, 0.0)),
        Some(Pose2D::new(2.0, 0.0, 0.0)),
    ]);
    let (tracker, backend) = tracker(ScriptedBackend::new(&[3, 3], 3), localizer);
    let plan = seq(&[(1.0, 0.0), (2.0, 0.0)]);

    tracker.track_trajectory(plan, 0.15).unwrap();
    let seqs: Vec<u64> = backend.sent_goals().iter().map(|g| g.seq).collect();
    assert_eq!(seqs, vec![1, 2]);
    assert_eq!(tracker.current_goal().unwrap().unwrap().seq, 2);
}

#[test]
fn first_abnormal_status_is_terminal_and_verbatim() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[5], 5),
        ScriptedLocalizer::at(Pose2D::identity()),
    );
    let plan = seq(&[(1.0, 0.0), (2.0, 0.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Rejected);
    // No advance to the second waypoint after the failure.
    assert_eq!(backend.sent_goals().len(), 1);
}

#[test]
fn wait_timeout_cancels_and_aborts() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[1], 1).with_wait_timeout(),
        ScriptedLocalizer::at(Pose2D::identity()),
    );
    let plan = seq(&[(1.0, 0.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Aborted);
    assert_eq!(backend.publishes.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_status_does_not_terminate() {
    // Code 42 is unmapped -> Unknown -> keep polling; the follow-up
    // pose lands on the waypoint so the run completes.
    let localizer = ScriptedLocalizer::new(&[
        Some(Pose2D::new(0.0, 0.0, 0.0)),
        Some(Pose2D::new(1.0, 0.0, 0.0)),
    ]);
    let (tracker, backend) = tracker(ScriptedBackend::new(&[42], 42), localizer);
    let plan = seq(&[(1.0, 0.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Active);
    assert_eq!(backend.sent_goals().len(), 1);
}

#[test]
fn pose_loss_mid_run_is_terminal_lost() {
    let localizer = ScriptedLocalizer::new(&[Some(Pose2D::identity()), None]);
    let (tracker, backend) = tracker(ScriptedBackend::new(&[0], 0), localizer);
    let plan = seq(&[(1.0, 0.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Lost);
    assert_eq!(backend.sent_goals().len(), 1);
}

#[test]
fn max_cycles_bounds_a_nonconverging_run() {
    let mut config = NavConfig::default();
    config.tracker.max_cycles = Some(5);

    let backend = Arc::new(ScriptedBackend::new(&[], 0)); // forever Pending
    let tracker = GoalTracker::new(
        free_map(),
        Arc::clone(&backend),
        Arc::new(ScriptedLocalizer::at(Pose2D::identity())),
        config,
    );
    let plan = seq(&[(5.0, 5.0)]);

    let status = tracker.track_trajectory(plan, 0.15).unwrap();
    assert_eq!(status, ActionStatus::Aborted);
    assert_eq!(backend.sent_goals().len(), 5);
    assert_eq!(backend.publishes.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_without_outstanding_goal_is_safe() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[], 0),
        ScriptedLocalizer::at(Pose2D::identity()),
    );
    tracker.cancel();
    assert_eq!(tracker.current_goal().unwrap(), None);
    assert_eq!(backend.publishes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.direct_cancels.load(Ordering::SeqCst), 0);
}

#[test]
fn cancel_falls_back_to_direct_cancel() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[], 0).with_broken_cancel_channel(),
        ScriptedLocalizer::at(Pose2D::identity()),
    );
    tracker.cancel();
    assert_eq!(backend.publishes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.direct_cancels.load(Ordering::SeqCst), 1);
}

#[test]
fn goto_rejects_without_any_start_pose() {
    let (tracker, backend) = tracker(
        ScriptedBackend::new(&[], 0),
        ScriptedLocalizer::unavailable(),
    );
    let status = tracker
        .goto(Pose2D::new(1.0, 1.0, 0.0), None, false)
        .unwrap();
    assert_eq!(status, ActionStatus::Rejected);
    assert!(backend.sent_goals().is_empty());
}

#[test]
fn async_goto_returns_pending_immediately() {
    // The localizer sits on the goal, so the spawned run finishes on
    // its own; the caller sees Pending regardless.
    let (tracker, _backend) = tracker(
        ScriptedBackend::new(&[], 3),
        ScriptedLocalizer::at(Pose2D::new(1.0, 1.0, 0.0)),
    );
    let status = tracker
        .goto(Pose2D::new(1.0, 1.0, 0.0), None, true)
        .unwrap();
    assert_eq!(status, ActionStatus::Pending);
}

#[test]
fn goto_plans_over_the_map_and_tracks() {
    // Start (0.3, 0.3) and goal (1.0, 1.0) are a pure diagonal on the
    // grid, so auto reduction keeps exactly start and goal. The pose
    // script then walks both.
    let localizer = ScriptedLocalizer::new(&[
        Some(Pose2D::new(0.3, 0.3, 0.0)),
        Some(Pose2D::new(1.0, 1.0, 0.0)),
    ]);
    let (tracker, backend) = tracker(ScriptedBackend::new(&[3], 3), localizer);

    let status = tracker
        .goto(Pose2D::new(1.0, 1.0, 0.0), None, false)
        .unwrap();
    assert_eq!(status, ActionStatus::Active);
    assert_eq!(backend.sent_goals().len(), 1);
}
