//! Drives the goal tracker end to end against an in-memory backend.
//!
//! The mock backend "executes" each goal by teleporting the simulated
//! robot onto the target pose and reporting success, so a full
//! plan-and-track cycle runs without hardware.
//!
//! ```sh
//! RUST_LOG=marga_nav=debug cargo run --example goto_mock
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bhumi_map::{GridMap, GridMeta, Pose2D};
use marga_nav::{
    BackendError, GoalRequest, GoalStatusCode, GoalTracker, MotionBackend, NavConfig, PoseSource,
};

/// Simulated robot state shared by the backend and the localizer.
struct SimRobot {
    pose: Mutex<Pose2D>,
}

/// Backend that executes goals instantaneously.
struct TeleportBackend {
    robot: Arc<SimRobot>,
}

impl MotionBackend for TeleportBackend {
    fn send_goal(&self, goal: &GoalRequest) -> Result<(), BackendError> {
        *self.robot.pose.lock().unwrap() = goal.target;
        Ok(())
    }

    fn status(&self) -> GoalStatusCode {
        GoalStatusCode(3) // Succeeded
    }

    fn wait_for_result(&self, _timeout: Duration) -> bool {
        true
    }

    fn publish_cancel(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn cancel_all(&self) {}
}

struct SimLocalizer {
    robot: Arc<SimRobot>,
}

impl PoseSource for SimLocalizer {
    fn current_pose(&self) -> Option<Pose2D> {
        Some(*self.robot.pose.lock().unwrap())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marga_nav=info".parse().unwrap()),
        )
        .init();

    // 2m x 2m map at 5cm resolution, robot starting at the world origin.
    let meta = GridMeta {
        resolution: 0.05,
        origin: [-1.0, -1.0, 0.0],
        occupied_thresh: 0.65,
        free_thresh: 0.196,
        negate: false,
    };
    let mut raw = vec![255u8; 40 * 40];
    // A dark (occupied) block in the north-west corner of the image.
    for y in 2..8 {
        for x in 2..8 {
            raw[y * 40 + x] = 0;
        }
    }
    let map = Arc::new(GridMap::from_raw(meta, 40, 40, &raw).expect("valid map"));

    let robot = Arc::new(SimRobot {
        pose: Mutex::new(Pose2D::identity()),
    });
    let backend = Arc::new(TeleportBackend {
        robot: Arc::clone(&robot),
    });
    let localizer = Arc::new(SimLocalizer {
        robot: Arc::clone(&robot),
    });

    let tracker = GoalTracker::new(map, backend, localizer, NavConfig::default());

    let goal = Pose2D::new(0.5, 0.5, 0.0);
    match tracker.goto(goal, None, false) {
        Ok(status) => {
            println!("navigation finished: {:?} ({:?})", status, status.classify());
            let pose = robot.pose.lock().unwrap();
            println!("robot ended at ({:.2}, {:.2})", pose.x, pose.y);
        }
        Err(e) => eprintln!("navigation failed: {}", e),
    }
}
