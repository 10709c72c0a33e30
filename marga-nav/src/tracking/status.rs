//! Goal status vocabulary and its control-flow classification.

use serde::{Deserialize, Serialize};

/// Raw status code reported by a motion backend, using the conventional
/// action-protocol numbering (0–9). Codes outside the table map to
/// [`ActionStatus::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalStatusCode(pub u8);

/// Lifecycle status of a dispatched motion goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// The goal has yet to be processed
    Pending,
    /// The goal is currently being processed
    Active,
    /// Cancelled after execution started, execution has completed
    Preempted,
    /// Achieved successfully
    Succeeded,
    /// Aborted during execution
    Aborted,
    /// Rejected without being processed
    Rejected,
    /// Cancelled after execution started, still executing
    Preempting,
    /// Cancelled before execution started, not yet confirmed
    Recalling,
    /// Cancelled before execution started
    Recalled,
    /// The client has lost track of the goal
    Lost,
    /// Status code outside the known vocabulary
    Unknown,
}

/// How the tracking loop reacts to a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// Keep polling; the goal is still moving through the queue.
    Healthy,
    /// Terminal failure; surface the status verbatim.
    Abnormal,
    /// Forward progress at the trajectory level.
    Complete,
    /// Outside the partition; continue conservatively.
    Indeterminate,
}

impl ActionStatus {
    /// Map a backend's native status code. Total: every unmapped code
    /// becomes [`ActionStatus::Unknown`].
    pub fn from_code(code: GoalStatusCode) -> Self {
        match code.0 {
            0 => ActionStatus::Pending,
            1 => ActionStatus::Active,
            2 => ActionStatus::Preempted,
            3 => ActionStatus::Succeeded,
            4 => ActionStatus::Aborted,
            5 => ActionStatus::Rejected,
            6 => ActionStatus::Preempting,
            7 => ActionStatus::Recalling,
            8 => ActionStatus::Recalled,
            9 => ActionStatus::Lost,
            _ => ActionStatus::Unknown,
        }
    }

    /// Partition this status for the tracking loop's control decision.
    ///
    /// `Active` counts as Complete rather than Healthy: completion of a
    /// waypoint goal is signalled by the backend having taken it up, not
    /// only by `Succeeded`. Callers checking for overall success should
    /// test the classification, not compare against `Succeeded`.
    pub fn classify(self) -> StatusClass {
        match self {
            ActionStatus::Pending | ActionStatus::Recalling | ActionStatus::Recalled => {
                StatusClass::Healthy
            }
            ActionStatus::Preempted
            | ActionStatus::Aborted
            | ActionStatus::Rejected
            | ActionStatus::Preempting
            | ActionStatus::Lost => StatusClass::Abnormal,
            ActionStatus::Active | ActionStatus::Succeeded => StatusClass::Complete,
            ActionStatus::Unknown => StatusClass::Indeterminate,
        }
    }

    /// Whether this status ends a tracking run.
    #[inline]
    pub fn is_abnormal(self) -> bool {
        self.classify() == StatusClass::Abnormal
    }
}
