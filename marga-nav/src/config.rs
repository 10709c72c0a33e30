//! Configuration loading for the navigation stack.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::planning::PlannerKind;

/// Main configuration structure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

/// Path-planner settings.
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    /// Which planning algorithm to run.
    #[serde(default)]
    pub kind: PlannerKind,

    /// Waypoint reduction stride: 0 selects automatic reduction at
    /// direction changes, 1 keeps every cell, N > 1 keeps every N-th.
    #[serde(default = "default_step")]
    pub step: usize,
}

/// Goal-tracker settings.
#[derive(Clone, Debug, Deserialize)]
pub struct TrackerConfig {
    /// Distance at which a waypoint counts as reached (meters).
    #[serde(default = "default_min_gap")]
    pub min_gap: f32,

    /// Bounded wait for backend goal completion (seconds).
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: f32,

    /// Upper bound on tracking-loop iterations. `None` polls until the
    /// trajectory converges or the backend fails.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

impl TrackerConfig {
    /// The completion wait as a [`Duration`].
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.wait_timeout_secs.max(0.0))
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            kind: PlannerKind::default(),
            step: default_step(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_gap: default_min_gap(),
            wait_timeout_secs: default_wait_timeout_secs(),
            max_cycles: None,
        }
    }
}

// Default value functions
fn default_step() -> usize {
    0
}
fn default_min_gap() -> f32 {
    0.15
}
fn default_wait_timeout_secs() -> f32 {
    60.0
}

impl NavConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
