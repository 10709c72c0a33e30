//! Map metadata as supplied by a map loader.

use serde::{Deserialize, Serialize};

/// Metadata describing how a stored grid maps into the world frame.
///
/// This mirrors the sidecar file that usually accompanies a grid image:
/// spatial resolution, the world pose of cell (0, 0), the occupancy
/// thresholds and the intensity polarity flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridMeta {
    /// Meters per cell. Must be > 0.
    pub resolution: f32,

    /// World-frame offset of the grid origin: x, y in meters, plus a
    /// third component carried through unchanged (conventionally yaw).
    pub origin: [f32; 3],

    /// Normalized occupancy above which a cell is an obstacle.
    pub occupied_thresh: f32,

    /// Normalized occupancy below which a cell is free.
    pub free_thresh: f32,

    /// Intensity polarity: when set, raw intensity IS occupancy; when
    /// clear, occupancy is the inverted intensity (white = free).
    #[serde(default)]
    pub negate: bool,
}

impl GridMeta {
    /// Normalize a raw 8-bit intensity into [0, 1] occupancy,
    /// honoring the polarity flag.
    #[inline]
    pub fn occupancy(&self, raw: u8) -> f32 {
        if self.negate {
            f32::from(raw) / 255.0
        } else {
            (255.0 - f32::from(raw)) / 255.0
        }
    }
}
