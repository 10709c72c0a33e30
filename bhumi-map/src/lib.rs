//! # Bhumi-Map: Occupancy-Grid Map Model
//!
//! A small library providing the map model used by the Marga navigation
//! stack: an occupancy grid with resolution/origin metadata and the
//! bidirectional transforms between integer pixel (grid-cell) coordinates
//! and continuous world coordinates in meters.
//!
//! ## Coordinate frames
//!
//! - **Pixel frame**: integer `(x, y)` cell indices, `x` = column,
//!   `y` = row. Row 0 is the top of the stored image, so the vertical
//!   axis is flipped relative to the world frame.
//! - **World frame**: continuous `(x, y)` in meters, X-forward, Y-left,
//!   counter-clockwise positive rotation (ROS REP-103).
//!
//! The grid may be cropped to its obstacle bounding box after loading
//! ([`GridMap::shrink_to_obstacles`]); the recorded crop offset keeps the
//! transforms consistent with the original, uncropped frame.

pub mod core;
pub mod grid;

pub use crate::core::{CellType, GridCoord, Pose2D, WorldPoint};
pub use crate::grid::{GridMap, GridMeta, MapError};
