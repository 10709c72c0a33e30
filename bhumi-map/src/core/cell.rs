//! Occupancy classification of a single grid cell.

use serde::{Deserialize, Serialize};

/// Classification of one occupancy-grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellType {
    /// Traversable space
    Free = 0,
    /// Occupied space, never traversable
    Obstacle = 1,
    /// Unobserved space
    #[default]
    Unknown = 2,
}

impl CellType {
    /// Whether this cell blocks traversal.
    #[inline]
    pub fn is_obstacle(self) -> bool {
        self == CellType::Obstacle
    }

    /// Whether this cell is known to be traversable.
    #[inline]
    pub fn is_free(self) -> bool {
        self == CellType::Free
    }
}
