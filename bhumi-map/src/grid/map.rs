//! Occupancy grid storage and pixel/world transforms.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::{CellType, GridCoord, WorldPoint};

use super::meta::GridMeta;

/// Errors raised while building a [`GridMap`].
#[derive(Error, Debug)]
pub enum MapError {
    #[error("invalid resolution {0} (must be > 0)")]
    InvalidResolution(f32),

    #[error("grid is {rows}x{cols} cells but {len} values were supplied")]
    DimensionMismatch { rows: usize, cols: usize, len: usize },
}

/// An occupancy-grid map.
///
/// Cells are stored row-major; pixel coordinate `(x, y)` addresses
/// column `x` of row `y`. The stored image has row 0 at the top, so the
/// vertical axis is flipped when converting to world coordinates.
///
/// The map is immutable after construction, with one exception:
/// [`shrink_to_obstacles`](GridMap::shrink_to_obstacles) may crop the
/// grid to its obstacle bounding box once per load. The crop offset is
/// recorded so transforms keep referring to the original frame.
#[derive(Clone, Debug)]
pub struct GridMap {
    meta: GridMeta,
    rows: usize,
    cols: usize,
    cells: Vec<CellType>,
    /// Crop offset in cells (x = column, y = row) when the stored grid
    /// is a sub-region of the loaded one.
    padding_offset: Option<GridCoord>,
    /// Row count used by the vertical flip. Fixed at load time; a later
    /// crop changes `rows` but not the flip reference.
    flip_rows: usize,
}

impl GridMap {
    /// Build a map from already-classified cells.
    pub fn from_classified(
        meta: GridMeta,
        rows: usize,
        cols: usize,
        cells: Vec<CellType>,
    ) -> Result<Self, MapError> {
        if meta.resolution <= 0.0 {
            return Err(MapError::InvalidResolution(meta.resolution));
        }
        if cells.len() != rows * cols {
            return Err(MapError::DimensionMismatch {
                rows,
                cols,
                len: cells.len(),
            });
        }
        Ok(Self {
            meta,
            rows,
            cols,
            cells,
            padding_offset: None,
            flip_rows: rows,
        })
    }

    /// Build a map from raw 8-bit intensities, classifying each cell
    /// against the metadata's occupancy thresholds and polarity.
    pub fn from_raw(
        meta: GridMeta,
        rows: usize,
        cols: usize,
        raw: &[u8],
    ) -> Result<Self, MapError> {
        let cells = raw
            .iter()
            .map(|&v| {
                let occ = meta.occupancy(v);
                if occ > meta.occupied_thresh {
                    CellType::Obstacle
                } else if occ < meta.free_thresh {
                    CellType::Free
                } else {
                    CellType::Unknown
                }
            })
            .collect();
        Self::from_classified(meta, rows, cols, cells)
    }

    /// Number of rows in the (possibly cropped) grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the (possibly cropped) grid.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Meters per cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.meta.resolution
    }

    /// Map metadata as loaded.
    #[inline]
    pub fn meta(&self) -> &GridMeta {
        &self.meta
    }

    /// Crop offset, if the grid has been shrunk to its obstacle bounds.
    #[inline]
    pub fn padding_offset(&self) -> Option<GridCoord> {
        self.padding_offset
    }

    /// Grid width in meters.
    #[inline]
    pub fn width_m(&self) -> f32 {
        self.cols as f32 * self.meta.resolution
    }

    /// Grid height in meters.
    #[inline]
    pub fn height_m(&self) -> f32 {
        self.rows as f32 * self.meta.resolution
    }

    /// Whether a pixel coordinate addresses a stored cell.
    #[inline]
    pub fn in_bounds(&self, c: GridCoord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.cols && (c.y as usize) < self.rows
    }

    /// Classification of the cell at `c`, or `None` out of bounds.
    #[inline]
    pub fn cell(&self, c: GridCoord) -> Option<CellType> {
        if !self.in_bounds(c) {
            return None;
        }
        Some(self.cells[c.y as usize * self.cols + c.x as usize])
    }

    /// Whether the cell at `c` is classified as an obstacle.
    #[inline]
    pub fn is_obstacle(&self, c: GridCoord) -> bool {
        self.cell(c) == Some(CellType::Obstacle)
    }

    /// All cells currently classified as obstacles, in row-major order.
    pub fn obstacle_cells(&self) -> Vec<GridCoord> {
        let mut out = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                if self.cells[y * self.cols + x].is_obstacle() {
                    out.push(GridCoord::new(x as i32, y as i32));
                }
            }
        }
        out
    }

    /// Convert a world position to the pixel coordinate of the cell
    /// containing it.
    ///
    /// The result is only a valid index when the input lies inside the
    /// grid's spatial extent; callers bounds-check with
    /// [`in_bounds`](GridMap::in_bounds). No clamping is applied.
    pub fn world_to_grid(&self, p: WorldPoint) -> GridCoord {
        let mut px = (p.x - self.meta.origin[0]) / self.meta.resolution;
        let mut py = (p.y - self.meta.origin[1]) / self.meta.resolution;
        py = self.flip_rows as f32 - py;
        if let Some(off) = self.padding_offset {
            px -= off.x as f32;
            py -= off.y as f32;
        }
        GridCoord::new(round_to_cell(px), round_to_cell(py))
    }

    /// Convert a pixel coordinate to the world position of the cell.
    pub fn grid_to_world(&self, c: GridCoord) -> WorldPoint {
        let mut px = c.x as f32;
        let mut py = c.y as f32;
        if let Some(off) = self.padding_offset {
            px += off.x as f32;
            py += off.y as f32;
        }
        py = self.flip_rows as f32 - py;
        WorldPoint::new(
            self.meta.origin[0] + px * self.meta.resolution,
            self.meta.origin[1] + py * self.meta.resolution,
        )
    }

    /// Bulk conversion of world points to pixel coordinates.
    ///
    /// Points falling outside the stored grid are discarded and
    /// duplicate pixels are collapsed; the output order is the sorted
    /// (y, then x) order of the surviving cells.
    pub fn batch_world_to_grid(&self, points: &[WorldPoint]) -> Vec<GridCoord> {
        let unique: BTreeSet<(i32, i32)> = points
            .iter()
            .map(|&p| self.world_to_grid(p))
            .filter(|&c| self.in_bounds(c))
            .map(|c| (c.y, c.x))
            .collect();
        unique
            .into_iter()
            .map(|(y, x)| GridCoord::new(x, y))
            .collect()
    }

    /// Bulk conversion of pixel coordinates to world positions.
    pub fn batch_grid_to_world(&self, cells: &[GridCoord]) -> Vec<WorldPoint> {
        cells.iter().map(|&c| self.grid_to_world(c)).collect()
    }

    /// Crop the grid to the minimal bounding box covering all obstacle
    /// cells and record the crop offset.
    ///
    /// A no-op when the map holds no obstacles, and on any call after
    /// the first crop (the operation runs at most once per load).
    /// Returns the obstacle cells in the resulting (possibly shifted)
    /// pixel frame.
    pub fn shrink_to_obstacles(&mut self) -> Vec<GridCoord> {
        let obstacles = self.obstacle_cells();
        if obstacles.is_empty() || self.padding_offset.is_some() {
            return obstacles;
        }

        let x_min = obstacles.iter().map(|c| c.x).min().unwrap_or(0);
        let x_max = obstacles.iter().map(|c| c.x).max().unwrap_or(0);
        let y_min = obstacles.iter().map(|c| c.y).min().unwrap_or(0);
        let y_max = obstacles.iter().map(|c| c.y).max().unwrap_or(0);

        let new_cols = (x_max - x_min + 1) as usize;
        let new_rows = (y_max - y_min + 1) as usize;
        let mut cropped = Vec::with_capacity(new_rows * new_cols);
        for y in y_min..=y_max {
            let row_start = y as usize * self.cols;
            cropped.extend_from_slice(
                &self.cells[row_start + x_min as usize..row_start + x_max as usize + 1],
            );
        }

        tracing::debug!(
            "cropped grid {}x{} -> {}x{} at offset ({}, {})",
            self.rows,
            self.cols,
            new_rows,
            new_cols,
            x_min,
            y_min
        );

        self.cells = cropped;
        self.rows = new_rows;
        self.cols = new_cols;
        let offset = GridCoord::new(x_min, y_min);
        self.padding_offset = Some(offset);

        obstacles.into_iter().map(|c| c - offset).collect()
    }
}

/// Round a continuous pixel coordinate to its cell index.
#[inline]
fn round_to_cell(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}
