//! Waypoint sequences: the reduced output of the path planner.

use bhumi_map::{GridCoord, Pose2D};

/// One target pose in a planned path.
///
/// Waypoints form a finite, forward-only chain: each node owns the next
/// one, the last node's `next` is absent. The chain is built once by the
/// planner and only read afterwards.
#[derive(Clone, Debug)]
pub struct Waypoint {
    /// Position in the emitted sequence, starting at 0.
    pub seq: usize,
    /// Pixel coordinate this waypoint was planned at.
    pub cell: GridCoord,
    /// World pose of the waypoint. The goal's heading is carried on
    /// every waypoint, not interpolated per segment.
    pub pose: Pose2D,
    /// Next waypoint toward the goal, if any.
    pub next: Option<Box<Waypoint>>,
}

/// An owned chain of waypoints, ordered start to goal.
#[derive(Clone, Debug, Default)]
pub struct WaypointSeq {
    head: Option<Box<Waypoint>>,
}

impl WaypointSeq {
    /// Link a list of (cell, pose) entries into a chain, assigning
    /// sequence numbers in order.
    pub fn link(entries: Vec<(GridCoord, Pose2D)>) -> Self {
        let mut next: Option<Box<Waypoint>> = None;
        for (seq, (cell, pose)) in entries.into_iter().enumerate().rev() {
            next = Some(Box::new(Waypoint {
                seq,
                cell,
                pose,
                next,
            }));
        }
        Self { head: next }
    }

    /// First waypoint of the chain.
    #[inline]
    pub fn first(&self) -> Option<&Waypoint> {
        self.head.as_deref()
    }

    /// Last waypoint of the chain.
    pub fn last(&self) -> Option<&Waypoint> {
        self.iter().last()
    }

    /// Whether the chain ends at `cell`. Planner output should be
    /// checked against the intended goal pixel before being tracked.
    pub fn reaches(&self, cell: GridCoord) -> bool {
        self.last().is_some_and(|wp| wp.cell == cell)
    }

    /// Iterate the chain front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Number of waypoints in the chain.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl Drop for WaypointSeq {
    fn drop(&mut self) {
        // Unlink iteratively; dropping a long chain node-by-node through
        // the default recursive drop would overflow the stack.
        let mut next = self.head.take();
        while let Some(mut wp) = next {
            next = wp.next.take();
        }
    }
}

/// Borrowing iterator over a [`WaypointSeq`].
pub struct Iter<'a> {
    next: Option<&'a Waypoint>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Waypoint;

    fn next(&mut self) -> Option<Self::Item> {
        let wp = self.next?;
        self.next = wp.next.as_deref();
        Some(wp)
    }
}

/// Reduce a raw backtracked path to the cells worth emitting.
///
/// `path` is in backtrack order (goal first, start last); the result is
/// in travel order (start first). `step` selects the mode:
///
/// - `1` (or fewer than 4 points): keep every cell;
/// - `> 1`: keep every `step`-th cell starting from the start cell, and
///   always terminate at the goal cell;
/// - `0`: keep only the start, the goal, and every cell where the
///   direction between consecutive cells changes.
pub fn reduce(path: &[GridCoord], step: usize) -> Vec<GridCoord> {
    let n = path.len();
    if n == 0 {
        return Vec::new();
    }
    if n < 4 || step == 1 {
        return path.iter().rev().copied().collect();
    }
    if step > 1 {
        let mut out: Vec<GridCoord> = path.iter().rev().step_by(step).copied().collect();
        if out.last() != Some(&path[0]) {
            out.push(path[0]);
        }
        return out;
    }

    // step == 0: collinearity compression
    let mut out = Vec::new();
    let mut prev: Option<GridCoord> = None;
    for inx in (0..n).rev() {
        let cur = path[inx];
        if out.is_empty() || inx == 0 {
            out.push(cur);
            prev = Some(cur);
            continue;
        }
        let ahead = path[inx - 1];
        if let Some(p) = prev
            && ahead - cur != cur - p
        {
            out.push(cur);
        }
        prev = Some(cur);
    }
    out
}
