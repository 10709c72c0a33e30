//! 2D pose: position plus heading.

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;
use super::point::WorldPoint;

/// A 2D pose in the world frame.
///
/// Position is in meters, `theta` is the heading in radians, normalized
/// to [-π, π], counter-clockwise positive from the X axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, [-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose. `theta` is normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// The identity pose (origin, facing along +X).
    #[inline]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// The position component of this pose.
    #[inline]
    pub fn position(self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Euclidean distance between the positions of two poses.
    #[inline]
    pub fn distance(&self, other: &Pose2D) -> f32 {
        self.position().distance(&other.position())
    }

    /// Compose this pose with `offset`: apply `offset` in this pose's
    /// frame (rotation by `self.theta`, then translation).
    ///
    /// This is the transform used to turn a relative goal into an
    /// absolute one:
    /// `x' = x + ox·cos θ − oy·sin θ`, `y' = y + ox·sin θ + oy·cos θ`,
    /// `θ' = θ + oθ`.
    #[inline]
    pub fn compose(self, offset: Pose2D) -> Self {
        let (sin, cos) = self.theta.sin_cos();
        Self::new(
            self.x + offset.x * cos - offset.y * sin,
            self.y + offset.x * sin + offset.y * cos,
            self.theta + offset.theta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn new_normalizes_heading() {
        let pose = Pose2D::new(0.0, 0.0, 3.0 * PI);
        assert!(pose.theta.abs() - PI < 1e-5);
    }

    #[test]
    fn compose_identity_is_noop() {
        let pose = Pose2D::new(1.0, 2.0, 0.5);
        let composed = pose.compose(Pose2D::identity());
        assert_relative_eq!(composed.x, pose.x, epsilon = 1e-6);
        assert_relative_eq!(composed.y, pose.y, epsilon = 1e-6);
        assert_relative_eq!(composed.theta, pose.theta, epsilon = 1e-6);
    }

    #[test]
    fn compose_rotates_offset_into_base_frame() {
        // Base at (1, 0) facing +Y: a forward offset lands "up".
        let base = Pose2D::new(1.0, 0.0, FRAC_PI_2);
        let offset = Pose2D::new(1.0, 0.0, 0.0);
        let goal = base.compose(offset);
        assert_relative_eq!(goal.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(goal.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(goal.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn distance_uses_positions_only() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, PI / 3.0);
        assert_relative_eq!(a.distance(&b), 5.0, epsilon = 1e-6);
    }
}
