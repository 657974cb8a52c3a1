//! Swerve drive odometry
//!
//! Dead-reckoning pose estimation built by integrating per-module drive
//! distance deltas together with the gyro heading. This is the implicit
//! forward kinematics of the drive: the average of the four modules' implied
//! displacement vectors, rotated into the field frame by the heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use super::{ModulePosition, NUM_MODULES};
use util::maths::wrap_angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The estimated 2D pose of the robot in the field frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the field x axis.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the field y axis.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading relative to the field x axis, canonical in (-pi, pi].
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Odometry estimator for a four-module swerve drive.
///
/// The pose is owned exclusively by this estimator, it is only ever advanced
/// by `update` or overwritten by `reset`.
#[derive(Clone, Debug, Default)]
pub struct SwerveOdometry {
    pose: Pose,

    /// Offset applied to the gyro heading so that reset poses with arbitrary
    /// headings are honoured.
    heading_offset_rad: f64,

    /// Module positions at the previous update, used to form deltas.
    prev_positions: [ModulePosition; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveOdometry {
    /// Create a new estimator at the given pose.
    pub fn new(
        pose: Pose,
        heading_rad: f64,
        positions: &[ModulePosition; NUM_MODULES],
    ) -> Self {
        Self {
            pose,
            heading_offset_rad: wrap_angle(pose.heading_rad - heading_rad),
            prev_positions: *positions,
        }
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Integrate one tick of module and gyro telemetry into the pose.
    ///
    /// Must be called exactly once per cycle, after telemetry is read and
    /// before any pose-dependent command processing. If upstream telemetry is
    /// stale it is integrated as-is, a control loop that halts on missing
    /// telemetry is more dangerous than one briefly acting on stale data.
    pub fn update(
        &mut self,
        heading_rad: f64,
        positions: &[ModulePosition; NUM_MODULES],
    ) -> Pose {
        // Average the displacement vectors implied by each module's distance
        // delta along its current angle, in the robot frame
        let mut delta_rb = Vector2::zeros();

        for (position, prev) in positions.iter().zip(self.prev_positions.iter()) {
            let distance = position.distance_m - prev.distance_m;
            delta_rb += distance * Vector2::new(position.angle_rad.cos(), position.angle_rad.sin());
        }

        delta_rb /= NUM_MODULES as f64;

        let heading = wrap_angle(heading_rad + self.heading_offset_rad);

        // Rotate the robot-frame displacement into the field frame
        let delta_field = Rotation2::new(heading) * delta_rb;

        self.pose.x_m += delta_field.x;
        self.pose.y_m += delta_field.y;
        self.pose.heading_rad = heading;

        self.prev_positions = *positions;

        self.pose
    }

    /// Discard previous bookkeeping and make `pose` the new reference.
    ///
    /// Used at match start or when re-synchronising against a trusted
    /// external pose source.
    pub fn reset(
        &mut self,
        pose: Pose,
        heading_rad: f64,
        positions: &[ModulePosition; NUM_MODULES],
    ) {
        self.pose = pose;
        self.heading_offset_rad = wrap_angle(pose.heading_rad - heading_rad);
        self.prev_positions = *positions;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    fn positions(distance_m: f64, angle_rad: f64) -> [ModulePosition; NUM_MODULES] {
        [ModulePosition { distance_m, angle_rad }; NUM_MODULES]
    }

    #[test]
    fn test_reset_update_round_trip() {
        let pose0 = Pose { x_m: 1.5, y_m: -2.0, heading_rad: 0.3 };
        let heading0 = 0.1;
        let positions0 = positions(12.0, 0.7);

        let mut odom = SwerveOdometry::new(Pose::default(), 0.0, &positions(0.0, 0.0));
        odom.reset(pose0, heading0, &positions0);

        // No movement, the pose must come back unchanged
        let pose = odom.update(heading0, &positions0);

        assert!((pose.x_m - pose0.x_m).abs() < 1e-12);
        assert!((pose.y_m - pose0.y_m).abs() < 1e-12);
        assert!((pose.heading_rad - pose0.heading_rad).abs() < 1e-12);
    }

    #[test]
    fn test_straight_line() {
        let mut odom = SwerveOdometry::new(Pose::default(), 0.0, &positions(0.0, 0.0));

        // All wheels forward, 0.5 m of travel split over two updates
        odom.update(0.0, &positions(0.2, 0.0));
        let pose = odom.update(0.0, &positions(0.5, 0.0));

        assert!((pose.x_m - 0.5).abs() < 1e-12);
        assert!(pose.y_m.abs() < 1e-12);
        assert!(pose.heading_rad.abs() < 1e-12);
    }

    #[test]
    fn test_heading_rotates_displacement() {
        let pose0 = Pose { x_m: 0.0, y_m: 0.0, heading_rad: 0.5 * PI };
        let mut odom = SwerveOdometry::new(pose0, 0.5 * PI, &positions(0.0, 0.0));

        // Wheels pointing chassis-forward while facing +90 degrees moves the
        // robot along field +y
        let pose = odom.update(0.5 * PI, &positions(1.0, 0.0));

        assert!(pose.x_m.abs() < 1e-9);
        assert!((pose.y_m - 1.0).abs() < 1e-9);
        assert!((pose.heading_rad - 0.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_in_place_does_not_translate() {
        // Wheels tangential on a square chassis: equal distances but at
        // opposing angles cancel out
        let mut odom = SwerveOdometry::new(Pose::default(), 0.0, &positions(0.0, 0.0));

        let tangential = [
            ModulePosition { distance_m: 0.3, angle_rad: 0.75 * PI },
            ModulePosition { distance_m: 0.3, angle_rad: 0.25 * PI },
            ModulePosition { distance_m: 0.3, angle_rad: -0.75 * PI },
            ModulePosition { distance_m: 0.3, angle_rad: -0.25 * PI },
        ];

        let pose = odom.update(0.4, &tangential);

        assert!(pose.x_m.abs() < 1e-9);
        assert!(pose.y_m.abs() < 1e-9);
        assert!((pose.heading_rad - 0.4).abs() < 1e-12);
    }
}
