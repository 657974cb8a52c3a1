//! Swerve drive kinematics
//!
//! Inverse kinematics convert a chassis velocity into four module setpoints.
//! Forward kinematics are implicit in the odometry integration and are not
//! computed here as a separate matrix inversion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use super::NUM_MODULES;
use util::maths::wrap_angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A desired or actual wheel velocity vector.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Signed wheel speed.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Wheel angle in the chassis frame, canonical in (-pi, pi].
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// A module's cumulative drive distance and current angle, used for odometry
/// integration. The distance is only ever reset by explicit encoder zeroing.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Cumulative drive distance.
    ///
    /// Units: meters
    pub distance_m: f64,

    /// Wheel angle in the chassis frame, canonical in (-pi, pi].
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// A chassis velocity in physical units, expressed in the robot body frame.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ChassisSpeeds {
    /// Speed along the chassis forward axis.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Speed along the chassis left axis.
    ///
    /// Units: meters/second
    pub vy_ms: f64,

    /// Rotation rate about the chassis centre, positive counter clockwise.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// Swerve drive kinematics for a fixed four-module chassis.
///
/// The module geometry must be identical to that used by the odometry
/// estimator, both are constructed from the same parameters.
#[derive(Clone, Debug)]
pub struct SwerveKinematics {
    /// Steer axis position of each module relative to the chassis centre.
    module_positions: [Vector2<f64>; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    /// Build a robot-frame velocity from a field-frame velocity and the
    /// current heading, by rotating the translation by the negative heading.
    pub fn from_field_relative(
        vx_ms: f64,
        vy_ms: f64,
        omega_rads: f64,
        heading_rad: f64,
    ) -> Self {
        let v_robot = Rotation2::new(-heading_rad) * Vector2::new(vx_ms, vy_ms);

        ChassisSpeeds {
            vx_ms: v_robot.x,
            vy_ms: v_robot.y,
            omega_rads,
        }
    }
}

impl SwerveKinematics {
    /// Create the kinematics from the module steer axis positions.
    pub fn new(module_positions_m: &[[f64; 2]; NUM_MODULES]) -> Self {
        let mut module_positions = [Vector2::zeros(); NUM_MODULES];

        for (i, pos) in module_positions_m.iter().enumerate() {
            module_positions[i] = Vector2::new(pos[0], pos[1]);
        }

        Self { module_positions }
    }

    /// Inverse kinematics: compute the module states required to achieve the
    /// given chassis velocity.
    ///
    /// Each module's wheel velocity is the chassis translation plus the
    /// rotational component `omega x perpendicular(offset)`.
    pub fn to_module_states(&self, speeds: &ChassisSpeeds) -> [ModuleState; NUM_MODULES] {
        let mut states = [ModuleState::default(); NUM_MODULES];
        let translation = Vector2::new(speeds.vx_ms, speeds.vy_ms);

        for (i, pos) in self.module_positions.iter().enumerate() {
            // Perpendicular of the offset, scaled by the rotation rate
            let rotational = speeds.omega_rads * Vector2::new(-pos.y, pos.x);
            let wheel_vel = translation + rotational;

            states[i] = ModuleState {
                speed_ms: wheel_vel.norm(),
                angle_rad: wrap_angle(wheel_vel.y.atan2(wheel_vel.x)),
            };
        }

        states
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Desaturate a set of module speeds so that none exceeds `max_speed_ms`.
///
/// If any speed exceeds the maximum all speeds are scaled by the same factor,
/// preserving their relative ratios and therefore the shape of the commanded
/// motion. Returns true if scaling was applied.
pub fn desaturate(states: &mut [ModuleState; NUM_MODULES], max_speed_ms: f64) -> bool {
    let max_observed = states
        .iter()
        .map(|s| s.speed_ms.abs())
        .fold(0.0, f64::max);

    if max_observed > max_speed_ms {
        let scale = max_speed_ms / max_observed;
        for state in states.iter_mut() {
            state.speed_ms *= scale;
        }
        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    /// A square chassis with 0.3 m half-spans, FL, FR, RL, RR.
    fn square_kinematics() -> SwerveKinematics {
        SwerveKinematics::new(&[
            [0.3, 0.3],
            [0.3, -0.3],
            [-0.3, 0.3],
            [-0.3, -0.3],
        ])
    }

    #[test]
    fn test_pure_translation() {
        let kin = square_kinematics();

        let states = kin.to_module_states(&ChassisSpeeds {
            vx_ms: 1.5,
            vy_ms: 0.0,
            omega_rads: 0.0,
        });

        for state in states.iter() {
            assert!((state.speed_ms - 1.5).abs() < 1e-9);
            assert!(state.angle_rad.abs() < 1e-9);
        }

        // Strafe left, all wheels at +pi/2
        let states = kin.to_module_states(&ChassisSpeeds {
            vx_ms: 0.0,
            vy_ms: 1.0,
            omega_rads: 0.0,
        });

        for state in states.iter() {
            assert!((state.speed_ms - 1.0).abs() < 1e-9);
            assert!((state.angle_rad - 0.5 * PI).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let kin = square_kinematics();

        let omega = 2.0;
        let states = kin.to_module_states(&ChassisSpeeds {
            vx_ms: 0.0,
            vy_ms: 0.0,
            omega_rads: omega,
        });

        // All modules move at omega * radius, tangential to their offset
        let radius = (0.3f64.powi(2) + 0.3f64.powi(2)).sqrt();
        for state in states.iter() {
            assert!((state.speed_ms - omega * radius).abs() < 1e-9);
        }

        // Front left wheel tangent for CCW rotation points rear-left
        assert!((states[0].angle_rad - 0.75 * PI).abs() < 1e-9);
        // Front right points front-left
        assert!((states[1].angle_rad - 0.25 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_field_relative_rotation() {
        // Facing +90 degrees, a field-forward command becomes a robot-frame
        // strafe to the right
        let speeds = ChassisSpeeds::from_field_relative(1.0, 0.0, 0.0, 0.5 * PI);

        assert!(speeds.vx_ms.abs() < 1e-9);
        assert!((speeds.vy_ms + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_desaturation_preserves_ratios() {
        let mut states = [
            ModuleState { speed_ms: 4.0, angle_rad: 0.0 },
            ModuleState { speed_ms: 2.0, angle_rad: 0.0 },
            ModuleState { speed_ms: 1.0, angle_rad: 0.0 },
            ModuleState { speed_ms: -3.0, angle_rad: 0.0 },
        ];

        let limited = desaturate(&mut states, 2.0);
        assert!(limited);

        assert!((states[0].speed_ms - 2.0).abs() < 1e-9);
        assert!((states[1].speed_ms - 1.0).abs() < 1e-9);
        assert!((states[2].speed_ms - 0.5).abs() < 1e-9);
        assert!((states[3].speed_ms + 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_desaturation_noop_below_limit() {
        let mut states = [
            ModuleState { speed_ms: 1.0, angle_rad: 0.0 },
            ModuleState { speed_ms: 0.5, angle_rad: 0.0 },
            ModuleState { speed_ms: 0.2, angle_rad: 0.0 },
            ModuleState { speed_ms: 0.0, angle_rad: 0.0 },
        ];

        let limited = desaturate(&mut states, 2.0);
        assert!(!limited);
        assert!((states[0].speed_ms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_speeds_give_zero_states() {
        let kin = square_kinematics();

        let states = kin.to_module_states(&ChassisSpeeds::default());

        for state in states.iter() {
            assert_eq!(state.speed_ms, 0.0);
        }
    }
}
