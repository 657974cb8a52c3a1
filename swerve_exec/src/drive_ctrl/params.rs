//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::NUM_MODULES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- CAPABILITIES ----

    /// Maximum allowed wheel/chassis speed. Note this is the allowed maximum,
    /// not the maximum the hardware is capable of.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum allowed chassis rotation rate.
    ///
    /// Units: radians/second
    pub max_angular_speed_rads: f64,

    /// The drive wheel speed when the drive motor is running at free speed.
    /// The reciprocal is used as the drive feedforward gain.
    ///
    /// Units: meters/second
    pub drive_wheel_free_speed_ms: f64,

    // ---- MOTION SHAPING ----

    /// Base slew rate for the translation direction. The effective rate is
    /// this value divided by the current translation magnitude.
    ///
    /// Units: radians/second
    pub direction_slew_rate_radps: f64,

    /// Slew rate for the translation magnitude.
    ///
    /// Units: 1/second (fraction of full scale per second)
    pub magnitude_slew_rate: f64,

    /// Slew rate for the rotation command.
    ///
    /// Units: 1/second (fraction of full scale per second)
    pub rotational_slew_rate: f64,

    // ---- GEOMETRY ----

    /// The position of each module's steer axis relative to the chassis
    /// centre, ordered front-left, front-right, rear-left, rear-right.
    ///
    /// Units: meters,
    /// Frame: Chassis body (x forward, y left)
    pub module_positions_m: [[f64; 2]; NUM_MODULES],

    /// Angular offset of each module's steer sensor zero relative to the
    /// chassis forward direction.
    ///
    /// Units: radians
    pub module_angular_offsets_rad: [f64; NUM_MODULES],

    // ---- SENSORS ----

    /// True if the gyro turn rate reads negative for a positive (counter
    /// clockwise) chassis rotation.
    pub gyro_reversed: bool,

    // ---- CONTROL ----

    /// Period of the closed loop controllers, equal to the executive's cycle
    /// period.
    ///
    /// Units: seconds
    pub pid_period_s: f64,

    /// Default P, I and D gains for the drive speed controllers.
    pub driving_pid: [f64; 3],

    /// Default P, I and D gains for the steer angle controllers.
    pub turning_pid: [f64; 3],
}

impl Default for Params {
    fn default() -> Self {
        Params {
            max_speed_ms: 2.0,
            max_angular_speed_rads: 2.0 * std::f64::consts::PI,
            drive_wheel_free_speed_ms: 4.46,
            direction_slew_rate_radps: 1.2,
            magnitude_slew_rate: 1.8,
            rotational_slew_rate: 2.0,
            module_positions_m: [
                [0.308, 0.308],
                [0.308, -0.308],
                [-0.308, 0.308],
                [-0.308, -0.308],
            ],
            module_angular_offsets_rad: [0.147, 2.046, -1.321, 1.801],
            gyro_reversed: false,
            pid_period_s: 0.02,
            driving_pid: [0.04, 0.0, 0.0],
            turning_pid: [0.69, 0.0, 0.0],
        }
    }
}
