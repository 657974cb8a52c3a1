//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{ModuleState, Pose, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A chassis velocity command.
///
/// All three axes are normalised to unit range, scaling to physical units
/// happens inside DriveCtrl using the configured maximum speeds. Deadband
/// filtering of raw joystick noise happens upstream of this command.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Desired speed along the chassis forward axis.
    ///
    /// Units: normalised, -1 to +1
    pub forward: f64,

    /// Desired speed along the chassis left axis.
    ///
    /// Units: normalised, -1 to +1
    pub strafe: f64,

    /// Desired rotation rate about the chassis centre.
    ///
    /// Units: normalised, -1 to +1
    pub rotation: f64,

    /// If true `forward`/`strafe` are expressed in the fixed field frame
    /// rather than the robot's own frame.
    pub field_relative: bool,

    /// If true the command is shaped by the slew rate limiter, if false it
    /// passes through unchanged (used for precision manoeuvres).
    pub rate_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible commands to be executed by DriveCtrl.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum DriveCmd {
    /// Drive with the given chassis velocity. Persists until superseded.
    Velocity(VelocityCommand),

    /// Bring the robot to a full stop, maintaining the current wheel angles.
    Stop,

    /// Set the wheels into an X formation to resist being pushed. Shaping is
    /// bypassed. Persists until superseded.
    XLock,

    /// Apply externally computed module setpoints directly (autonomous layer
    /// hook). Setpoints are desaturated before application.
    SetModuleStates([ModuleState; NUM_MODULES]),

    /// Make the given pose the new odometry reference.
    ResetOdometry(Pose),

    /// Zero the gyro heading.
    ZeroHeading,

    /// Zero the cumulative drive-position counters of all modules.
    ResetEncoders,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityCommand {
    /// Determine if the command is valid (all axes finite and in unit range).
    pub fn is_valid(&self) -> bool {
        [self.forward, self.strafe, self.rotation]
            .iter()
            .all(|v| v.is_finite() && v.abs() <= 1.0)
    }

    /// A command of zero velocity in the robot frame, unshaped.
    pub fn zero() -> Self {
        Self {
            forward: 0.0,
            strafe: 0.0,
            rotation: 0.0,
            field_relative: false,
            rate_limited: false,
        }
    }
}
