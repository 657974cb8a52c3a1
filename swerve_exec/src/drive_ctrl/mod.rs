//! Drive control module
//!
//! Converts chassis velocity commands into per-wheel speed/angle setpoints,
//! shapes commands to respect slew rate limits, closes the loop on each
//! module's drive speed and steer angle, and integrates wheel and gyro
//! telemetry into a pose estimate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod kinematics;
mod module;
mod odom;
mod params;
mod pid;
mod slew;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use kinematics::*;
pub use module::*;
pub use odom::*;
pub use params::*;
pub use pid::*;
pub use slew::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the robot.
///
/// The chassis is a fixed four-module rectangle, this is not configurable.
pub const NUM_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load the drive control parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Expected equipment for exactly {} modules, found {0}", NUM_MODULES)]
    WrongModuleCount(usize),

    #[error("Expected exactly 3 PID gains (P, I, D), found {0}")]
    InvalidGains(usize),

    #[error("Received an invalid drive command: {0:?}")]
    InvalidCmd(VelocityCommand),

    #[error("DriveCtrl has not been initialised")]
    NotInitialised,

    #[error("Could not initialise the archivers: {0}")]
    ArchiverInitError(String),
}
