//! Equipment interfaces
//!
//! Narrow collaborator contracts through which the drive control module
//! talks to the hardware. All calls are synchronous and return immediately
//! with last-known values, full device drivers live behind these traits and
//! are out of scope for the control core.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sim;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A motor with an associated relative encoder.
///
/// One instance exists per drive motor and one per turn motor. For drive
/// motors the encoder units are linear wheel travel, for turn motors the
/// velocity/position getters are unused (the steer sensor is absolute).
pub trait Motor {
    /// Command the motor with a normalised output in -1 to +1.
    fn set_output(&mut self, output: f64);

    /// Last-known encoder velocity.
    ///
    /// Units: meters/second
    fn velocity_ms(&self) -> f64;

    /// Last-known cumulative encoder position.
    ///
    /// Units: meters
    fn position_m(&self) -> f64;

    /// Zero the cumulative encoder position.
    fn reset_position(&mut self);
}

/// An absolute steer angle sensor.
pub trait SteerSensor {
    /// Last-known raw (cumulative) sensor angle, in the module's local
    /// sensor frame.
    ///
    /// Units: radians
    fn angle_rad(&self) -> f64;
}

/// A chassis yaw gyro.
pub trait Gyro {
    /// Last-known heading, positive counter clockwise.
    ///
    /// Units: degrees, -180 to +180
    fn heading_degs(&self) -> f64;

    /// Last-known turn rate.
    ///
    /// Units: degrees/second
    fn turn_rate_degs(&self) -> f64;

    /// Zero the heading.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The equipment owned by a single swerve module.
pub struct ModuleEqpt {
    pub drive_motor: Box<dyn Motor>,
    pub turn_motor: Box<dyn Motor>,
    pub steer_sensor: Box<dyn SteerSensor>,
}

/// All equipment handed to DriveCtrl at initialisation.
///
/// `modules` must contain exactly one entry per swerve module, ordered
/// front-left, front-right, rear-left, rear-right.
pub struct DriveEqpt {
    pub modules: Vec<ModuleEqpt>,
    pub gyro: Box<dyn Gyro>,
    pub tuning: Box<dyn crate::tuning::TuningProvider>,
}
