//! # Swerve drive library.
//!
//! This library allows other crates in the workspace (and the executable's
//! unit tests) to access items defined inside the swerve exec crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command script - replays timed drive commands from a TOML script
pub mod cmd_script;

/// Global data store for the executable
pub mod data_store;

/// Drive control module - converts chassis velocity commands into individual wheel commands and
/// estimates the robot pose
pub mod drive_ctrl;

/// Equipment interfaces - motor, steer sensor and gyro contracts plus simulated implementations
pub mod eqpt;

/// Tuning client - live PID gain overrides for the drive control module
pub mod tuning;
