//! # Drive command script module
//!
//! This module provides a player for timed drive command scripts, allowing
//! sequences of drive commands to be executed without an operator.
//!
//! Scripts are TOML files containing a `commands` array, each entry pairing a
//! session-elapsed execution time with a [`DriveCmd`]:
//!
//! ```toml
//! [[commands]]
//! time_s = 1.0
//! cmd = { Velocity = { forward = 0.5, strafe = 0.0, rotation = 0.0, field_relative = true, rate_limited = true } }
//!
//! [[commands]]
//! time_s = 6.0
//! cmd = "Stop"
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::drive_ctrl::DriveCmd;
use util::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug, Deserialize)]
pub struct ScriptCommand {
    /// The session-elapsed time the command is supposed to execute at
    pub time_s: f64,

    /// The drive command to run
    pub cmd: DriveCmd,
}

/// On-disk layout of a command script.
#[derive(Debug, Deserialize)]
struct ScriptFile {
    commands: Vec<ScriptCommand>,
}

/// A command script player.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of drive commands that need
/// executing.
pub struct CmdScript {
    _script_path: PathBuf,
    cmds: VecDeque<ScriptCommand>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("Could not parse the script: {0}")]
    ScriptParseError(toml::de::Error),

    #[error("The script contains no commands")]
    ScriptEmpty,
}

pub enum PendingCmds {
    None,
    Some(Vec<DriveCmd>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdScript {
    /// Create a new script player from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e)),
        };

        let file: ScriptFile = match toml::from_str(&script) {
            Ok(f) => f,
            Err(e) => return Err(ScriptError::ScriptParseError(e)),
        };

        if file.commands.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        // Order by execution time so authors may write the script in any
        // order
        let mut commands = file.commands;
        commands.sort_by(|a, b| {
            a.time_s
                .partial_cmp(&b.time_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(CmdScript {
            _script_path: path,
            cmds: commands.into(),
        })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    pub fn get_pending_cmds(&mut self) -> PendingCmds {
        self.pending_at(get_elapsed_seconds())
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.time_s,
            None => 0f64,
        }
    }

    /// Return the commands pending at the given time.
    fn pending_at(&mut self, current_time_s: f64) -> PendingCmds {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut cmd_vec: Vec<DriveCmd> = vec![];

        // Pop items from the queue while the head's exec time is lower than
        // the current time
        while let Some(head) = self.cmds.front() {
            if head.time_s >= current_time_s {
                break;
            }

            // Pop cannot fail, front just returned an item
            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.cmd);
            }
        }

        if !cmd_vec.is_empty() {
            PendingCmds::Some(cmd_vec)
        } else {
            PendingCmds::None
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        [[commands]]
        time_s = 5.0
        cmd = "Stop"

        [[commands]]
        time_s = 1.0
        cmd = { Velocity = { forward = 0.5, strafe = 0.0, rotation = 0.0, field_relative = true, rate_limited = true } }

        [[commands]]
        time_s = 6.0
        cmd = "XLock"
    "#;

    fn test_script() -> CmdScript {
        let file: ScriptFile = toml::from_str(SCRIPT).unwrap();
        let mut commands = file.commands;
        commands.sort_by(|a, b| {
            a.time_s
                .partial_cmp(&b.time_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        CmdScript {
            _script_path: PathBuf::new(),
            cmds: commands.into(),
        }
    }

    #[test]
    fn test_commands_released_in_time_order() {
        let mut script = test_script();

        assert_eq!(script.get_num_cmds(), 3);
        assert!((script.get_duration() - 6.0).abs() < 1e-12);

        // Nothing is pending before the first command's time
        assert!(matches!(script.pending_at(0.5), PendingCmds::None));

        // The velocity command comes first despite being written second
        match script.pending_at(1.5) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds.len(), 1);
                assert!(matches!(cmds[0], DriveCmd::Velocity(_)));
            }
            _ => panic!("expected a pending command"),
        }

        // Both remaining commands release together once their times pass
        match script.pending_at(10.0) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds.len(), 2);
                assert!(matches!(cmds[0], DriveCmd::Stop));
                assert!(matches!(cmds[1], DriveCmd::XLock));
            }
            _ => panic!("expected pending commands"),
        }

        // The script is now exhausted
        assert!(matches!(script.pending_at(11.0), PendingCmds::EndOfScript));
    }

    #[test]
    fn test_missing_script_rejected() {
        assert!(matches!(
            CmdScript::new("/nonexistent/script.toml"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }

    #[test]
    fn test_empty_script_parses_to_no_commands() {
        let file: ScriptFile = toml::from_str("commands = []").unwrap();
        assert!(file.commands.is_empty());
    }
}
