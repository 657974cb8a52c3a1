//! Tuning client
//!
//! Provides live PID gain overrides to the drive control module, in the way
//! a driver-station dashboard would. Overrides are read from an optional
//! `tuning.toml` parameter file, when the file (or an entry in it) is absent
//! the compiled-in defaults from the drive control parameters are used.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::SystemTime;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A provider of live PID gain values.
///
/// DriveCtrl reads the gains through this trait every tick, last writer wins.
/// Implementations must return the given defaults when no override is
/// present, and must never block.
pub trait TuningProvider {
    /// Current P, I, D gains for the drive speed controllers.
    fn driving_gains(&mut self, defaults: &[f64]) -> Vec<f64>;

    /// Current P, I, D gains for the steer angle controllers.
    fn turning_gains(&mut self, defaults: &[f64]) -> Vec<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Contents of the tuning override file. Both entries are optional, gains
/// that are not overridden fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
struct TuningFile {
    driving_pid: Option<Vec<f64>>,
    turning_pid: Option<Vec<f64>>,
}

/// Tuning provider backed by a TOML file under the params directory.
///
/// The file is re-read when its modification time changes, so gains can be
/// edited while the software is running.
pub struct FileTuning {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    cached: TuningFile,
}

/// Tuning provider that always returns the defaults. Used in tests and when
/// no tuning file path is available.
#[derive(Default)]
pub struct FixedTuning;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FileTuning {
    /// Create a tuning client for the given file name under the software
    /// root's params directory.
    pub fn new(file_name: &str) -> Result<Self, std::env::VarError> {
        let mut path = util::host::get_sw_root()?;
        path.push("params");
        path.push(file_name);

        Ok(Self {
            path,
            last_modified: None,
            cached: TuningFile::default(),
        })
    }

    /// Re-read the override file if it has changed since the last read.
    fn refresh(&mut self) {
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok();

        // Missing file is the nominal no-override case
        let modified = match modified {
            Some(m) => m,
            None => {
                self.last_modified = None;
                self.cached = TuningFile::default();
                return;
            }
        };

        if self.last_modified == Some(modified) {
            return;
        }

        self.last_modified = Some(modified);

        match std::fs::read_to_string(&self.path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(t) => self.cached = t,
                Err(e) => {
                    warn!("Could not parse tuning file {:?}: {}", self.path, e);
                    self.cached = TuningFile::default();
                }
            },
            Err(e) => {
                warn!("Could not read tuning file {:?}: {}", self.path, e);
                self.cached = TuningFile::default();
            }
        }
    }
}

impl TuningProvider for FileTuning {
    fn driving_gains(&mut self, defaults: &[f64]) -> Vec<f64> {
        self.refresh();
        match self.cached.driving_pid {
            Some(ref g) => g.clone(),
            None => defaults.to_vec(),
        }
    }

    fn turning_gains(&mut self, defaults: &[f64]) -> Vec<f64> {
        self.refresh();
        match self.cached.turning_pid {
            Some(ref g) => g.clone(),
            None => defaults.to_vec(),
        }
    }
}

impl TuningProvider for FixedTuning {
    fn driving_gains(&mut self, defaults: &[f64]) -> Vec<f64> {
        defaults.to_vec()
    }

    fn turning_gains(&mut self, defaults: &[f64]) -> Vec<f64> {
        defaults.to_vec()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_tuning_returns_defaults() {
        let mut tuning = FixedTuning::default();
        let defaults = [0.04, 0.0, 0.0];

        assert_eq!(tuning.driving_gains(&defaults), vec![0.04, 0.0, 0.0]);
        assert_eq!(tuning.turning_gains(&defaults), vec![0.04, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let mut tuning = FileTuning {
            path: PathBuf::from("/nonexistent/tuning.toml"),
            last_modified: None,
            cached: TuningFile::default(),
        };
        let defaults = [0.69, 0.0, 0.0];

        assert_eq!(tuning.turning_gains(&defaults), vec![0.69, 0.0, 0.0]);
    }
}
