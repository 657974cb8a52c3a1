//! # Data Store

use crate::drive_ctrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub cycle_start_time_s: f64,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: drive_ctrl::OutputData,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets
    /// the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.drive_ctrl_input = drive_ctrl::InputData::default();

        self.cycle_start_time_s = util::session::get_elapsed_seconds();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_1_hz_flag_set_on_frequency_boundaries() {
        let mut ds = DataStore::default();

        ds.cycle_start(50.0);
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 1;
        ds.cycle_start(50.0);
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 50;
        ds.cycle_start(50.0);
        assert!(ds.is_1_hz_cycle);
    }

    #[test]
    fn test_cycle_start_clears_input() {
        let mut ds = DataStore::default();
        ds.drive_ctrl_input.cmd = Some(drive_ctrl::DriveCmd::Stop);

        ds.cycle_start(50.0);

        assert!(ds.drive_ctrl_input.cmd.is_none());
    }
}
