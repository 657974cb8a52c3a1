//! Main swerve drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Command script processing
//!         - Drive control processing
//!         - Archive writing
//!         - Equipment simulation stepping
//!
//! # Modules
//!
//! All modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use swerve_lib::{
    cmd_script::{CmdScript, PendingCmds},
    data_store::DataStore,
    drive_ctrl,
    eqpt::sim::{SimEqpt, SimParams},
    tuning::FileTuning,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Script played when no script path is given on the command line, relative
/// to the software root.
const DEFAULT_SCRIPT_PATH: &str = "scripts/demo_script.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("swerve_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE COMMAND SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path, otherwise fall
    // back to the demo script under the software root
    let script_path = match args.len() {
        1 => {
            let mut path = host::get_sw_root()
                .map_err(|_| eyre!("The software root environment variable is not set"))?;
            path.push(DEFAULT_SCRIPT_PATH);
            path
        }
        2 => args[1].clone().into(),
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    info!("Loading script from {:?}", script_path);

    let mut cmd_script = CmdScript::new(&script_path)
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} commands\n",
        cmd_script.get_duration(),
        cmd_script.get_num_cmds()
    );

    // ---- INITIALISE EQUIPMENT ----

    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;

    let tuning = FileTuning::new("tuning.toml")
        .map_err(|_| eyre!("The software root environment variable is not set"))?;

    let (mut sim, eqpt) = SimEqpt::new(sim_params, Box::new(tuning));

    info!("Simulated equipment initialised");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.drive_ctrl
        .init(
            drive_ctrl::InitData {
                params_path: "drive_ctrl.toml",
                eqpt,
            },
            &session,
        )
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    // Commands released by the script but not yet handed to DriveCtrl, one is
    // consumed per cycle
    let mut pending_cmds: VecDeque<drive_ctrl::DriveCmd> = VecDeque::new();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- COMMAND PROCESSING ----

        match cmd_script.get_pending_cmds() {
            PendingCmds::None => (),
            PendingCmds::Some(cmd_vec) => pending_cmds.extend(cmd_vec),
            // Exit once the end of the script is reached and all released
            // commands have been executed
            PendingCmds::EndOfScript => {
                if pending_cmds.is_empty() {
                    info!("End of command script reached, stopping");
                    break;
                }
            }
        }

        ds.drive_ctrl_input.cmd = pending_cmds.pop_front();

        if let Some(ref cmd) = ds.drive_ctrl_input.cmd {
            info!("Executing command: {:?}", cmd);
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // DriveCtrl processing
        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((o, r)) => {
                ds.drive_ctrl_output = o;
                ds.drive_ctrl_status_rpt = r;
            }
            Err(e) => {
                // DriveCtrl errors usually just mean a bad command was sent,
                // so just issue the warning and continue.
                warn!("Error during DriveCtrl processing: {}", e)
            }
        };

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.drive_ctrl.write() {
            warn!("Could not write DriveCtrl archives: {}", e);
        }

        // ---- EQUIPMENT SIMULATION ----

        sim.step(CYCLE_PERIOD_S, ds.drive_ctrl_output.omega_cmd_rads);

        // ---- MONITORING ----

        if ds.is_1_hz_cycle {
            let pose = ds.drive_ctrl_output.pose;
            info!(
                "Pose: x = {:.03} m, y = {:.03} m, heading = {:.03} rad",
                pose.x_m, pose.y_m, pose.heading_rad
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
