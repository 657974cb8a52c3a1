//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    desaturate, shape, ChassisSpeeds, DriveCmd, DriveCtrlError, ModulePosition, ModuleState,
    Params, Pose, SlewState, SwerveKinematics, SwerveModule, SwerveOdometry, NUM_MODULES,
};
use crate::eqpt::{DriveEqpt, Gyro};
use crate::tuning::TuningProvider;
use util::{
    archive::{Archived, Archiver},
    maths::wrap_angle,
    module::State,
    params, session,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Wheel angles of the X formation, ordered front-left, front-right,
/// rear-left, rear-right. The diagonal pattern gives the chassis no common
/// rolling direction.
///
/// Units: radians
const X_LOCK_ANGLES_RAD: [f64; NUM_MODULES] = [
    std::f64::consts::FRAC_PI_4,
    -std::f64::consts::FRAC_PI_4,
    -std::f64::consts::FRAC_PI_4,
    std::f64::consts::FRAC_PI_4,
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) current_cmd: Option<DriveCmd>,
    arch_current_cmd: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,

    modules: Vec<SwerveModule>,
    gyro: Option<Box<dyn Gyro>>,
    tuning: Option<Box<dyn TuningProvider>>,
    kinematics: Option<SwerveKinematics>,
    odometry: Option<SwerveOdometry>,
    slew_state: SlewState,
}

/// Data required to initialise DriveCtrl.
pub struct InitData {
    /// Name of the parameter file under the software root's params directory.
    pub params_path: &'static str,

    /// The equipment the module will drive.
    pub eqpt: DriveEqpt,
}

/// Input data to Drive Control.
#[derive(Default)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new command
    /// on this cycle.
    pub cmd: Option<DriveCmd>,
}

/// Output data from one cycle of Drive Control processing.
#[derive(Clone, Copy, Default, Debug)]
pub struct OutputData {
    /// The optimised setpoint applied to each module this cycle.
    pub module_setpoints: [ModuleState; NUM_MODULES],

    /// The measured state of each module this cycle.
    pub module_states: [ModuleState; NUM_MODULES],

    /// The current odometry pose estimate.
    pub pose: Pose,

    /// The heading used for this cycle, gyro reading corrected for mounting
    /// direction.
    ///
    /// Units: radians, canonical in (-pi, pi]
    pub heading_rad: f64,

    /// The measured chassis turn rate, sign corrected for mounting
    /// direction.
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64,

    /// The commanded chassis rotation rate, zero for non-velocity commands.
    /// Fed back to the simulation to drive the gyro model.
    ///
    /// Units: radians/second
    pub omega_cmd_rads: f64,
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the module setpoints were desaturated this cycle, meaning the
    /// commanded chassis velocity was not fully achievable.
    pub desaturated: bool,

    /// True if the executed velocity command bypassed motion shaping.
    pub shaping_bypassed: bool,
}

/// Flat archive record of the current command.
///
/// The CSV writer only accepts scalar columns when writing headers, so the
/// command enum is recorded as a type tag plus the velocity axes (zero for
/// non-velocity commands).
#[derive(Clone, Copy, Serialize)]
struct CmdRecord {
    cmd_type: &'static str,
    forward: f64,
    strafe: f64,
    rotation: f64,
    field_relative: bool,
    rate_limited: bool,
}

/// Flat archive record of the cycle output, the per-module arrays spread
/// into named scalar columns.
#[derive(Clone, Copy, Serialize)]
struct OutputRecord {
    setpoint_speed_0_ms: f64,
    setpoint_angle_0_rad: f64,
    setpoint_speed_1_ms: f64,
    setpoint_angle_1_rad: f64,
    setpoint_speed_2_ms: f64,
    setpoint_angle_2_rad: f64,
    setpoint_speed_3_ms: f64,
    setpoint_angle_3_rad: f64,
    state_speed_0_ms: f64,
    state_angle_0_rad: f64,
    state_speed_1_ms: f64,
    state_angle_1_rad: f64,
    state_speed_2_ms: f64,
    state_angle_2_rad: f64,
    state_speed_3_ms: f64,
    state_angle_3_rad: f64,
    pose_x_m: f64,
    pose_y_m: f64,
    pose_heading_rad: f64,
    heading_rad: f64,
    turn_rate_rads: f64,
    omega_cmd_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = InitData;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data.params_path)?;

        // Create the arch folder for drive_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path)
            .map_err(|e| DriveCtrlError::ArchiverInitError(e.to_string()))?;

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv")
            .map_err(|e| DriveCtrlError::ArchiverInitError(e.to_string()))?;
        self.arch_current_cmd = Archiver::from_path(session, "drive_ctrl/current_cmd.csv")
            .map_err(|e| DriveCtrlError::ArchiverInitError(e.to_string()))?;
        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv")
            .map_err(|e| DriveCtrlError::ArchiverInitError(e.to_string()))?;

        self.init_eqpt(init_data.eqpt)
    }

    /// Perform cyclic processing of Drive Control.
    ///
    /// The processing order is fixed: read telemetry, update odometry,
    /// refresh the PID gains, process any new command, then drive the modules
    /// towards the current command's setpoints.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let gyro = self.gyro.as_mut().ok_or(DriveCtrlError::NotInitialised)?;
        let tuning = self.tuning.as_mut().ok_or(DriveCtrlError::NotInitialised)?;
        let odometry = self.odometry.as_mut().ok_or(DriveCtrlError::NotInitialised)?;
        let kinematics = self.kinematics.as_ref().ok_or(DriveCtrlError::NotInitialised)?;

        // Read this cycle's telemetry
        let mut heading_rad = Self::heading_from_gyro(&self.params, &**gyro);
        let turn_rate_rads = Self::turn_rate_from_gyro(&self.params, &**gyro);
        let positions = Self::module_positions(&self.modules);

        // Integrate the telemetry into the pose estimate
        odometry.update(heading_rad, &positions);

        // Refresh the PID gains from the tuning provider, fanning out to all
        // modules
        let driving_gains = tuning.driving_gains(&self.params.driving_pid);
        let turning_gains = tuning.turning_gains(&self.params.turning_pid);

        for module in self.modules.iter_mut() {
            module.set_driving_pid_values(&driving_gains)?;
            module.set_turning_pid_values(&turning_gains)?;
        }

        // Check to see if there's a new command. Momentary commands are
        // executed immediately and leave the previous persistent command in
        // place, persistent commands supersede it.
        if let Some(cmd) = input_data.cmd {
            match cmd {
                DriveCmd::ResetOdometry(pose) => {
                    odometry.reset(pose, heading_rad, &positions);
                }
                DriveCmd::ZeroHeading => {
                    gyro.reset();
                    heading_rad = Self::heading_from_gyro(&self.params, &**gyro);
                }
                DriveCmd::ResetEncoders => {
                    for module in self.modules.iter_mut() {
                        module.reset_encoders();
                    }

                    // Re-reference the odometry bookkeeping so the zeroed
                    // counters are not integrated as a jump in distance
                    let positions = Self::module_positions(&self.modules);
                    let pose = odometry.pose();
                    odometry.reset(pose, heading_rad, &positions);
                }
                DriveCmd::Velocity(v) if !v.is_valid() => {
                    return Err(DriveCtrlError::InvalidCmd(v));
                }
                _ => self.current_cmd = Some(cmd),
            }
        }

        let mut omega_cmd_rads = 0.0;

        // Execute the current persistent command, stopping if none has been
        // received yet
        match self.current_cmd.unwrap_or(DriveCmd::Stop) {
            DriveCmd::Velocity(v) => {
                // Shape the command against the slew limits
                let now_s = session::get_elapsed_seconds();
                let (shaped, slew_state) = shape(&self.params, self.slew_state, &v, now_s);
                self.slew_state = slew_state;
                self.report.shaping_bypassed = !v.rate_limited;

                // Scale the unit-range command to physical units
                let vx_ms = shaped.forward * self.params.max_speed_ms;
                let vy_ms = shaped.strafe * self.params.max_speed_ms;
                let omega_rads = shaped.rotation * self.params.max_angular_speed_rads;

                let speeds = if v.field_relative {
                    ChassisSpeeds::from_field_relative(vx_ms, vy_ms, omega_rads, heading_rad)
                } else {
                    ChassisSpeeds {
                        vx_ms,
                        vy_ms,
                        omega_rads,
                    }
                };

                let mut setpoints = kinematics.to_module_states(&speeds);
                self.report.desaturated = desaturate(&mut setpoints, self.params.max_speed_ms);

                for (module, setpoint) in self.modules.iter_mut().zip(setpoints.iter()) {
                    module.set_desired_state(*setpoint, self.params.pid_period_s);
                }

                omega_cmd_rads = omega_rads;
            }
            DriveCmd::Stop => {
                // Hold the current setpoint angles and bring the speeds to
                // zero
                for module in self.modules.iter_mut() {
                    let angle_rad = module.desired_state().angle_rad;
                    module.set_desired_state(
                        ModuleState {
                            speed_ms: 0.0,
                            angle_rad,
                        },
                        self.params.pid_period_s,
                    );
                }
            }
            DriveCmd::XLock => {
                for (module, angle_rad) in self.modules.iter_mut().zip(X_LOCK_ANGLES_RAD.iter()) {
                    module.set_desired_state(
                        ModuleState {
                            speed_ms: 0.0,
                            angle_rad: *angle_rad,
                        },
                        self.params.pid_period_s,
                    );
                }
            }
            DriveCmd::SetModuleStates(states) => {
                let mut setpoints = states;
                self.report.desaturated = desaturate(&mut setpoints, self.params.max_speed_ms);

                for (module, setpoint) in self.modules.iter_mut().zip(setpoints.iter()) {
                    module.set_desired_state(*setpoint, self.params.pid_period_s);
                }
            }
            // Momentary commands are never stored as the current command
            DriveCmd::ResetOdometry(_) | DriveCmd::ZeroHeading | DriveCmd::ResetEncoders => (),
        }

        let pose = odometry.pose();

        let mut module_setpoints = [ModuleState::default(); NUM_MODULES];
        let mut module_states = [ModuleState::default(); NUM_MODULES];

        for (i, module) in self.modules.iter().enumerate() {
            module_setpoints[i] = module.desired_state();
            module_states[i] = module.state();
        }

        let output = OutputData {
            module_setpoints,
            module_states,
            pose,
            heading_rad,
            turn_rate_rads,
            omega_cmd_rads,
        };

        trace!(
            "DriveCtrl output:\n    setpoints: {:?}\n    pose: {:?}",
            output.module_setpoints,
            output.pose
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;

        if let Some(ref cmd) = self.current_cmd {
            self.arch_current_cmd.serialise(CmdRecord::from(cmd))?;
        }

        if let Some(ref output) = self.output {
            self.arch_output.serialise(OutputRecord::from(output))?;
        }

        Ok(())
    }
}

impl CmdRecord {
    /// Record for a command which carries no velocity axes.
    fn tag_only(cmd_type: &'static str) -> Self {
        Self {
            cmd_type,
            forward: 0.0,
            strafe: 0.0,
            rotation: 0.0,
            field_relative: false,
            rate_limited: false,
        }
    }
}

impl From<&DriveCmd> for CmdRecord {
    fn from(cmd: &DriveCmd) -> Self {
        match *cmd {
            DriveCmd::Velocity(v) => CmdRecord {
                cmd_type: "velocity",
                forward: v.forward,
                strafe: v.strafe,
                rotation: v.rotation,
                field_relative: v.field_relative,
                rate_limited: v.rate_limited,
            },
            DriveCmd::Stop => CmdRecord::tag_only("stop"),
            DriveCmd::XLock => CmdRecord::tag_only("x_lock"),
            DriveCmd::SetModuleStates(_) => CmdRecord::tag_only("set_module_states"),
            DriveCmd::ResetOdometry(_) => CmdRecord::tag_only("reset_odometry"),
            DriveCmd::ZeroHeading => CmdRecord::tag_only("zero_heading"),
            DriveCmd::ResetEncoders => CmdRecord::tag_only("reset_encoders"),
        }
    }
}

impl From<&OutputData> for OutputRecord {
    fn from(output: &OutputData) -> Self {
        let sp = &output.module_setpoints;
        let st = &output.module_states;

        Self {
            setpoint_speed_0_ms: sp[0].speed_ms,
            setpoint_angle_0_rad: sp[0].angle_rad,
            setpoint_speed_1_ms: sp[1].speed_ms,
            setpoint_angle_1_rad: sp[1].angle_rad,
            setpoint_speed_2_ms: sp[2].speed_ms,
            setpoint_angle_2_rad: sp[2].angle_rad,
            setpoint_speed_3_ms: sp[3].speed_ms,
            setpoint_angle_3_rad: sp[3].angle_rad,
            state_speed_0_ms: st[0].speed_ms,
            state_angle_0_rad: st[0].angle_rad,
            state_speed_1_ms: st[1].speed_ms,
            state_angle_1_rad: st[1].angle_rad,
            state_speed_2_ms: st[2].speed_ms,
            state_angle_2_rad: st[2].angle_rad,
            state_speed_3_ms: st[3].speed_ms,
            state_angle_3_rad: st[3].angle_rad,
            pose_x_m: output.pose.x_m,
            pose_y_m: output.pose.y_m,
            pose_heading_rad: output.pose.heading_rad,
            heading_rad: output.heading_rad,
            turn_rate_rads: output.turn_rate_rads,
            omega_cmd_rads: output.omega_cmd_rads,
        }
    }
}

impl DriveCtrl {
    /// Take ownership of the equipment and set up the controllers, kinematics
    /// and odometry.
    ///
    /// `self.params` must be loaded before calling this function.
    fn init_eqpt(&mut self, eqpt: DriveEqpt) -> Result<(), DriveCtrlError> {
        if eqpt.modules.len() != NUM_MODULES {
            return Err(DriveCtrlError::WrongModuleCount(eqpt.modules.len()));
        }

        let mut modules = Vec::with_capacity(NUM_MODULES);

        for (i, module_eqpt) in eqpt.modules.into_iter().enumerate() {
            modules.push(SwerveModule::new(
                module_eqpt,
                self.params.module_angular_offsets_rad[i],
                &self.params,
            ));
        }

        self.modules = modules;
        self.gyro = Some(eqpt.gyro);
        self.tuning = Some(eqpt.tuning);
        self.kinematics = Some(SwerveKinematics::new(&self.params.module_positions_m));

        // Seed the odometry at the origin with the current telemetry
        let heading_rad = match self.gyro {
            Some(ref gyro) => Self::heading_from_gyro(&self.params, &**gyro),
            None => 0.0,
        };
        let positions = Self::module_positions(&self.modules);

        self.odometry = Some(SwerveOdometry::new(Pose::default(), heading_rad, &positions));

        Ok(())
    }

    /// The gyro heading corrected for the mounting direction, in radians.
    fn heading_from_gyro(params: &Params, gyro: &dyn Gyro) -> f64 {
        let sign = if params.gyro_reversed { -1.0 } else { 1.0 };
        wrap_angle((gyro.heading_degs() * sign).to_radians())
    }

    /// The gyro turn rate corrected for the mounting direction, in
    /// radians/second.
    fn turn_rate_from_gyro(params: &Params, gyro: &dyn Gyro) -> f64 {
        let sign = if params.gyro_reversed { -1.0 } else { 1.0 };
        (gyro.turn_rate_degs() * sign).to_radians()
    }

    /// Read the current position of every module.
    fn module_positions(modules: &[SwerveModule]) -> [ModulePosition; NUM_MODULES] {
        let mut positions = [ModulePosition::default(); NUM_MODULES];

        for (i, module) in modules.iter().enumerate() {
            positions[i] = module.position();
        }

        positions
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::VelocityCommand;
    use crate::eqpt::sim::{SimEqpt, SimParams};
    use crate::tuning::FixedTuning;

    const FRAC_PI_4: f64 = std::f64::consts::FRAC_PI_4;
    const DT: f64 = 0.02;

    /// Build an initialised DriveCtrl over simulated equipment, with the sim
    /// steer sensors starting at the angular offsets so every wheel points
    /// chassis-forward.
    fn test_drive_ctrl() -> (SimEqpt, DriveCtrl) {
        let (sim, eqpt) = SimEqpt::new(SimParams::default(), Box::new(FixedTuning));

        let mut ctrl = DriveCtrl::default();
        ctrl.init_eqpt(eqpt).unwrap();

        (sim, ctrl)
    }

    fn unshaped_velocity(forward: f64, strafe: f64, rotation: f64) -> DriveCmd {
        DriveCmd::Velocity(VelocityCommand {
            forward,
            strafe,
            rotation,
            field_relative: false,
            rate_limited: false,
        })
    }

    #[test]
    fn test_uninitialised_proc_errors() {
        let mut ctrl = DriveCtrl::default();

        assert!(matches!(
            ctrl.proc(&InputData::default()),
            Err(DriveCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_wrong_module_count_rejected() {
        let (_sim, mut eqpt) = SimEqpt::new(SimParams::default(), Box::new(FixedTuning));
        eqpt.modules.pop();

        let mut ctrl = DriveCtrl::default();

        assert!(matches!(
            ctrl.init_eqpt(eqpt),
            Err(DriveCtrlError::WrongModuleCount(3))
        ));
    }

    #[test]
    fn test_no_command_outputs_zero_speed() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let (output, _) = ctrl.proc(&InputData::default()).unwrap();

        for setpoint in output.module_setpoints.iter() {
            assert_eq!(setpoint.speed_ms, 0.0);
        }
        assert_eq!(output.omega_cmd_rads, 0.0);
    }

    #[test]
    fn test_invalid_velocity_rejected() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let input = InputData {
            cmd: Some(unshaped_velocity(1.5, 0.0, 0.0)),
        };

        assert!(matches!(
            ctrl.proc(&input),
            Err(DriveCtrlError::InvalidCmd(_))
        ));
    }

    #[test]
    fn test_x_lock_sets_diagonal_setpoints() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::XLock),
            })
            .unwrap();

        let expected = [FRAC_PI_4, -FRAC_PI_4, -FRAC_PI_4, FRAC_PI_4];

        for (setpoint, angle) in output.module_setpoints.iter().zip(expected.iter()) {
            assert_eq!(setpoint.speed_ms, 0.0);
            assert!((setpoint.angle_rad - angle).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forward_velocity_drives_forward() {
        let (mut sim, mut ctrl) = test_drive_ctrl();

        // Half speed forward, unshaped so the test does not depend on
        // session time
        let mut input = InputData {
            cmd: Some(unshaped_velocity(0.5, 0.0, 0.0)),
        };

        let mut output = OutputData::default();
        for _ in 0..200 {
            let (o, _) = ctrl.proc(&input).unwrap();
            output = o;
            sim.step(DT, output.omega_cmd_rads);

            // The command persists, no need to resend it
            input = InputData::default();
        }

        // Wheels at half of the 2 m/s maximum, pointing chassis-forward
        for state in output.module_states.iter() {
            assert!((state.speed_ms - 1.0).abs() < 0.1);
            assert!(state.angle_rad.abs() < 0.05);
        }

        // The pose has advanced along +x without turning
        assert!(output.pose.x_m > 1.0);
        assert!(output.pose.y_m.abs() < 0.1);
        assert!(output.pose.heading_rad.abs() < 1e-9);
    }

    #[test]
    fn test_reset_odometry_moves_pose() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let pose = Pose {
            x_m: 1.0,
            y_m: -2.0,
            heading_rad: 0.3,
        };

        ctrl.proc(&InputData {
            cmd: Some(DriveCmd::ResetOdometry(pose)),
        })
        .unwrap();

        // No movement since the reset, the pose must hold
        let (output, _) = ctrl.proc(&InputData::default()).unwrap();

        assert!((output.pose.x_m - 1.0).abs() < 1e-9);
        assert!((output.pose.y_m + 2.0).abs() < 1e-9);
        assert!((output.pose.heading_rad - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_momentary_command_keeps_persistent_command() {
        let (mut sim, mut ctrl) = test_drive_ctrl();

        // Establish a persistent velocity command
        ctrl.proc(&InputData {
            cmd: Some(unshaped_velocity(0.5, 0.0, 0.0)),
        })
        .unwrap();
        sim.step(DT, 0.0);

        // A momentary command must not clear it
        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::ZeroHeading),
            })
            .unwrap();

        assert!(output.module_setpoints[0].speed_ms > 0.0);
        assert!(matches!(ctrl.current_cmd, Some(DriveCmd::Velocity(_))));
    }

    /// Serialise a record through a header-writing CSV writer, as the
    /// archiver does.
    fn csv_accepts<T: serde::Serialize>(record: T) -> bool {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);
        writer.serialize(record).is_ok()
    }

    #[test]
    fn test_archive_records_serialise_as_csv() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let (output, report) = ctrl
            .proc(&InputData {
                cmd: Some(unshaped_velocity(0.5, 0.0, 0.2)),
            })
            .unwrap();

        // Every archived record type must be a flat struct the CSV writer
        // accepts while writing headers
        assert!(csv_accepts(report));
        assert!(csv_accepts(OutputRecord::from(&output)));
        assert!(csv_accepts(CmdRecord::from(&unshaped_velocity(0.5, 0.0, 0.2))));
        assert!(csv_accepts(CmdRecord::from(&DriveCmd::XLock)));
        assert!(csv_accepts(CmdRecord::from(&DriveCmd::ResetOdometry(
            Pose::default()
        ))));
    }

    #[test]
    fn test_output_record_carries_pose_and_setpoints() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::XLock),
            })
            .unwrap();

        let record = OutputRecord::from(&output);

        assert_eq!(record.setpoint_speed_0_ms, output.module_setpoints[0].speed_ms);
        assert_eq!(record.setpoint_angle_3_rad, output.module_setpoints[3].angle_rad);
        assert_eq!(record.pose_x_m, output.pose.x_m);
        assert_eq!(record.heading_rad, output.heading_rad);
    }

    #[test]
    fn test_desaturation_reported() {
        let (_sim, mut ctrl) = test_drive_ctrl();

        // Full translation plus full rotation cannot be met simultaneously
        let (_, report) = ctrl
            .proc(&InputData {
                cmd: Some(unshaped_velocity(1.0, 0.0, 1.0)),
            })
            .unwrap();

        assert!(report.desaturated);
        assert!(report.shaping_bypassed);
    }
}
