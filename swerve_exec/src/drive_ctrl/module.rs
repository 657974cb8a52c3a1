//! Swerve module controller
//!
//! One instance exists per wheel. Each controller owns its module's drive and
//! turn motors plus the absolute steer sensor, and closes the loop on wheel
//! speed and steer angle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveCtrlError, ModulePosition, ModuleState, Params, PidController};
use crate::eqpt::ModuleEqpt;
use util::maths::{angle_difference, rem_euclid, wrap_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Controller for a single swerve module.
pub struct SwerveModule {
    eqpt: ModuleEqpt,

    /// Offset between the steer sensor zero and the chassis forward
    /// direction.
    ///
    /// Units: radians
    angular_offset_rad: f64,

    driving_pid: PidController,
    turning_pid: PidController,

    /// The last optimised setpoint applied to the module.
    desired_state: ModuleState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveModule {
    /// Create a module controller around the given equipment.
    ///
    /// The desired state starts at zero speed with the module's current
    /// angle, so an idle module does not snap to zero on the first tick.
    pub fn new(eqpt: ModuleEqpt, angular_offset_rad: f64, params: &Params) -> Self {
        let driving_pid = PidController::new(
            params.driving_pid[0],
            params.driving_pid[1],
            params.driving_pid[2],
        )
        .with_feedforward(1.0 / params.drive_wheel_free_speed_ms);

        // Continuous input lets the turn controller take the short path
        // through the angle wrap boundary
        let turning_pid = PidController::new(
            params.turning_pid[0],
            params.turning_pid[1],
            params.turning_pid[2],
        )
        .with_continuous_input();

        let mut module = Self {
            eqpt,
            angular_offset_rad,
            driving_pid,
            turning_pid,
            desired_state: ModuleState::default(),
        };

        module.desired_state.angle_rad = module.angle_rad();
        module.eqpt.drive_motor.reset_position();

        module
    }

    /// The module's current angle in the chassis frame.
    pub fn angle_rad(&self) -> f64 {
        // The sensor reads a raw cumulative angle in its own frame, reduce it
        // to one revolution and translate into the chassis frame
        let raw = rem_euclid(self.eqpt.steer_sensor.angle_rad(), std::f64::consts::TAU);
        wrap_angle(raw - self.angular_offset_rad)
    }

    /// The module's current measured state.
    pub fn state(&self) -> ModuleState {
        ModuleState {
            speed_ms: self.eqpt.drive_motor.velocity_ms(),
            angle_rad: self.angle_rad(),
        }
    }

    /// The module's current measured position.
    pub fn position(&self) -> ModulePosition {
        ModulePosition {
            distance_m: self.eqpt.drive_motor.position_m(),
            angle_rad: self.angle_rad(),
        }
    }

    /// The last optimised setpoint applied to the module.
    pub fn desired_state(&self) -> ModuleState {
        self.desired_state
    }

    /// Optimise a setpoint against the current angle so the module never
    /// rotates more than 90 degrees.
    ///
    /// If reaching the target angle would require a turn of more than pi/2
    /// the angle is flipped by pi and the speed negated, the module drives
    /// "backwards" instead of swinging the long way round.
    pub fn optimize(desired: ModuleState, current_angle_rad: f64) -> ModuleState {
        if angle_difference(desired.angle_rad, current_angle_rad) > std::f64::consts::FRAC_PI_2 {
            ModuleState {
                speed_ms: -desired.speed_ms,
                angle_rad: wrap_angle(desired.angle_rad + std::f64::consts::PI),
            }
        } else {
            ModuleState {
                speed_ms: desired.speed_ms,
                angle_rad: wrap_angle(desired.angle_rad),
            }
        }
    }

    /// Apply a new setpoint to the module, driving both motors towards it.
    pub fn set_desired_state(&mut self, desired: ModuleState, dt_s: f64) {
        let current_angle = self.angle_rad();
        let optimized = Self::optimize(desired, current_angle);

        let drive_output = self.driving_pid.calculate(
            self.eqpt.drive_motor.velocity_ms(),
            optimized.speed_ms,
            dt_s,
        );
        self.eqpt.drive_motor.set_output(drive_output);

        let turn_output = self
            .turning_pid
            .calculate(current_angle, optimized.angle_rad, dt_s);
        self.eqpt.turn_motor.set_output(turn_output);

        self.desired_state = optimized;
    }

    /// Set the P, I and D gains for the drive speed controller.
    ///
    /// `values` must contain exactly three gains, any other length is a
    /// contract violation.
    pub fn set_driving_pid_values(&mut self, values: &[f64]) -> Result<(), DriveCtrlError> {
        if values.len() != 3 {
            return Err(DriveCtrlError::InvalidGains(values.len()));
        }

        self.driving_pid.set_gains(values[0], values[1], values[2]);
        Ok(())
    }

    /// Set the P, I and D gains for the steer angle controller.
    ///
    /// `values` must contain exactly three gains, any other length is a
    /// contract violation.
    pub fn set_turning_pid_values(&mut self, values: &[f64]) -> Result<(), DriveCtrlError> {
        if values.len() != 3 {
            return Err(DriveCtrlError::InvalidGains(values.len()));
        }

        self.turning_pid.set_gains(values[0], values[1], values[2]);
        Ok(())
    }

    /// Current drive speed controller gains.
    pub fn driving_pid_values(&self) -> [f64; 3] {
        self.driving_pid.gains()
    }

    /// Current steer angle controller gains.
    pub fn turning_pid_values(&self) -> [f64; 3] {
        self.turning_pid.gains()
    }

    /// Zero the cumulative drive-position counter. Does not affect the
    /// angle.
    pub fn reset_encoders(&mut self) {
        self.eqpt.drive_motor.reset_position();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::sim::{SimEqpt, SimParams};
    use crate::tuning::FixedTuning;

    const PI: f64 = std::f64::consts::PI;
    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;
    const DT: f64 = 0.02;

    fn test_module() -> (SimEqpt, SwerveModule) {
        let mut sim_params = SimParams::default();
        sim_params.initial_steer_angles_rad = [0.0; 4];

        let (sim, mut eqpt) = SimEqpt::new(sim_params, Box::new(FixedTuning));
        let module = SwerveModule::new(eqpt.modules.remove(0), 0.0, &Params::default());

        (sim, module)
    }

    #[test]
    fn test_optimize_never_exceeds_quarter_turn() {
        let mut target_angle = -PI;
        while target_angle <= PI {
            let mut current_angle = -PI;
            while current_angle <= PI {
                let desired = ModuleState {
                    speed_ms: 1.0,
                    angle_rad: target_angle,
                };
                let optimized = SwerveModule::optimize(desired, current_angle);

                let delta = angle_difference(optimized.angle_rad, current_angle);
                assert!(
                    delta <= FRAC_PI_2 + 1e-9,
                    "delta {} for current {} target {}",
                    delta,
                    current_angle,
                    target_angle
                );

                // Speed is negated exactly when the raw target was more than
                // a quarter turn away
                if angle_difference(target_angle, current_angle) > FRAC_PI_2 {
                    assert_eq!(optimized.speed_ms, -1.0);
                } else {
                    assert_eq!(optimized.speed_ms, 1.0);
                }

                current_angle += 0.1;
            }
            target_angle += 0.1;
        }
    }

    #[test]
    fn test_invalid_gain_length_rejected() {
        let (_, mut module) = test_module();

        assert!(matches!(
            module.set_driving_pid_values(&[0.1, 0.0]),
            Err(DriveCtrlError::InvalidGains(2))
        ));
        assert!(matches!(
            module.set_turning_pid_values(&[0.1, 0.0, 0.0, 0.5]),
            Err(DriveCtrlError::InvalidGains(4))
        ));

        assert!(module.set_driving_pid_values(&[0.1, 0.0, 0.0]).is_ok());
        assert_eq!(module.driving_pid_values(), [0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_closed_loop_converges_on_setpoint() {
        let (mut sim, mut module) = test_module();

        let target = ModuleState {
            speed_ms: 1.0,
            angle_rad: 0.4,
        };

        for _ in 0..250 {
            module.set_desired_state(target, DT);
            sim.step(DT, 0.0);
        }

        let state = module.state();
        assert!((state.speed_ms - 1.0).abs() < 0.1);
        assert!(angle_difference(state.angle_rad, 0.4) < 0.05);
    }

    #[test]
    fn test_reset_encoders_zeroes_distance_only() {
        let (mut sim, mut module) = test_module();

        // Drive forward for a while to accumulate distance
        let target = ModuleState {
            speed_ms: 1.0,
            angle_rad: 0.0,
        };
        for _ in 0..100 {
            module.set_desired_state(target, DT);
            sim.step(DT, 0.0);
        }

        assert!(module.position().distance_m > 0.0);

        let angle_before = module.angle_rad();
        module.reset_encoders();

        assert_eq!(module.position().distance_m, 0.0);
        assert_eq!(module.angle_rad(), angle_before);
    }

    #[test]
    fn test_angular_offset_translates_to_chassis_frame() {
        let mut sim_params = SimParams::default();
        sim_params.initial_steer_angles_rad = [1.0, 0.0, 0.0, 0.0];

        let (_sim, mut eqpt) = SimEqpt::new(sim_params, Box::new(FixedTuning));
        let module = SwerveModule::new(eqpt.modules.remove(0), 1.0, &Params::default());

        // Raw sensor angle equals the offset, so the chassis-frame angle is
        // zero
        assert!(module.angle_rad().abs() < 1e-12);
    }
}
