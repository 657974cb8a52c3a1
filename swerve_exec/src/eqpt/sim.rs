//! Simulated equipment
//!
//! Simple first-order models of the drive motors, steer assemblies and the
//! gyro, standing in for the real device drivers. Used by the executable when
//! no hardware is present and by the closed-loop unit tests.
//!
//! The executive steps the simulation once per cycle, between the drive
//! control processing of consecutive ticks. All models share state with
//! their trait handles through `Rc<RefCell<..>>`, execution is single
//! threaded throughout.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use super::{DriveEqpt, Gyro, ModuleEqpt, Motor, SteerSensor};
use crate::drive_ctrl::NUM_MODULES;
use crate::tuning::TuningProvider;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Wheel speed at full drive motor output.
    ///
    /// Units: meters/second
    pub drive_free_speed_ms: f64,

    /// First order time constant of the drive motor speed response.
    ///
    /// Units: seconds
    pub drive_time_constant_s: f64,

    /// Steer rate at full turn motor output.
    ///
    /// Units: radians/second
    pub steer_max_rate_rads: f64,

    /// Initial raw steer sensor angle of each module. Setting these to the
    /// module angular offsets starts every wheel pointing chassis-forward.
    ///
    /// Units: radians
    pub initial_steer_angles_rad: [f64; NUM_MODULES],
}

#[derive(Default)]
struct SimDriveState {
    output: f64,
    velocity_ms: f64,
    position_m: f64,
}

#[derive(Default)]
struct SimSteerState {
    output: f64,
    angle_rad: f64,
}

#[derive(Default)]
struct SimGyroState {
    heading_degs: f64,
    rate_degs: f64,
}

/// Handle to all simulated equipment state, retained by the executive so the
/// models can be stepped each cycle.
pub struct SimEqpt {
    params: SimParams,
    drives: Vec<Rc<RefCell<SimDriveState>>>,
    steers: Vec<Rc<RefCell<SimSteerState>>>,
    gyro: Rc<RefCell<SimGyroState>>,
}

struct SimDriveMotor(Rc<RefCell<SimDriveState>>);
struct SimTurnMotor(Rc<RefCell<SimSteerState>>);
struct SimSteerSensor(Rc<RefCell<SimSteerState>>);
struct SimGyro(Rc<RefCell<SimGyroState>>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            drive_free_speed_ms: 4.46,
            drive_time_constant_s: 0.15,
            steer_max_rate_rads: 12.0,
            initial_steer_angles_rad: [0.147, 2.046, -1.321, 1.801],
        }
    }
}

impl Motor for SimDriveMotor {
    fn set_output(&mut self, output: f64) {
        self.0.borrow_mut().output = clamp(&output, &-1.0, &1.0);
    }

    fn velocity_ms(&self) -> f64 {
        self.0.borrow().velocity_ms
    }

    fn position_m(&self) -> f64 {
        self.0.borrow().position_m
    }

    fn reset_position(&mut self) {
        self.0.borrow_mut().position_m = 0.0;
    }
}

impl Motor for SimTurnMotor {
    fn set_output(&mut self, output: f64) {
        self.0.borrow_mut().output = clamp(&output, &-1.0, &1.0);
    }

    // The steer sensor is absolute, the turn motor's own encoder is unused
    fn velocity_ms(&self) -> f64 {
        0.0
    }

    fn position_m(&self) -> f64 {
        0.0
    }

    fn reset_position(&mut self) {}
}

impl SteerSensor for SimSteerSensor {
    fn angle_rad(&self) -> f64 {
        self.0.borrow().angle_rad
    }
}

impl Gyro for SimGyro {
    fn heading_degs(&self) -> f64 {
        // Wrap the integrated heading into -180 to +180
        let wrapped = self.0.borrow().heading_degs.rem_euclid(360.0);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    fn turn_rate_degs(&self) -> f64 {
        self.0.borrow().rate_degs
    }

    fn reset(&mut self) {
        self.0.borrow_mut().heading_degs = 0.0;
    }
}

impl SimEqpt {
    /// Build the simulated equipment set and the `DriveEqpt` handed to
    /// DriveCtrl.
    pub fn new(
        params: SimParams,
        tuning: Box<dyn TuningProvider>,
    ) -> (Self, DriveEqpt) {
        let mut drives = Vec::with_capacity(NUM_MODULES);
        let mut steers = Vec::with_capacity(NUM_MODULES);
        let mut modules = Vec::with_capacity(NUM_MODULES);

        for i in 0..NUM_MODULES {
            let drive = Rc::new(RefCell::new(SimDriveState::default()));
            let steer = Rc::new(RefCell::new(SimSteerState {
                output: 0.0,
                angle_rad: params.initial_steer_angles_rad[i],
            }));

            modules.push(ModuleEqpt {
                drive_motor: Box::new(SimDriveMotor(drive.clone())),
                turn_motor: Box::new(SimTurnMotor(steer.clone())),
                steer_sensor: Box::new(SimSteerSensor(steer.clone())),
            });

            drives.push(drive);
            steers.push(steer);
        }

        let gyro = Rc::new(RefCell::new(SimGyroState::default()));

        let eqpt = DriveEqpt {
            modules,
            gyro: Box::new(SimGyro(gyro.clone())),
            tuning,
        };

        (
            Self {
                params,
                drives,
                steers,
                gyro,
            },
            eqpt,
        )
    }

    /// Advance all models by `dt_s`.
    ///
    /// `omega_rads` is the chassis rotation rate to integrate into the gyro,
    /// taken from the commanded rotation of the previous cycle.
    pub fn step(&mut self, dt_s: f64, omega_rads: f64) {
        let alpha = (dt_s / self.params.drive_time_constant_s).min(1.0);

        for drive in self.drives.iter() {
            let mut d = drive.borrow_mut();
            let target = d.output * self.params.drive_free_speed_ms;
            d.velocity_ms += (target - d.velocity_ms) * alpha;
            d.position_m += d.velocity_ms * dt_s;
        }

        for steer in self.steers.iter() {
            let mut s = steer.borrow_mut();
            s.angle_rad += s.output * self.params.steer_max_rate_rads * dt_s;
        }

        let mut g = self.gyro.borrow_mut();
        g.rate_degs = omega_rads.to_degrees();
        g.heading_degs += g.rate_degs * dt_s;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::tuning::FixedTuning;

    #[test]
    fn test_drive_motor_approaches_free_speed() {
        let (mut sim, mut eqpt) = SimEqpt::new(SimParams::default(), Box::new(FixedTuning));

        eqpt.modules[0].drive_motor.set_output(1.0);

        for _ in 0..200 {
            sim.step(0.02, 0.0);
        }

        let v = eqpt.modules[0].drive_motor.velocity_ms();
        assert!((v - SimParams::default().drive_free_speed_ms).abs() < 0.05);

        // Position has accumulated
        assert!(eqpt.modules[0].drive_motor.position_m() > 0.0);
    }

    #[test]
    fn test_gyro_integrates_rate_and_resets() {
        let (mut sim, mut eqpt) = SimEqpt::new(SimParams::default(), Box::new(FixedTuning));

        // Quarter turn per second for one second
        for _ in 0..50 {
            sim.step(0.02, std::f64::consts::FRAC_PI_2);
        }

        assert!((eqpt.gyro.heading_degs() - 90.0).abs() < 1e-6);

        eqpt.gyro.reset();
        assert_eq!(eqpt.gyro.heading_degs(), 0.0);
    }
}
