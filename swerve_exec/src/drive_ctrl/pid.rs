//! Closed loop PID controller used by the module controllers.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::{clamp, wrap_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller with optional feedforward and continuous (wraparound)
/// input support.
///
/// With continuous input enabled the error is wrapped into the shorter arc of
/// the circle, so the controller always takes the short path through the
/// angle wrap boundary.
#[derive(Debug, Clone)]
pub struct PidController {
    p: f64,
    i: f64,
    d: f64,

    /// Feedforward gain applied to the setpoint, not the error.
    ff: f64,

    continuous: bool,

    min_output: f64,
    max_output: f64,

    integral: f64,
    prev_error: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains. Output is limited to
    /// the normalised motor command range of -1 to +1.
    pub fn new(p: f64, i: f64, d: f64) -> Self {
        Self {
            p,
            i,
            d,
            ff: 0.0,
            continuous: false,
            min_output: -1.0,
            max_output: 1.0,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// Add a feedforward gain applied to the setpoint.
    pub fn with_feedforward(mut self, ff: f64) -> Self {
        self.ff = ff;
        self
    }

    /// Enable continuous input, treating the input domain as a circle so the
    /// controller takes the shorter path through the wrap boundary.
    pub fn with_continuous_input(mut self) -> Self {
        self.continuous = true;
        self
    }

    /// Set the P, I and D gains, keeping the accumulated state.
    pub fn set_gains(&mut self, p: f64, i: f64, d: f64) {
        self.p = p;
        self.i = i;
        self.d = d;
    }

    /// Get the current P, I and D gains.
    pub fn gains(&self) -> [f64; 3] {
        [self.p, self.i, self.d]
    }

    /// Clear the integrator and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// Calculate the controller output for the given measurement and
    /// setpoint over the elapsed period `dt_s`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, dt_s: f64) -> f64 {
        let mut error = setpoint - measurement;

        if self.continuous {
            error = wrap_angle(error);
        }

        if dt_s > 0.0 {
            self.integral += error * dt_s;
        }

        let derivative = match self.prev_error {
            Some(prev) if dt_s > 0.0 => (error - prev) / dt_s,
            _ => 0.0,
        };

        self.prev_error = Some(error);

        let output = self.p * error
            + self.i * self.integral
            + self.d * derivative
            + self.ff * setpoint;

        clamp(&output, &self.min_output, &self.max_output)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(0.5, 0.0, 0.0);

        assert!((pid.calculate(0.0, 1.0, 0.02) - 0.5).abs() < 1e-12);
        assert!((pid.calculate(1.0, 1.0, 0.02)).abs() < 1e-12);
        assert!((pid.calculate(2.0, 1.0, 0.02) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = PidController::new(10.0, 0.0, 0.0);

        assert_eq!(pid.calculate(0.0, 1.0, 0.02), 1.0);
        assert_eq!(pid.calculate(1.0, 0.0, 0.02), -1.0);
    }

    #[test]
    fn test_continuous_input_takes_short_path() {
        let mut pid = PidController::new(1.0, 0.0, 0.0).with_continuous_input();

        // From just below the wrap boundary to just above it the error is
        // small and positive, not nearly a full turn negative
        let out = pid.calculate(PI - 0.1, -PI + 0.1, 0.02);
        assert!((out - 0.2).abs() < 1e-9);

        // And the same the other way round
        let out = pid.calculate(-PI + 0.1, PI - 0.1, 0.02);
        assert!((out + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_feedforward() {
        let mut pid = PidController::new(0.0, 0.0, 0.0).with_feedforward(0.25);

        // No error, output is pure feedforward on the setpoint
        assert!((pid.calculate(2.0, 2.0, 0.02) - 0.5).abs() < 1e-12);
    }
}
