//! Motion shaping (slew rate limiting) for chassis velocity commands
//!
//! The raw unit-range `(forward, strafe, rotation)` command is shaped so that
//! it cannot change faster than the configured limits, improving traction and
//! reducing mechanical stress. Translation is shaped in polar form, rotation
//! through its own independent rate limiter.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, VelocityCommand};
use util::maths::{angle_difference, clamp, step_towards_circular, wrap_angle};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Direction changes below this threshold are followed directly, stepping the
/// direction while ramping the magnitude.
const SMALL_DIR_CHANGE_RAD: f64 = 0.45 * std::f64::consts::PI;

/// Direction changes above this threshold are treated as a reversal: the
/// magnitude is decayed to near zero before the direction is flipped by pi.
const REVERSAL_DIR_CHANGE_RAD: f64 = 0.85 * std::f64::consts::PI;

/// Magnitude below which the translation is considered stopped for the
/// purpose of the reversal flip. Avoids floating-point equality checks.
const REVERSAL_MAG_EPSILON: f64 = 1e-4;

/// Effective direction slew rate used when the current magnitude is zero. A
/// stationary chassis may change direction instantaneously.
const INSTANT_DIR_SLEW_RADPS: f64 = 500.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion shaping continuity state, carried across ticks.
///
/// Owned exclusively by DriveCtrl and threaded explicitly through `shape` so
/// the shaping behaviour is unit-testable without a scheduler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SlewState {
    /// Current shaped translation direction, canonical in (-pi, pi].
    ///
    /// Units: radians
    pub translation_dir_rad: f64,

    /// Current shaped translation magnitude.
    ///
    /// Units: normalised, 0 to 1
    pub translation_mag: f64,

    /// Current shaped rotation command.
    ///
    /// Units: normalised, -1 to +1
    pub rotation: f64,

    /// Time of the previous shaping update, in session-elapsed seconds.
    pub prev_time_s: f64,
}

/// A shaped unit-range chassis velocity, in Cartesian form.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ShapedVelocity {
    pub forward: f64,
    pub strafe: f64,
    pub rotation: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SlewState {
    fn default() -> Self {
        SlewState {
            translation_dir_rad: 0.0,
            translation_mag: 0.0,
            rotation: 0.0,
            prev_time_s: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit the rate of change of `current` towards `target`, moving at most
/// `rate_per_s * dt_s` in one step.
pub fn rate_limit(rate_per_s: f64, current: f64, target: f64, dt_s: f64) -> f64 {
    let max_step = rate_per_s * dt_s;
    current + clamp(&(target - current), &-max_step, &max_step)
}

/// Shape a raw velocity command against the slew rate limits.
///
/// Returns the shaped unit-range velocity and the updated slew state. If the
/// command is not rate limited it passes through unchanged, with only the
/// rotation continuity updated so a later shaped command resumes from the
/// correct value.
pub fn shape(
    params: &Params,
    state: SlewState,
    cmd: &VelocityCommand,
    now_s: f64,
) -> (ShapedVelocity, SlewState) {
    if !cmd.rate_limited {
        let mut new_state = state;
        new_state.rotation = cmd.rotation;

        return (
            ShapedVelocity {
                forward: cmd.forward,
                strafe: cmd.strafe,
                rotation: cmd.rotation,
            },
            new_state,
        );
    }

    // Convert the translation to polar form for shaping
    let input_dir = cmd.strafe.atan2(cmd.forward);
    let input_mag = cmd.forward.hypot(cmd.strafe);

    // The allowed direction rate is inversely proportional to the current
    // magnitude: a sharp turn at high speed must slow down first. At zero
    // magnitude the direction may change instantaneously.
    let direction_slew_radps = if state.translation_mag != 0.0 {
        (params.direction_slew_rate_radps / state.translation_mag).abs()
    } else {
        INSTANT_DIR_SLEW_RADPS
    };

    let dt_s = now_s - state.prev_time_s;
    let angle_dif = angle_difference(input_dir, state.translation_dir_rad);

    let mut dir = state.translation_dir_rad;
    let mut mag = state.translation_mag;

    if angle_dif < SMALL_DIR_CHANGE_RAD {
        dir = step_towards_circular(dir, input_dir, direction_slew_radps * dt_s);
        mag = rate_limit(params.magnitude_slew_rate, mag, input_mag, dt_s);
    } else if angle_dif > REVERSAL_DIR_CHANGE_RAD {
        if mag > REVERSAL_MAG_EPSILON {
            // Keep the direction and decay the magnitude, the flip happens
            // once the chassis has effectively stopped translating
            mag = rate_limit(params.magnitude_slew_rate, mag, 0.0, dt_s);
        } else {
            dir = wrap_angle(dir + std::f64::consts::PI);
            mag = rate_limit(params.magnitude_slew_rate, mag, input_mag, dt_s);
        }
    } else {
        // Ambiguous zone: keep turning towards the target but slow down
        dir = step_towards_circular(dir, input_dir, direction_slew_radps * dt_s);
        mag = rate_limit(params.magnitude_slew_rate, mag, 0.0, dt_s);
    }

    let rotation = rate_limit(params.rotational_slew_rate, state.rotation, cmd.rotation, dt_s);

    let new_state = SlewState {
        translation_dir_rad: dir,
        translation_mag: mag,
        rotation,
        prev_time_s: now_s,
    };

    (
        ShapedVelocity {
            forward: mag * dir.cos(),
            strafe: mag * dir.sin(),
            rotation,
        },
        new_state,
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
