//! Utility maths functions
//!
//! Angle handling convention: all angles are in radians and canonical angles
//! lie in the half-open range (-pi, pi].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap any angle into the canonical range (-pi, pi].
///
/// This is a total function, any real input produces a canonical angle.
pub fn wrap_angle<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    // Shift so that the wrap boundary falls at -pi, reduce into [0, 2pi), and
    // shift back. Exactly pi maps to pi, exactly -pi maps to pi.
    pi_t - rem_euclid(pi_t - angle, tau_t)
}

/// Get the unsigned shortest angular distance between two angles.
///
/// The result is always in [0, pi], accounting for wrapping through the -pi/pi
/// boundary.
pub fn angle_difference<T>(a: T, b: T) -> T
where
    T: Float
{
    wrap_angle(a - b).abs()
}

/// Step `current` towards `target` along the shorter arc, moving at most
/// `max_step`.
///
/// If `target` is within `max_step` of `current` the (wrapped) target is
/// returned exactly, otherwise the result is `current` moved by `max_step` in
/// the direction of the shorter arc, wrapping through the -pi/pi boundary.
pub fn step_towards_circular<T>(current: T, target: T, max_step: T) -> T
where
    T: Float
{
    // Signed shortest-arc offset from current to target
    let offset = wrap_angle(target - current);

    if offset.abs() <= max_step {
        wrap_angle(target)
    }
    else {
        wrap_angle(current + max_step * offset.signum())
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(PI) - PI).abs() < 1e-12);
        assert!(wrap_angle(0f64).abs() < 1e-12);
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(7.0 * PI + 0.1) - (-PI + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_angle_difference() {
        // Near the wrap boundary the short way round is taken
        assert!((angle_difference(PI - 0.01, -PI + 0.01) - 0.02).abs() < 1e-9);
        assert!((angle_difference(-PI + 0.01, PI - 0.01) - 0.02).abs() < 1e-9);
        assert!((angle_difference(0.0, PI) - PI).abs() < 1e-12);
        assert!((angle_difference(0.25 * PI, -0.25 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!(angle_difference(1f64, 1f64).abs() < 1e-12);
    }

    #[test]
    fn test_step_towards_circular() {
        // Within max_step the target is returned exactly
        assert_eq!(step_towards_circular(0.0, 0.1, 0.2), 0.1);

        // Outside max_step the result moves by exactly max_step
        assert!((step_towards_circular(0.0, 1.0, 0.2) - 0.2).abs() < 1e-12);
        assert!((step_towards_circular(0.0, -1.0, 0.2) + 0.2).abs() < 1e-12);

        // Stepping through the -pi/pi boundary takes the short way round
        let stepped = step_towards_circular(PI - 0.05, -PI + 0.5, 0.1);
        assert!(angle_difference(stepped, -PI + 0.05) < 1e-9);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.5, &0.0, &1.0), 0.5);
        assert_eq!(clamp(&-0.5, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&1.5, &0.0, &1.0), 1.0);
    }
}
