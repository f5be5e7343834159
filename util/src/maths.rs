//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;
use std::convert::TryFrom;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// The return value `r` satisfies `0.0 <= r < rhs.abs()` in most cases.
/// Due to floating point round-off it can result in `r == rhs.abs()` when
/// `lhs` is much smaller than `rhs.abs()` in magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the half-open interval `[-pi, pi)`.
///
/// Computes `((a + pi) mod 2pi) - pi`. Angles already inside the interval
/// are returned unchanged, so the wrap is exactly idempotent. Non-finite
/// angles are returned as they are.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::nan);
    let tau_t = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    if !angle.is_finite() || (angle >= -pi_t && angle < pi_t) {
        return angle;
    }

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // Round-off in rem_euclid can land exactly on the open end
    if wrapped >= pi_t {
        wrapped - tau_t
    }
    else {
        wrapped
    }
}

/// Round a value to the given number of decimal places.
///
/// When `10^decimals` or the scaled value cannot be represented the value is already exact to
/// that many places and is returned as it is. Negative zero is normalised to positive zero.
pub fn round_dp<T>(value: T, decimals: u32) -> T
where
    T: Float
{
    let scale = i32::try_from(decimals)
        .ok()
        .and_then(|d| T::from(10f64.powi(d)))
        .filter(|s| s.is_finite());

    let rounded = match scale {
        Some(s) if (value * s).is_finite() => (value * s).round() / s,
        _ => value,
    };

    if rounded == T::zero() { T::zero() } else { rounded }
}

/// Element-wise mean of a set of equally sized samples.
///
/// Returns `None` if there are no samples or the samples differ in length.
pub fn mean_columns<T>(samples: &[Vec<T>]) -> Option<Vec<T>>
where
    T: Float
{
    let first = samples.first()?;
    if samples.iter().any(|s| s.len() != first.len()) {
        return None;
    }

    let count = T::from(samples.len())?;
    let mut sums = vec![T::zero(); first.len()];

    for sample in samples {
        for (sum, value) in sums.iter_mut().zip(sample.iter()) {
            *sum = *sum + *value;
        }
    }

    Some(sums.into_iter().map(|s| s / count).collect())
}

/// Root mean square of a set of values, or `None` if there are no values.
pub fn rms<T>(values: &[T]) -> Option<T>
where
    T: Float
{
    if values.is_empty() {
        return None;
    }

    let sum_sq = values
        .iter()
        .fold(T::zero(), |acc, v| acc + v.powi(2));

    Some((sum_sq / T::from(values.len())?).sqrt())
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_wrap_to_pi_interval() {
        let angles = [
            0.0, 1.0, -1.0, PI, -PI, TAU, -TAU, 3.0 * PI, -3.0 * PI,
            7.5, -7.5, 100.0, -100.0, 1e6, -1e6, PI - 1e-12, -PI - 1e-12
        ];

        for a in angles.iter() {
            let w = wrap_to_pi(*a);
            assert!(w >= -PI && w < PI, "wrap({}) = {} is out of range", a, w);
        }
    }

    #[test]
    fn test_wrap_to_pi_boundary() {
        assert_eq!(wrap_to_pi(PI), -PI);
        assert_eq!(wrap_to_pi(-PI), -PI);
        assert_eq!(wrap_to_pi(0.0), 0.0);
        assert_eq!(wrap_to_pi(0.5), 0.5);
    }

    #[test]
    fn test_wrap_to_pi_idempotent() {
        for i in -400..400 {
            let a = i as f64 * 0.0371;
            let w = wrap_to_pi(a);
            assert_eq!(wrap_to_pi(w), w);
        }
    }

    #[test]
    fn test_wrap_to_pi_periodic() {
        for i in -50..50 {
            let a = i as f64 * 0.113;
            for k in -4..=4 {
                let shifted = wrap_to_pi(a + TAU * k as f64);
                let base = wrap_to_pi(a);

                // Compare on the circle so -pi and pi-eps are treated as neighbours
                let diff = wrap_to_pi(shifted - base).abs();
                assert!(diff < 1e-9, "wrap({} + 2pi*{}) = {} != {}", a, k, shifted, base);
            }
        }
    }

    #[test]
    fn test_wrap_to_pi_non_finite() {
        assert!(wrap_to_pi(f64::NAN).is_nan());
        assert_eq!(wrap_to_pi(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(PI, 6), 3.141593);
        assert_eq!(round_dp(-1.23456789, 3), -1.235);
        assert_eq!(round_dp(2.5, 0), 3.0);
        assert!(round_dp(-0.0000001, 6).is_sign_positive());
    }

    #[test]
    fn test_round_dp_unrepresentable_scale() {
        // 10^400 overflows and u32::MAX does not fit an i32 exponent
        assert_eq!(round_dp(-0.123456, 400), -0.123456);
        assert_eq!(round_dp(-0.123456, u32::MAX), -0.123456);
        assert_eq!(round_dp(1e300, 10), 1e300);
        assert!(round_dp(-0.0, u32::MAX).is_sign_positive());
    }

    #[test]
    fn test_mean_columns() {
        let samples = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(mean_columns(&samples), Some(vec![2.0, 3.0]));

        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(mean_columns(&ragged), None);

        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(mean_columns(&empty), None);
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[3.0, -3.0]), Some(3.0));
        assert_eq!(rms::<f64>(&[]), None);
    }
}
