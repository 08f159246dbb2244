//! Weight arithmetic helpers.

use crate::error::{GradingError, Result};

/// Converts a percentage of `total` into an absolute value.
///
/// `total` is unconstrained and may be negative for penalty scales.
///
/// # Errors
///
/// Returns [`GradingError::PercentOutOfRange`] if `percent` is outside
/// [0, 100] (or NaN).
pub fn percent_to_value(percent: f64, total: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(GradingError::PercentOutOfRange { percent });
    }
    Ok(total * percent / 100.0)
}

/// Greatest common divisor. `gcd(0, 0)` is 0.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple. Zero if either argument is zero.
///
/// `None` if the result does not fit in a `u64`.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Folds [`lcm`] over `numbers` with identity 1.
///
/// Gives the common multiple needed to rescale several integer weighting
/// ratios onto one denominator. `None` as soon as an intermediate multiple
/// overflows.
pub fn lcm_all<I>(numbers: I) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    numbers.into_iter().try_fold(1, lcm)
}

/// Rescales `(numerator, denominator)` ratios onto their common denominator,
/// returning that denominator and the rescaled numerators.
///
/// Ratios with a zero denominator contribute nothing and rescale to 0.
/// `None` if the denominator or any rescaled numerator overflows.
pub fn rescale_to_common_denominator(ratios: &[(u64, u64)]) -> Option<(u64, Vec<u64>)> {
    let common = lcm_all(ratios.iter().map(|&(_, d)| d).filter(|&d| d != 0))?;
    let scaled = ratios
        .iter()
        .map(|&(n, d)| if d == 0 { Some(0) } else { n.checked_mul(common / d) })
        .collect::<Option<Vec<u64>>>()?;
    Some((common, scaled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_value() {
        let total = 185.0;
        let percent = 56.6543;
        assert_eq!(percent_to_value(percent, total).unwrap(), total * percent / 100.0);
    }

    #[test]
    fn test_percent_to_value_bounds() {
        assert_eq!(percent_to_value(0.0, 185.0).unwrap(), 0.0);
        assert_eq!(percent_to_value(100.0, 185.0).unwrap(), 185.0);
        assert_eq!(percent_to_value(50.0, -20.0).unwrap(), -10.0);
    }

    #[test]
    fn test_percent_to_value_negative() {
        let err = percent_to_value(-7.098, 185.0).unwrap_err();
        assert!(matches!(err, GradingError::PercentOutOfRange { .. }));
    }

    #[test]
    fn test_percent_to_value_over_hundred() {
        let err = percent_to_value(121.08, 185.0).unwrap_err();
        assert!(matches!(err, GradingError::PercentOutOfRange { .. }));
        assert!(percent_to_value(f64::NAN, 185.0).is_err());
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(1, 4), Some(4));
        assert_eq!(lcm(2, 4), Some(4));
        assert_eq!(lcm(4, 2), Some(4));
        assert_eq!(lcm(2, 3), Some(6));
        assert_eq!(lcm(6, 4), Some(12));
        assert_eq!(lcm(0, 4), Some(0));
    }

    #[test]
    fn test_lcm_overflow() {
        assert_eq!(lcm(1 << 40, (1 << 40) + 1), None);
        assert_eq!(lcm(u64::MAX, u64::MAX - 1), None);
        assert_eq!(lcm(1 << 32, 1 << 31), Some(1 << 32));
    }

    #[test]
    fn test_lcm_all() {
        assert_eq!(lcm_all([5, 3, 15]), Some(15));
        assert_eq!(lcm_all(std::iter::empty()), Some(1));
        assert_eq!(lcm_all([4, 6, 10]), Some(60));
        assert_eq!(lcm_all([1 << 40, (1 << 40) + 1, 2]), None);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn test_rescale_to_common_denominator() {
        let (common, scaled) = rescale_to_common_denominator(&[(1, 2), (2, 3), (3, 4)]).unwrap();
        assert_eq!(common, 12);
        assert_eq!(scaled, vec![6, 8, 9]);
    }

    #[test]
    fn test_rescale_skips_zero_denominator() {
        let (common, scaled) = rescale_to_common_denominator(&[(1, 5), (4, 0)]).unwrap();
        assert_eq!(common, 5);
        assert_eq!(scaled, vec![1, 0]);
    }

    #[test]
    fn test_rescale_overflow() {
        assert_eq!(rescale_to_common_denominator(&[(1, 1 << 40), (1, (1 << 40) + 1)]), None);
        assert_eq!(rescale_to_common_denominator(&[(u64::MAX, 1), (1, 2)]), None);
    }
}
