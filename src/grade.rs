//! Fixed-point grade values.
//!
//! Grades are significant to 5 decimal places. They are stored as an integer
//! count of 1e-5 units so that aggregation, rounding and the "has the value
//! changed" comparison are exact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};

/// Number of decimal places a grade is significant to.
pub const GRADE_DECIMALS: u32 = 5;

/// Units per whole grade point (10^[`GRADE_DECIMALS`]).
pub const UNITS_PER_POINT: i64 = 100_000;

/// A non-negative grade with 5-decimal precision.
///
/// Grades on the usual scale lie in [0, 100], but the type does not enforce
/// the upper bound: collaborators may store larger values, and weight-0
/// entries carrying them must still flow through aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Grade(i64);

impl Grade {
    pub const MIN: Grade = Grade(0);
    /// Top of the 100-point scale.
    pub const FULL_MARKS: Grade = Grade(100 * UNITS_PER_POINT);

    /// Builds a grade from a float, rounding half-up to 5 decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`GradingError::GradeOutOfRange`] for NaN, infinities,
    /// negative values, or values too large for 1e-5 units in an `i64`.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(GradingError::GradeOutOfRange { value });
        }
        round_half_up_units(value)
            .and_then(Self::from_units)
            .ok_or(GradingError::GradeOutOfRange { value })
    }

    /// Builds a grade from raw 1e-5 units, if non-negative.
    pub fn from_units(units: i64) -> Option<Self> {
        (units >= 0).then_some(Self(units))
    }

    pub fn units(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / UNITS_PER_POINT as f64
    }

    /// Whether the grade lies on the 100-point scale.
    pub fn is_on_scale(self) -> bool {
        self <= Self::FULL_MARKS
    }
}

/// Rounds a finite non-negative float to 1e-5 units, half-up.
///
/// Decided on the shortest decimal rendering that round-trips to `value`,
/// not on `value * 1e5`: 1.000005 * 1e5 lands just below the half in binary.
/// Digits past the sixth decimal are truncated, never rounded.
fn round_half_up_units(value: f64) -> Option<i64> {
    let decimals = GRADE_DECIMALS as usize;
    let rendered = value.to_string();
    let (whole, frac) = rendered.split_once('.').unwrap_or((&rendered, ""));

    let digits: Vec<u8> = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(decimals + 1)
        .collect();
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let kept = digits[..decimals]
        .iter()
        .fold(0i64, |acc, d| acc * 10 + i64::from(d - b'0'));

    let units = whole
        .parse::<i64>()
        .ok()?
        .checked_mul(UNITS_PER_POINT)?
        .checked_add(kept)?;
    if digits[decimals] >= b'5' {
        units.checked_add(1)
    } else {
        Some(units)
    }
}

/// Integer division rounding half-up, for non-negative numerators and
/// positive denominators.
pub(crate) fn div_half_up(numerator: i128, denominator: i128) -> i128 {
    (2 * numerator + denominator) / (2 * denominator)
}

impl TryFrom<f64> for Grade {
    type Error = GradingError;

    fn try_from(value: f64) -> Result<Self> {
        Grade::new(value)
    }
}

impl From<Grade> for f64 {
    fn from(grade: Grade) -> f64 {
        grade.to_f64()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:05}",
            self.0 / UNITS_PER_POINT,
            self.0 % UNITS_PER_POINT
        )
    }
}
