//! Setpoint solver.
//!
//! Inverts the fitted model to recommend input flows that should bring the
//! predicted output to the latest sample's target. Each input is solved
//! separately, holding the other input at a different reference point:
//!
//! ```text
//! a* = b_a / (target − b₀ − b_b · b_latest)
//! b* = (target − b₀ − b_a · mean(1 / a)) / b_b
//! ```
//!
//! `a*` holds `input_b` at the latest sample's value; `b*` holds the
//! `1 / input_a` term at its historical mean. The two recommendations are
//! an approximation, not a joint optimum: applying both at once does not in
//! general hit the target exactly.

use tracing::trace;

use crate::engine::{CalculationResult, Degeneracy};
use crate::regression::finite;
use crate::sample::Sample;

/// Recommended input setpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setpoints {
    /// Recommended `input_a`.
    pub input_a: Option<f64>,
    /// Recommended `input_b`.
    pub input_b: Option<f64>,
    /// Reasons a recommendation was withheld.
    pub notes: Vec<Degeneracy>,
}

/// Solves both setpoints from a fitted result and the latest sample.
///
/// Returns two `None`s without notes when `result` carries no model
/// (fewer than two samples).
///
/// # Examples
///
/// ```
/// use u_gradefit::engine::CalculationResult;
/// use u_gradefit::grade::Grade;
/// use u_gradefit::sample::Sample;
/// use u_gradefit::setpoint::solve_setpoints;
///
/// let latest = Sample::new(Grade::N660, 90.5, 4.8, 9.8, chrono::Utc::now()).unwrap();
/// let result = CalculationResult {
///     n: 3,
///     mean_inverse_input_a: Some(0.2),
///     slope_a: Some(40.0),
///     slope_b: Some(-1.0),
///     intercept: Some(92.0),
///     ..CalculationResult::default()
/// };
/// let sp = solve_setpoints(&result, &latest);
/// // 40 / (90 − 92 + 9.8) = 40 / 7.8
/// assert!((sp.input_a.unwrap() - 40.0 / 7.8).abs() < 1e-12);
/// // (90 − 92 − 8) / −1 = 10
/// assert!((sp.input_b.unwrap() - 10.0).abs() < 1e-12);
/// ```
pub fn solve_setpoints(result: &CalculationResult, latest: &Sample) -> Setpoints {
    let (Some(model), Some(mean_inverse_a)) = (result.model(), result.mean_inverse_input_a)
    else {
        return Setpoints::default();
    };
    let target = latest.target();
    let mut notes = Vec::new();

    let input_a = if model.slope_a == 0.0 {
        notes.push(Degeneracy::UnsolvableInputA);
        None
    } else {
        let denom = target - model.intercept - model.slope_b * latest.input_b();
        if denom == 0.0 {
            notes.push(Degeneracy::UnsolvableInputA);
            None
        } else {
            let v = finite(model.slope_a / denom);
            if v.is_none() {
                notes.push(Degeneracy::NonFinite("optimal_input_a"));
            }
            v
        }
    };

    let input_b = if model.slope_b == 0.0 {
        notes.push(Degeneracy::UnsolvableInputB);
        None
    } else {
        let v = finite((target - model.intercept - model.slope_a * mean_inverse_a) / model.slope_b);
        if v.is_none() {
            notes.push(Degeneracy::NonFinite("optimal_input_b"));
        }
        v
    };

    trace!(?input_a, ?input_b, target, "solved setpoints");
    Setpoints {
        input_a,
        input_b,
        notes,
    }
}
