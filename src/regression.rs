//! Two-factor sequential regression.
//!
//! Fits the measured output against two process inputs, one factor at a
//! time:
//!
//! ```text
//! ŷ = b₀ + b_a · (1 / a) + b_b · b
//! ```
//!
//! - `b_a` is the OLS slope of output on the transformed predictor `1 / a`
//! - `b_b` is the OLS slope of output on the raw predictor `b`
//! - `b₀ = target − b_a · mean(1 / a) − b_b · mean(b)`
//!
//! The two slopes are estimated independently. This is not a joint
//! multiple regression, and fitting both predictors jointly gives
//! different coefficients. The intercept is anchored to the latest
//! sample's target rather than to the mean output, so the fitted surface
//! passes through the target at the mean operating point.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use u_gradefit::grade::Grade;
//! use u_gradefit::regression::fit;
//! use u_gradefit::sample::Sample;
//!
//! let t0 = Utc::now();
//! let samples = vec![
//!     Sample::new(Grade::N660, 90.2, 5.0, 10.0, t0).unwrap(),
//!     Sample::new(Grade::N660, 89.8, 5.2, 10.5, t0 + Duration::minutes(1)).unwrap(),
//!     Sample::new(Grade::N660, 90.5, 4.8, 9.8, t0 + Duration::minutes(2)).unwrap(),
//! ];
//! let result = fit(&samples);
//! let model = result.model.unwrap();
//! assert!(model.slope_a.is_finite());
//! assert!(result.predicted_output.is_some());
//! ```

use serde::Serialize;
use tracing::trace;
use u_numflow::stats;

use crate::engine::Degeneracy;
use crate::sample::Sample;

/// Sample means over one grade's samples.
///
/// A mean that overflows is `None`; the other means are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Means {
    /// Number of samples.
    pub n: usize,
    /// Mean measured output.
    pub output: Option<f64>,
    /// Mean of `input_a`.
    pub input_a: Option<f64>,
    /// Mean of `input_b`.
    pub input_b: Option<f64>,
    /// Mean of `1 / input_a`.
    pub inverse_input_a: Option<f64>,
}

impl Means {
    /// Notes for every mean that was dropped as non-finite.
    fn non_finite(&self) -> impl Iterator<Item = Degeneracy> {
        [
            ("mean_output", self.output),
            ("mean_input_a", self.input_a),
            ("mean_input_b", self.input_b),
            ("mean_inverse_input_a", self.inverse_input_a),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(field, _)| Degeneracy::NonFinite(field))
    }
}

/// Fitted two-factor model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    /// Slope against `1 / input_a`.
    pub slope_a: f64,
    /// Slope against `input_b`.
    pub slope_b: f64,
    /// Target-anchored intercept.
    pub intercept: f64,
}

impl LinearModel {
    /// Evaluates `intercept + slope_a / input_a + slope_b · input_b`.
    ///
    /// Returns `None` if `input_a` is not positive or the result is not finite.
    pub fn evaluate(&self, input_a: f64, input_b: f64) -> Option<f64> {
        if input_a.is_nan() || input_a <= 0.0 || !input_b.is_finite() {
            return None;
        }
        finite(self.intercept + self.slope_a * (1.0 / input_a) + self.slope_b * input_b)
    }

    /// Evaluates the model at a sample's inputs.
    pub fn predict(&self, sample: &Sample) -> Option<f64> {
        self.evaluate(sample.input_a(), sample.input_b())
    }
}

/// Output of [`fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// `None` when there are no samples.
    pub means: Option<Means>,
    /// Slope against `1 / input_a`, even when `slope_b` is unavailable.
    pub slope_a: Option<f64>,
    /// Slope against `input_b`, even when `slope_a` is unavailable.
    pub slope_b: Option<f64>,
    /// `None` when fewer than two samples, or a parameter is not finite.
    pub model: Option<LinearModel>,
    /// Model evaluated at the latest sample's inputs.
    pub predicted_output: Option<f64>,
    /// Degenerate conditions met while fitting.
    pub notes: Vec<Degeneracy>,
}

impl Fit {
    fn means_only(means: Option<Means>, notes: Vec<Degeneracy>) -> Self {
        Self {
            means,
            slope_a: None,
            slope_b: None,
            model: None,
            predicted_output: None,
            notes,
        }
    }
}

/// Computes the means of output, both inputs, and `1 / input_a`.
///
/// Returns `None` for an empty slice.
pub fn sample_means(samples: &[Sample]) -> Option<Means> {
    if samples.is_empty() {
        return None;
    }
    Some(Means {
        n: samples.len(),
        output: mean_by(samples, Sample::measured_output),
        input_a: mean_by(samples, Sample::input_a),
        input_b: mean_by(samples, Sample::input_b),
        inverse_input_a: mean_by(samples, |s| 1.0 / s.input_a()),
    })
}

/// Fits the two-factor model on `samples`, the last element being the
/// latest sample.
///
/// Order affects only which sample is latest; the fitted means and slopes
/// are order-insensitive up to floating-point summation order.
///
/// | n | means | slopes, model, prediction |
/// |---|-------|---------------------------|
/// | 0 | `None` | `None` |
/// | 1 | `Some` | `None` |
/// | ≥ 2 | `Some` | `Some` unless non-finite |
///
/// A zero slope denominator (every sample shares the same input value)
/// yields a slope of exactly `0` and a [`Degeneracy`] note. A slope whose
/// means overflowed is `None`; the note sits on the mean.
///
/// # Panics
///
/// If a sample has `input_a <= 0`. [`Sample`] construction rejects such
/// values, so this only fires on a broken invariant.
pub fn fit(samples: &[Sample]) -> Fit {
    assert!(
        samples.iter().all(|s| s.input_a() > 0.0),
        "input_a must be positive"
    );

    let means = sample_means(samples);
    let (Some(m), Some(latest)) = (means, samples.last()) else {
        return Fit::means_only(means, Vec::new());
    };
    let mut notes: Vec<Degeneracy> = m.non_finite().collect();
    if m.n < 2 {
        return Fit::means_only(means, notes);
    }

    let slope_a = match (m.inverse_input_a, m.output) {
        (Some(x_mean), Some(y_mean)) => checked_slope(
            ols_slope(
                samples.iter().map(|s| (1.0 / s.input_a(), s.measured_output())),
                x_mean,
                y_mean,
            ),
            Degeneracy::ConstantInputA,
            "slope_a",
            &mut notes,
        ),
        _ => None,
    };
    let slope_b = match (m.input_b, m.output) {
        (Some(x_mean), Some(y_mean)) => checked_slope(
            ols_slope(
                samples.iter().map(|s| (s.input_b(), s.measured_output())),
                x_mean,
                y_mean,
            ),
            Degeneracy::ConstantInputB,
            "slope_b",
            &mut notes,
        ),
        _ => None,
    };

    let model = match (slope_a, slope_b, m.inverse_input_a, m.input_b) {
        (Some(slope_a), Some(slope_b), Some(mean_inv), Some(mean_b)) => {
            let intercept = latest.target() - slope_a * mean_inv - slope_b * mean_b;
            match finite(intercept) {
                Some(intercept) => Some(LinearModel {
                    slope_a,
                    slope_b,
                    intercept,
                }),
                None => {
                    notes.push(Degeneracy::NonFinite("intercept"));
                    None
                }
            }
        }
        _ => None,
    };

    let predicted_output = model.and_then(|model| {
        let p = model.predict(latest);
        if p.is_none() {
            notes.push(Degeneracy::NonFinite("predicted_output"));
        }
        p
    });

    trace!(n = m.n, ?slope_a, ?slope_b, ?model, ?predicted_output, "fitted two-factor model");

    Fit {
        means,
        slope_a,
        slope_b,
        model,
        predicted_output,
        notes,
    }
}

enum Slope {
    Fitted(f64),
    ZeroDenominator,
    NonFinite,
}

/// `Σ(xᵢ − x̄)(yᵢ − ȳ) / Σ(xᵢ − x̄)²`.
fn ols_slope(pairs: impl Iterator<Item = (f64, f64)>, x_mean: f64, y_mean: f64) -> Slope {
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in pairs {
        let dx = x - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return Slope::ZeroDenominator;
    }
    match finite(sxy / sxx) {
        Some(v) => Slope::Fitted(v),
        None => Slope::NonFinite,
    }
}

fn checked_slope(
    slope: Slope,
    constant: Degeneracy,
    field: &'static str,
    notes: &mut Vec<Degeneracy>,
) -> Option<f64> {
    match slope {
        Slope::Fitted(v) => Some(v),
        Slope::ZeroDenominator => {
            notes.push(constant);
            Some(0.0)
        }
        Slope::NonFinite => {
            notes.push(Degeneracy::NonFinite(field));
            None
        }
    }
}

/// Corrected two-pass mean: `m = Σx/n` (compensated), then `m + Σ(x − m)/n`.
///
/// Exact for a constant column, which keeps the zero-denominator and
/// zero-variance checks exact.
pub(crate) fn mean_by<F>(samples: &[Sample], value: F) -> Option<f64>
where
    F: Fn(&Sample) -> f64,
{
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let values: Vec<f64> = samples.iter().map(&value).collect();
    let first = finite(stats::kahan_sum(&values) / n)?;
    let correction = values.iter().map(|v| v - first).sum::<f64>() / n;
    finite(first + correction)
}

pub(crate) fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
