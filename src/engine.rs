//! Calculation entry point.
//!
//! [`compute`] is a pure function of one grade's time-ordered samples. It
//! runs the two-factor fit, the setpoint solver, and the capability
//! analysis, and flattens everything into a [`CalculationResult`]. Every
//! call is a full recompute; nothing is cached between calls.
//!
//! Absent values are `None`. Two different reasons lead to `None`:
//!
//! - too few samples, reported by [`CalculationResult::status`]
//! - a degenerate fit, reported in [`CalculationResult::notes`]
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use u_gradefit::engine::{compute, FitStatus};
//! use u_gradefit::grade::Grade;
//! use u_gradefit::sample::Sample;
//!
//! let t0 = Utc::now();
//! let samples = vec![
//!     Sample::new(Grade::N660, 90.2, 5.0, 10.0, t0).unwrap(),
//!     Sample::new(Grade::N660, 89.8, 5.2, 10.5, t0 + Duration::minutes(1)).unwrap(),
//!     Sample::new(Grade::N660, 90.5, 4.8, 9.8, t0 + Duration::minutes(2)).unwrap(),
//! ];
//! let result = compute(&samples);
//! assert_eq!(result.n, 3);
//! assert_eq!(result.status(), FitStatus::Fitted);
//! assert!(result.cpk.is_some());
//! ```

use serde::Serialize;
use tracing::debug;

use crate::capability::{self, CapabilityClass, CapabilityThresholds};
use crate::regression::{self, LinearModel};
use crate::sample::Sample;
use crate::setpoint;

/// Degenerate condition met during a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Degeneracy {
    /// Every sample has the same `input_a`; `slope_a` is forced to `0`.
    ConstantInputA,
    /// Every sample has the same `input_b`; `slope_b` is forced to `0`.
    ConstantInputB,
    /// `optimal_input_a` has no solution (zero slope or zero denominator).
    UnsolvableInputA,
    /// `optimal_input_b` has no solution (zero slope).
    UnsolvableInputB,
    /// Measured output has zero spread; capability indices are undefined.
    ZeroVariance,
    /// The named field evaluated to NaN or infinity and was dropped.
    NonFinite(&'static str),
}

/// How much of the calculation the sample count supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitStatus {
    /// No samples: only `n` is meaningful.
    NoData,
    /// One sample: means only.
    InsufficientForRegression,
    /// Two or more samples: model, setpoints and capability attempted.
    Fitted,
}

/// Derived values for one grade's sample set.
///
/// # Invariants
///
/// - `n == 0`: every field other than `n` is `None`
/// - `n == 1`: only the four means can be `Some`
/// - `n` always equals the number of samples
/// - no field holds NaN or infinity; a dropped field is noted in `notes`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalculationResult {
    /// Number of samples.
    pub n: usize,
    pub mean_output: Option<f64>,
    pub mean_input_a: Option<f64>,
    pub mean_input_b: Option<f64>,
    /// Mean of `1 / input_a`.
    pub mean_inverse_input_a: Option<f64>,
    /// Slope against `1 / input_a`.
    pub slope_a: Option<f64>,
    /// Slope against `input_b`.
    pub slope_b: Option<f64>,
    /// Target-anchored intercept.
    pub intercept: Option<f64>,
    /// Model evaluated at the latest sample's inputs.
    pub predicted_output: Option<f64>,
    /// Recommended `input_a` with `input_b` at the latest sample's value.
    pub optimal_input_a: Option<f64>,
    /// Recommended `input_b` with `1 / input_a` at its mean.
    pub optimal_input_b: Option<f64>,
    /// Sample standard deviation of the measured output.
    pub std_dev: Option<f64>,
    pub cpu: Option<f64>,
    pub cpl: Option<f64>,
    pub cpk: Option<f64>,
    /// Degenerate conditions, in the order they were detected.
    pub notes: Vec<Degeneracy>,
}

impl CalculationResult {
    /// Result for an empty sample set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FitStatus {
        match self.n {
            0 => FitStatus::NoData,
            1 => FitStatus::InsufficientForRegression,
            _ => FitStatus::Fitted,
        }
    }

    /// `true` once two or more samples drive the calculation.
    pub fn is_active(&self) -> bool {
        self.status() == FitStatus::Fitted
    }

    pub fn prediction_available(&self) -> bool {
        self.is_active() && self.predicted_output.is_some()
    }

    /// Fitted model, if all three parameters are present.
    pub fn model(&self) -> Option<LinearModel> {
        Some(LinearModel {
            slope_a: self.slope_a?,
            slope_b: self.slope_b?,
            intercept: self.intercept?,
        })
    }

    /// Latest measured output minus `predicted_output`.
    pub fn residual(&self, latest: &Sample) -> Option<f64> {
        self.predicted_output.map(|p| latest.measured_output() - p)
    }

    pub fn has_note(&self, note: Degeneracy) -> bool {
        self.notes.contains(&note)
    }

    /// Classifies `cpk` against `thresholds`.
    pub fn capability_class(&self, thresholds: &CapabilityThresholds) -> CapabilityClass {
        if self.n == 0 {
            return CapabilityClass::NoData;
        }
        thresholds.classify(self.cpk)
    }
}

/// Computes the full result for one grade's samples in time order.
///
/// The last element is the latest sample: its target anchors the
/// intercept, its inputs feed the prediction, and its limits feed the
/// capability indices.
pub fn compute(samples: &[Sample]) -> CalculationResult {
    let fit = regression::fit(samples);
    let Some(means) = fit.means else {
        debug!(n = 0, "no samples; empty result");
        return CalculationResult::empty();
    };

    let mut result = CalculationResult {
        n: means.n,
        mean_output: means.output,
        mean_input_a: means.input_a,
        mean_input_b: means.input_b,
        mean_inverse_input_a: means.inverse_input_a,
        slope_a: fit.slope_a,
        slope_b: fit.slope_b,
        intercept: fit.model.map(|m| m.intercept),
        predicted_output: fit.predicted_output,
        notes: fit.notes,
        ..CalculationResult::default()
    };

    if let Some(latest) = samples.last() {
        let setpoints = setpoint::solve_setpoints(&result, latest);
        result.optimal_input_a = setpoints.input_a;
        result.optimal_input_b = setpoints.input_b;
        result.notes.extend(setpoints.notes);
    }

    let indices = capability::capability(samples, &result);
    result.std_dev = indices.std_dev;
    result.cpu = indices.cpu;
    result.cpl = indices.cpl;
    result.cpk = indices.cpk;
    result.notes.extend(indices.notes);

    debug!(
        grade = ?samples.last().map(Sample::grade),
        n = result.n,
        notes = result.notes.len(),
        "recomputed calculation result"
    );
    result
}
