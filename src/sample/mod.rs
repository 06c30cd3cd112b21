//! Operator samples.
//!
//! A [`Sample`] is one timestamped observation: the two input flows, the
//! measured output, and the grade limits copied at entry time. Construction
//! validates every numeric field, so the estimation routines can divide by
//! `input_a` without re-checking.
//!
//! - [`Sample`] — validated, immutable observation
//! - [`SampleId`] — opaque unique identity
//! - [`SampleStore`] — in-memory grade-scoped store

mod store;

pub use store::SampleStore;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::grade::{Grade, GradePreset};

/// Opaque, immutable sample identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleId(Uuid);

impl SampleId {
    /// Generates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SampleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One operator observation for a grade.
///
/// # Invariants
///
/// - `input_a > 0` and `input_b > 0`, both finite
/// - `measured_output`, limits, target and `predicted_output` are finite
///
/// `lower_limit < target < upper_limit` is expected but not enforced.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use u_gradefit::grade::Grade;
/// use u_gradefit::sample::Sample;
///
/// let s = Sample::new(Grade::N660, 90.2, 5.0, 10.0, Utc::now()).unwrap();
/// assert_eq!(s.target(), 90.0);
/// assert!(Sample::new(Grade::N660, 90.2, 0.0, 10.0, Utc::now()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    id: SampleId,
    grade: Grade,
    measured_output: f64,
    input_a: f64,
    input_b: f64,
    lower_limit: f64,
    target: f64,
    upper_limit: f64,
    predicted_output: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl Sample {
    /// Creates a sample, copying the grade's current preset limits.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSample`] if a value is non-finite or a flow is not positive.
    pub fn new(
        grade: Grade,
        measured_output: f64,
        input_a: f64,
        input_b: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        Self::from_parts(
            grade,
            grade.preset(),
            measured_output,
            input_a,
            input_b,
            None,
            timestamp,
        )
    }

    /// Creates a sample with explicit limits and an optional recorded prediction.
    ///
    /// Used when the limits in force at entry time are known from another
    /// source, e.g. a bulk import.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSample`] if a value is non-finite or a flow is not positive.
    pub fn from_parts(
        grade: Grade,
        limits: GradePreset,
        measured_output: f64,
        input_a: f64,
        input_b: f64,
        predicted_output: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        require_finite("measured_output", measured_output)?;
        require_positive("input_a", input_a)?;
        require_positive("input_b", input_b)?;
        require_finite("lower_limit", limits.lower_limit)?;
        require_finite("target", limits.target)?;
        require_finite("upper_limit", limits.upper_limit)?;
        if let Some(p) = predicted_output {
            require_finite("predicted_output", p)?;
        }
        Ok(Self {
            id: SampleId::new(),
            grade,
            measured_output,
            input_a,
            input_b,
            lower_limit: limits.lower_limit,
            target: limits.target,
            upper_limit: limits.upper_limit,
            predicted_output,
            timestamp,
        })
    }

    /// Returns the sample with its recorded prediction set.
    ///
    /// A non-finite prediction is dropped to `None`.
    pub fn with_predicted_output(mut self, predicted: Option<f64>) -> Self {
        self.predicted_output = predicted.filter(|p| p.is_finite());
        self
    }

    /// Unique identity.
    pub fn id(&self) -> SampleId {
        self.id
    }

    /// Grade the sample belongs to.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Measured output property.
    pub fn measured_output(&self) -> f64 {
        self.measured_output
    }

    /// First input flow (`> 0`); enters the model as `1 / input_a`.
    pub fn input_a(&self) -> f64 {
        self.input_a
    }

    /// Second input flow (`> 0`); enters the model linearly.
    pub fn input_b(&self) -> f64 {
        self.input_b
    }

    /// Lower specification limit copied at entry time.
    pub fn lower_limit(&self) -> f64 {
        self.lower_limit
    }

    /// Grade target copied at entry time.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Upper specification limit copied at entry time.
    pub fn upper_limit(&self) -> f64 {
        self.upper_limit
    }

    /// Limits copied at entry time.
    pub fn limits(&self) -> GradePreset {
        GradePreset {
            lower_limit: self.lower_limit,
            target: self.target,
            upper_limit: self.upper_limit,
        }
    }

    /// Model prediction recorded when the sample was entered, if the model
    /// was available at that point.
    pub fn predicted_output(&self) -> Option<f64> {
        self.predicted_output
    }

    /// Observation time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidSample { field, value })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSample { field, value })
    }
}
