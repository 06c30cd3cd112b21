//! Prediction audit.
//!
//! Each sample may carry the prediction the model made when it was entered.
//! Comparing those against the measured outputs shows how well the
//! sequential model has tracked the process over time.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use u_gradefit::diagnostics::prediction_audit;
//! use u_gradefit::grade::Grade;
//! use u_gradefit::sample::SampleStore;
//!
//! let mut store = SampleStore::new();
//! let t0 = Utc::now();
//! for (i, (y, a, b)) in [(90.2, 5.0, 10.0), (89.8, 5.2, 10.5), (90.5, 4.8, 9.8), (90.1, 5.1, 10.1)]
//!     .into_iter()
//!     .enumerate()
//! {
//!     store.record(Grade::N660, y, a, b, t0 + Duration::minutes(i as i64)).unwrap();
//! }
//! let audit = prediction_audit(store.list_samples(Grade::N660));
//! assert_eq!(audit.total, 4);
//! assert_eq!(audit.points.len(), 2);
//! assert!(audit.mean_residual.is_some());
//! ```

use chrono::{DateTime, Utc};
use u_numflow::stats;

use crate::sample::{Sample, SampleId};

/// One sample with a recorded prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditPoint {
    pub id: SampleId,
    pub timestamp: DateTime<Utc>,
    pub measured_output: f64,
    pub predicted_output: f64,
    /// `measured_output − predicted_output`.
    pub residual: f64,
    /// Whether the measured output lies within the sample's limits.
    pub within_limits: bool,
}

/// Summary of recorded predictions against measured outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionAudit {
    /// Samples examined.
    pub total: usize,
    /// Samples with a recorded prediction, time-ascending.
    pub points: Vec<AuditPoint>,
    /// Mean residual (bias). Requires one point.
    pub mean_residual: Option<f64>,
    /// Mean absolute residual. Requires one point.
    pub mean_absolute_residual: Option<f64>,
    /// Sample standard deviation of residuals. Requires two points.
    pub residual_std_dev: Option<f64>,
}

/// Audits the recorded predictions of one grade's samples.
pub fn prediction_audit(samples: &[Sample]) -> PredictionAudit {
    let mut points: Vec<AuditPoint> = samples
        .iter()
        .filter_map(|s| {
            let predicted = s.predicted_output()?;
            let y = s.measured_output();
            Some(AuditPoint {
                id: s.id(),
                timestamp: s.timestamp(),
                measured_output: y,
                predicted_output: predicted,
                residual: y - predicted,
                within_limits: y >= s.lower_limit() && y <= s.upper_limit(),
            })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);

    let residuals: Vec<f64> = points.iter().map(|p| p.residual).collect();
    let absolute: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();

    PredictionAudit {
        total: samples.len(),
        mean_residual: stats::mean(&residuals),
        mean_absolute_residual: stats::mean(&absolute),
        residual_std_dev: stats::std_dev(&residuals),
        points,
    }
}
