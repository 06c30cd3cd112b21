//! # u-gradefit
//!
//! Sequential setpoint model and process capability per product grade.
//!
//! Operators log samples of two input flows and a measured output, each
//! tagged with a product grade. For the samples of one grade this crate
//! computes a two-factor predictive model anchored to the grade target,
//! recommends input setpoints that should hit the target, and rates the
//! process capability against the grade limits.
//!
//! ## Modules
//!
//! - [`grade`] — Grade registry (fixed limits and target per grade)
//! - [`sample`] — Validated samples and an in-memory grade-scoped store
//! - [`regression`] — Means, independent slopes, target-anchored intercept
//! - [`setpoint`] — Inverse solves for the two input setpoints
//! - [`capability`] — Cpu, Cpl, Cpk and capability classification
//! - [`engine`] — [`compute`](engine::compute): the full calculation result
//! - [`interchange`] — CSV import and export of sample tables
//! - [`diagnostics`] — Audit of recorded predictions against measurements
//! - [`config`] — Thresholds and interchange options
//!
//! ## Design Philosophy
//!
//! - **Pure computation**: results depend only on the samples passed in
//! - **Absence over sentinels**: undefined values are `None`, never NaN
//! - **Full recompute**: no running sums or cached state between calls

pub mod capability;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod grade;
pub mod interchange;
pub mod regression;
pub mod sample;
pub mod setpoint;

pub use engine::{compute, CalculationResult, Degeneracy, FitStatus};
pub use error::{Error, Result};
pub use grade::{Grade, GradePreset, GradeRegistry};
pub use sample::{Sample, SampleId, SampleStore};
