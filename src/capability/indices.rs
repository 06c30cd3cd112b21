//! One-sided and worst-case capability indices (Cpu, Cpl, Cpk).
//!
//! Uses the Bessel-corrected sample standard deviation of the measured
//! output and the limits of the latest sample:
//!
//! ```text
//! s   = sqrt(Σ(yᵢ − ȳ)² / (n − 1))
//! Cpu = (USL − ȳ) / (3s)
//! Cpl = (ȳ − LSL) / (3s)
//! Cpk = min(Cpu, Cpl)
//! ```
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use u_numflow::stats;

use crate::engine::{CalculationResult, Degeneracy};
use crate::regression::finite;
use crate::sample::Sample;

/// Computed capability indices.
///
/// `std_dev` requires at least two samples. The three indices also require
/// a strictly positive `std_dev`; with zero spread they are `None` even
/// though Cpu and Cpl are mathematically unbounded.
///
/// | Cpk | Interpretation |
/// |-----|----------------|
/// | >= 1.33 | Capable |
/// | 1.00 – 1.33 | Marginal |
/// | < 1.00 | Not capable |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityIndices {
    /// Sample standard deviation of the measured output.
    pub std_dev: Option<f64>,
    /// Cpu = (USL - mean) / (3 * std_dev).
    pub cpu: Option<f64>,
    /// Cpl = (mean - LSL) / (3 * std_dev).
    pub cpl: Option<f64>,
    /// Cpk = min(Cpu, Cpl).
    pub cpk: Option<f64>,
    /// Reasons indices were withheld.
    pub notes: Vec<Degeneracy>,
}

/// Bessel-corrected standard deviation of the measured output.
///
/// Returns `None` for fewer than two samples or a non-finite result.
pub fn sample_std_dev(samples: &[Sample]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let outputs: Vec<f64> = samples.iter().map(Sample::measured_output).collect();
    stats::std_dev(&outputs).and_then(finite)
}

/// Computes capability indices for `samples` using the mean from `result`.
///
/// The last sample supplies the limits. `result` must come from the same
/// sample slice.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use u_gradefit::capability::capability;
/// use u_gradefit::engine::compute;
/// use u_gradefit::grade::Grade;
/// use u_gradefit::sample::Sample;
///
/// let now = Utc::now();
/// let samples: Vec<Sample> = [89.0, 90.0, 91.0]
///     .iter()
///     .map(|&y| Sample::new(Grade::N660, y, 5.0, 10.0, now).unwrap())
///     .collect();
/// let result = compute(&samples);
/// let idx = capability(&samples, &result);
/// assert_eq!(idx.std_dev, Some(1.0));
/// assert_eq!(idx.cpk, Some(1.0));
/// ```
pub fn capability(samples: &[Sample], result: &CalculationResult) -> CapabilityIndices {
    debug_assert_eq!(result.n, samples.len(), "result computed on another sample set");
    let (Some(mean), Some(latest)) = (result.mean_output, samples.last()) else {
        return CapabilityIndices::default();
    };
    let Some(std_dev) = sample_std_dev(samples) else {
        let mut idx = CapabilityIndices::default();
        if samples.len() >= 2 {
            idx.notes.push(Degeneracy::NonFinite("std_dev"));
        }
        return idx;
    };
    if std_dev <= 0.0 {
        return CapabilityIndices {
            std_dev: Some(std_dev),
            notes: vec![Degeneracy::ZeroVariance],
            ..CapabilityIndices::default()
        };
    }

    let mut notes = Vec::new();
    let mut checked = |field: &'static str, v: f64| {
        let v = finite(v);
        if v.is_none() {
            notes.push(Degeneracy::NonFinite(field));
        }
        v
    };
    let cpu = checked("cpu", (latest.upper_limit() - mean) / (3.0 * std_dev));
    let cpl = checked("cpl", (mean - latest.lower_limit()) / (3.0 * std_dev));
    let cpk = match (cpu, cpl) {
        (Some(u), Some(l)) => Some(u.min(l)),
        _ => None,
    };

    CapabilityIndices {
        std_dev: Some(std_dev),
        cpu,
        cpl,
        cpk,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute;
    use crate::grade::{Grade, GradePreset};
    use chrono::{DateTime, Duration, Utc};

    fn t(i: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(i)
    }

    fn outputs(grade: Grade, ys: &[f64]) -> Vec<Sample> {
        ys.iter()
            .enumerate()
            .map(|(i, &y)| Sample::new(grade, y, 5.0, 10.0, t(i as i64)).unwrap())
            .collect()
    }

    fn analyze(samples: &[Sample]) -> CapabilityIndices {
        capability(samples, &compute(samples))
    }

    // -----------------------------------------------------------------------
    // Insufficient data
    // -----------------------------------------------------------------------

    #[test]
    fn empty_and_single_have_no_indices() {
        assert_eq!(analyze(&[]), CapabilityIndices::default());
        assert_eq!(analyze(&outputs(Grade::N660, &[90.0])), CapabilityIndices::default());
    }

    #[test]
    fn sample_std_dev_requires_two() {
        assert!(sample_std_dev(&[]).is_none());
        assert!(sample_std_dev(&outputs(Grade::N660, &[90.0])).is_none());
    }

    // -----------------------------------------------------------------------
    // Known values
    // -----------------------------------------------------------------------

    /// N660 (87/90/93), outputs 89, 90, 91: mean 90, s = 1.
    /// Cpu = Cpl = 3 / 3 = 1.
    #[test]
    fn centered_process_unit_spread() {
        let idx = analyze(&outputs(Grade::N660, &[89.0, 90.0, 91.0]));
        assert_eq!(idx.std_dev, Some(1.0));
        assert_eq!(idx.cpu, Some(1.0));
        assert_eq!(idx.cpl, Some(1.0));
        assert_eq!(idx.cpk, Some(1.0));
        assert!(idx.notes.is_empty());
    }

    /// N550 (118/121/124), outputs 122, 123, 124: mean 123, s = 1.
    /// Cpu = 1/3, Cpl = 5/3, Cpk = Cpu.
    #[test]
    fn off_center_process() {
        let idx = analyze(&outputs(Grade::N550, &[122.0, 123.0, 124.0]));
        let cpu = idx.cpu.unwrap();
        let cpl = idx.cpl.unwrap();
        assert!((cpu - 1.0 / 3.0).abs() < 1e-12, "{cpu}");
        assert!((cpl - 5.0 / 3.0).abs() < 1e-12, "{cpl}");
        assert_eq!(idx.cpk, Some(cpu));
    }

    #[test]
    fn exact_numerical_verification() {
        let ys = [90.2, 89.8, 90.5, 90.1, 89.6];
        let idx = analyze(&outputs(Grade::N660, &ys));
        let mean = ys.iter().sum::<f64>() / 5.0;
        let s = (ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / 4.0).sqrt();
        assert!((idx.std_dev.unwrap() - s).abs() < 1e-12);
        assert!((idx.cpu.unwrap() - (93.0 - mean) / (3.0 * s)).abs() < 1e-10);
        assert!((idx.cpl.unwrap() - (mean - 87.0) / (3.0 * s)).abs() < 1e-10);
    }

    #[test]
    fn mean_outside_limits_gives_negative_index() {
        let idx = analyze(&outputs(Grade::N660, &[94.0, 95.0, 96.0]));
        assert!(idx.cpu.unwrap() < 0.0);
        assert!(idx.cpk.unwrap() < 0.0);
    }

    // -----------------------------------------------------------------------
    // Degenerate spread
    // -----------------------------------------------------------------------

    #[test]
    fn zero_spread_withholds_indices() {
        let idx = analyze(&outputs(Grade::N660, &[90.2, 90.2, 90.2, 90.2]));
        assert_eq!(idx.std_dev, Some(0.0));
        assert!(idx.cpu.is_none());
        assert!(idx.cpl.is_none());
        assert!(idx.cpk.is_none());
        assert_eq!(idx.notes, vec![Degeneracy::ZeroVariance]);
    }

    // -----------------------------------------------------------------------
    // Latest limits
    // -----------------------------------------------------------------------

    #[test]
    fn uses_latest_sample_limits() {
        let mut s = outputs(Grade::N660, &[89.0, 90.0]);
        let wide = GradePreset {
            lower_limit: 80.0,
            target: 90.0,
            upper_limit: 100.0,
        };
        s.push(Sample::from_parts(Grade::N660, wide, 91.0, 5.0, 10.0, None, t(5)).unwrap());
        let idx = analyze(&s);
        // mean 90, s 1: (100 − 90) / 3
        assert!((idx.cpu.unwrap() - 10.0 / 3.0).abs() < 1e-12);
    }
}
