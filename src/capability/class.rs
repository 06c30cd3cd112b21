//! Capability classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Qualitative reading of a Cpk value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapabilityClass {
    /// `cpk >= capable` threshold.
    Capable,
    /// `acceptable <= cpk < capable`.
    Marginal,
    /// `cpk < acceptable`.
    NotCapable,
    /// Cpk undefined.
    NoData,
}

impl CapabilityClass {
    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityClass::Capable => "Excellent",
            CapabilityClass::Marginal => "Acceptable",
            CapabilityClass::NotCapable => "Poor",
            CapabilityClass::NoData => "No Data",
        }
    }
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cpk cut points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityThresholds {
    /// Lowest Cpk classified as capable.
    pub capable: f64,
    /// Lowest Cpk classified as marginal.
    pub acceptable: f64,
}

impl Default for CapabilityThresholds {
    fn default() -> Self {
        Self {
            capable: 1.33,
            acceptable: 1.00,
        }
    }
}

impl CapabilityThresholds {
    /// Creates thresholds, requiring `capable > acceptable > 0`, both finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_gradefit::capability::CapabilityThresholds;
    ///
    /// assert!(CapabilityThresholds::new(1.67, 1.33).is_ok());
    /// assert!(CapabilityThresholds::new(1.0, 1.33).is_err());
    /// ```
    pub fn new(capable: f64, acceptable: f64) -> Result<Self> {
        let t = Self {
            capable,
            acceptable,
        };
        t.validate()?;
        Ok(t)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.capable.is_finite() || !self.acceptable.is_finite() {
            return Err(Error::InvalidConfig(
                "capability thresholds must be finite".to_string(),
            ));
        }
        if self.acceptable <= 0.0 || self.capable <= self.acceptable {
            return Err(Error::InvalidConfig(format!(
                "capability thresholds must satisfy capable > acceptable > 0, got {} / {}",
                self.capable, self.acceptable
            )));
        }
        Ok(())
    }

    /// Classifies a Cpk value.
    ///
    /// ```
    /// use u_gradefit::capability::{CapabilityClass, CapabilityThresholds};
    ///
    /// let t = CapabilityThresholds::default();
    /// assert_eq!(t.classify(Some(1.5)), CapabilityClass::Capable);
    /// assert_eq!(t.classify(Some(1.1)), CapabilityClass::Marginal);
    /// assert_eq!(t.classify(Some(0.7)), CapabilityClass::NotCapable);
    /// assert_eq!(t.classify(None), CapabilityClass::NoData);
    /// ```
    pub fn classify(&self, cpk: Option<f64>) -> CapabilityClass {
        match cpk {
            Some(v) if v.is_nan() => CapabilityClass::NoData,
            Some(v) if v >= self.capable => CapabilityClass::Capable,
            Some(v) if v >= self.acceptable => CapabilityClass::Marginal,
            Some(_) => CapabilityClass::NotCapable,
            None => CapabilityClass::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_below() {
        let t = CapabilityThresholds::default();
        assert_eq!(t.classify(Some(1.33)), CapabilityClass::Capable);
        assert_eq!(t.classify(Some(1.3299)), CapabilityClass::Marginal);
        assert_eq!(t.classify(Some(1.0)), CapabilityClass::Marginal);
        assert_eq!(t.classify(Some(0.9999)), CapabilityClass::NotCapable);
        assert_eq!(t.classify(Some(-2.0)), CapabilityClass::NotCapable);
    }

    #[test]
    fn nan_is_no_data() {
        let t = CapabilityThresholds::default();
        assert_eq!(t.classify(Some(f64::NAN)), CapabilityClass::NoData);
    }

    #[test]
    fn labels() {
        assert_eq!(CapabilityClass::Capable.to_string(), "Excellent");
        assert_eq!(CapabilityClass::Marginal.to_string(), "Acceptable");
        assert_eq!(CapabilityClass::NotCapable.to_string(), "Poor");
        assert_eq!(CapabilityClass::NoData.to_string(), "No Data");
    }

    #[test]
    fn new_rejects_inverted_or_non_finite() {
        assert!(CapabilityThresholds::new(1.0, 1.0).is_err());
        assert!(CapabilityThresholds::new(1.0, 0.0).is_err());
        assert!(CapabilityThresholds::new(f64::NAN, 1.0).is_err());
        assert!(CapabilityThresholds::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn custom_thresholds_shift_classes() {
        let t = CapabilityThresholds::new(1.67, 1.33).unwrap();
        assert_eq!(t.classify(Some(1.5)), CapabilityClass::Marginal);
        assert_eq!(t.classify(Some(1.2)), CapabilityClass::NotCapable);
    }
}
