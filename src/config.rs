//! Crate configuration.
//!
//! Every section has defaults, so an empty JSON object is a valid
//! configuration. The grade table is fixed and not configurable.
//!
//! ```
//! use u_gradefit::config::Config;
//!
//! let cfg = Config::from_json_str(r#"{ "capability": { "capable": 1.67 } }"#).unwrap();
//! assert_eq!(cfg.capability.capable, 1.67);
//! assert_eq!(cfg.capability.acceptable, 1.00);
//! assert_eq!(cfg.interchange.delimiter, b',');
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityThresholds;
use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cpk classification cut points.
    pub capability: CapabilityThresholds,
    /// CSV import/export options.
    pub interchange: InterchangeOptions,
}

/// CSV interchange options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchangeOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for InterchangeOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl Config {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] on malformed JSON, [`Error::InvalidConfig`] on
    /// inconsistent values.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a configuration file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        self.capability.validate()?;
        let d = self.interchange.delimiter;
        if !d.is_ascii() || matches!(d, b'"' | b'\n' | b'\r') {
            return Err(Error::InvalidConfig(format!(
                "unsupported delimiter byte {d}"
            )));
        }
        Ok(())
    }
}
