//! Error type for sample construction, storage, interchange, and configuration.
//!
//! Numerical routines never fail with an error: a value that cannot be
//! computed is `None`. Errors are reserved for rejected inputs and I/O.

use thiserror::Error;

use crate::sample::SampleId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the crate boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// A sample field violates its precondition (non-finite, or a flow `<= 0`).
    #[error("invalid sample: {field} = {value}")]
    InvalidSample { field: &'static str, value: f64 },

    /// Grade identifier not present in the registry.
    #[error("unknown grade: {0}")]
    UnknownGrade(String),

    /// No sample with the given identity exists in the store.
    #[error("sample not found: {0}")]
    SampleNotFound(SampleId),

    /// Tabular interchange failure (header, I/O, or writer error).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure outside the CSV layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration document could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but holds inconsistent values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
