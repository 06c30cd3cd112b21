//! Process capability analysis.
//!
//! Measures how far the process mean of a grade sits from its
//! specification limits, relative to the spread of the measured output.
//!
//! # Indices
//!
//! - **Cpu** — upper one-sided capability
//! - **Cpl** — lower one-sided capability
//! - **Cpk** — worst case, `min(Cpu, Cpl)`
//!
//! # Classification
//!
//! - [`CapabilityClass`] — capable / marginal / not capable / no data
//! - [`CapabilityThresholds`] — the Cpk cut points, 1.33 and 1.00 by default
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod class;
mod indices;

pub use class::{CapabilityClass, CapabilityThresholds};
pub use indices::{capability, sample_std_dev, CapabilityIndices};
