//! Tabular sample interchange (CSV).
//!
//! One header row, then one sample per row:
//!
//! ```text
//! grade,measured_output,input_a,input_b,lower_limit,target,upper_limit,predicted_output,timestamp
//! N660,90.2,5.0,10.0,87.0,90.0,93.0,,2023-11-14T22:13:20Z
//! ```
//!
//! Floats are written in shortest round-trip form, so reading an exported
//! file reproduces every numeric field bit for bit. Timestamps are RFC 3339.
//! An empty `predicted_output` means no prediction was recorded. The three
//! limit columns may be empty or absent, in which case the grade preset is
//! used.
//!
//! Reading is lenient: rows that fail to parse or validate are skipped and
//! reported in [`ImportReport::rejected`]. Header and I/O failures are
//! errors.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::InterchangeOptions;
use crate::error::{Error, Result};
use crate::grade::{Grade, GradePreset};
use crate::sample::Sample;

/// Column names in export order.
pub const COLUMNS: [&str; 9] = [
    "grade",
    "measured_output",
    "input_a",
    "input_b",
    "lower_limit",
    "target",
    "upper_limit",
    "predicted_output",
    "timestamp",
];

#[derive(Debug, Serialize, Deserialize)]
struct SampleRow {
    grade: String,
    measured_output: f64,
    input_a: f64,
    input_b: f64,
    #[serde(default)]
    lower_limit: Option<f64>,
    #[serde(default)]
    target: Option<f64>,
    #[serde(default)]
    upper_limit: Option<f64>,
    #[serde(default)]
    predicted_output: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl From<&Sample> for SampleRow {
    fn from(s: &Sample) -> Self {
        Self {
            grade: s.grade().to_string(),
            measured_output: s.measured_output(),
            input_a: s.input_a(),
            input_b: s.input_b(),
            lower_limit: Some(s.lower_limit()),
            target: Some(s.target()),
            upper_limit: Some(s.upper_limit()),
            predicted_output: s.predicted_output(),
            timestamp: s.timestamp(),
        }
    }
}

impl SampleRow {
    fn into_sample(self) -> Result<Sample> {
        let grade: Grade = self.grade.parse()?;
        let preset = grade.preset();
        let limits = GradePreset {
            lower_limit: self.lower_limit.unwrap_or(preset.lower_limit),
            target: self.target.unwrap_or(preset.target),
            upper_limit: self.upper_limit.unwrap_or(preset.upper_limit),
        };
        Sample::from_parts(
            grade,
            limits,
            self.measured_output,
            self.input_a,
            self.input_b,
            self.predicted_output,
            self.timestamp,
        )
    }
}

/// A row skipped during import.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line number in the input, when known.
    pub line: Option<u64>,
    /// Why the row was skipped.
    pub reason: String,
}

/// Result of reading a sample table.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Accepted samples, in file order, each with a fresh identity.
    pub samples: Vec<Sample>,
    /// Skipped rows.
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    /// `true` if no row was accepted.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Writes samples as a CSV table with a header row.
///
/// # Errors
///
/// Fails on I/O or serialization errors from the writer.
pub fn write_samples<'a, W, I>(writer: W, samples: I, options: &InterchangeOptions) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Sample>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    let mut count = 0usize;
    for sample in samples {
        wtr.serialize(SampleRow::from(sample))?;
        count += 1;
    }
    wtr.flush()?;
    info!(count, "exported samples");
    Ok(())
}

/// Writes samples to a CSV string.
pub fn to_csv_string<'a, I>(samples: I, options: &InterchangeOptions) -> Result<String>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut buf = Vec::new();
    write_samples(&mut buf, samples, options)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Reads a CSV sample table.
///
/// Columns are matched by header name, so their order does not matter.
///
/// # Errors
///
/// Fails if the header row cannot be read.
///
/// # Examples
///
/// ```
/// use u_gradefit::config::InterchangeOptions;
/// use u_gradefit::interchange::read_samples;
///
/// let text = "\
/// grade,measured_output,input_a,input_b,predicted_output,timestamp
/// N660,90.2,5.0,10.0,,2024-03-01T08:00:00Z
/// N660,89.8,0.0,10.5,,2024-03-01T09:00:00Z
/// ";
/// let report = read_samples(text.as_bytes(), &InterchangeOptions::default()).unwrap();
/// assert_eq!(report.samples.len(), 1);
/// assert_eq!(report.samples[0].target(), 90.0);
/// assert_eq!(report.rejected.len(), 1);
/// ```
pub fn read_samples<R: Read>(reader: R, options: &InterchangeOptions) -> Result<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut report = ImportReport::default();
    for record in rdr.records() {
        let (line, parsed) = match record {
            Ok(record) => (
                record.position().map(|p| p.line()),
                record
                    .deserialize::<SampleRow>(Some(&headers))
                    .map_err(Error::from)
                    .and_then(SampleRow::into_sample),
            ),
            Err(err) => (err.position().map(|p| p.line()), Err(err.into())),
        };
        match parsed {
            Ok(sample) => report.samples.push(sample),
            Err(err) => {
                warn!(?line, error = %err, "skipping sample row");
                report.rejected.push(RejectedRow {
                    line,
                    reason: err.to_string(),
                });
            }
        }
    }
    info!(
        accepted = report.samples.len(),
        rejected = report.rejected.len(),
        "read sample table"
    );
    Ok(report)
}
