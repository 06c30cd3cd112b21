//! Grade registry.
//!
//! Each product grade carries a fixed specification: lower limit, target,
//! and upper limit of the measured output. The table is process-wide
//! configuration and cannot be edited at runtime. Samples copy their
//! grade's preset when they are created, so historical samples keep the
//! limits that were in force at entry time.
//!
//! | Grade | LSL | Target | USL |
//! |-------|-----|--------|-----|
//! | N660  | 87  | 90     | 93  |
//! | N550  | 118 | 121    | 124 |
//! | N772  | 62  | 65     | 68  |
//! | N774  | 69  | 72     | 75  |
//! | N762  | 62  | 65     | 68  |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Product grade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    N660,
    N550,
    N772,
    N774,
    N762,
}

impl Grade {
    /// All built-in grades, in registry order.
    pub const ALL: [Grade; 5] = [
        Grade::N660,
        Grade::N550,
        Grade::N772,
        Grade::N774,
        Grade::N762,
    ];

    /// Identifier as written in the interchange format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::N660 => "N660",
            Grade::N550 => "N550",
            Grade::N772 => "N772",
            Grade::N774 => "N774",
            Grade::N762 => "N762",
        }
    }

    /// Preset limits for this grade.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_gradefit::grade::Grade;
    ///
    /// let preset = Grade::N660.preset();
    /// assert_eq!(preset.target, 90.0);
    /// ```
    pub fn preset(&self) -> GradePreset {
        GradeRegistry::builtin().preset(*self)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Grade::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownGrade(trimmed.to_string()))
    }
}

/// Specification limits and target for one grade.
///
/// `lower_limit < target < upper_limit` holds for every built-in preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradePreset {
    /// Lower specification limit (LSL).
    pub lower_limit: f64,
    /// Target value of the measured output.
    pub target: f64,
    /// Upper specification limit (USL).
    pub upper_limit: f64,
}

impl GradePreset {
    const fn new(lower_limit: f64, target: f64, upper_limit: f64) -> Self {
        Self {
            lower_limit,
            target,
            upper_limit,
        }
    }
}

/// Fixed lookup from [`Grade`] to [`GradePreset`].
#[derive(Debug, Clone, Copy)]
pub struct GradeRegistry {
    entries: [(Grade, GradePreset); 5],
}

static BUILTIN: GradeRegistry = GradeRegistry {
    entries: [
        (Grade::N660, GradePreset::new(87.0, 90.0, 93.0)),
        (Grade::N550, GradePreset::new(118.0, 121.0, 124.0)),
        (Grade::N772, GradePreset::new(62.0, 65.0, 68.0)),
        (Grade::N774, GradePreset::new(69.0, 72.0, 75.0)),
        (Grade::N762, GradePreset::new(62.0, 65.0, 68.0)),
    ],
};

impl GradeRegistry {
    /// The built-in registry.
    pub fn builtin() -> &'static GradeRegistry {
        &BUILTIN
    }

    /// Preset for `grade`. Every [`Grade`] variant has an entry.
    pub fn preset(&self, grade: Grade) -> GradePreset {
        // entries are stored in declaration order of `Grade`
        self.entries[grade as usize].1
    }

    /// Looks up a preset by textual identifier.
    pub fn lookup(&self, id: &str) -> Result<(Grade, GradePreset), Error> {
        let grade: Grade = id.parse()?;
        Ok((grade, self.preset(grade)))
    }

    /// Iterates over `(grade, preset)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, GradePreset)> + '_ {
        self.entries.iter().copied()
    }
}
