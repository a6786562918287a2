//! Quality grades and the threshold classifier.
//!
//! Operators configure grades as three percentage shares that sum to 100.
//! They are resolved once into cumulative [`Thresholds`]; a classification
//! draws a single uniform value in `[0, 100)` and finds its bucket.

use crate::error::{ConfigError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const SHARE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Low,
    Medium,
    High,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Low, Grade::Medium, Grade::High];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Low => write!(f, "Low"),
            Grade::Medium => write!(f, "Medium"),
            Grade::High => write!(f, "High"),
        }
    }
}

/// One value per grade, e.g. a processing time or a nested share table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeTable<T> {
    pub low: T,
    pub medium: T,
    pub high: T,
}

impl<T> GradeTable<T> {
    pub fn new(low: T, medium: T, high: T) -> Self {
        Self { low, medium, high }
    }

    pub fn get(&self, grade: Grade) -> &T {
        match grade {
            Grade::Low => &self.low,
            Grade::Medium => &self.medium,
            Grade::High => &self.high,
        }
    }

    pub fn values(&self) -> [&T; 3] {
        [&self.low, &self.medium, &self.high]
    }
}

/// Operator-facing percentage of items expected in each grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeShares {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl GradeShares {
    pub fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    /// Every draw lands in `grade`
    pub fn all(grade: Grade) -> Self {
        match grade {
            Grade::Low => Self::new(100.0, 0.0, 0.0),
            Grade::Medium => Self::new(0.0, 100.0, 0.0),
            Grade::High => Self::new(0.0, 0.0, 100.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }

    pub fn validate(&self, table: &str) -> Result<()> {
        let shares = [self.low, self.medium, self.high];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ConfigError::NegativeShare {
                table: table.to_string(),
            });
        }
        let total = self.total();
        if (total - 100.0).abs() > SHARE_TOLERANCE {
            return Err(ConfigError::InvalidShares {
                table: table.to_string(),
                total,
            });
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low: self.low,
            medium: self.low + self.medium,
        }
    }
}

/// Cumulative bounds: `Low` up to `low`, `Medium` up to `medium`, `High` above
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    low: f64,
    medium: f64,
}

impl Thresholds {
    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }

    /// Bucket for an already drawn percentage
    pub fn grade_for(&self, value: f64) -> Grade {
        if value <= self.low {
            Grade::Low
        } else if value <= self.medium {
            Grade::Medium
        } else {
            Grade::High
        }
    }
}

/// Draw exactly one value from `rng` and grade it
pub fn classify<R: Rng + ?Sized>(thresholds: &Thresholds, rng: &mut R) -> Grade {
    let value = rng.gen_range(0.0..100.0);
    thresholds.grade_for(value)
}
