use crate::core::dynamics::fluctuation::FluctuationProfile;
use crate::core::utils::stats::{CorrelationError, pearson_correlation};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MODERATE_CONFIDENCE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Node {node_index} has no experimental flexibility value (B-factor)")]
    MissingFlexibility { node_index: usize },

    #[error("Predicted and experimental profiles differ in length ({predicted} vs {experimental})")]
    LengthMismatch {
        predicted: usize,
        experimental: usize,
    },

    #[error("At least two nodes are required for validation (got {0})")]
    TooFewPoints(usize),

    #[error("The {0} profile is constant; correlation is undefined")]
    DegenerateInput(&'static str),

    #[error("The {0} profile contains a non-finite value")]
    NonFiniteValue(&'static str),
}

impl From<CorrelationError> for ValidationError {
    fn from(err: CorrelationError) -> Self {
        match err {
            CorrelationError::LengthMismatch { left, right } => ValidationError::LengthMismatch {
                predicted: left,
                experimental: right,
            },
            CorrelationError::TooFewPoints(n) => ValidationError::TooFewPoints(n),
            CorrelationError::NonFiniteValue(which) => {
                ValidationError::NonFiniteValue(profile_name(which))
            }
            CorrelationError::DegenerateInput(which) => {
                ValidationError::DegenerateInput(profile_name(which))
            }
        }
    }
}

fn profile_name(which: &'static str) -> &'static str {
    if which == "first" {
        "predicted"
    } else {
        "experimental"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceLevel {
    High,
    Moderate,
    /// Weak agreement, usually a sign of dynamic disorder in the crystal.
    Low,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Moderate => "moderate",
            ConfidenceLevel::Low => "low/disordered",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Correlation cut-offs for the confidence classification.
///
/// `r > high` is [`ConfidenceLevel::High`], `r > moderate` is
/// [`ConfidenceLevel::Moderate`], anything else is [`ConfidenceLevel::Low`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub moderate: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            moderate: DEFAULT_MODERATE_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    pub fn classify(&self, r: f64) -> ConfidenceLevel {
        if r > self.high {
            ConfidenceLevel::High
        } else if r > self.moderate {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationResult {
    pub pearson_r: f64,
    pub confidence: ConfidenceLevel,
}

/// Compares predicted fluctuations against experimental B-factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationScorer {
    thresholds: ConfidenceThresholds,
}

impl ValidationScorer {
    pub fn new(thresholds: ConfidenceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    /// Correlates `profile` with `experimental` values node by node.
    ///
    /// # Errors
    ///
    /// Fails on a length mismatch, fewer than two nodes, non-finite values, or a
    /// constant sequence. A failure is never reported as a zero correlation.
    pub fn score(
        &self,
        profile: &FluctuationProfile,
        experimental: &[f64],
    ) -> Result<ValidationResult, ValidationError> {
        let pearson_r = pearson_correlation(profile.values(), experimental)?;
        Ok(ValidationResult {
            pearson_r,
            confidence: self.thresholds.classify(pearson_r),
        })
    }

    /// Like [`score`](Self::score), taking experimental values that may be absent per node.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFlexibility`] for the first node without a value,
    /// otherwise as [`score`](Self::score).
    pub fn score_optional(
        &self,
        profile: &FluctuationProfile,
        experimental: &[Option<f64>],
    ) -> Result<ValidationResult, ValidationError> {
        let values = experimental
            .iter()
            .enumerate()
            .map(|(node_index, v)| v.ok_or(ValidationError::MissingFlexibility { node_index }))
            .collect::<Result<Vec<f64>, _>>()?;
        self.score(profile, &values)
    }
}
