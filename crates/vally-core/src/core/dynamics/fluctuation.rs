use super::modes::{Mode, ModeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FluctuationError {
    #[error("Mode {mode_index} is a rigid-body mode (eigenvalue {eigenvalue:e}) and cannot contribute")]
    RigidModeInFluctuation { mode_index: usize, eigenvalue: f64 },

    #[error("The selected mode range contains no vibrational modes")]
    EmptyModeRange,

    #[error("Mode range ends at position {requested} but only {available} modes are available")]
    ModeRangeOutOfBounds { requested: usize, available: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid mode range '{0}' (expected 'all', 'lowest:<n>' or '<first>-<last>')")]
pub struct ModeRangeParseError(pub String);

/// Which retained modes contribute to a fluctuation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeRange {
    /// Every vibrational mode in the set.
    #[default]
    All,
    /// The `n` lowest-frequency vibrational modes.
    Lowest(usize),
    /// An inclusive span of positions within the mode set.
    Span { first: usize, last: usize },
}

impl fmt::Display for ModeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeRange::All => write!(f, "all"),
            ModeRange::Lowest(n) => write!(f, "lowest:{}", n),
            ModeRange::Span { first, last } => write!(f, "{}-{}", first, last),
        }
    }
}

impl FromStr for ModeRange {
    type Err = ModeRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ModeRangeParseError(s.to_string());
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(ModeRange::All);
        }
        if let Some(count) = trimmed.strip_prefix("lowest:") {
            return count
                .trim()
                .parse()
                .map(ModeRange::Lowest)
                .map_err(|_| err());
        }
        let (first, last) = trimmed.split_once('-').ok_or_else(err)?;
        Ok(ModeRange::Span {
            first: first.trim().parse().map_err(|_| err())?,
            last: last.trim().parse().map_err(|_| err())?,
        })
    }
}

/// Per-node mean-square fluctuation, aligned with the structure's node order.
#[derive(Debug, Clone, PartialEq)]
pub struct FluctuationProfile {
    values: Vec<f64>,
    mode_count: usize,
}

impl FluctuationProfile {
    /// Wraps precomputed per-node values, e.g. fluctuations from an external model.
    pub fn new(values: Vec<f64>, mode_count: usize) -> Self {
        Self { values, mode_count }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, node: usize) -> Option<f64> {
        self.values.get(node).copied()
    }

    /// Number of modes summed into this profile.
    pub fn mode_count(&self) -> usize {
        self.mode_count
    }
}

pub struct FluctuationEngine<'a> {
    modes: &'a ModeSet,
}

impl<'a> FluctuationEngine<'a> {
    pub fn new(modes: &'a ModeSet) -> Self {
        Self { modes }
    }

    /// Computes `MSF_i = Σ_k (1/λ_k)·|v_k,i|²` over the modes selected by `range`.
    ///
    /// # Errors
    ///
    /// Returns [`FluctuationError::RigidModeInFluctuation`] if an explicit span reaches a
    /// rigid mode, [`FluctuationError::EmptyModeRange`] when nothing is selected, and
    /// [`FluctuationError::ModeRangeOutOfBounds`] for a span or count beyond the set.
    pub fn profile(&self, range: ModeRange) -> Result<FluctuationProfile, FluctuationError> {
        let selected = self.select(range)?;

        for mode in &selected {
            if mode.rigid || mode.eigenvalue <= 0.0 {
                return Err(FluctuationError::RigidModeInFluctuation {
                    mode_index: mode.index,
                    eigenvalue: mode.eigenvalue,
                });
            }
        }

        let n = self.modes.node_count();
        let mut values = vec![0.0; n];
        for mode in &selected {
            let weight = 1.0 / mode.eigenvalue;
            for (node, value) in values.iter_mut().enumerate() {
                *value += weight * mode.node_amplitude_sq(node);
            }
        }

        debug!(range = %range, modes = selected.len(), nodes = n, "Computed fluctuation profile.");

        Ok(FluctuationProfile {
            values,
            mode_count: selected.len(),
        })
    }

    fn select(&self, range: ModeRange) -> Result<Vec<&'a Mode>, FluctuationError> {
        let selected: Vec<&Mode> = match range {
            ModeRange::All => self.modes.vibrational().collect(),
            ModeRange::Lowest(count) => {
                let available = self.modes.vibrational_count();
                if count > available {
                    return Err(FluctuationError::ModeRangeOutOfBounds {
                        requested: count,
                        available,
                    });
                }
                self.modes.vibrational().take(count).collect()
            }
            ModeRange::Span { first, last } => {
                if first > last {
                    return Err(FluctuationError::EmptyModeRange);
                }
                let modes = self.modes.modes();
                if last >= modes.len() {
                    return Err(FluctuationError::ModeRangeOutOfBounds {
                        requested: last,
                        available: modes.len(),
                    });
                }
                modes[first..=last].iter().collect()
            }
        };

        if selected.is_empty() {
            return Err(FluctuationError::EmptyModeRange);
        }
        Ok(selected)
    }
}
