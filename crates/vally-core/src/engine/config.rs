use super::validation::ConfidenceThresholds;
use crate::core::dynamics::fluctuation::ModeRange;
use crate::core::dynamics::hessian::{DEFAULT_CUTOFF, DEFAULT_SPRING_CONSTANT};
use crate::core::dynamics::modes::DEFAULT_MODE_COUNT;
use thiserror::Error;

pub const PRIOR_KNOWLEDGE_BONUS: f64 = 1.5;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_FLEXIBILITY_PERCENTILE: f64 = 85.0;
pub const DEFAULT_MIN_ACTIVE_SITE_DISTANCE: f64 = 15.0;
/// Eigendecomposition is cubic in the node count; larger structures are refused.
pub const DEFAULT_MAX_NODES: usize = 5000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    pub cutoff: f64,
    pub spring_constant: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            spring_constant: DEFAULT_SPRING_CONSTANT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeConfig {
    /// Vibrational modes kept after the rigid-body modes.
    pub mode_count: usize,
    pub include_rigid: bool,
    /// Modes summed into the fluctuation profile used for validation and ranking.
    pub fluctuation_range: ModeRange,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            mode_count: DEFAULT_MODE_COUNT,
            include_rigid: false,
            fluctuation_range: ModeRange::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllostericConfig {
    pub top_k: usize,
    /// Percentile (0-100) of adjusted scores a candidate must reach under the geometric filter.
    pub flexibility_percentile: f64,
    /// Candidates must be strictly farther than this from every active-site node (Angstroms).
    pub min_active_site_distance: f64,
    pub geometric_filter: bool,
    pub prior_bonus: f64,
}

impl Default for AllostericConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            flexibility_percentile: DEFAULT_FLEXIBILITY_PERCENTILE,
            min_active_site_distance: DEFAULT_MIN_ACTIVE_SITE_DISTANCE,
            geometric_filter: true,
            prior_bonus: PRIOR_KNOWLEDGE_BONUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub network: NetworkConfig,
    pub modes: ModeConfig,
    pub validation: ConfidenceThresholds,
    pub allosteric: AllostericConfig,
    pub max_nodes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            modes: ModeConfig::default(),
            validation: ConfidenceThresholds::default(),
            allosteric: AllostericConfig::default(),
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl ScanConfig {
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct ScanConfigBuilder {
    cutoff: Option<f64>,
    spring_constant: Option<f64>,
    mode_count: Option<usize>,
    include_rigid: Option<bool>,
    fluctuation_range: Option<ModeRange>,
    high_confidence: Option<f64>,
    moderate_confidence: Option<f64>,
    top_k: Option<usize>,
    flexibility_percentile: Option<f64>,
    min_active_site_distance: Option<f64>,
    geometric_filter: Option<bool>,
    prior_bonus: Option<f64>,
    max_nodes: Option<usize>,
}

impl ScanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn spring_constant(mut self, gamma: f64) -> Self {
        self.spring_constant = Some(gamma);
        self
    }
    pub fn mode_count(mut self, n: usize) -> Self {
        self.mode_count = Some(n);
        self
    }
    pub fn include_rigid(mut self, include: bool) -> Self {
        self.include_rigid = Some(include);
        self
    }
    pub fn fluctuation_range(mut self, range: ModeRange) -> Self {
        self.fluctuation_range = Some(range);
        self
    }
    pub fn high_confidence(mut self, threshold: f64) -> Self {
        self.high_confidence = Some(threshold);
        self
    }
    pub fn moderate_confidence(mut self, threshold: f64) -> Self {
        self.moderate_confidence = Some(threshold);
        self
    }
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }
    pub fn flexibility_percentile(mut self, p: f64) -> Self {
        self.flexibility_percentile = Some(p);
        self
    }
    pub fn min_active_site_distance(mut self, distance: f64) -> Self {
        self.min_active_site_distance = Some(distance);
        self
    }
    pub fn geometric_filter(mut self, enabled: bool) -> Self {
        self.geometric_filter = Some(enabled);
        self
    }
    pub fn prior_bonus(mut self, bonus: f64) -> Self {
        self.prior_bonus = Some(bonus);
        self
    }
    pub fn max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    /// Fills unset fields with their defaults and validates the result.
    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        let network_defaults = NetworkConfig::default();
        let mode_defaults = ModeConfig::default();
        let threshold_defaults = ConfidenceThresholds::default();
        let allosteric_defaults = AllostericConfig::default();

        let network = NetworkConfig {
            cutoff: positive("cutoff", self.cutoff.unwrap_or(network_defaults.cutoff))?,
            spring_constant: positive(
                "spring_constant",
                self.spring_constant
                    .unwrap_or(network_defaults.spring_constant),
            )?,
        };

        let modes = ModeConfig {
            mode_count: at_least(
                "mode_count",
                self.mode_count.unwrap_or(mode_defaults.mode_count),
                1,
            )?,
            include_rigid: self.include_rigid.unwrap_or(mode_defaults.include_rigid),
            fluctuation_range: self
                .fluctuation_range
                .unwrap_or(mode_defaults.fluctuation_range),
        };
        match modes.fluctuation_range {
            ModeRange::Lowest(0) => {
                return Err(invalid("fluctuation_range", "must select at least one mode"));
            }
            ModeRange::Lowest(n) if n > modes.mode_count => {
                return Err(invalid(
                    "fluctuation_range",
                    format!("selects {} modes but only {} are retained", n, modes.mode_count),
                ));
            }
            ModeRange::Span { first, last } if first > last => {
                return Err(invalid("fluctuation_range", "span start exceeds its end"));
            }
            _ => {}
        }

        let validation = ConfidenceThresholds {
            high: self.high_confidence.unwrap_or(threshold_defaults.high),
            moderate: self
                .moderate_confidence
                .unwrap_or(threshold_defaults.moderate),
        };
        for (name, value) in [
            ("high_confidence", validation.high),
            ("moderate_confidence", validation.moderate),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(invalid(name, format!("{} is outside [-1, 1]", value)));
            }
        }
        if validation.moderate > validation.high {
            return Err(invalid(
                "moderate_confidence",
                "must not exceed the high-confidence threshold",
            ));
        }

        let flexibility_percentile = self
            .flexibility_percentile
            .unwrap_or(allosteric_defaults.flexibility_percentile);
        if !(0.0..=100.0).contains(&flexibility_percentile) {
            return Err(invalid(
                "flexibility_percentile",
                format!("{} is outside [0, 100]", flexibility_percentile),
            ));
        }
        let min_active_site_distance = self
            .min_active_site_distance
            .unwrap_or(allosteric_defaults.min_active_site_distance);
        if !min_active_site_distance.is_finite() || min_active_site_distance < 0.0 {
            return Err(invalid(
                "min_active_site_distance",
                format!("{} must be finite and non-negative", min_active_site_distance),
            ));
        }

        let allosteric = AllostericConfig {
            top_k: at_least("top_k", self.top_k.unwrap_or(allosteric_defaults.top_k), 1)?,
            flexibility_percentile,
            min_active_site_distance,
            geometric_filter: self
                .geometric_filter
                .unwrap_or(allosteric_defaults.geometric_filter),
            prior_bonus: positive(
                "prior_bonus",
                self.prior_bonus.unwrap_or(allosteric_defaults.prior_bonus),
            )?,
        };

        Ok(ScanConfig {
            network,
            modes,
            validation,
            allosteric,
            max_nodes: at_least("max_nodes", self.max_nodes.unwrap_or(DEFAULT_MAX_NODES), 2)?,
        })
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(name, format!("{} must be finite and positive", value)))
    }
}

fn at_least(name: &'static str, value: usize, min: usize) -> Result<usize, ConfigError> {
    if value >= min {
        Ok(value)
    } else {
        Err(invalid(name, format!("must be at least {}", min)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_documented_values() {
        let config = ScanConfigBuilder::new().build().unwrap();
        assert_eq!(config.network.cutoff, 15.0);
        assert_eq!(config.network.spring_constant, 1.0);
        assert_eq!(config.modes.mode_count, 20);
        assert_eq!(config.modes.fluctuation_range, ModeRange::All);
        assert!(!config.modes.include_rigid);
        assert_eq!(config.validation.high, 0.5);
        assert_eq!(config.validation.moderate, 0.2);
        assert_eq!(config.allosteric.top_k, 5);
        assert_eq!(config.allosteric.flexibility_percentile, 85.0);
        assert_eq!(config.allosteric.min_active_site_distance, 15.0);
        assert_eq!(config.allosteric.prior_bonus, 1.5);
        assert!(config.allosteric.geometric_filter);
        assert_eq!(config.max_nodes, 5000);
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn builder_applies_overrides() {
        let config = ScanConfig::builder()
            .cutoff(12.0)
            .mode_count(10)
            .fluctuation_range(ModeRange::Lowest(3))
            .top_k(8)
            .geometric_filter(false)
            .build()
            .unwrap();
        assert_eq!(config.network.cutoff, 12.0);
        assert_eq!(config.modes.fluctuation_range, ModeRange::Lowest(3));
        assert_eq!(config.allosteric.top_k, 8);
        assert!(!config.allosteric.geometric_filter);
    }

    #[test]
    fn build_rejects_invalid_values() {
        let cases = [
            (ScanConfig::builder().cutoff(-1.0), "cutoff"),
            (ScanConfig::builder().mode_count(0), "mode_count"),
            (ScanConfig::builder().top_k(0), "top_k"),
            (ScanConfig::builder().flexibility_percentile(120.0), "flexibility_percentile"),
            (ScanConfig::builder().prior_bonus(0.0), "prior_bonus"),
            (ScanConfig::builder().max_nodes(1), "max_nodes"),
            (
                ScanConfig::builder().mode_count(2).fluctuation_range(ModeRange::Lowest(3)),
                "fluctuation_range",
            ),
            (
                ScanConfig::builder().high_confidence(0.1).moderate_confidence(0.3),
                "moderate_confidence",
            ),
        ];
        for (builder, expected) in cases {
            match builder.build() {
                Err(ConfigError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected error for {}, got {:?}", expected, other),
            }
        }
    }
}
