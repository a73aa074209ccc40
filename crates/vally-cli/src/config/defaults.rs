use vallyscan::core::dynamics::fluctuation::ModeRange;
use vallyscan::engine::config::ScanConfig;

pub struct DefaultsConfig {
    pub cutoff: f64,
    pub spring_constant: f64,
    pub mode_count: usize,
    pub include_rigid: bool,
    pub fluctuation_range: ModeRange,
    pub high_confidence: f64,
    pub moderate_confidence: f64,
    pub top_k: usize,
    pub flexibility_percentile: f64,
    pub min_active_site_distance: f64,
    pub geometric_filter: bool,
    pub prior_bonus: f64,
    pub max_nodes: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let core = ScanConfig::default();
        Self {
            cutoff: core.network.cutoff,
            spring_constant: core.network.spring_constant,
            mode_count: core.modes.mode_count,
            include_rigid: core.modes.include_rigid,
            fluctuation_range: core.modes.fluctuation_range,
            high_confidence: core.validation.high,
            moderate_confidence: core.validation.moderate,
            top_k: core.allosteric.top_k,
            flexibility_percentile: core.allosteric.flexibility_percentile,
            min_active_site_distance: core.allosteric.min_active_site_distance,
            geometric_filter: core.allosteric.geometric_filter,
            prior_bonus: core.allosteric.prior_bonus,
            max_nodes: core.max_nodes,
        }
    }
}
