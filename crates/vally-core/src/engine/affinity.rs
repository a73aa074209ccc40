/// Offset of the log-fluctuation placeholder, in kcal/mol-like units.
pub const DEFAULT_AFFINITY_OFFSET: f64 = -7.5;

/// Surfaced next to every affinity figure.
pub const AFFINITY_NOTE: &str = "Heuristic placeholder derived from summed adjusted fluctuation; \
not a validated binding free energy.";

/// Maps bonus-adjusted fluctuation scores to a heuristic affinity figure.
///
/// Implementations are placeholders for ranking and display only; none of them is a
/// physically validated free energy.
pub trait AffinityModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `None` when the scores do not support an estimate.
    fn estimate(&self, adjusted_scores: &[f64]) -> Option<f64>;
}

/// `offset - ln(Σ scores)`: more total flexibility gives a more negative figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogFluctuationAffinity {
    pub offset: f64,
}

impl Default for LogFluctuationAffinity {
    fn default() -> Self {
        Self {
            offset: DEFAULT_AFFINITY_OFFSET,
        }
    }
}

impl AffinityModel for LogFluctuationAffinity {
    fn name(&self) -> &'static str {
        "log-fluctuation"
    }

    fn estimate(&self, adjusted_scores: &[f64]) -> Option<f64> {
        let total: f64 = adjusted_scores.iter().sum();
        if total > 0.0 && total.is_finite() {
            Some(self.offset - total.ln())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_offset_minus_log_of_total() {
        let model = LogFluctuationAffinity::default();
        let estimate = model.estimate(&[0.5, 0.25, 0.25]).unwrap();
        assert!((estimate - (-7.5)).abs() < 1e-12);

        let e = std::f64::consts::E;
        let estimate = model.estimate(&[e]).unwrap();
        assert!((estimate - (-8.5)).abs() < 1e-12);
    }

    #[test]
    fn estimate_is_deterministic() {
        let model = LogFluctuationAffinity::default();
        let scores = [0.3, 1.2, 0.7];
        assert_eq!(model.estimate(&scores), model.estimate(&scores));
    }

    #[test]
    fn non_positive_total_has_no_estimate() {
        let model = LogFluctuationAffinity { offset: -5.0 };
        assert_eq!(model.estimate(&[]), None);
        assert_eq!(model.estimate(&[0.0, 0.0]), None);
    }
}
