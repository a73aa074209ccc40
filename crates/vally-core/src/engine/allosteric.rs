use super::affinity::{AffinityModel, LogFluctuationAffinity};
use super::config::AllostericConfig;
use crate::core::dynamics::fluctuation::FluctuationProfile;
use crate::core::models::node::Node;
use crate::core::utils::geometry::min_distance_to_set;
use crate::core::utils::stats::percentile;
use nalgebra::Point3;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeuristicError {
    #[error("Fluctuation profile has {profile} values but the structure has {nodes} nodes")]
    LengthMismatch { profile: usize, nodes: usize },
}

/// A residue ranked as a putative allosteric site.
#[derive(Debug, Clone, PartialEq)]
pub struct AllostericCandidate {
    pub node_index: usize,
    pub chain_id: char,
    pub residue_number: isize,
    pub residue_name: String,
    /// Fluctuation after the prior-knowledge bonus.
    pub score: f64,
    /// Fluctuation before any bonus.
    pub base_fluctuation: f64,
    pub prior_knowledge: bool,
    /// Distance in Angstroms to the nearest matched active-site node.
    pub distance_to_active_site: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllostericOutcome {
    /// At most `top_k` candidates, best first.
    pub candidates: Vec<AllostericCandidate>,
    /// Bonus-adjusted score of every node, in node order.
    pub adjusted_scores: Vec<f64>,
    pub affinity_estimate: Option<f64>,
    pub geometric_filter_applied: bool,
    /// The flexibility cut-off used by the geometric filter, when it ran.
    pub flexibility_threshold: Option<f64>,
    pub unmatched_prior_residues: Vec<isize>,
    pub unmatched_active_site_residues: Vec<isize>,
}

/// Ranks residues by flexibility, informed by literature and active-site geometry.
///
/// Scoring starts from the per-node fluctuation. Residues named in the prior-knowledge
/// set get their score multiplied by the configured bonus. When an active site is known
/// and the geometric filter is on, only residues that are both highly flexible (score at
/// or above the configured percentile) and farther than the minimum distance from every
/// active-site residue stay eligible.
pub struct AllostericHeuristic {
    config: AllostericConfig,
    affinity: Box<dyn AffinityModel>,
}

impl AllostericHeuristic {
    pub fn new(config: AllostericConfig) -> Self {
        Self {
            config,
            affinity: Box::new(LogFluctuationAffinity::default()),
        }
    }

    pub fn with_affinity_model(mut self, model: Box<dyn AffinityModel>) -> Self {
        self.affinity = model;
        self
    }

    pub fn config(&self) -> &AllostericConfig {
        &self.config
    }

    pub fn affinity_model(&self) -> &dyn AffinityModel {
        self.affinity.as_ref()
    }

    /// Scores and ranks every node.
    ///
    /// Residue numbers resolve to every node carrying that number, one per chain in
    /// multi-chain entries; numbers that match no node are ignored and listed in the outcome. Ranking is by adjusted score,
    /// descending, with ties going to the lower node index.
    ///
    /// # Errors
    ///
    /// Returns [`HeuristicError::LengthMismatch`] if `profile` and `nodes` differ in length.
    pub fn rank(
        &self,
        profile: &FluctuationProfile,
        nodes: &[Node],
        prior_residues: &[isize],
        active_site_residues: &[isize],
    ) -> Result<AllostericOutcome, HeuristicError> {
        if profile.len() != nodes.len() {
            return Err(HeuristicError::LengthMismatch {
                profile: profile.len(),
                nodes: nodes.len(),
            });
        }

        let base = profile.values();
        let mut adjusted = base.to_vec();
        let mut is_prior = vec![false; nodes.len()];

        let (prior_nodes, unmatched_prior_residues) = resolve_residues(nodes, prior_residues);
        for index in prior_nodes {
            adjusted[index] *= self.config.prior_bonus;
            is_prior[index] = true;
        }

        let (active_nodes, unmatched_active_site_residues) =
            resolve_residues(nodes, active_site_residues);
        let active_positions: Vec<Point3<f64>> =
            active_nodes.iter().map(|&i| nodes[i].position).collect();
        let distances: Vec<Option<f64>> = nodes
            .iter()
            .map(|n| min_distance_to_set(&n.position, &active_positions))
            .collect();

        let mut flexibility_threshold = None;
        let mut eligible: Vec<usize> = (0..nodes.len()).collect();
        if self.config.geometric_filter {
            if active_positions.is_empty() {
                warn!(
                    requested = active_site_residues.len(),
                    "No active-site residue matched the structure; geometric filter skipped."
                );
            } else if let Some(threshold) =
                percentile(&adjusted, self.config.flexibility_percentile)
            {
                let min_distance = self.config.min_active_site_distance;
                eligible.retain(|&i| {
                    adjusted[i] >= threshold && distances[i].is_some_and(|d| d > min_distance)
                });
                flexibility_threshold = Some(threshold);
            }
        }

        eligible.sort_by(|&a, &b| adjusted[b].total_cmp(&adjusted[a]).then(a.cmp(&b)));
        let candidates: Vec<AllostericCandidate> = eligible
            .into_iter()
            .take(self.config.top_k)
            .map(|i| AllostericCandidate {
                node_index: i,
                chain_id: nodes[i].chain_id,
                residue_number: nodes[i].residue_number,
                residue_name: nodes[i].residue_name.clone(),
                score: adjusted[i],
                base_fluctuation: base[i],
                prior_knowledge: is_prior[i],
                distance_to_active_site: distances[i],
            })
            .collect();

        let affinity_estimate = self.affinity.estimate(&adjusted);

        debug!(
            candidates = candidates.len(),
            filtered = flexibility_threshold.is_some(),
            model = self.affinity.name(),
            "Ranked allosteric candidates."
        );

        Ok(AllostericOutcome {
            candidates,
            adjusted_scores: adjusted,
            affinity_estimate,
            geometric_filter_applied: flexibility_threshold.is_some(),
            flexibility_threshold,
            unmatched_prior_residues,
            unmatched_active_site_residues,
        })
    }
}

/// Maps residue numbers to the indices of all nodes carrying them (duplicates collapsed).
fn resolve_residues(nodes: &[Node], residue_numbers: &[isize]) -> (Vec<usize>, Vec<isize>) {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for &number in residue_numbers {
        if !seen.insert(number) {
            continue;
        }
        let before = matched.len();
        matched.extend(
            nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.residue_number == number)
                .map(|(i, _)| i),
        );
        if matched.len() == before {
            unmatched.push(number);
        }
    }
    (matched, unmatched)
}
