use super::allosteric::AllostericCandidate;
use crate::core::io::audit::AuditRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub node_index: usize,
    pub chain_id: char,
    pub residue_number: isize,
    pub residue_name: String,
    pub score: f64,
    pub base_fluctuation: f64,
    pub prior_knowledge: bool,
    pub distance_to_active_site: Option<f64>,
}

impl From<&AllostericCandidate> for CandidateRecord {
    fn from(candidate: &AllostericCandidate) -> Self {
        Self {
            node_index: candidate.node_index,
            chain_id: candidate.chain_id,
            residue_number: candidate.residue_number,
            residue_name: candidate.residue_name.clone(),
            score: candidate.score,
            base_fluctuation: candidate.base_fluctuation,
            prior_knowledge: candidate.prior_knowledge,
            distance_to_active_site: candidate.distance_to_active_site,
        }
    }
}

impl CandidateRecord {
    /// Short identifier such as `LYS-75`.
    pub fn hotspot_id(&self) -> String {
        format!("{}-{}", self.residue_name, self.residue_number)
    }
}

/// The complete, serializable result of scanning one structure.
///
/// A failed validation leaves `pearson_r` and `confidence_label` empty and explains why
/// in `validation_error`; it is never reported as a zero correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub structure_id: String,
    pub node_count: usize,
    pub retained_modes: usize,
    pub pearson_r: Option<f64>,
    pub confidence_label: Option<String>,
    pub validation_error: Option<String>,
    pub top_candidates: Vec<CandidateRecord>,
    pub heuristic_affinity_estimate: Option<f64>,
    pub affinity_note: String,
    pub warnings: Vec<String>,
    pub unmatched_prior_residues: Vec<isize>,
    pub unmatched_active_site_residues: Vec<isize>,
}

impl ScanReport {
    pub fn hotspot_ids(&self) -> Vec<String> {
        self.top_candidates
            .iter()
            .map(CandidateRecord::hotspot_id)
            .collect()
    }

    pub fn to_audit_record(&self, timestamp: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            timestamp,
            structure_id: self.structure_id.clone(),
            pearson_r: self.pearson_r,
            hotspots: self.hotspot_ids(),
        }
    }
}
