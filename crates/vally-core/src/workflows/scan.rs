use crate::core::dynamics::fluctuation::{FluctuationEngine, FluctuationProfile};
use crate::core::dynamics::hessian::NetworkBuilder;
use crate::core::dynamics::modes::{ModeSet, ModeSolver};
use crate::core::knowledge::registry::TargetKnowledge;
use crate::core::models::structure::{InputError, StructureModel};
use crate::engine::affinity::{AFFINITY_NOTE, AffinityModel, LogFluctuationAffinity};
use crate::engine::allosteric::{AllostericHeuristic, AllostericOutcome};
use crate::engine::config::ScanConfig;
use crate::engine::error::ScanError;
use crate::engine::progress::ProgressReporter;
use crate::engine::report::{CandidateRecord, ScanReport};
use crate::engine::validation::{ValidationError, ValidationResult, ValidationScorer};
use tracing::{debug, info, instrument, warn};

/// Phases of one scan, in the order they are reported.
pub const SCAN_PHASES: [&str; 4] = [
    "Solving Normal Modes",
    "Computing Fluctuations",
    "Validating Against B-factors",
    "Ranking Allosteric Candidates",
];

/// Residue numbers that steer the allosteric ranking of one structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanTargets {
    /// Literature-reported functional residues (receive the prior-knowledge bonus).
    pub prior_residues: Vec<isize>,
    /// Catalytic residues candidates must stay away from.
    pub active_site_residues: Vec<isize>,
}

impl From<&TargetKnowledge> for ScanTargets {
    fn from(target: &TargetKnowledge) -> Self {
        Self {
            prior_residues: target.key_residues.clone(),
            active_site_residues: target.active_site.clone(),
        }
    }
}

/// Scans one structure with the default affinity placeholder.
///
/// # Errors
///
/// Returns a [`ScanError`] if the structure is too large or any numerical stage fails.
/// A failed B-factor validation is not an error; it is recorded on the report.
pub fn run(
    structure: &StructureModel,
    targets: &ScanTargets,
    config: &ScanConfig,
    reporter: &ProgressReporter,
) -> Result<ScanReport, ScanError> {
    run_with_affinity(
        structure,
        targets,
        config,
        Box::new(LogFluctuationAffinity::default()),
        reporter,
    )
}

/// Scans one structure, estimating affinity with the given model.
#[instrument(skip_all, name = "scan_workflow", fields(structure = structure.id()))]
pub fn run_with_affinity(
    structure: &StructureModel,
    targets: &ScanTargets,
    config: &ScanConfig,
    affinity: Box<dyn AffinityModel>,
    reporter: &ProgressReporter,
) -> Result<ScanReport, ScanError> {
    let node_count = structure.node_count();
    if node_count > config.max_nodes {
        return Err(InputError::TooManyNodes {
            structure_id: structure.id().to_string(),
            count: node_count,
            max: config.max_nodes,
        }
        .into());
    }
    info!(nodes = node_count, "Starting scan.");

    // === Phase 1: Normal modes ===
    let modes = reporter.phase(SCAN_PHASES[0], || solve_modes(structure, config))?;

    // === Phase 2: Fluctuation profile ===
    let profile = reporter.phase(SCAN_PHASES[1], || {
        FluctuationEngine::new(&modes).profile(config.modes.fluctuation_range)
    })?;

    // === Phase 3: Experimental validation (non-fatal) ===
    let validation = reporter.phase(SCAN_PHASES[2], || {
        validate(structure, &profile, config)
    });

    // === Phase 4: Allosteric ranking ===
    let outcome = reporter.phase(SCAN_PHASES[3], || {
        AllostericHeuristic::new(config.allosteric)
            .with_affinity_model(affinity)
            .rank(
                &profile,
                structure.nodes(),
                &targets.prior_residues,
                &targets.active_site_residues,
            )
    })?;

    let report = assemble_report(structure, &modes, validation, outcome);
    info!(
        pearson_r = ?report.pearson_r,
        candidates = report.top_candidates.len(),
        warnings = report.warnings.len(),
        "Scan complete."
    );
    Ok(report)
}

fn solve_modes(structure: &StructureModel, config: &ScanConfig) -> Result<ModeSet, ScanError> {
    let hessian = NetworkBuilder::new(config.network.cutoff, config.network.spring_constant)?
        .build(&structure.coordinates())?;
    let modes =
        ModeSolver::new(config.modes.mode_count, config.modes.include_rigid).solve(&hessian)?;
    debug!(
        vibrational = modes.vibrational_count(),
        zero_modes = modes.zero_mode_count(),
        zero_threshold = modes.zero_threshold(),
        "Normal modes solved."
    );
    if modes.vibrational_count() == 0 {
        return Err(ScanError::DegenerateNetwork {
            zero_modes: modes.zero_mode_count(),
            node_count: modes.node_count(),
        });
    }
    Ok(modes)
}

fn validate(
    structure: &StructureModel,
    profile: &FluctuationProfile,
    config: &ScanConfig,
) -> Result<ValidationResult, ValidationError> {
    let result = ValidationScorer::new(config.validation)
        .score_optional(profile, &structure.b_factors());
    match &result {
        Ok(v) => info!(
            pearson_r = v.pearson_r,
            confidence = %v.confidence,
            "Validated fluctuations against B-factors."
        ),
        Err(e) => warn!(error = %e, "Validation against B-factors failed."),
    }
    result
}

fn assemble_report(
    structure: &StructureModel,
    modes: &ModeSet,
    validation: Result<ValidationResult, ValidationError>,
    outcome: AllostericOutcome,
) -> ScanReport {
    let mut warnings: Vec<String> = modes.warnings().iter().map(|w| w.to_string()).collect();
    if !outcome.unmatched_prior_residues.is_empty() {
        warnings.push(format!(
            "Prior-knowledge residues not found in structure: {:?}",
            outcome.unmatched_prior_residues
        ));
    }
    if !outcome.unmatched_active_site_residues.is_empty() {
        warnings.push(format!(
            "Active-site residues not found in structure: {:?}",
            outcome.unmatched_active_site_residues
        ));
    }

    let (pearson_r, confidence_label, validation_error) = match validation {
        Ok(v) => (Some(v.pearson_r), Some(v.confidence.label().to_string()), None),
        Err(e) => (None, None, Some(e.to_string())),
    };

    ScanReport {
        structure_id: structure.id().to_string(),
        node_count: structure.node_count(),
        retained_modes: modes.vibrational_count(),
        pearson_r,
        confidence_label,
        validation_error,
        top_candidates: outcome.candidates.iter().map(CandidateRecord::from).collect(),
        heuristic_affinity_estimate: outcome.affinity_estimate,
        affinity_note: AFFINITY_NOTE.to_string(),
        warnings,
        unmatched_prior_residues: outcome.unmatched_prior_residues,
        unmatched_active_site_residues: outcome.unmatched_active_site_residues,
    }
}
