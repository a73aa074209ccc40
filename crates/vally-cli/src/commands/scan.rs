use super::{load_knowledge, write_report};
use crate::cli::ScanArgs;
use crate::config::{ConfigSources, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use chrono::Utc;
use tracing::info;
use vallyscan::{
    core::io::{
        audit::AuditLog,
        pdb::PdbFile,
        traits::{StructureFile, structure_id_from_path},
    },
    core::knowledge::registry::KnowledgeBase,
    engine::{affinity::AFFINITY_NOTE, progress::ProgressReporter, report::ScanReport},
    workflows::{self, scan::ScanTargets},
};

pub fn run(args: ScanArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&ConfigSources::from(&args))?;
    let knowledge = load_knowledge(app_config.knowledge_path.as_deref())?;

    let structure_id = args
        .id
        .clone()
        .unwrap_or_else(|| structure_id_from_path(&args.input));
    let targets = resolve_targets(&args, &knowledge, &structure_id);
    info!(
        structure = %structure_id,
        prior = targets.prior_residues.len(),
        active_site = targets.active_site_residues.len(),
        "Resolved scan targets."
    );

    info!("Loading input structure from {:?}", &args.input);
    let (structure, metadata) =
        PdbFile::read_from_path(&args.input, &structure_id).map_err(|e| {
            CliError::FileParsing {
                path: args.input.clone(),
                source: e.into(),
            }
        })?;
    if let Some(title) = &metadata.title {
        info!("Structure title: {}", title);
    }

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Scanning {} ({} nodes)...", structure_id, structure.node_count());
    let report = workflows::scan::run(&structure, &targets, &app_config.core_config, &reporter)?;

    if let Some(path) = &args.output {
        write_report(&report, path)?;
        println!("Report written to: {}", path.display());
    }

    if let Some(path) = &args.audit_log {
        let audit = AuditLog::open(path)?;
        audit.append(&report.to_audit_record(Utc::now()))?;
        info!("Appended audit record to {:?}", path);
    }

    print_summary(&report);
    Ok(())
}

/// Explicit residue lists win over the knowledge entry for the structure.
fn resolve_targets(args: &ScanArgs, knowledge: &KnowledgeBase, structure_id: &str) -> ScanTargets {
    let known = match knowledge.get(structure_id) {
        Some(target) => {
            info!(structure = %structure_id, target = %target.name, "Using target annotations.");
            ScanTargets::from(target)
        }
        None => ScanTargets::default(),
    };
    ScanTargets {
        prior_residues: args.prior.clone().unwrap_or(known.prior_residues),
        active_site_residues: args
            .active_site
            .clone()
            .unwrap_or(known.active_site_residues),
    }
}

fn print_summary(report: &ScanReport) {
    println!();
    println!("Structure:        {}", report.structure_id);
    println!("Nodes:            {}", report.node_count);
    println!("Retained modes:   {}", report.retained_modes);

    match (report.pearson_r, &report.confidence_label) {
        (Some(r), Some(label)) => {
            println!("B-factor Pearson: {:.3} ({})", r, label);
        }
        _ => println!(
            "B-factor Pearson: unavailable ({})",
            report
                .validation_error
                .as_deref()
                .unwrap_or("no validation performed")
        ),
    }

    if report.top_candidates.is_empty() {
        println!("Allosteric candidates: none");
    } else {
        println!("Allosteric candidates:");
        for (rank, candidate) in report.top_candidates.iter().enumerate() {
            let distance = candidate
                .distance_to_active_site
                .map(|d| format!("{:.1} Å", d))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}. {}{} chain {}  score {:.4}  distance {}",
                rank + 1,
                candidate.hotspot_id(),
                if candidate.prior_knowledge { "*" } else { "" },
                candidate.chain_id,
                candidate.score,
                distance
            );
        }
    }

    match report.heuristic_affinity_estimate {
        Some(estimate) => println!("Affinity estimate: {:.2} kcal/mol", estimate),
        None => println!("Affinity estimate: unavailable"),
    }
    println!("  Note: {}", AFFINITY_NOTE);

    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }
}
