use super::{load_knowledge, write_report};
use crate::cli::BatchArgs;
use crate::config::{ConfigSources, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::path::Path;
use tracing::{info, warn};
use vallyscan::{
    core::io::audit::AuditLog,
    engine::{progress::ProgressReporter, report::ScanReport},
    workflows::{self, batch::BatchItem},
};

pub fn run(args: BatchArgs, quiet: bool) -> Result<()> {
    let app_config = build_config(&ConfigSources::from(&args))?;
    let knowledge = load_knowledge(app_config.knowledge_path.as_deref())?;

    let paths = workflows::batch::discover_structures(&args.directory)?;
    if paths.is_empty() {
        return Err(CliError::Argument(format!(
            "No structure files (.pdb, .ent) found in {}",
            args.directory.display()
        )));
    }
    info!("Discovered {} structure file(s) in {:?}", paths.len(), &args.directory);

    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)?;
    }
    let audit = args.audit_log.as_deref().map(AuditLog::open).transpose()?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Scanning {} structure(s)...", paths.len());
    let items = workflows::batch::run(
        &paths,
        &app_config.core_config,
        &knowledge,
        audit.as_ref(),
        &reporter,
    );

    let failed = report_items(&items, args.output.as_deref());

    println!("\n{} succeeded, {} failed.", items.len() - failed, failed);

    summarize(items.len(), failed)
}

/// Prints one line per item and writes its JSON report; returns how many items failed.
/// An item whose report cannot be written counts as failed without stopping the rest.
fn report_items(items: &[BatchItem], output: Option<&Path>) -> usize {
    let mut failed = 0;
    for item in items {
        let report = match &item.outcome {
            Ok(report) => report,
            Err(e) => {
                failed += 1;
                println!("✗ {:<12} {}", item.structure_id, e);
                continue;
            }
        };

        if let Some(dir) = output {
            if let Err(e) = write_item_report(item, report, dir) {
                failed += 1;
                warn!(structure = %item.structure_id, error = %e, "Failed to write report.");
                println!("✗ {:<12} report not written: {}", item.structure_id, e);
                continue;
            }
        }

        let pearson = report
            .pearson_r
            .map(|r| format!("{:.3}", r))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "✓ {:<12} nodes {:>5}  r {:>6}  hotspots [{}]",
            item.structure_id,
            report.node_count,
            pearson,
            report.hotspot_ids().join(", ")
        );
    }
    failed
}

fn write_item_report(item: &BatchItem, report: &ScanReport, dir: &Path) -> Result<()> {
    let path = dir.join(format!("{}.json", item.structure_id));
    write_report(report, &path)?;
    info!("Report for {} written to {:?}", item.structure_id, path);
    Ok(())
}

/// A batch fails only when nothing in it succeeded.
fn summarize(total: usize, failed: usize) -> Result<()> {
    if total > 0 && failed == total {
        return Err(CliError::Other(anyhow::anyhow!(
            "All {} structure(s) failed to scan",
            total
        )));
    }
    if failed > 0 {
        warn!(failed, total, "Some structures failed to scan.");
    }
    Ok(())
}
