use super::scan::{self, ScanTargets};
use crate::core::io::audit::AuditLog;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{StructureFile, structure_id_from_path};
use crate::core::knowledge::registry::KnowledgeBase;
use crate::engine::config::ScanConfig;
use crate::engine::error::ScanError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::ScanReport;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const STRUCTURE_EXTENSIONS: [&str; 2] = ["pdb", "ent"];

/// The result of scanning one file of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub structure_id: String,
    pub outcome: Result<ScanReport, ScanError>,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Lists the structure files (`.pdb`, `.ent`) directly inside `dir`, sorted by path.
pub fn discover_structures(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_structure = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    STRUCTURE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                });
        if is_structure {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Scans every file independently and returns one item per path, in input order.
///
/// A failure in one file (unreadable, no protein nodes, numerical breakdown) is recorded
/// on its item and never affects the others. Prior-knowledge and active-site residues are
/// looked up in `knowledge` by the file-derived structure id. When an audit log is given,
/// each successful scan appends one record; a failed append is logged and does not fail
/// the item.
#[instrument(skip_all, name = "batch_workflow", fields(items = paths.len()))]
pub fn run(
    paths: &[PathBuf],
    config: &ScanConfig,
    knowledge: &KnowledgeBase,
    audit: Option<&AuditLog>,
    reporter: &ProgressReporter,
) -> Vec<BatchItem> {
    info!("Starting batch scan.");
    reporter.report(Progress::TaskStart {
        total_steps: paths.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = paths.iter();

    #[cfg(feature = "parallel")]
    let iterator = paths.par_iter();

    let items: Vec<BatchItem> = iterator
        .map(|path| {
            let item = scan_file(path, config, knowledge, audit);
            reporter.report(Progress::TaskIncrement);
            item
        })
        .collect();

    reporter.report(Progress::TaskFinish);

    let succeeded = items.iter().filter(|item| item.is_success()).count();
    info!(
        succeeded,
        failed = items.len() - succeeded,
        "Batch scan complete."
    );
    items
}

fn scan_file(
    path: &Path,
    config: &ScanConfig,
    knowledge: &KnowledgeBase,
    audit: Option<&AuditLog>,
) -> BatchItem {
    let structure_id = structure_id_from_path(path);
    let targets = knowledge
        .get(&structure_id)
        .map(ScanTargets::from)
        .unwrap_or_default();

    let outcome = PdbFile::read_from_path(path, &structure_id)
        .map_err(ScanError::from)
        .and_then(|(structure, _)| {
            scan::run(&structure, &targets, config, &ProgressReporter::new())
        });

    match &outcome {
        Ok(report) => {
            if let Some(log) = audit {
                if let Err(e) = log.append(&report.to_audit_record(Utc::now())) {
                    warn!(structure = %structure_id, error = %e, "Failed to append audit record.");
                }
            }
        }
        Err(e) => warn!(structure = %structure_id, error = %e, "Structure scan failed."),
    }

    BatchItem {
        path: path.to_path_buf(),
        structure_id,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;
    use tempfile::tempdir;

    fn helix_pdb(count: usize) -> String {
        let mut text = String::new();
        for i in 0..count {
            let t = i as f64 * 100f64.to_radians();
            let b = 10.0 + (i as f64 - count as f64 / 2.0).powi(2);
            writeln!(
                text,
                "ATOM  {:>5}  CA  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00{:>6.2}           C",
                i + 1,
                i + 1,
                2.3 * t.cos(),
                2.3 * t.sin(),
                1.5 * i as f64,
                b
            )
            .unwrap();
        }
        text.push_str("END\n");
        text
    }

    fn config() -> ScanConfig {
        ScanConfig::builder().cutoff(9.0).build().unwrap()
    }

    #[test]
    fn discover_lists_structure_files_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.pdb"), "").unwrap();
        fs::write(dir.path().join("a.PDB"), "").unwrap();
        fs::write(dir.path().join("c.ent"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.pdb")).unwrap();

        let names: Vec<String> = discover_structures(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDB", "b.pdb", "c.ent"]);
    }

    #[test]
    fn failures_are_isolated_and_order_is_preserved() {
        let dir = tempdir().unwrap();
        let good_a = dir.path().join("alpha.pdb");
        let broken = dir.path().join("broken.pdb");
        let good_b = dir.path().join("gamma.pdb");
        let missing = dir.path().join("missing.pdb");
        fs::write(&good_a, helix_pdb(12)).unwrap();
        fs::write(&broken, "HETATM    1  O   HOH A   1       0.000   0.000   0.000\n").unwrap();
        fs::write(&good_b, helix_pdb(14)).unwrap();

        let paths = vec![good_a, broken, good_b, missing];
        let items = run(
            &paths,
            &config(),
            &KnowledgeBase::builtin(),
            None,
            &ProgressReporter::new(),
        );

        assert_eq!(items.len(), 4);
        let ids: Vec<&str> = items.iter().map(|i| i.structure_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "broken", "gamma", "missing"]);
        assert!(items[0].is_success());
        assert!(matches!(items[1].outcome, Err(ScanError::Load { .. })));
        assert_eq!(items[2].outcome.as_ref().unwrap().node_count, 14);
        assert!(matches!(items[3].outcome, Err(ScanError::Load { .. })));
    }

    #[test]
    fn successful_items_are_audited() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| {
                let path = dir.path().join(format!("s{}.pdb", i));
                fs::write(&path, helix_pdb(10 + i)).unwrap();
                path
            })
            .collect();
        let audit_path = dir.path().join("audit.csv");
        let audit = AuditLog::open(&audit_path).unwrap();

        let items = run(
            &paths,
            &config(),
            &KnowledgeBase::default(),
            Some(&audit),
            &ProgressReporter::new(),
        );
        assert!(items.iter().all(BatchItem::is_success));

        let mut reader = csv::Reader::from_path(&audit_path).unwrap();
        let mut ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[1].to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["s0", "s1", "s2"]);
    }

    #[test]
    fn knowledge_supplies_targets_by_structure_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("6LU7.pdb");
        fs::write(&path, helix_pdb(12)).unwrap();

        let items = run(
            &[path],
            &config(),
            &KnowledgeBase::builtin(),
            None,
            &ProgressReporter::new(),
        );
        let report = items[0].outcome.as_ref().unwrap();
        // The short helix has residues 1-12 only; every Mpro residue goes unmatched.
        assert_eq!(report.unmatched_prior_residues, vec![41, 49, 143, 145, 163, 164, 166, 189]);
        assert_eq!(report.unmatched_active_site_residues, vec![41, 144, 145, 163]);
    }
}
