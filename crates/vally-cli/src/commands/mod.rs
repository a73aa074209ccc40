pub mod batch;
pub mod scan;

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use vallyscan::core::knowledge::registry::KnowledgeBase;
use vallyscan::engine::report::ScanReport;

/// Built-in target annotations, overlaid with a user file when one is configured.
fn load_knowledge(path: Option<&Path>) -> Result<KnowledgeBase> {
    let knowledge = match path {
        Some(path) => {
            info!("Loading target annotations from {:?}", path);
            KnowledgeBase::load(path)?
        }
        None => KnowledgeBase::builtin(),
    };
    info!(targets = knowledge.len(), "Knowledge base ready.");
    Ok(knowledge)
}

fn write_report(report: &ScanReport, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
