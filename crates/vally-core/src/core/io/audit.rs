use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

const AUDIT_HEADER: [&str; 4] = ["timestamp", "structure_id", "pearson_r", "hotspots"];
const HOTSPOT_SEPARATOR: &str = ";";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to open audit log '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Failed to write audit record: {0}")]
    Csv(#[from] csv::Error),
    #[error("Audit log writer is unavailable after a panic in another writer")]
    Poisoned,
}

/// One completed scan, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub structure_id: String,
    pub pearson_r: Option<f64>,
    /// Hotspot identifiers in rank order, e.g. `LYS-75`.
    pub hotspots: Vec<String>,
}

#[derive(Serialize)]
struct AuditRow<'a> {
    timestamp: String,
    structure_id: &'a str,
    pearson_r: Option<f64>,
    hotspots: String,
}

impl<'a> From<&'a AuditRecord> for AuditRow<'a> {
    fn from(record: &'a AuditRecord) -> Self {
        Self {
            timestamp: record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            structure_id: &record.structure_id,
            pearson_r: record.pearson_r,
            hotspots: record.hotspots.join(HOTSPOT_SEPARATOR),
        }
    }
}

/// Append-only CSV log of scan results, safe to share between concurrent scans.
///
/// Columns are `timestamp,structure_id,pearson_r,hotspots`; a missing correlation is
/// written as an empty field. The header is written only when the file starts empty,
/// so reopening an existing log continues it.
pub struct AuditLog {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl AuditLog {
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file cannot be opened for appending, or
    /// [`AuditError::Csv`] if writing the header fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let io_err = |source| AuditError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        let is_empty = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer.write_record(AUDIT_HEADER)?;
            writer.flush().map_err(io_err)?;
        }

        debug!(path = %path.display(), new_file = is_empty, "Opened audit log.");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and flushes it to disk.
    pub fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut writer = self.writer.lock().map_err(|_| AuditError::Poisoned)?;
        writer.serialize(AuditRow::from(record))?;
        writer.flush().map_err(|source| AuditError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}
