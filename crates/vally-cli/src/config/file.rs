use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileNetworkConfig {
    pub cutoff: Option<f64>,
    pub spring_constant: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileModeConfig {
    pub mode_count: Option<usize>,
    pub include_rigid: Option<bool>,
    /// `all`, `lowest:<n>` or `<first>-<last>`.
    pub fluctuation_range: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileValidationConfig {
    pub high_confidence: Option<f64>,
    pub moderate_confidence: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileAllostericConfig {
    pub top_k: Option<usize>,
    pub flexibility_percentile: Option<f64>,
    pub min_active_site_distance: Option<f64>,
    pub geometric_filter: Option<bool>,
    pub prior_bonus: Option<f64>,
}

/// A configuration file as written by the user; every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<FileNetworkConfig>,
    pub modes: Option<FileModeConfig>,
    pub validation: Option<FileValidationConfig>,
    pub allosteric: Option<FileAllostericConfig>,
    pub max_nodes: Option<usize>,
    pub knowledge_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
