use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

struct BuiltinTarget {
    name: &'static str,
    key_residues: &'static [isize],
    active_site: &'static [isize],
}

static BUILTIN_TARGETS: Map<&'static str, BuiltinTarget> = phf_map! {
    "2fom" => BuiltinTarget {
        name: "Dengue virus NS2B/NS3 protease",
        key_residues: &[51, 75, 133, 135, 150, 151, 153],
        active_site: &[75, 135, 157],
    },
    "6lu7" => BuiltinTarget {
        name: "SARS-CoV-2 main protease (Mpro)",
        key_residues: &[41, 49, 143, 145, 163, 164, 166, 189],
        active_site: &[41, 144, 145, 163],
    },
};

/// Curated residue annotations for one target structure.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TargetKnowledge {
    pub name: String,
    /// Residue numbers reported as functionally important (earn the prior bonus).
    #[serde(default)]
    pub key_residues: Vec<isize>,
    /// Catalytic residue numbers used by the geometric filter.
    #[serde(default)]
    pub active_site: Vec<isize>,
}

impl From<&BuiltinTarget> for TargetKnowledge {
    fn from(target: &BuiltinTarget) -> Self {
        Self {
            name: target.name.to_string(),
            key_residues: target.key_residues.to_vec(),
            active_site: target.active_site.to_vec(),
        }
    }
}

/// Target annotations keyed by structure identifier (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    targets: HashMap<String, TargetKnowledge>,
}

impl KnowledgeBase {
    /// The annotations shipped with the library.
    pub fn builtin() -> Self {
        let targets = BUILTIN_TARGETS
            .entries()
            .map(|(id, target)| (id.to_string(), TargetKnowledge::from(target)))
            .collect();
        Self { targets }
    }

    /// Loads the built-in annotations overlaid with the entries of a TOML file.
    ///
    /// The file maps structure ids to tables with `name`, `key-residues` and
    /// `active-site`; an entry in the file replaces the built-in entry of the same id.
    pub fn load(path: &Path) -> Result<Self, KnowledgeLoadError> {
        let mut knowledge = Self::builtin();
        knowledge.merge_file(path)?;
        Ok(knowledge)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<(), KnowledgeLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let entries: HashMap<String, TargetKnowledge> =
            toml::from_str(&content).map_err(|e| KnowledgeLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        for (id, target) in entries {
            self.insert(&id, target);
        }
        Ok(())
    }

    pub fn insert(&mut self, structure_id: &str, target: TargetKnowledge) {
        self.targets.insert(structure_id.to_ascii_lowercase(), target);
    }

    pub fn get(&self, structure_id: &str) -> Option<&TargetKnowledge> {
        self.targets.get(&structure_id.trim().to_ascii_lowercase())
    }

    /// Known structure ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum KnowledgeLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
