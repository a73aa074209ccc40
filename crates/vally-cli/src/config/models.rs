use std::path::PathBuf;
use vallyscan::engine::config::ScanConfig;

#[derive(Debug)]
pub struct AppConfig {
    pub core_config: ScanConfig,
    /// Extra target annotations layered over the built-in ones.
    pub knowledge_path: Option<PathBuf>,
}
