use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{BatchArgs, ScanArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use vallyscan::core::dynamics::fluctuation::ModeRange;
use vallyscan::engine::config::ScanConfig;

/// The command-line inputs that shape the configuration, shared by `scan` and `batch`.
#[derive(Debug, Default)]
pub struct ConfigSources<'a> {
    pub config_path: Option<&'a Path>,
    pub set_values: &'a [String],
    pub top_k: Option<usize>,
    pub no_geometric_filter: bool,
    pub knowledge_path: Option<&'a Path>,
}

impl<'a> From<&'a ScanArgs> for ConfigSources<'a> {
    fn from(args: &'a ScanArgs) -> Self {
        Self {
            config_path: args.config.as_deref(),
            set_values: &args.set_values,
            top_k: args.top_k,
            no_geometric_filter: args.no_geometric_filter,
            knowledge_path: args.knowledge.as_deref(),
        }
    }
}

impl<'a> From<&'a BatchArgs> for ConfigSources<'a> {
    fn from(args: &'a BatchArgs) -> Self {
        Self {
            config_path: args.config.as_deref(),
            knowledge_path: args.knowledge.as_deref(),
            ..Self::default()
        }
    }
}

/// Merges CLI flags, `-S` overrides, the config file and built-in defaults, in that order
/// of precedence, into a validated [`AppConfig`].
pub fn build_config(sources: &ConfigSources<'_>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match sources.config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let file_config = apply_set_values(file_config, sources.set_values)?;

    let network = file_config.network.unwrap_or_default();
    let modes = file_config.modes.unwrap_or_default();
    let validation = file_config.validation.unwrap_or_default();
    let allosteric = file_config.allosteric.unwrap_or_default();

    let fluctuation_range = match modes.fluctuation_range.as_deref() {
        Some(text) => parse_mode_range("modes.fluctuation-range", text)?,
        None => defaults.fluctuation_range,
    };

    let top_k = sources
        .top_k
        .or(allosteric.top_k)
        .unwrap_or(defaults.top_k);
    let geometric_filter = if sources.no_geometric_filter {
        false
    } else {
        allosteric
            .geometric_filter
            .unwrap_or(defaults.geometric_filter)
    };

    let core_config = ScanConfig::builder()
        .cutoff(network.cutoff.unwrap_or(defaults.cutoff))
        .spring_constant(network.spring_constant.unwrap_or(defaults.spring_constant))
        .mode_count(modes.mode_count.unwrap_or(defaults.mode_count))
        .include_rigid(modes.include_rigid.unwrap_or(defaults.include_rigid))
        .fluctuation_range(fluctuation_range)
        .high_confidence(
            validation
                .high_confidence
                .unwrap_or(defaults.high_confidence),
        )
        .moderate_confidence(
            validation
                .moderate_confidence
                .unwrap_or(defaults.moderate_confidence),
        )
        .top_k(top_k)
        .flexibility_percentile(
            allosteric
                .flexibility_percentile
                .unwrap_or(defaults.flexibility_percentile),
        )
        .min_active_site_distance(
            allosteric
                .min_active_site_distance
                .unwrap_or(defaults.min_active_site_distance),
        )
        .geometric_filter(geometric_filter)
        .prior_bonus(allosteric.prior_bonus.unwrap_or(defaults.prior_bonus))
        .max_nodes(file_config.max_nodes.unwrap_or(defaults.max_nodes))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let knowledge_path = sources
        .knowledge_path
        .map(Path::to_path_buf)
        .or(file_config.knowledge_path);

    Ok(AppConfig {
        core_config,
        knowledge_path,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_mode_range(key: &str, value: &str) -> Result<ModeRange> {
    ModeRange::from_str(value).map_err(|e| CliError::Config(format!("{}: {}", key, e)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "network.cutoff" => {
                config.network.get_or_insert_with(Default::default).cutoff =
                    Some(parse_value(key, value, "float")?);
            }
            "network.spring-constant" => {
                config
                    .network
                    .get_or_insert_with(Default::default)
                    .spring_constant = Some(parse_value(key, value, "float")?);
            }
            "modes.mode-count" => {
                config.modes.get_or_insert_with(Default::default).mode_count =
                    Some(parse_value(key, value, "integer")?);
            }
            "modes.include-rigid" => {
                config.modes.get_or_insert_with(Default::default).include_rigid =
                    Some(parse_value(key, value, "boolean")?);
            }
            "modes.fluctuation-range" => {
                parse_mode_range(key, value)?;
                config
                    .modes
                    .get_or_insert_with(Default::default)
                    .fluctuation_range = Some(value.to_string());
            }
            "validation.high-confidence" => {
                config
                    .validation
                    .get_or_insert_with(Default::default)
                    .high_confidence = Some(parse_value(key, value, "float")?);
            }
            "validation.moderate-confidence" => {
                config
                    .validation
                    .get_or_insert_with(Default::default)
                    .moderate_confidence = Some(parse_value(key, value, "float")?);
            }
            "allosteric.top-k" => {
                config.allosteric.get_or_insert_with(Default::default).top_k =
                    Some(parse_value(key, value, "integer")?);
            }
            "allosteric.flexibility-percentile" => {
                config
                    .allosteric
                    .get_or_insert_with(Default::default)
                    .flexibility_percentile = Some(parse_value(key, value, "float")?);
            }
            "allosteric.min-active-site-distance" => {
                config
                    .allosteric
                    .get_or_insert_with(Default::default)
                    .min_active_site_distance = Some(parse_value(key, value, "float")?);
            }
            "allosteric.geometric-filter" => {
                config
                    .allosteric
                    .get_or_insert_with(Default::default)
                    .geometric_filter = Some(parse_value(key, value, "boolean")?);
            }
            "allosteric.prior-bonus" => {
                config
                    .allosteric
                    .get_or_insert_with(Default::default)
                    .prior_bonus = Some(parse_value(key, value, "float")?);
            }
            "max-nodes" => {
                config.max_nodes = Some(parse_value(key, value, "integer")?);
            }
            "knowledge-path" => {
                config.knowledge_path = Some(PathBuf::from(value));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, toml: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, toml).unwrap();
        path
    }

    #[test]
    fn no_sources_yields_core_defaults() {
        let app = build_config(&ConfigSources::default()).expect("build ok");
        assert_eq!(app.core_config, ScanConfig::default());
        assert!(app.knowledge_path.is_none());
    }

    #[test]
    fn file_values_are_merged_over_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            knowledge-path = "targets.toml"
            [network]
            cutoff = 12.0
            [modes]
            mode-count = 10
            fluctuation-range = "lowest:3"
            [allosteric]
            top-k = 3
            "#,
        );
        let sources = ConfigSources {
            config_path: Some(path.as_path()),
            ..ConfigSources::default()
        };

        let app = build_config(&sources).expect("build ok");
        let cfg = app.core_config;
        assert_eq!(cfg.network.cutoff, 12.0);
        assert_eq!(
            cfg.network.spring_constant,
            DefaultsConfig::default().spring_constant
        );
        assert_eq!(cfg.modes.mode_count, 10);
        assert_eq!(cfg.modes.fluctuation_range, ModeRange::Lowest(3));
        assert_eq!(cfg.allosteric.top_k, 3);
        assert!(cfg.allosteric.geometric_filter);
        assert_eq!(app.knowledge_path, Some(PathBuf::from("targets.toml")));
    }

    #[test]
    fn precedence_is_cli_then_set_then_file() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [network]
            cutoff = 12.0
            [allosteric]
            top-k = 3
            geometric-filter = true
            "#,
        );
        let set_values = vec![
            "network.cutoff=10.5".to_string(),
            "allosteric.top-k=4".to_string(),
        ];
        let knowledge = PathBuf::from("cli-targets.toml");
        let sources = ConfigSources {
            config_path: Some(path.as_path()),
            set_values: &set_values,
            top_k: Some(7),
            no_geometric_filter: true,
            knowledge_path: Some(knowledge.as_path()),
        };

        let app = build_config(&sources).expect("build ok");
        let cfg = app.core_config;
        assert_eq!(cfg.network.cutoff, 10.5);
        assert_eq!(cfg.allosteric.top_k, 7);
        assert!(!cfg.allosteric.geometric_filter);
        assert_eq!(app.knowledge_path, Some(knowledge));
    }

    #[test]
    fn set_values_cover_every_section() {
        let set_values: Vec<String> = [
            "network.spring-constant=2.5",
            "modes.mode-count=12",
            "modes.include-rigid=true",
            "modes.fluctuation-range=1-4",
            "validation.high-confidence=0.7",
            "validation.moderate-confidence=0.3",
            "allosteric.flexibility-percentile=90",
            "allosteric.min-active-site-distance=10",
            "allosteric.prior-bonus=2.0",
            "max-nodes=800",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let sources = ConfigSources {
            set_values: &set_values,
            ..ConfigSources::default()
        };

        let cfg = build_config(&sources).expect("build ok").core_config;
        assert_eq!(cfg.network.spring_constant, 2.5);
        assert_eq!(cfg.modes.mode_count, 12);
        assert!(cfg.modes.include_rigid);
        assert_eq!(
            cfg.modes.fluctuation_range,
            ModeRange::Span { first: 1, last: 4 }
        );
        assert_eq!(cfg.validation.high, 0.7);
        assert_eq!(cfg.validation.moderate, 0.3);
        assert_eq!(cfg.allosteric.flexibility_percentile, 90.0);
        assert_eq!(cfg.allosteric.min_active_site_distance, 10.0);
        assert_eq!(cfg.allosteric.prior_bonus, 2.0);
        assert_eq!(cfg.max_nodes, 800);
    }

    #[test]
    fn malformed_overrides_are_configuration_errors() {
        for bad in [
            "network.cutoff",
            "network.cutoff=wide",
            "modes.fluctuation-range=some",
            "modes.include-rigid=maybe",
            "optimization.num-solutions=5",
        ] {
            let set_values = vec![bad.to_string()];
            let sources = ConfigSources {
                set_values: &set_values,
                ..ConfigSources::default()
            };
            assert!(
                matches!(build_config(&sources), Err(CliError::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn core_validation_failures_surface_as_configuration_errors() {
        let set_values = vec!["network.cutoff=-1".to_string()];
        let sources = ConfigSources {
            set_values: &set_values,
            ..ConfigSources::default()
        };
        let err = build_config(&sources).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("cutoff")));
    }
}
