use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    Layer, Registry,
    filter::{LevelFilter, Targets},
    fmt::{self, MakeWriter},
    prelude::*,
};

/// Targets emitted by this workspace: the scan library and the `vally` binary.
const WORKSPACE_TARGETS: [&str; 2] = ["vallyscan", "vally"];

/// The log file always keeps at least this much detail from the scan pipeline, so mode
/// counts and zero thresholds are on record even for a quiet run.
const FILE_FLOOR: LevelFilter = LevelFilter::DEBUG;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Console level chosen by `-v`/`-q`.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Workspace events pass at `level`; third-party crates never go below WARN.
fn workspace_targets(level: LevelFilter) -> Targets {
    WORKSPACE_TARGETS
        .iter()
        .fold(Targets::new().with_default(level.min(LevelFilter::WARN)), |targets, name| {
            targets.with_target(*name, level)
        })
}

fn console_layer(level: LevelFilter) -> BoxedLayer {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(workspace_targets(level))
        .boxed()
}

fn file_layer<W>(writer: W, console: LevelFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // Batch scans run on rayon workers; thread ids tell interleaved structures apart.
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(workspace_targets(console.max(FILE_FLOOR)))
        .boxed()
}

/// Installs the global subscriber: a compact stderr layer plus, with `--log-file`, a
/// plain-text file layer that records the scan pipeline at debug level or finer.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let console = console_level(verbosity, quiet);
    let mut layers = vec![console_layer(console)];
    if let Some(path) = log_file {
        layers.push(file_layer(File::create(path)?, console));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{Level, debug, warn};

    #[test]
    fn flags_select_console_level() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(5, false), LevelFilter::TRACE);
        assert_eq!(console_level(0, true), LevelFilter::ERROR);
    }

    #[test]
    fn dependencies_are_capped_at_warn() {
        let targets = workspace_targets(LevelFilter::TRACE);
        assert!(targets.would_enable("vallyscan::workflows::batch", &Level::TRACE));
        assert!(targets.would_enable("vally::commands::scan", &Level::DEBUG));
        assert!(targets.would_enable("rayon_core::registry", &Level::WARN));
        assert!(!targets.would_enable("rayon_core::registry", &Level::INFO));

        let quiet = workspace_targets(LevelFilter::ERROR);
        assert!(!quiet.would_enable("vallyscan::engine::allosteric", &Level::WARN));
        assert!(!quiet.would_enable("rayon_core::registry", &Level::WARN));
    }

    #[test]
    fn log_file_keeps_pipeline_detail_under_quiet_console() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.log");
        let subscriber =
            tracing_subscriber::registry().with(file_layer(File::create(&path).unwrap(), LevelFilter::ERROR));

        tracing::subscriber::with_default(subscriber, || {
            debug!(
                target: "vallyscan::workflows::scan",
                zero_modes = 6,
                vibrational = 20,
                "Normal modes solved."
            );
            warn!(target: "vally::commands::batch", structure = "6lu7", "Failed to write report.");
            debug!(target: "rayon_core::registry", "worker parked");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Normal modes solved."));
        assert!(content.contains("zero_modes=6"));
        assert!(content.contains("structure=\"6lu7\""));
        assert!(content.contains("vallyscan::workflows::scan"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("worker parked"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(dir.path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    #[serial]
    fn second_installation_is_rejected() {
        let first = setup_logging(1, false, None);
        let second = setup_logging(1, false, None);
        assert!(first.is_ok());
        assert!(matches!(second, Err(CliError::Other(_))));
    }
}
