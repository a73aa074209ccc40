use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use vallyscan::engine::progress::{Progress, ProgressCallback};
use vallyscan::workflows::scan::SCAN_PHASES;

const SPINNER_TICK_MS: u64 = 80;

/// Shows scan progress on stderr.
///
/// A single scan appears as a spinner stepping through the numbered pipeline phases
/// (`[2/4] Computing Fluctuations`). A batch appears as a bar counting finished structures.
/// `ProgressBar` is internally shared, so clones and callbacks update the same line
/// from any rayon worker.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Tracks state without drawing (`--quiet`).
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target).with_style(phase_style());
        Self { bar }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |event| apply(&bar, event))
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            bar.set_style(phase_style());
            bar.set_prefix(phase_prefix(name));
            bar.set_message(name);
            bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        }
        Progress::PhaseFinish => {
            // The ranking phase closes the scan; earlier phases hand over to the next one.
            if bar.message() == SCAN_PHASES[SCAN_PHASES.len() - 1] {
                bar.disable_steady_tick();
                bar.finish_with_message("Scan complete");
            }
        }
        Progress::TaskStart { total_steps } => {
            bar.disable_steady_tick();
            bar.reset();
            bar.set_style(structure_style());
            bar.set_length(total_steps);
            bar.set_prefix("");
            bar.set_message("structures scanned");
        }
        Progress::TaskIncrement => bar.inc(1),
        Progress::TaskFinish => {
            let scanned = bar.position();
            bar.finish_with_message(format!("{} structure(s) scanned", scanned));
        }
        Progress::Message(msg) => bar.println(format!("  {}", msg)),
    }
}

/// `[n/4]` for known scan phases, empty otherwise.
fn phase_prefix(name: &str) -> String {
    SCAN_PHASES
        .iter()
        .position(|phase| *phase == name)
        .map(|i| format!("[{}/{}]", i + 1, SCAN_PHASES.len()))
        .unwrap_or_default()
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn structure_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
