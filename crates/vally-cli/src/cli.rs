use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Lionell Eduardo Nava Ramos",
    version,
    about = "VALLY-Scan CLI - Elastic-network vibrational analysis of protein structures, validated against B-factors, with a heuristic ranking of putative allosteric residues.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a single protein structure: normal modes, B-factor validation and allosteric ranking.
    Scan(ScanArgs),
    /// Scan every PDB file in a directory independently.
    Batch(BatchArgs),
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    // --- Core Arguments ---
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Structure identifier used for knowledge lookup and reporting.
    /// Defaults to the input file name without its extension.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    // --- Target Overrides ---
    /// Literature-reported functional residue numbers, replacing the knowledge entry.
    #[arg(long, value_name = "N,..", value_delimiter = ',', allow_negative_numbers = true)]
    pub prior: Option<Vec<isize>>,

    /// Active-site residue numbers, replacing the knowledge entry.
    #[arg(long, value_name = "N,..", value_delimiter = ',', allow_negative_numbers = true)]
    pub active_site: Option<Vec<isize>>,

    /// Path to a TOML file with additional target annotations.
    #[arg(long, value_name = "PATH")]
    pub knowledge: Option<PathBuf>,

    // --- Ranking Overrides ---
    /// Override the number of allosteric candidates to report.
    #[arg(short = 'k', long, value_name = "INT")]
    pub top_k: Option<usize>,

    /// Disable the flexibility/distance filter, overriding the config file.
    #[arg(long)]
    pub no_geometric_filter: bool,

    // --- Outputs ---
    /// Write the full report as JSON to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Append a summary line to this CSV audit log.
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S modes.mode-count=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory containing the PDB files to scan.
    #[arg(short = 'd', long = "dir", required = true, value_name = "DIR")]
    pub directory: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving one JSON report per successfully scanned structure.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Append one summary line per successful scan to this CSV audit log.
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Path to a TOML file with additional target annotations.
    #[arg(long, value_name = "PATH")]
    pub knowledge: Option<PathBuf>,
}
