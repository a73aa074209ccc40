use thiserror::Error;

use super::allosteric::HeuristicError;
use super::config::ConfigError;
use crate::core::dynamics::fluctuation::FluctuationError;
use crate::core::dynamics::hessian::NetworkError;
use crate::core::dynamics::modes::ModeError;
use crate::core::io::pdb::PdbError;
use crate::core::models::structure::InputError;

/// Failures that abort the analysis of one structure.
///
/// Validation failures are deliberately absent: they are recorded on the report instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load structure: {source}")]
    Load {
        #[from]
        source: PdbError,
    },

    #[error("Invalid input: {source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("Elastic network construction failed: {source}")]
    Network {
        #[from]
        source: NetworkError,
    },

    #[error("Numerical failure in mode extraction: {source}")]
    Numerical {
        #[from]
        source: ModeError,
    },

    #[error(
        "Elastic network is disconnected or degenerate: all {zero_modes} modes of {node_count} nodes are zero modes"
    )]
    DegenerateNetwork { zero_modes: usize, node_count: usize },

    #[error("Fluctuation calculation failed: {source}")]
    Fluctuation {
        #[from]
        source: FluctuationError,
    },

    #[error("Allosteric ranking failed: {source}")]
    Heuristic {
        #[from]
        source: HeuristicError,
    },
}
