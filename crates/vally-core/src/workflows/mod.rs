//! # Workflows Module
//!
//! Top-level entry points of VALLY-Scan. Each workflow runs the complete pipeline
//! (elastic network, normal modes, fluctuations, validation, allosteric ranking) and
//! returns serializable reports, reporting progress through a `ProgressReporter`.
//!
//! - **Scan Workflow** ([`scan`]) - one structure in, one `ScanReport` out
//! - **Batch Workflow** ([`batch`]) - many structure files scanned independently, with
//!   per-item failure isolation and an optional shared audit log

pub mod batch;
pub mod scan;
