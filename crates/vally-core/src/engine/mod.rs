//! # Engine Module
//!
//! Turns the numerical output of the elastic network into scientific judgements about a
//! structure: how well the model agrees with experiment, and which residues are the most
//! promising allosteric candidates.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - `ScanConfig` and its validating builder
//! - **Validation** ([`validation`]) - Pearson correlation against B-factors and the
//!   confidence classification
//! - **Allosteric Ranking** ([`allosteric`]) - prior-knowledge bonus, active-site
//!   exclusion, and deterministic top-K selection
//! - **Affinity Placeholder** ([`affinity`]) - the swappable `AffinityModel` heuristic
//! - **Reports** ([`report`]) - the serializable result of one scan
//! - **Progress Monitoring** ([`progress`]) - phase callbacks for front ends
//! - **Error Handling** ([`error`]) - `ScanError`, aggregating every fatal failure

pub mod affinity;
pub mod allosteric;
pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod validation;
