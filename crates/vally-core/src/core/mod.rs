//! # Core Module
//!
//! Fundamental building blocks of VALLY-Scan: structure representation, file I/O,
//! and the elastic-network numerics.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Atoms, per-residue network nodes, and the
//!   immutable `StructureModel` that owns them
//! - **File I/O** ([`io`]) - PDB parsing and the append-only CSV audit log
//! - **Elastic Network Dynamics** ([`dynamics`]) - Hessian construction, normal-mode
//!   extraction, and mean-square fluctuation profiles
//! - **Prior Knowledge** ([`knowledge`]) - Literature-curated key residues and active sites
//!   for known targets
//! - **Utilities** ([`utils`]) - Geometry, statistics, and residue identifiers
//!
//! ## Scientific Foundation
//!
//! - **Anisotropic Network Model** (Atilgan et al., 2001): residues as point masses joined
//!   by uniform springs within a cutoff distance
//! - **Normal mode analysis**: low-frequency modes dominate large-amplitude, functionally
//!   relevant motion
//! - **B-factor validation**: predicted fluctuations should correlate with crystallographic
//!   temperature factors

pub mod dynamics;
pub mod io;
pub mod knowledge;
pub mod models;
pub mod utils;
