//! # VALLY-Scan Core Library
//!
//! Vibrational analysis of protein structures with an Anisotropic Network Model (ANM),
//! validated against crystallographic B-factors and folded into a heuristic ranking of
//! putative allosteric residues.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`StructureModel`, `Node`),
//!   structure I/O, and the pure numerical kernels of the elastic network
//!   (`hessian`, `modes`, `fluctuation`).
//!
//! - **[`engine`]: The Logic Core.** Configuration, error taxonomy, progress reporting,
//!   experimental validation, and the allosteric heuristic that turns a fluctuation
//!   profile into ranked candidates.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that tie `core` and `engine`
//!   together: scanning a single structure or a batch of independent structures.

pub mod core;
pub mod engine;
pub mod workflows;
