//! Elastic network dynamics.
//!
//! Implements the three numerical stages of the Anisotropic Network Model:
//!
//! - [`hessian`] - `NetworkBuilder` assembles the 3N×3N spring Hessian from node coordinates
//! - [`modes`] - `ModeSolver` eigendecomposes the Hessian and separates rigid-body modes
//! - [`fluctuation`] - `FluctuationEngine` sums inverse-eigenvalue weighted mode amplitudes
//!   into per-node mean-square fluctuations
//!
//! Each stage consumes the immutable output of the previous one.

pub mod fluctuation;
pub mod hessian;
pub mod modes;
