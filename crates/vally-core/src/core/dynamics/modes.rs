use super::hessian::Hessian;
use nalgebra::{DVector, SymmetricEigen};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of vibrational (non-rigid) modes retained per analysis.
pub const DEFAULT_MODE_COUNT: usize = 20;
/// Three translations plus three rotations of a free three-dimensional body.
pub const RIGID_BODY_MODE_COUNT: usize = 6;
/// Eigenvalues with magnitude at or below this fraction of the spectral norm count as zero.
pub const ZERO_EIGENVALUE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModeError {
    #[error("Hessian contains non-finite entries; cannot eigendecompose")]
    NonFiniteHessian,

    #[error("Eigendecomposition produced a non-finite eigenvalue at position {index}")]
    NonFiniteEigenvalue { index: usize },

    #[error("At least one mode must be requested")]
    NoModesRequested,
}

/// Non-fatal conditions detected while extracting modes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NetworkWarning {
    /// The number of near-zero eigenvalues differs from the six rigid-body modes expected
    /// of a connected three-dimensional network (disconnected or under-constrained network).
    DegenerateNetwork { zero_modes: usize, expected: usize },
    /// Fewer vibrational modes exist than were requested.
    TruncatedModes { requested: usize, available: usize },
}

impl fmt::Display for NetworkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkWarning::DegenerateNetwork {
                zero_modes,
                expected,
            } => write!(
                f,
                "Degenerate network: {} near-zero modes found (expected {}); the network may be disconnected",
                zero_modes, expected
            ),
            NetworkWarning::TruncatedModes {
                requested,
                available,
            } => write!(
                f,
                "Only {} vibrational modes available ({} requested)",
                available, requested
            ),
        }
    }
}

/// One eigenpair of the Hessian.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    /// Position of this mode in the full ascending spectrum.
    pub index: usize,
    pub eigenvalue: f64,
    /// Unit eigenvector of length 3N, laid out as consecutive per-node (x, y, z) triplets.
    pub vector: DVector<f64>,
    /// Whether the eigenvalue is numerically zero (rigid-body or disconnected motion).
    pub rigid: bool,
}

impl Mode {
    pub fn node_amplitude_sq(&self, node: usize) -> f64 {
        self.vector.fixed_rows::<3>(3 * node).norm_squared()
    }
}

/// Ascending-ordered modes extracted from one Hessian.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSet {
    modes: Vec<Mode>,
    node_count: usize,
    zero_mode_count: usize,
    zero_threshold: f64,
    warnings: Vec<NetworkWarning>,
}

impl ModeSet {
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of near-zero eigenvalues in the full spectrum (retained or not).
    pub fn zero_mode_count(&self) -> usize {
        self.zero_mode_count
    }

    /// Eigenvalue magnitude at or below which a mode counts as rigid.
    pub fn zero_threshold(&self) -> f64 {
        self.zero_threshold
    }

    pub fn vibrational(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter().filter(|m| !m.rigid)
    }

    pub fn vibrational_count(&self) -> usize {
        self.vibrational().count()
    }

    pub fn eigenvalues(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.eigenvalue).collect()
    }

    pub fn warnings(&self) -> &[NetworkWarning] {
        &self.warnings
    }
}

/// Eigendecomposes Hessians and separates rigid-body modes from vibrational ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSolver {
    mode_count: usize,
    include_rigid: bool,
}

impl Default for ModeSolver {
    fn default() -> Self {
        Self {
            mode_count: DEFAULT_MODE_COUNT,
            include_rigid: false,
        }
    }
}

impl ModeSolver {
    /// # Arguments
    ///
    /// * `mode_count` - Number of vibrational modes to retain.
    /// * `include_rigid` - Also keep the near-zero modes (flagged as rigid) in the output.
    pub fn new(mode_count: usize, include_rigid: bool) -> Self {
        Self {
            mode_count,
            include_rigid,
        }
    }

    pub fn mode_count(&self) -> usize {
        self.mode_count
    }

    /// Computes the ascending spectrum of `hessian` and retains the requested modes.
    ///
    /// Every eigenvalue within `ZERO_EIGENVALUE_TOLERANCE × ‖H‖₂` of zero is classified as
    /// rigid, however many there are, so a disconnected network never has a zero mode
    /// mistaken for a vibration. A zero-mode count other than six is reported as a
    /// [`NetworkWarning::DegenerateNetwork`] on the returned set.
    ///
    /// Eigenvector signs are normalized so the largest-magnitude component is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::NonFiniteHessian`] or [`ModeError::NonFiniteEigenvalue`] on
    /// numerical failure, and [`ModeError::NoModesRequested`] for a zero mode count.
    pub fn solve(&self, hessian: &Hessian) -> Result<ModeSet, ModeError> {
        if self.mode_count == 0 {
            return Err(ModeError::NoModesRequested);
        }
        if !hessian.is_finite() {
            return Err(ModeError::NonFiniteHessian);
        }

        let eigen = SymmetricEigen::new(hessian.matrix().clone());
        if let Some(index) = eigen.eigenvalues.iter().position(|v| !v.is_finite()) {
            return Err(ModeError::NonFiniteEigenvalue { index });
        }

        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .total_cmp(&eigen.eigenvalues[b])
                .then(a.cmp(&b))
        });

        let spectral_norm = eigen
            .eigenvalues
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let zero_threshold = ZERO_EIGENVALUE_TOLERANCE * spectral_norm;

        let spectrum: Vec<Mode> = order
            .iter()
            .enumerate()
            .map(|(rank, &column)| {
                let eigenvalue = eigen.eigenvalues[column];
                Mode {
                    index: rank,
                    eigenvalue,
                    vector: normalize_sign(eigen.eigenvectors.column(column).into_owned()),
                    rigid: eigenvalue.abs() <= zero_threshold,
                }
            })
            .collect();

        let zero_mode_count = spectrum.iter().filter(|m| m.rigid).count();
        let available = spectrum.len() - zero_mode_count;

        let mut warnings = Vec::new();
        if zero_mode_count != RIGID_BODY_MODE_COUNT {
            let warning = NetworkWarning::DegenerateNetwork {
                zero_modes: zero_mode_count,
                expected: RIGID_BODY_MODE_COUNT,
            };
            warn!(edges = hessian.edge_count(), "{}", warning);
            warnings.push(warning);
        }
        if available < self.mode_count {
            let warning = NetworkWarning::TruncatedModes {
                requested: self.mode_count,
                available,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let mut vibrational_kept = 0;
        let modes: Vec<Mode> = spectrum
            .into_iter()
            .filter(|m| {
                if m.rigid {
                    self.include_rigid
                } else if vibrational_kept < self.mode_count {
                    vibrational_kept += 1;
                    true
                } else {
                    false
                }
            })
            .collect();

        debug!(
            zero_modes = zero_mode_count,
            retained = modes.len(),
            threshold = zero_threshold,
            "Mode extraction complete."
        );

        Ok(ModeSet {
            modes,
            node_count: hessian.node_count(),
            zero_mode_count,
            zero_threshold,
            warnings,
        })
    }
}

fn normalize_sign(mut vector: DVector<f64>) -> DVector<f64> {
    let dominant = vector
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if dominant < 0.0 {
        vector.neg_mut();
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dynamics::hessian::NetworkBuilder;
    use nalgebra::Point3;

    fn compact_cluster() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.8, 0.0, 0.0),
            Point3::new(5.1, 3.4, 0.2),
            Point3::new(2.9, 6.1, 1.7),
            Point3::new(-0.6, 5.0, 3.9),
            Point3::new(1.2, 2.2, -3.1),
            Point3::new(4.4, 1.0, 4.0),
        ]
    }

    #[test]
    fn connected_network_has_exactly_six_zero_modes() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(5, true).solve(&hessian).unwrap();

        assert_eq!(modes.zero_mode_count(), RIGID_BODY_MODE_COUNT);
        assert!(modes.warnings().is_empty());
        assert_eq!(modes.len(), 6 + 5);
        assert!(modes.modes()[..6].iter().all(|m| m.rigid));
        assert!(modes.modes()[6..].iter().all(|m| !m.rigid && m.eigenvalue > 0.0));
    }

    #[test]
    fn zero_threshold_scales_with_the_stiffest_mode() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(15, true).solve(&hessian).unwrap();

        let stiffest = modes
            .eigenvalues()
            .into_iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert_eq!(modes.len(), 21);
        assert!((modes.zero_threshold() - ZERO_EIGENVALUE_TOLERANCE * stiffest).abs() < 1e-15);
        assert!(modes.vibrational().all(|m| m.eigenvalue > modes.zero_threshold()));
    }

    #[test]
    fn rigid_modes_are_excluded_by_default() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(4, false).solve(&hessian).unwrap();

        assert_eq!(modes.len(), 4);
        assert_eq!(modes.vibrational_count(), 4);
        assert_eq!(modes.modes()[0].index, 6);
    }

    #[test]
    fn eigenvalues_are_ascending() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(50, true).solve(&hessian).unwrap();
        let values = modes.eigenvalues();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values.len(), hessian.dimension());
    }

    #[test]
    fn eigenvectors_are_orthonormal() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(6, false).solve(&hessian).unwrap();
        for a in modes.modes() {
            for b in modes.modes() {
                let dot = a.vector.dot(&b.vector);
                let expected = if a.index == b.index { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn eigenvector_signs_are_deterministic() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        let modes = ModeSolver::new(8, false).solve(&hessian).unwrap();
        for mode in modes.modes() {
            let dominant = mode
                .vector
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap();
            assert!(dominant > 0.0);
        }
    }

    #[test]
    fn collinear_chain_reports_degenerate_null_space() {
        let chain = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(8.0, 0.0, 0.0),
        ];
        let hessian = NetworkBuilder::new(5.0, 1.0).unwrap().build(&chain).unwrap();
        let modes = ModeSolver::default().solve(&hessian).unwrap();

        // Only axial springs: x-translation plus all y/z motion is free.
        assert_eq!(modes.zero_mode_count(), 7);
        assert_eq!(modes.vibrational_count(), 2);
        assert!((modes.modes()[0].eigenvalue - 1.0).abs() < 1e-9);
        assert!((modes.modes()[1].eigenvalue - 3.0).abs() < 1e-9);
        assert!(modes.warnings().contains(&NetworkWarning::DegenerateNetwork {
            zero_modes: 7,
            expected: 6
        }));
        assert!(modes.warnings().contains(&NetworkWarning::TruncatedModes {
            requested: DEFAULT_MODE_COUNT,
            available: 2
        }));
    }

    #[test]
    fn edgeless_network_yields_only_zero_modes() {
        let far_apart = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)];
        let hessian = NetworkBuilder::default().build(&far_apart).unwrap();
        let modes = ModeSolver::default().solve(&hessian).unwrap();

        assert_eq!(modes.zero_mode_count(), 6);
        assert_eq!(modes.vibrational_count(), 0);
        assert!(modes.is_empty());
        assert!(modes.warnings().iter().any(|w| matches!(
            w,
            NetworkWarning::TruncatedModes { available: 0, .. }
        )));
    }

    #[test]
    fn zero_requested_modes_is_an_error() {
        let hessian = NetworkBuilder::default().build(&compact_cluster()).unwrap();
        assert_eq!(
            ModeSolver::new(0, false).solve(&hessian),
            Err(ModeError::NoModesRequested)
        );
    }

    #[test]
    fn warning_messages_are_descriptive() {
        let warning = NetworkWarning::DegenerateNetwork {
            zero_modes: 9,
            expected: 6,
        };
        assert!(warning.to_string().contains("9 near-zero modes"));
    }
}
