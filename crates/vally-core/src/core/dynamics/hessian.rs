use crate::core::utils::geometry::pairs_within_cutoff;
use nalgebra::{DMatrix, Matrix3, Point3, Vector3};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Default interaction cutoff in Angstroms (the conventional ANM value).
pub const DEFAULT_CUTOFF: f64 = 15.0;
/// Default uniform spring constant (normalized units).
pub const DEFAULT_SPRING_CONSTANT: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("An elastic network needs at least 2 nodes (found {found})")]
    InsufficientNodes { found: usize },

    #[error("Invalid network parameter '{name}': {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// The 3N×3N second-derivative matrix of an elastic network.
///
/// Built once by [`NetworkBuilder`] and never patched afterwards. Block `(i, j)` is the
/// 3×3 coupling between nodes `i` and `j`; every diagonal block is the negative sum of
/// the off-diagonal blocks in its block row.
#[derive(Debug, Clone, PartialEq)]
pub struct Hessian {
    matrix: DMatrix<f64>,
    node_count: usize,
    edge_count: usize,
    cutoff: f64,
    spring_constant: f64,
}

impl Hessian {
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn dimension(&self) -> usize {
        3 * self.node_count
    }

    /// Number of springs (node pairs within the cutoff).
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn spring_constant(&self) -> f64 {
        self.spring_constant
    }

    /// Returns a copy of the 3×3 block coupling nodes `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn block(&self, i: usize, j: usize) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(3 * i, 3 * j).into_owned()
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

/// Builds ANM Hessians with a fixed cutoff and spring constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkBuilder {
    cutoff: f64,
    spring_constant: f64,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            spring_constant: DEFAULT_SPRING_CONSTANT,
        }
    }
}

impl NetworkBuilder {
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidParameter`] if either value is non-finite or not positive.
    pub fn new(cutoff: f64, spring_constant: f64) -> Result<Self, NetworkError> {
        validate_parameter("cutoff", cutoff)?;
        validate_parameter("spring_constant", spring_constant)?;
        Ok(Self {
            cutoff,
            spring_constant,
        })
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn spring_constant(&self) -> f64 {
        self.spring_constant
    }

    /// Assembles the Hessian for the given node coordinates.
    ///
    /// Every unordered pair within the cutoff adds `γ·u·uᵀ` (with `u` the unit vector
    /// between the nodes) to both diagonal blocks and subtracts it from both off-diagonal
    /// blocks. A network without edges yields a well-formed all-zero matrix.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InsufficientNodes`] for fewer than two coordinates.
    pub fn build(&self, positions: &[Point3<f64>]) -> Result<Hessian, NetworkError> {
        let n = positions.len();
        if n < 2 {
            return Err(NetworkError::InsufficientNodes { found: n });
        }

        // Collection preserves pair order, keeping accumulation deterministic.
        #[cfg(not(feature = "parallel"))]
        let edges: Vec<(usize, usize, Vector3<f64>)> = (0..n)
            .flat_map(|i| pairs_within_cutoff(positions, i, self.cutoff))
            .collect();

        #[cfg(feature = "parallel")]
        let edges: Vec<(usize, usize, Vector3<f64>)> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| pairs_within_cutoff(positions, i, self.cutoff))
            .collect();

        let mut matrix = DMatrix::<f64>::zeros(3 * n, 3 * n);
        for (i, j, separation) in &edges {
            let unit = separation / separation.norm();
            let block = unit * unit.transpose() * self.spring_constant;

            let (i3, j3) = (3 * i, 3 * j);
            let mut off_ij = matrix.fixed_view_mut::<3, 3>(i3, j3);
            off_ij -= block;
            let mut off_ji = matrix.fixed_view_mut::<3, 3>(j3, i3);
            off_ji -= block;
            let mut diag_i = matrix.fixed_view_mut::<3, 3>(i3, i3);
            diag_i += block;
            let mut diag_j = matrix.fixed_view_mut::<3, 3>(j3, j3);
            diag_j += block;
        }

        debug!(
            nodes = n,
            edges = edges.len(),
            cutoff = self.cutoff,
            "Assembled elastic network Hessian."
        );

        Ok(Hessian {
            matrix,
            node_count: n,
            edge_count: edges.len(),
            cutoff: self.cutoff,
            spring_constant: self.spring_constant,
        })
    }
}

fn validate_parameter(name: &'static str, value: f64) -> Result<(), NetworkError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn scattered_nodes() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.8, 0.0, 0.0),
            Point3::new(5.1, 3.4, 0.2),
            Point3::new(2.9, 6.1, 1.7),
            Point3::new(-0.6, 5.0, 3.9),
            Point3::new(30.0, 30.0, 30.0),
        ]
    }

    #[test]
    fn fewer_than_two_nodes_is_rejected() {
        let builder = NetworkBuilder::default();
        assert_eq!(
            builder.build(&[]),
            Err(NetworkError::InsufficientNodes { found: 0 })
        );
        assert_eq!(
            builder.build(&[Point3::origin()]),
            Err(NetworkError::InsufficientNodes { found: 1 })
        );
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            NetworkBuilder::new(0.0, 1.0),
            Err(NetworkError::InvalidParameter { name: "cutoff", .. })
        ));
        assert!(matches!(
            NetworkBuilder::new(15.0, f64::NAN),
            Err(NetworkError::InvalidParameter {
                name: "spring_constant",
                ..
            })
        ));
    }

    #[test]
    fn default_builder_uses_conventional_parameters() {
        let builder = NetworkBuilder::default();
        assert_eq!(builder.cutoff(), 15.0);
        assert_eq!(builder.spring_constant(), 1.0);
    }

    #[test]
    fn hessian_is_exactly_symmetric() {
        let hessian = NetworkBuilder::default().build(&scattered_nodes()).unwrap();
        let m = hessian.matrix();
        assert_eq!(m, &m.transpose());
        for i in 0..hessian.node_count() {
            for j in 0..hessian.node_count() {
                assert_eq!(hessian.block(i, j), hessian.block(j, i).transpose());
            }
        }
    }

    #[test]
    fn diagonal_blocks_balance_their_row() {
        let hessian = NetworkBuilder::new(7.0, 2.5)
            .unwrap()
            .build(&scattered_nodes())
            .unwrap();
        let n = hessian.node_count();
        for i in 0..n {
            let off_diagonal_sum = (0..n)
                .filter(|&j| j != i)
                .fold(Matrix3::zeros(), |acc, j| acc + hessian.block(i, j));
            let residual = hessian.block(i, i) + off_diagonal_sum;
            assert!(residual.abs().max() < TOLERANCE, "row {i} residual {residual}");
        }
    }

    #[test]
    fn linear_chain_has_two_edges_with_axial_springs() {
        let chain = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(8.0, 0.0, 0.0),
        ];
        let hessian = NetworkBuilder::new(5.0, 1.0).unwrap().build(&chain).unwrap();

        assert_eq!(hessian.edge_count(), 2);
        assert_eq!(hessian.block(0, 2), Matrix3::zeros());
        assert_eq!(hessian.block(0, 1)[(0, 0)], -1.0);
        assert_eq!(hessian.block(1, 1)[(0, 0)], 2.0);
        assert_eq!(hessian.block(0, 0)[(0, 0)], 1.0);
        assert_eq!(hessian.block(1, 1)[(1, 1)], 0.0);
    }

    #[test]
    fn disconnected_nodes_give_all_zero_hessian() {
        let far_apart = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)];
        let hessian = NetworkBuilder::default().build(&far_apart).unwrap();
        assert_eq!(hessian.edge_count(), 0);
        assert_eq!(hessian.dimension(), 6);
        assert!(hessian.matrix().iter().all(|&v| v == 0.0));
        assert!(hessian.is_finite());
    }

    #[test]
    fn spring_constant_scales_matrix_linearly() {
        let nodes = scattered_nodes();
        let unit = NetworkBuilder::new(10.0, 1.0).unwrap().build(&nodes).unwrap();
        let tripled = NetworkBuilder::new(10.0, 3.0).unwrap().build(&nodes).unwrap();
        let diff = (unit.matrix() * 3.0 - tripled.matrix()).abs().max();
        assert!(diff < TOLERANCE);
    }
}
