use nalgebra::Point3;

/// A single point of the elastic network: one residue, anchored on its alpha carbon.
///
/// Nodes are ordered by residue sequence order within their `StructureModel`; `index`
/// is the position in that order and addresses the node's 3-row block in the Hessian.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub index: usize,
    pub chain_id: char,
    pub residue_number: isize,
    pub residue_name: String,
    pub position: Point3<f64>,
    /// Experimental flexibility (B-factor) of the anchoring atom, when the source has one.
    pub b_factor: Option<f64>,
}
