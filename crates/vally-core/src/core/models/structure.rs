use super::atom::{Atom, RecordKind};
use super::node::Node;
use crate::core::utils::identifiers::is_standard_amino_acid;
use nalgebra::Point3;
use std::collections::HashSet;
use thiserror::Error;

const ALPHA_CARBON_ATOM_NAME: &str = "CA";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("No residue nodes (protein alpha carbons) found in structure '{structure_id}'")]
    NoNodes { structure_id: String },

    #[error(
        "Non-finite coordinate for atom '{atom_name}' of residue {residue_number} in structure '{structure_id}'"
    )]
    NonFiniteCoordinate {
        structure_id: String,
        atom_name: String,
        residue_number: isize,
    },

    #[error("Structure '{structure_id}' has {count} nodes, exceeding the configured limit of {max}")]
    TooManyNodes {
        structure_id: String,
        count: usize,
        max: usize,
    },
}

/// An immutable, in-memory view of one macromolecular structure.
///
/// Owns every atom read from the source and the ordered sequence of elastic-network
/// nodes derived from them. The node order is the residue order of the source file,
/// and the node count N fixes every downstream dimension (3N Hessian rows, N fluctuation
/// values).
#[derive(Debug, Clone)]
pub struct StructureModel {
    id: String,
    atoms: Vec<Atom>,
    nodes: Vec<Node>,
}

impl StructureModel {
    /// Builds a model directly from pre-selected nodes, bypassing atom-level selection.
    ///
    /// Node indices are reassigned to match their position in `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NoNodes`] if `nodes` is empty, or
    /// [`InputError::NonFiniteCoordinate`] if any coordinate is NaN or infinite.
    pub fn from_nodes(id: &str, nodes: Vec<Node>) -> Result<Self, InputError> {
        let nodes: Vec<Node> = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Node { index, ..node })
            .collect();
        for node in &nodes {
            check_finite(id, ALPHA_CARBON_ATOM_NAME, node.residue_number, &node.position)?;
        }
        if nodes.is_empty() {
            return Err(InputError::NoNodes {
                structure_id: id.to_string(),
            });
        }
        Ok(Self {
            id: id.to_string(),
            atoms: Vec::new(),
            nodes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn coordinates(&self) -> Vec<Point3<f64>> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Per-node experimental flexibility values, in node order.
    pub fn b_factors(&self) -> Vec<Option<f64>> {
        self.nodes.iter().map(|n| n.b_factor).collect()
    }
}

/// Incrementally assembles a [`StructureModel`] from atoms as a reader encounters them.
pub struct StructureModelBuilder {
    id: String,
    atoms: Vec<Atom>,
}

impl StructureModelBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn add_atom(&mut self, atom: Atom) -> &mut Self {
        self.atoms.push(atom);
        self
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Finalizes the model, selecting one alpha-carbon node per protein residue.
    ///
    /// The selection keeps `ATOM` records of standard amino acids named `CA`, primary
    /// conformer only, and the first occurrence of each (chain, residue number,
    /// insertion code) triple.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonFiniteCoordinate`] for any non-finite atom coordinate and
    /// [`InputError::NoNodes`] when no alpha carbon qualifies.
    pub fn build(self) -> Result<StructureModel, InputError> {
        for atom in &self.atoms {
            check_finite(&self.id, &atom.name, atom.residue_number, &atom.position)?;
        }

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for atom in &self.atoms {
            if atom.kind != RecordKind::Atom
                || atom.name != ALPHA_CARBON_ATOM_NAME
                || !atom.is_primary_conformer()
                || !is_standard_amino_acid(&atom.residue_name)
            {
                continue;
            }
            if !seen.insert((atom.chain_id, atom.residue_number, atom.insertion_code)) {
                continue;
            }
            nodes.push(Node {
                index: nodes.len(),
                chain_id: atom.chain_id,
                residue_number: atom.residue_number,
                residue_name: atom.residue_name.clone(),
                position: atom.position,
                b_factor: atom.b_factor,
            });
        }

        if nodes.is_empty() {
            return Err(InputError::NoNodes {
                structure_id: self.id,
            });
        }

        Ok(StructureModel {
            id: self.id,
            atoms: self.atoms,
            nodes,
        })
    }
}

fn check_finite(
    structure_id: &str,
    atom_name: &str,
    residue_number: isize,
    position: &Point3<f64>,
) -> Result<(), InputError> {
    if position.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(InputError::NonFiniteCoordinate {
            structure_id: structure_id.to_string(),
            atom_name: atom_name.to_string(),
            residue_number,
        })
    }
}
