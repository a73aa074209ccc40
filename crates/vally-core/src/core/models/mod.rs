//! # Core Models Module
//!
//! Data structures representing a macromolecular structure as read from disk and as
//! seen by the elastic network.
//!
//! ## Key Components
//!
//! - [`atom`] - Immutable atom records with coordinates and experimental B-factors
//! - [`node`] - One network node per residue, anchored on its alpha carbon
//! - [`structure`] - The `StructureModel` that owns atoms and nodes, and its builder
//!
//! ## Usage
//!
//! ```ignore
//! use vallyscan::core::models::structure::StructureModelBuilder;
//!
//! let mut builder = StructureModelBuilder::new("1abc");
//! builder.add_atom(atom);
//! let structure = builder.build()?;
//! assert!(structure.node_count() > 0);
//! ```

pub mod atom;
pub mod node;
pub mod structure;
