//! Structure file reading and run auditing.
//!
//! [`traits::StructureFile`] is the common reading interface; [`pdb::PdbFile`] implements
//! it for fixed-column PDB coordinate files. [`audit::AuditLog`] appends one CSV row per
//! completed scan.

pub mod audit;
pub mod pdb;
pub mod traits;
