//! # Knowledge Module
//!
//! Literature-curated facts about known targets: functionally important residues that
//! earn a prior-knowledge bonus during ranking, and the catalytic (active-site) residues
//! that the geometric filter keeps candidates away from.
//!
//! ## Key Components
//!
//! - [`registry`] - `KnowledgeBase` with built-in entries, extendable from TOML files
//!
//! ## Usage
//!
//! ```ignore
//! use vallyscan::core::knowledge::registry::KnowledgeBase;
//!
//! let knowledge = KnowledgeBase::load("targets.toml")?;
//! let mpro = knowledge.get("6LU7").unwrap();
//! ```

pub mod registry;
