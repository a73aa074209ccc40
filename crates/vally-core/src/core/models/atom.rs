use nalgebra::Point3;

/// Distinguishes polymer atoms from hetero groups (ligands, waters, ions).
///
/// Mirrors the two coordinate record types of the PDB format. Only `Atom` records
/// are eligible to become elastic-network nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RecordKind {
    /// Standard polymer atom (`ATOM` record).
    #[default]
    Atom,
    /// Hetero atom (`HETATM` record).
    Hetero,
}

/// Represents one atom of a macromolecular structure as read from a structure file.
///
/// Atoms are produced once by a structure reader and never mutated afterwards. The
/// B-factor is optional because some formats (and some predicted models) do not carry
/// a meaningful experimental flexibility value.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom serial number from the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The alternate location indicator, if any.
    pub alt_loc: Option<char>,
    /// The three-letter name of the parent residue (e.g., "ALA").
    pub residue_name: String,
    /// The single-character chain identifier.
    pub chain_id: char,
    /// The residue sequence number from the source file.
    pub residue_number: isize,
    /// The residue insertion code, if any.
    pub insertion_code: Option<char>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The crystallographic occupancy.
    pub occupancy: f64,
    /// The experimental temperature factor (B-factor) in square Angstroms.
    pub b_factor: Option<f64>,
    /// Whether the atom came from an `ATOM` or `HETATM` record.
    pub kind: RecordKind,
}

impl Atom {
    /// Creates a new `Atom` with default values for the optional fields.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_name` - The three-letter name of the parent residue.
    /// * `residue_number` - The residue sequence number.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_name: &str, residue_number: isize, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            alt_loc: None,
            residue_name: residue_name.to_string(),
            chain_id: 'A',
            residue_number,
            insertion_code: None,
            position,
            occupancy: 1.0,
            b_factor: None,
            kind: RecordKind::default(),
        }
    }

    /// Returns `true` if this atom is the primary conformer (no alternate location, or `A`).
    pub fn is_primary_conformer(&self) -> bool {
        matches!(self.alt_loc, None | Some('A'))
    }
}
