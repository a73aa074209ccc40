use phf::{Set, phf_set};

static STANDARD_AMINO_ACIDS: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    // Protonation and disulfide variants written by common preparation tools.
    "HSD", "HSE", "HSP", "HID", "HIE", "HIP", "CYX", "CYM", "ASH", "GLH", "LYN",
    // Frequently modelled non-canonical residues.
    "MSE", "SEC", "PYL",
};

/// Returns `true` if `residue_name` names an amino acid that belongs to a protein chain.
pub fn is_standard_amino_acid(residue_name: &str) -> bool {
    let name = residue_name.trim();
    STANDARD_AMINO_ACIDS.contains(name) || STANDARD_AMINO_ACIDS.contains(name.to_ascii_uppercase().as_str())
}
