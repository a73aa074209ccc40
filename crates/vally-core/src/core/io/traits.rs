use crate::core::models::structure::StructureModel;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structure file formats into a [`StructureModel`].
///
/// Implementors handle format-specific parsing and hand the atoms to a
/// `StructureModelBuilder`, which performs node selection.
pub trait StructureFile {
    /// Format-specific information that does not belong in the model.
    type Metadata;

    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `structure_id` - Identifier assigned to the resulting model.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, the atoms do not yield a valid model, or
    /// the reader fails.
    fn read_from(
        reader: &mut impl BufRead,
        structure_id: &str,
    ) -> Result<(StructureModel, Self::Metadata), Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        structure_id: &str,
    ) -> Result<(StructureModel, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, structure_id)
    }
}

/// Derives a structure identifier from a file name (`data/2FOM.pdb` → `2FOM`).
pub fn structure_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
