use super::traits::StructureFile;
use crate::core::models::atom::{Atom, RecordKind};
use crate::core::models::structure::{InputError, StructureModel, StructureModelBuilder};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

/// Coordinates end at column 54; anything shorter cannot be an atom record.
const MIN_ATOM_RECORD_LENGTH: usize = 54;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// The four-character entry code from the `HEADER` record.
    pub id_code: Option<String>,
    pub title: Option<String>,
    /// Number of `MODEL` records seen before reading stopped.
    pub models_seen: usize,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn optional_char(line: &str, column: usize) -> Option<char> {
    line.get(column..column + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<Option<f64>, PdbError> {
    let field = slice_and_trim(line, start, end);
    if field.is_empty() {
        return Ok(None);
    }
    field.parse().map(Some).map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: field.into(),
        },
    })
}

fn parse_required_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<f64, PdbError> {
    parse_float(line, line_num, start, end)?.ok_or_else(|| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::MissingRequiredField {
            columns: format!("{}-{}", start + 1, end),
        },
    })
}

/// Reader for fixed-column PDB coordinate files.
///
/// Only the first model of a multi-model entry (NMR ensembles, trajectories) is read.
pub struct PdbFile;

impl PdbFile {
    fn parse_atom(line: &str, line_num: usize, kind: RecordKind) -> Result<Atom, PdbError> {
        if line.len() < MIN_ATOM_RECORD_LENGTH {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let serial_str = slice_and_trim(line, 6, 11);
        // Serial numbers overflow into hybrid-36 for very large entries; order is kept anyway.
        let serial = match serial_str.parse() {
            Ok(serial) => serial,
            Err(_) => {
                debug!(
                    line = line_num,
                    serial = serial_str,
                    "Unparseable atom serial; recording 0."
                );
                0
            }
        };

        let name = slice_and_trim(line, 12, 16);
        if name.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            });
        }

        let res_num_str = slice_and_trim(line, 22, 26);
        let residue_number: isize = res_num_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_num_str.into(),
            },
        })?;

        let x = parse_required_float(line, line_num, 30, 38)?;
        let y = parse_required_float(line, line_num, 38, 46)?;
        let z = parse_required_float(line, line_num, 46, 54)?;
        let occupancy = parse_float(line, line_num, 54, 60)?.unwrap_or(1.0);
        let b_factor = parse_float(line, line_num, 60, 66)?;

        Ok(Atom {
            serial,
            name: name.to_string(),
            alt_loc: optional_char(line, 16),
            residue_name: slice_and_trim(line, 17, 20).to_string(),
            chain_id: optional_char(line, 21).unwrap_or('A'),
            residue_number,
            insertion_code: optional_char(line, 26),
            position: Point3::new(x, y, z),
            occupancy,
            b_factor,
            kind,
        })
    }
}

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
        structure_id: &str,
    ) -> Result<(StructureModel, Self::Metadata), Self::Error> {
        let mut builder = StructureModelBuilder::new(structure_id);
        let mut metadata = PdbMetadata::default();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" => {
                    builder.add_atom(Self::parse_atom(&line, line_num, RecordKind::Atom)?);
                }
                "HETATM" => {
                    builder.add_atom(Self::parse_atom(&line, line_num, RecordKind::Hetero)?);
                }
                "HEADER" => {
                    let code = slice_and_trim(&line, 62, 66);
                    if !code.is_empty() {
                        metadata.id_code = Some(code.to_string());
                    }
                }
                "TITLE" => {
                    let text = slice_and_trim(&line, 10, 80);
                    metadata.title = Some(match metadata.title.take() {
                        Some(existing) => format!("{} {}", existing, text),
                        None => text.to_string(),
                    });
                }
                "MODEL" => metadata.models_seen += 1,
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if builder.atom_count() == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        debug!(
            structure = structure_id,
            atoms = builder.atom_count(),
            "Parsed PDB coordinates."
        );
        Ok((builder.build()?, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
HEADER    HYDROLASE                               01-JAN-20   6LU7
TITLE     THE CRYSTAL STRUCTURE OF COVID-19 MAIN PROTEASE
ATOM      1  N   SER A   1      -2.000   4.000 -17.000  1.00 40.00           N
ATOM      2  CA  SER A   1      -2.500   5.100 -16.300  1.00 35.50           C
ATOM      3  CA AGLY A   2       1.000   5.500 -15.000  0.60 30.25           C
ATOM      4  CA BGLY A   2       1.100   5.600 -15.100  0.40 31.00           C
ATOM      5  CA  PHE A   3       4.200   6.800 -14.100  1.00 28.00           C
HETATM    6  O   HOH A 401      10.000  10.000  10.000  1.00 50.00           O
END
";

    fn read(text: &str) -> Result<(StructureModel, PdbMetadata), PdbError> {
        PdbFile::read_from(&mut Cursor::new(text), "test")
    }

    #[test]
    fn reads_alpha_carbons_and_b_factors() {
        let (model, metadata) = read(SAMPLE).unwrap();

        assert_eq!(model.id(), "test");
        assert_eq!(model.atoms().len(), 6);
        assert_eq!(model.node_count(), 3);
        assert_eq!(model.b_factors(), vec![Some(35.5), Some(30.25), Some(28.0)]);
        assert_eq!(model.nodes()[1].position, Point3::new(1.0, 5.5, -15.0));
        assert_eq!(metadata.id_code.as_deref(), Some("6LU7"));
        assert!(metadata.title.unwrap().contains("MAIN PROTEASE"));
    }

    #[test]
    fn parses_fixed_columns() {
        let (model, _) = read(SAMPLE).unwrap();
        let alt = &model.atoms()[2];
        assert_eq!(alt.alt_loc, Some('A'));
        assert_eq!(alt.occupancy, 0.6);
        assert_eq!(alt.chain_id, 'A');
        assert_eq!(alt.serial, 3);
        assert_eq!(model.atoms()[5].kind, RecordKind::Hetero);
    }

    #[test]
    fn hybrid36_serial_is_recorded_as_zero() {
        let text = "\
ATOM  A0000  CA  ALA A   1       0.000   0.000   0.000  1.00 10.00           C
ATOM  A0001  CA  ALA A   2       3.800   0.000   0.000  1.00 11.00           C
END
";
        let (model, _) = read(text).unwrap();
        assert_eq!(model.node_count(), 2);
        assert!(model.atoms().iter().all(|atom| atom.serial == 0));
        assert_eq!(model.nodes()[1].residue_number, 2);
    }

    #[test]
    fn reading_stops_after_first_model() {
        let text = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00 10.00           C
ATOM      2  CA  ALA A   2       3.800   0.000   0.000  1.00 11.00           C
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       9.000   0.000   0.000  1.00 10.00           C
ATOM      2  CA  ALA A   2       9.000   3.800   0.000  1.00 11.00           C
ATOM      3  CA  ALA A   3       9.000   7.600   0.000  1.00 12.00           C
ENDMDL
";
        let (model, metadata) = read(text).unwrap();
        assert_eq!(model.node_count(), 2);
        assert_eq!(metadata.models_seen, 1);
        assert_eq!(model.nodes()[0].position.x, 0.0);
    }

    #[test]
    fn missing_b_factor_column_leaves_none() {
        let text = "ATOM      1  CA  ALA A   1       0.000   0.000   0.000\n";
        let (model, _) = read(text).unwrap();
        assert_eq!(model.nodes()[0].b_factor, None);
        assert_eq!(model.atoms()[0].occupancy, 1.0);
    }

    #[test]
    fn malformed_coordinate_reports_line_number() {
        let text = "\
REMARK   1
ATOM      1  CA  ALA A   1       0.000   abc     0.000  1.00 10.00           C
";
        match read(text) {
            Err(PdbError::Parse { line, kind }) => {
                assert_eq!(line, 2);
                assert!(matches!(kind, PdbParseErrorKind::InvalidFloat { .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn short_atom_line_is_rejected() {
        assert!(matches!(
            read("ATOM      1  CA  ALA A   1       0.000\n"),
            Err(PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::LineTooShort
            })
        ));
    }

    #[test]
    fn file_without_atoms_is_missing_record() {
        assert!(matches!(
            read("HEADER    EMPTY\nEND\n"),
            Err(PdbError::MissingRecord(_))
        ));
    }

    #[test]
    fn ligand_only_file_has_no_nodes() {
        let text =
            "HETATM    1  C1  LIG A   1       0.000   0.000   0.000  1.00 10.00           C\n";
        assert!(matches!(
            read(text),
            Err(PdbError::Input(InputError::NoNodes { .. }))
        ));
    }

    #[test]
    fn read_from_path_opens_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("6lu7.pdb");
        fs::write(&path, SAMPLE).unwrap();

        let (model, _) = PdbFile::read_from_path(&path, "6lu7").unwrap();
        assert_eq!(model.id(), "6lu7");
        assert_eq!(model.node_count(), 3);

        let missing = PdbFile::read_from_path(dir.path().join("absent.pdb"), "x");
        assert!(matches!(missing, Err(PdbError::Io(_))));
    }
}
