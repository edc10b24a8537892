//! Minimal PDB entry reader.
//!
//! Parses `ATOM` records with fixed-width columns and derives one [`Chain`]
//! per chain identifier: the residue string in file order, with each
//! residue's alpha-carbon position when present. Residues whose CA atom is
//! missing from the coordinate section come out disordered, which is exactly
//! what the chain windower needs to skip gapped windows.
//!
//! Only the first model of multi-model files is read. `HETATM` records and
//! alternate locations other than blank or `A` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{FlibError, Result};
use crate::structure::{Chain, ChainResidue, ChainSource, Coords};

/// Reads chains from PDB files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdbReader;

impl ChainSource for PdbReader {
    fn read_chains(&self, path: &Path) -> Result<Vec<Chain>> {
        let file = File::open(path).map_err(|e| entry_error(path, e.to_string()))?;
        let reader = BufReader::new(file);

        let entry_name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());

        let mut chains: Vec<ChainBuilder> = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| entry_error(path, format!("line {}: {e}", lineno + 1)))?;
            if line.starts_with("ENDMDL") {
                break;
            }
            let Some(atom) = parse_atom_line(&line) else { continue };
            let index = match chains.iter().position(|c| c.id == atom.chain_id) {
                Some(index) => index,
                None => {
                    chains.push(ChainBuilder::new(atom.chain_id));
                    chains.len() - 1
                }
            };
            chains[index].observe(&atom);
        }

        Ok(chains.into_iter().filter(|c| !c.residues.is_empty()).map(|c| c.build(&entry_name)).collect())
    }
}

fn entry_error(path: &Path, reason: String) -> FlibError {
    FlibError::EntryRead { path: path.display().to_string(), reason }
}

/// One parsed `ATOM` record.
struct AtomRecord {
    atom_name: String,
    res_name: String,
    chain_id: char,
    res_seq: i32,
    i_code: char,
    position: Coords,
}

/// Parses a PDB `ATOM` line using the wwPDB fixed-width columns.
/// Returns `None` for records that are not protein atoms we care about.
fn parse_atom_line(line: &str) -> Option<AtomRecord> {
    let bytes = line.as_bytes();
    if bytes.len() < 54 || !line.starts_with("ATOM") {
        return None;
    }

    let field = |range: std::ops::Range<usize>| -> &str {
        std::str::from_utf8(&bytes[range]).unwrap_or("").trim()
    };

    let alt_loc = bytes[16] as char;
    if alt_loc != ' ' && alt_loc != 'A' {
        return None;
    }

    Some(AtomRecord {
        atom_name: field(12..16).to_string(),
        res_name: field(17..20).to_string(),
        chain_id: bytes[21] as char,
        res_seq: field(22..26).parse().ok()?,
        i_code: bytes[26] as char,
        position: [
            field(30..38).parse().ok()?,
            field(38..46).parse().ok()?,
            field(46..54).parse().ok()?,
        ],
    })
}

struct ChainBuilder {
    id: char,
    residues: Vec<ChainResidue>,
    current: Option<(i32, char)>,
}

impl ChainBuilder {
    fn new(id: char) -> Self {
        Self { id, residues: Vec::new(), current: None }
    }

    fn observe(&mut self, atom: &AtomRecord) {
        let key = (atom.res_seq, atom.i_code);
        if self.current != Some(key) {
            self.current = Some(key);
            self.residues.push(ChainResidue { code: three_to_one(&atom.res_name), ca: None });
        }
        if atom.atom_name == "CA" {
            if let Some(residue) = self.residues.last_mut() {
                if residue.ca.is_none() {
                    residue.ca = Some(atom.position);
                }
            }
        }
    }

    fn build(self, entry_name: &str) -> Chain {
        let id = if self.id == ' ' { '_' } else { self.id };
        Chain::new(format!("{entry_name}_{id}"), self.residues)
    }
}

/// Maps a three-letter residue name to its one-letter code.
/// Non-standard residues fold into `X`.
fn three_to_one(name: &str) -> u8 {
    match name {
        "ALA" => b'A',
        "ARG" => b'R',
        "ASN" => b'N',
        "ASP" => b'D',
        "CYS" => b'C',
        "GLN" => b'Q',
        "GLU" => b'E',
        "GLY" => b'G',
        "HIS" => b'H',
        "ILE" => b'I',
        "LEU" => b'L',
        "LYS" => b'K',
        "MET" | "MSE" => b'M',
        "PHE" => b'F',
        "PRO" => b'P',
        "SER" => b'S',
        "THR" => b'T',
        "TRP" => b'W',
        "TYR" => b'Y',
        "VAL" => b'V',
        _ => b'X',
    }
}
