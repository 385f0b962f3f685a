// alphabet.rs - Residue alphabets and character classes

use serde::{Deserialize, Serialize};

use crate::error::{AlnError, Result};

/// Gap character
pub const GAP: u8 = b'-';
/// Match-point character (identical to the first sequence)
pub const POINT: u8 = b'.';
/// Ambiguous/wildcard character
pub const OTHER: u8 = b'*';
/// All-ambiguous nucleotide
pub const ALL_NUCLE: u8 = b'N';
/// All-ambiguous amino acid
pub const ALL_AMINO: u8 = b'X';

/// The 4 standard nucleotides
pub const NUCLEOTIDES: &[u8] = b"ACGT";
/// The 20 standard amino acids
pub const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Residue alphabet of a sequence collection.
///
/// Fixed for the lifetime of a store, except via an explicit `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alphabet {
    Nucleotide,
    AminoAcid,
    Unknown,
}

impl Alphabet {
    /// Parse an alphabet name ("dna", "rna", "nucleotide", "protein").
    /// Unrecognized names map to `Unknown`.
    pub fn from_name(name: &str) -> Alphabet {
        match name.to_lowercase().as_str() {
            "dna" | "rna" | "nucleotide" => Alphabet::Nucleotide,
            "protein" => Alphabet::AminoAcid,
            _ => Alphabet::Unknown,
        }
    }

    /// The standard residue characters of this alphabet.
    pub fn characters(&self) -> Result<&'static [u8]> {
        match self {
            Alphabet::Nucleotide => Ok(NUCLEOTIDES),
            Alphabet::AminoAcid => Ok(AMINO_ACIDS),
            Alphabet::Unknown => Err(AlnError::UnsupportedAlphabet(
                "unknown alphabet has no character set".to_string(),
            )),
        }
    }

    /// The all-ambiguous character used for masking ('N' or 'X').
    pub fn ambiguity(&self) -> Result<u8> {
        match self {
            Alphabet::Nucleotide => Ok(ALL_NUCLE),
            Alphabet::AminoAcid => Ok(ALL_AMINO),
            Alphabet::Unknown => Err(AlnError::UnsupportedAlphabet(
                "cannot mask alignment with unknown alphabet".to_string(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Alphabet::Nucleotide => "nucleotide",
            Alphabet::AminoAcid => "protein",
            Alphabet::Unknown => "unknown",
        }
    }
}

/// True for characters ignored by most statistics (gap excepted).
pub fn is_special(c: u8) -> bool {
    c == GAP || c == POINT || c == OTHER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_from_name() {
        assert_eq!(Alphabet::from_name("DNA"), Alphabet::Nucleotide);
        assert_eq!(Alphabet::from_name("rna"), Alphabet::Nucleotide);
        assert_eq!(Alphabet::from_name("protein"), Alphabet::AminoAcid);
        assert_eq!(Alphabet::from_name("martian"), Alphabet::Unknown);
    }

    #[test]
    fn test_ambiguity_characters() {
        assert_eq!(Alphabet::Nucleotide.ambiguity().unwrap(), b'N');
        assert_eq!(Alphabet::AminoAcid.ambiguity().unwrap(), b'X');
        assert!(Alphabet::Unknown.ambiguity().is_err());
    }

    #[test]
    fn test_character_sets() {
        assert_eq!(Alphabet::Nucleotide.characters().unwrap().len(), 4);
        assert_eq!(Alphabet::AminoAcid.characters().unwrap().len(), 20);
    }
}
