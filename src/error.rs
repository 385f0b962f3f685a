// error.rs - Typed error kinds surfaced by every fallible engine operation

use thiserror::Error;

/// Errors returned by alignment operations.
///
/// Validation happens before mutation wherever feasible: an `Err` means the
/// alignment was left untouched, except for the operations explicitly
/// documented as partial-effect (`concat`).
#[derive(Debug, Error)]
pub enum AlnError {
    /// A row's width is inconsistent with the alignment length
    #[error("sequence \"{name}\" has length {found}, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// An out-of-range rate/cutoff/size parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A site/column/row index outside the current alignment bounds
    #[error("{what} {index} is outside the alignment")]
    OutOfRange { what: &'static str, index: usize },

    /// Sequence name not found where one was required
    #[error("sequence \"{0}\" does not exist in the alignment")]
    UnknownSequence(String),

    /// Sequence name absent from a companion sequence set
    #[error("sequence \"{0}\" is not present in the nucleotidic sequences")]
    MissingSequence(String),

    /// Operation not defined for the current alphabet
    #[error("unsupported alphabet: {0}")]
    UnsupportedAlphabet(String),

    /// Unknown PSSM normalization mode
    #[error("unsupported normalization: {0}")]
    UnsupportedNormalization(String),

    /// A character missing from the global statistics (PSSM data normalization)
    #[error("no character '{}' in alignment statistics", *.0 as char)]
    UnknownCharacter(u8),

    /// Nucleotide sequence shorter than its amino-acid counterpart
    #[error("nucleotidic sequence \"{0}\" is shorter than its amino-acid counterpart")]
    ShortSequence(String),

    /// Nucleotide sequence longer than tolerated (more than 2 trailing nucleotides)
    #[error("nucleotidic sequence \"{name}\" is longer than its amino-acid counterpart ({remaining} nucleotides remaining)")]
    LongSequence { name: String, remaining: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AlnError>;
