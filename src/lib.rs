// lib.rs - alnkit library root

//! # alnkit - In-memory multiple sequence alignment engine
//!
//! This library provides the matrix-level operations behind alignment
//! tooling: filtering, compressing, perturbing, mapping and summarizing the
//! rows and columns of a multiple sequence alignment (MSA). Format parsing
//! and writing (FASTA, Phylip, Nexus, Clustal) and the command-line surface
//! live in the surrounding layer; this crate only ever sees fully-formed
//! character matrices.
//!
//! ## Features
//!
//! - **Strict invariants**: every row keeps the alignment width, names stay
//!   unique, the alphabet is fixed; mutations fail before touching the
//!   matrix or are documented as partial-effect
//! - **Site filtering**: gap-driven column/row removal, trimming, masking,
//!   sub-alignment extraction
//! - **Analysis**: column-pattern compression, reference coordinate
//!   mapping, frameshift and premature-stop detection, per-site statistics,
//!   consensus, entropy, conservation, position-weight matrices
//! - **Simulation**: site shuffling with rogue taxa, sequence swapping and
//!   recombination, gap injection, point mutation, bootstrap and
//!   rarefaction, all driven by an injected random source
//!
//! ## Basic Usage
//!
//! ```rust
//! use alnkit::prelude::*;
//!
//! let mut aln = Alignment::new(Alphabet::Nucleotide);
//! aln.add_sequence("s1", b"AC-GT".to_vec(), "")?;
//! aln.add_sequence("s2", b"ACTGT".to_vec(), "")?;
//!
//! // Drop columns with at least one gap
//! aln.remove_gap_sites(0.0, false);
//! assert_eq!(aln.length(), 4);
//!
//! // Seeded bootstrap replicate
//! use rand::{rngs::StdRng, SeedableRng};
//! let mut rng = StdRng::seed_from_u64(42);
//! let boot = aln.build_bootstrap(&mut rng);
//! assert_eq!(boot.length(), aln.length());
//! # Ok::<(), alnkit::AlnError>(())
//! ```

// Re-export all main modules
pub mod core;
pub mod data;
pub mod error;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::core::{random_alignment, standard_genetic_code};
    pub use crate::core::{FrameshiftRegion, Normalization, Pssm, SiteConservation};
    pub use crate::data::{Alignment, Alphabet, PartitionSet, SequenceRecord, SequenceStore};
    pub use crate::error::{AlnError, Result};
}

// Re-export main types at the root level for convenience
pub use data::{Alignment, Alphabet, PartitionSet, SequenceRecord, SequenceStore};
pub use error::{AlnError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("alnkit v{} - multiple sequence alignment engine", VERSION)
}
