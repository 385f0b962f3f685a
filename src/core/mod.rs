// mod.rs - Engine logic module

pub mod codon;
pub mod compress;
pub mod coords;
pub mod frame;
pub mod perturb;
pub mod setops;
pub mod sites;
pub mod stats;

// Re-export main types for convenience
pub use codon::standard_genetic_code;
pub use frame::FrameshiftRegion;
pub use perturb::random_alignment;
pub use stats::{Normalization, Pssm, SiteConservation};
