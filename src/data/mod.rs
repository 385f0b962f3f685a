// mod.rs - Data structures module

pub mod alignment;
pub mod alphabet;
pub mod partition;
pub mod store;

// Re-export main types for convenience
pub use alignment::Alignment;
pub use alphabet::Alphabet;
pub use partition::PartitionSet;
pub use store::{SequenceRecord, SequenceStore};
