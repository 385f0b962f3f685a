// alignment.rs - The core alignment matrix: a sequence store plus a shared length invariant

use crate::data::alphabet::Alphabet;
use crate::data::store::{SequenceRecord, SequenceStore};
use crate::error::{AlnError, Result};

/// A multiple sequence alignment.
///
/// Wraps a [`SequenceStore`] with a single invariant: every record has
/// exactly `length` characters. `length` is `None` while the alignment holds
/// no rows. Every mutating operation either preserves the invariant for all
/// rows or fails before any row is changed, except the operations documented
/// as partial-effect.
#[derive(Debug, Clone)]
pub struct Alignment {
    store: SequenceStore,
    length: Option<usize>,
}

impl Alignment {
    /// Create an empty alignment. The BOTH alphabet of upstream detectors
    /// collapses to nucleotide here.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            store: SequenceStore::new(alphabet),
            length: None,
        }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.store.alphabet()
    }

    /// Current number of columns (0 while the alignment is empty).
    pub fn length(&self) -> usize {
        self.length.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn nb_sequences(&self) -> usize {
        self.store.nb_sequences()
    }

    pub fn set_ignore_identical(&mut self, ignore: bool) {
        self.store.set_ignore_identical(ignore);
    }

    /// Add a row, enforcing the shared column-length invariant.
    ///
    /// Duplicate names follow the store policy (suppression or rename with a
    /// warning). A width conflict fails with `LengthMismatch` before the
    /// store is touched.
    pub fn add_sequence(&mut self, name: &str, chars: Vec<u8>, comment: &str) -> Result<()> {
        if let Some(expected) = self.length {
            if chars.len() != expected {
                return Err(AlnError::LengthMismatch {
                    name: name.to_string(),
                    expected,
                    found: chars.len(),
                });
            }
        }
        let width = chars.len();
        if self.store.push(name, chars, comment) {
            self.length = Some(width);
        }
        Ok(())
    }

    /// Remove every row and reset the length invariant.
    pub fn clear(&mut self) {
        self.store.clear();
        self.length = None;
    }

    pub fn get(&self, name: &str) -> Option<&SequenceRecord> {
        self.store.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// Rows in insertion order; parsers populate through `add_sequence` and
    /// writers serialize through this.
    pub fn iter(&self) -> impl Iterator<Item = &SequenceRecord> {
        self.store.iter()
    }

    /// Append every row of `other` to this alignment, width-checked.
    pub fn append(&mut self, other: &Alignment) -> Result<()> {
        for rec in other.iter() {
            self.add_sequence(&rec.name, rec.chars.clone(), &rec.comment)?;
        }
        Ok(())
    }

    // Crate-internal accessors used by the engine modules. They can break
    // the length invariant, so every caller must restore it before return.

    pub(crate) fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut SequenceStore {
        &mut self.store
    }

    pub(crate) fn set_length(&mut self, length: Option<usize>) {
        self.length = length;
    }
}
