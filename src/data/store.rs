// store.rs - Ordered, name-indexed collection of sequence records

use std::collections::HashMap;

use tracing::warn;

use crate::data::alphabet::Alphabet;

/// A single named sequence
#[derive(Debug, Clone)]
pub struct SequenceRecord {
    pub name: String,
    pub chars: Vec<u8>,
    pub comment: String,
}

impl SequenceRecord {
    pub fn new(name: &str, chars: Vec<u8>, comment: &str) -> Self {
        Self {
            name: name.to_string(),
            chars,
            comment: comment.to_string(),
        }
    }

    /// Number of non-gap characters.
    pub fn ungapped_len(&self) -> usize {
        self.chars
            .iter()
            .filter(|&&c| c != crate::data::alphabet::GAP)
            .count()
    }
}

/// Ordered collection of sequence records with a name index.
///
/// Insertion order is the canonical output order. No two records ever share
/// a name: duplicates are either suppressed (ignore-identical mode, when the
/// characters are byte-identical) or renamed with a zero-padded numeric
/// suffix. Both cases are advisory warnings, never errors.
#[derive(Debug, Clone)]
pub struct SequenceStore {
    records: Vec<SequenceRecord>,
    index: HashMap<String, usize>,
    ignore_identical: bool,
    alphabet: Alphabet,
}

impl SequenceStore {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            ignore_identical: false,
            alphabet,
        }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// If enabled, inserting a record whose name and characters both match an
    /// existing record is a no-op instead of a rename.
    pub fn set_ignore_identical(&mut self, ignore: bool) {
        self.ignore_identical = ignore;
    }

    pub fn ignore_identical(&self) -> bool {
        self.ignore_identical
    }

    pub fn nb_sequences(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record, applying the duplicate-name policy.
    /// Returns false if the record was suppressed (ignore-identical mode).
    pub fn push(&mut self, name: &str, chars: Vec<u8>, comment: &str) -> bool {
        if let Some(&pos) = self.index.get(name) {
            if self.ignore_identical && self.records[pos].chars == chars {
                warn!(
                    name = name,
                    "sequence already exists with the same characters, ignoring"
                );
                return false;
            }
        }

        let mut unique = name.to_string();
        let mut suffix = 0usize;
        while self.index.contains_key(&unique) {
            suffix += 1;
            unique = format!("{}_{:04}", name, suffix);
            warn!(
                name = name,
                renamed = unique.as_str(),
                "sequence already exists, renaming"
            );
        }

        self.index.insert(unique.clone(), self.records.len());
        self.records.push(SequenceRecord::new(&unique, chars, comment));
        true
    }

    pub fn get(&self, name: &str) -> Option<&SequenceRecord> {
        self.index.get(name).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SequenceRecord> {
        match self.index.get(name) {
            Some(&pos) => Some(&mut self.records[pos]),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn record(&self, row: usize) -> &SequenceRecord {
        &self.records[row]
    }

    pub fn record_mut(&mut self, row: usize) -> &mut SequenceRecord {
        &mut self.records[row]
    }

    /// Mutable access to two distinct rows at once.
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut SequenceRecord, &mut SequenceRecord) {
        assert_ne!(i, j, "pair_mut requires distinct rows");
        if i < j {
            let (left, right) = self.records.split_at_mut(j);
            (&mut left[i], &mut right[0])
        } else {
            let (left, right) = self.records.split_at_mut(i);
            (&mut right[0], &mut left[j])
        }
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SequenceRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SequenceRecord> {
        self.records.iter_mut()
    }

    /// Remove every record; the alphabet is kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Rebuild the store keeping only the rows selected by `keep`,
    /// preserving order. Used by row-level filters.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&SequenceRecord) -> bool,
    {
        let old = std::mem::take(&mut self.records);
        self.index.clear();
        for rec in old {
            if keep(&rec) {
                self.index.insert(rec.name.clone(), self.records.len());
                self.records.push(rec);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = SequenceStore::new(Alphabet::Nucleotide);
        store.push("b", b"ACGT".to_vec(), "");
        store.push("a", b"TGCA".to_vec(), "");
        let names: Vec<&str> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_name_renamed() {
        let mut store = SequenceStore::new(Alphabet::Nucleotide);
        store.push("seq", b"ACGT".to_vec(), "");
        store.push("seq", b"TTTT".to_vec(), "");
        store.push("seq", b"GGGG".to_vec(), "");
        assert_eq!(store.nb_sequences(), 3);
        assert!(store.contains("seq"));
        assert!(store.contains("seq_0001"));
        assert!(store.contains("seq_0002"));
    }

    #[test]
    fn test_ignore_identical_suppresses() {
        let mut store = SequenceStore::new(Alphabet::Nucleotide);
        store.set_ignore_identical(true);
        assert!(store.push("seq", b"ACGT".to_vec(), ""));
        assert!(!store.push("seq", b"ACGT".to_vec(), ""));
        assert_eq!(store.nb_sequences(), 1);
        // Different characters still get renamed, not suppressed
        assert!(store.push("seq", b"TTTT".to_vec(), ""));
        assert_eq!(store.nb_sequences(), 2);
        assert!(store.contains("seq_0001"));
    }

    #[test]
    fn test_retain_rows() {
        let mut store = SequenceStore::new(Alphabet::Nucleotide);
        store.push("a", b"AC".to_vec(), "");
        store.push("b", b"A-".to_vec(), "");
        store.push("c", b"GT".to_vec(), "");
        store.retain_rows(|r| !r.chars.contains(&b'-'));
        assert_eq!(store.nb_sequences(), 2);
        assert!(store.get("b").is_none());
        assert_eq!(store.get("c").unwrap().chars, b"GT");
    }
}
