// compress.rs - Column-pattern deduplication with multiplicity weights

use std::collections::HashMap;

use crate::data::Alignment;

/// Order-preserving tally of column patterns: first-seen order is the
/// output order, so compression is deterministic and reproducible.
#[derive(Debug, Default)]
struct PatternTally {
    slots: Vec<(Vec<u8>, usize)>,
    index: HashMap<Vec<u8>, usize>,
}

impl PatternTally {
    fn add(&mut self, pattern: Vec<u8>) {
        match self.index.get(&pattern) {
            Some(&slot) => self.slots[slot].1 += 1,
            None => {
                self.index.insert(pattern.clone(), self.slots.len());
                self.slots.push((pattern, 1));
            }
        }
    }
}

impl Alignment {
    /// Deduplicate identical columns in place.
    ///
    /// Each column is read as the vertical string of characters across all
    /// rows. One representative column is kept per distinct pattern, in
    /// first-occurrence order; row widths shrink to the number of distinct
    /// patterns. Returns one occurrence count per retained column, in the
    /// same order.
    pub fn compress(&mut self) -> Vec<usize> {
        let length = self.length();
        let nseq = self.nb_sequences();

        let mut tally = PatternTally::default();
        for site in 0..length {
            let pattern: Vec<u8> = (0..nseq)
                .map(|row| self.store().record(row).chars[site])
                .collect();
            tally.add(pattern);
        }

        let npat = tally.slots.len();
        for (slot, (pattern, _)) in tally.slots.iter().enumerate() {
            for (row, &c) in pattern.iter().enumerate() {
                self.store_mut().record_mut(row).chars[slot] = c;
            }
        }
        for rec in self.store_mut().iter_mut() {
            rec.chars.truncate(npat);
        }
        if !self.is_empty() {
            self.set_length(Some(npat));
        }

        tally.slots.into_iter().map(|(_, count)| count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Alphabet;

    fn aln(rows: &[(&str, &str)]) -> Alignment {
        let mut a = Alignment::new(Alphabet::Nucleotide);
        for (name, chars) in rows {
            a.add_sequence(name, chars.as_bytes().to_vec(), "").unwrap();
        }
        a
    }

    #[test]
    fn test_compress_first_seen_order() {
        let mut a = aln(&[("s1", "AATA"), ("s2", "CCGC")]);
        let weights = a.compress();
        assert_eq!(weights, vec![3, 1]);
        assert_eq!(a.length(), 2);
        assert_eq!(a.get("s1").unwrap().chars, b"AT");
        assert_eq!(a.get("s2").unwrap().chars, b"CG");
    }

    #[test]
    fn test_compress_reexpansion_recovers_column_multiset() {
        let mut a = aln(&[("s1", "ACGTAC"), ("s2", "A--TA-"), ("s3", "ACGTAC")]);
        let original: Vec<Vec<u8>> = (0..a.length())
            .map(|site| a.iter().map(|r| r.chars[site]).collect())
            .collect();
        let weights = a.compress();
        let mut expanded: Vec<Vec<u8>> = Vec::new();
        for (slot, &w) in weights.iter().enumerate() {
            let col: Vec<u8> = a.iter().map(|r| r.chars[slot]).collect();
            for _ in 0..w {
                expanded.push(col.clone());
            }
        }
        let mut original = original;
        let mut expanded = expanded;
        original.sort();
        expanded.sort();
        assert_eq!(original, expanded);
    }

    #[test]
    fn test_compress_no_duplicates_is_identity() {
        let mut a = aln(&[("s1", "ACGT"), ("s2", "TGCA")]);
        let weights = a.compress();
        assert_eq!(weights, vec![1, 1, 1, 1]);
        assert_eq!(a.get("s1").unwrap().chars, b"ACGT");
    }
}
