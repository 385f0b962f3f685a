// setops.rs - Whole-alignment composition: concatenation, partition-driven
// splitting and codon back-translation

use tracing::warn;

use crate::data::alphabet::{Alphabet, GAP};
use crate::data::{Alignment, PartitionSet, SequenceStore};
use crate::error::{AlnError, Result};

impl Alignment {
    /// Concatenate `other` column-wise onto this alignment.
    ///
    /// Rows present on only one side are padded with an all-gap filler of
    /// the other side's length. Fails up front if the alphabets differ;
    /// partial-effect afterwards: a final width verification failure leaves
    /// the alignment modified.
    pub fn concat(&mut self, other: &Alignment) -> Result<()> {
        if self.alphabet() != other.alphabet() {
            return Err(AlnError::UnsupportedAlphabet(format!(
                "cannot concatenate a {} alignment with a {} alignment",
                self.alphabet().name(),
                other.alphabet().name(),
            )));
        }
        let own_len = self.length();
        let other_len = other.length();

        // Rows of this alignment missing from the other side get a gap tail
        for rec in self.store_mut().iter_mut() {
            if !other.contains(&rec.name) {
                rec.chars.extend(std::iter::repeat(GAP).take(other_len));
            }
        }

        // Rows of the other side get appended, behind a gap head if new here
        for rec in other.iter() {
            if self.contains(&rec.name) {
                if let Some(own) = self.store_mut().get_mut(&rec.name) {
                    own.chars.extend_from_slice(&rec.chars);
                }
            } else {
                let mut chars = vec![GAP; own_len];
                chars.extend_from_slice(&rec.chars);
                self.store_mut().push(&rec.name, chars, &rec.comment);
            }
        }

        // Verify the invariant before committing the new length
        let mut final_len = None;
        for rec in self.iter() {
            match final_len {
                None => final_len = Some(rec.chars.len()),
                Some(expected) if expected != rec.chars.len() => {
                    return Err(AlnError::LengthMismatch {
                        name: rec.name.clone(),
                        expected,
                        found: rec.chars.len(),
                    });
                }
                Some(_) => {}
            }
        }
        self.set_length(final_len);
        Ok(())
    }

    /// Split into one new alignment per partition, each keeping only its
    /// assigned columns, rows and names in original order.
    pub fn split(&self, part: &PartitionSet) -> Result<Vec<Alignment>> {
        if part.n_partitions() < 2 {
            return Err(AlnError::InvalidArgument(
                "partition set contains less than 2 partitions".to_string(),
            ));
        }
        if part.ali_length() != self.length() {
            return Err(AlnError::InvalidArgument(format!(
                "partition set declares length {}, alignment has {}",
                part.ali_length(),
                self.length()
            )));
        }

        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); part.n_partitions()];
        for pos in 0..self.length() {
            columns[part.partition(pos)].push(pos);
        }

        let mut out = Vec::with_capacity(part.n_partitions());
        for cols in &columns {
            let mut sub = Alignment::new(self.alphabet());
            for rec in self.iter() {
                let chars: Vec<u8> = cols.iter().map(|&pos| rec.chars[pos]).collect();
                sub.add_sequence(&rec.name, chars, &rec.comment)?;
            }
            out.push(sub);
        }
        Ok(out)
    }

    /// Back-translate this amino-acid alignment into a codon alignment.
    ///
    /// Each amino-acid column expands to the next 3 characters of the
    /// matching nucleotide row ("---" for a gap), advancing a per-row
    /// cursor. Correctness of the translation itself is not checked. Up to
    /// 2 trailing nucleotides are dropped with a warning; more is an error.
    pub fn codon_align(&self, nt_store: &SequenceStore) -> Result<Alignment> {
        if self.alphabet() != Alphabet::AminoAcid {
            return Err(AlnError::UnsupportedAlphabet(
                "cannot reverse translate a non amino-acid alignment".to_string(),
            ));
        }
        if nt_store.alphabet() != Alphabet::Nucleotide {
            return Err(AlnError::UnsupportedAlphabet(
                "cannot reverse translate with non nucleotidic sequences".to_string(),
            ));
        }

        let mut out = Alignment::new(nt_store.alphabet());
        for rec in self.iter() {
            let nt = nt_store
                .get(&rec.name)
                .ok_or_else(|| AlnError::MissingSequence(rec.name.clone()))?;

            let mut codons = Vec::with_capacity(rec.chars.len() * 3);
            let mut cursor = 0usize;
            for &aa in &rec.chars {
                if aa == GAP {
                    codons.extend_from_slice(b"---");
                } else {
                    if cursor + 3 > nt.chars.len() {
                        return Err(AlnError::ShortSequence(rec.name.clone()));
                    }
                    codons.extend_from_slice(&nt.chars[cursor..cursor + 3]);
                    cursor += 3;
                }
            }
            let remaining = nt.chars.len() - cursor;
            if remaining > 2 {
                return Err(AlnError::LongSequence {
                    name: rec.name.clone(),
                    remaining,
                });
            }
            if remaining > 0 {
                warn!(
                    name = rec.name.as_str(),
                    remaining, "dropping trailing nucleotides"
                );
            }
            out.add_sequence(&rec.name, codons, &rec.comment)?;
        }
        Ok(out)
    }
}
