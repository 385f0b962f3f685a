// coords.rs - Ungapped reference coordinates to gapped alignment coordinates

use crate::data::alphabet::GAP;
use crate::data::Alignment;
use crate::error::{AlnError, Result};

impl Alignment {
    /// Convert coordinates on the named (ungapped) reference row into
    /// coordinates on the (gapped) alignment.
    ///
    /// `ref_start` is the 0-based index on the reference row ignoring gaps;
    /// `ref_len` the number of reference characters to cover. The result is
    /// the alignment column where the region starts and the number of
    /// alignment columns, interleaved gaps included, needed to span it.
    pub fn ref_coordinates(
        &self,
        name: &str,
        ref_start: usize,
        ref_len: usize,
    ) -> Result<(usize, usize)> {
        let rec = self
            .get(name)
            .ok_or_else(|| AlnError::UnknownSequence(name.to_string()))?;
        if ref_len == 0 {
            return Err(AlnError::InvalidArgument(
                "reference length must be > 0".to_string(),
            ));
        }
        if ref_start + ref_len > rec.ungapped_len() {
            return Err(AlnError::OutOfRange {
                what: "ref_start+ref_len",
                index: ref_start + ref_len,
            });
        }

        let mut ali_start = 0usize;
        let mut ali_len = 0usize;
        // Ungapped index of the last non-gap character seen so far
        let mut ungapped: isize = -1;
        let mut covered = false;

        for &c in &rec.chars {
            if c != GAP {
                ungapped += 1;
            }
            if ungapped < ref_start as isize {
                ali_start += 1;
            } else {
                ali_len += 1;
                if ungapped as usize >= ref_start + ref_len - 1 {
                    covered = true;
                    break;
                }
            }
        }

        if !covered {
            return Err(AlnError::OutOfRange {
                what: "ref_start+ref_len",
                index: ref_start + ref_len,
            });
        }
        Ok((ali_start, ali_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Alphabet;

    fn aln(chars: &str) -> Alignment {
        let mut a = Alignment::new(Alphabet::Nucleotide);
        a.add_sequence("ref", chars.as_bytes().to_vec(), "").unwrap();
        a
    }

    #[test]
    fn test_ungapped_row_is_identity() {
        let a = aln("ACGTACGT");
        for k in 0..8 {
            assert_eq!(a.ref_coordinates("ref", k, 1).unwrap(), (k, 1));
        }
    }

    #[test]
    fn test_gaps_stretch_the_window() {
        // columns: A - C G - T  (ungapped indices 0 . 1 2 . 3)
        let a = aln("A-CG-T");
        // Reference position 1 is the 'C' at column 2
        assert_eq!(a.ref_coordinates("ref", 1, 1).unwrap(), (2, 1));
        // Covering CG T (ref 1..4) spans columns 2..=5
        assert_eq!(a.ref_coordinates("ref", 1, 3).unwrap(), (2, 4));
        // Leading gap before ref position 0
        assert_eq!(a.ref_coordinates("ref", 0, 2).unwrap(), (0, 3));
    }

    #[test]
    fn test_out_of_range_and_unknown() {
        let a = aln("A-CG-T");
        assert!(matches!(
            a.ref_coordinates("ref", 2, 3),
            Err(AlnError::OutOfRange { .. })
        ));
        assert!(matches!(
            a.ref_coordinates("nope", 0, 1),
            Err(AlnError::UnknownSequence(_))
        ));
        assert!(matches!(
            a.ref_coordinates("ref", 0, 0),
            Err(AlnError::InvalidArgument(_))
        ));
    }
}
