// frame.rs - Phase-tracked frameshift and premature-stop detection

use serde::{Deserialize, Serialize};

use crate::data::alphabet::GAP;
use crate::data::Alignment;

/// Longest dephased region of one row, in ungapped-position units.
/// `start == end` means no frameshift was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameshiftRegion {
    pub start: usize,
    pub end: usize,
}

/// Advance the phase for a reference gap (insertion relative to reference).
fn phase_forward(phase: i32) -> i32 {
    (phase + 1) % 3
}

/// Retreat the phase for a gap in the scanned row (deletion).
fn phase_back(phase: i32) -> i32 {
    if phase == 0 {
        2
    } else {
        phase - 1
    }
}

impl Alignment {
    /// Detect dephased regions relative to the first row.
    ///
    /// The first row is the in-frame reference; each other row is scanned
    /// left to right with a phase counter in {0,1,2}: a reference gap
    /// advances the phase, a gap in the scanned row retreats it. With
    /// `starting_gaps_as_incomplete`, dephasing before the row's first
    /// non-gap character is absorbed as phase retreat instead of being
    /// counted. One region per row is returned (index 0, the reference, is
    /// always empty): the longest contiguous run where the phase is nonzero,
    /// with run boundaries resetting each time the phase returns to 0.
    pub fn frameshifts(&self, starting_gaps_as_incomplete: bool) -> Vec<FrameshiftRegion> {
        let nseq = self.nb_sequences();
        let length = self.length();
        let mut out = vec![FrameshiftRegion::default(); nseq];
        if nseq == 0 {
            return out;
        }
        let reference = &self.store().record(0).chars;

        for row in 1..nseq {
            let seq = &self.store().record(row).chars;
            let mut phase = 0i32;
            let mut start = 0usize; // ungapped position where dephasing began
            let mut pos = 0usize; // current ungapped position
            let mut started = false;

            for site in 0..length {
                if reference[site] == GAP {
                    phase = phase_forward(phase);
                }
                if seq[site] == GAP {
                    phase = phase_back(phase);
                } else if !started && starting_gaps_as_incomplete && phase != 0 {
                    phase = phase_back(phase);
                } else {
                    started = true;
                    pos += 1;
                }

                // Back in frame (or at the last column): keep the run if it
                // beats the longest one seen so far
                if (phase == 0 || site == length - 1)
                    && pos - start > 1
                    && pos - start > out[row].end - out[row].start
                {
                    out[row] = FrameshiftRegion { start, end: pos };
                }

                if phase == 0 {
                    start = pos;
                }
            }
        }
        out
    }

    /// Find the first premature stop codon of every row.
    ///
    /// Same phase tracking as [`frameshifts`](Alignment::frameshifts);
    /// non-gap characters of each scanned row accumulate into triplets which
    /// are upper-cased, U→T normalized and translated through `code`
    /// (unknown codons read as 'X'). A '*' translation records the 1-based
    /// ungapped position of the stop and halts that row's scan. The first
    /// row is the phase reference and is never scanned itself (entry 0 is
    /// always `None`).
    pub fn stop_codons<F>(&self, starting_gaps_as_incomplete: bool, code: F) -> Vec<Option<usize>>
    where
        F: Fn(&[u8; 3]) -> u8,
    {
        let nseq = self.nb_sequences();
        let length = self.length();
        let mut stops = vec![None; nseq];
        if nseq == 0 || length < 3 {
            return stops;
        }
        let reference = &self.store().record(0).chars;

        for row in 1..nseq {
            let seq = &self.store().record(row).chars;
            let mut phase = 0i32;
            let mut started = false;
            let mut pos = 0usize; // ungapped position on the scanned row
            let mut codon = [0u8; 3];
            let mut codonpos = 0usize;

            for site in 0..length - 2 {
                if reference[site] == GAP {
                    phase = phase_forward(phase);
                }
                if seq[site] == GAP {
                    phase = phase_back(phase);
                } else if !started && starting_gaps_as_incomplete && phase != 0 {
                    phase = phase_back(phase);
                } else {
                    started = true;
                }

                if seq[site] != GAP && (!starting_gaps_as_incomplete || started) {
                    codon[codonpos] = seq[site];
                    codonpos += 1;
                    pos += 1;
                }

                if codonpos == 3 {
                    let mut normalized = codon;
                    for c in &mut normalized {
                        *c = c.to_ascii_uppercase();
                        if *c == b'U' {
                            *c = b'T';
                        }
                    }
                    if code(&normalized) == b'*' {
                        stops[row] = Some(pos);
                        break;
                    }
                    codonpos = 0;
                }
            }
        }
        stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codon::standard_genetic_code;
    use crate::data::Alphabet;

    fn aln(rows: &[(&str, &str)]) -> Alignment {
        let mut a = Alignment::new(Alphabet::Nucleotide);
        for (name, chars) in rows {
            a.add_sequence(name, chars.as_bytes().to_vec(), "").unwrap();
        }
        a
    }

    #[test]
    fn test_identical_row_no_frameshift_no_stop() {
        let a = aln(&[("ref", "ATGAAAGGG"), ("s2", "ATGAAAGGG")]);
        let fs = a.frameshifts(false);
        assert_eq!(fs[1], FrameshiftRegion { start: 0, end: 0 });
        let stops = a.stop_codons(false, standard_genetic_code);
        assert_eq!(stops[1], None);
    }

    #[test]
    fn test_single_deletion_dephases_to_the_end() {
        // One gap in s2 retreats the phase; it never returns to 0
        let a = aln(&[("ref", "ATGAAAGGGCCC"), ("s2", "ATGA-AGGGCCC")]);
        let fs = a.frameshifts(false);
        // Dephasing begins at ungapped position 4 and runs to the last one
        assert_eq!(fs[1], FrameshiftRegion { start: 4, end: 11 });
    }

    #[test]
    fn test_gap_run_of_three_rephases() {
        // Three consecutive deletions wrap the phase back to 0: only the
        // region between the first and last gap is dephased, too short here
        // to qualify as a frameshift (runs of length <= 1 are ignored)
        let a = aln(&[("ref", "ATGAAAGGGCCC"), ("s2", "ATG---GGGCCC")]);
        let fs = a.frameshifts(false);
        assert_eq!(fs[1], FrameshiftRegion { start: 0, end: 0 });
    }

    #[test]
    fn test_reference_gap_advances_phase() {
        // Insertion relative to the reference dephases the scanned row
        let a = aln(&[("ref", "ATG-AAGGGCCC"), ("s2", "ATGCAAGGGCCC")]);
        let fs = a.frameshifts(false);
        assert!(fs[1].end - fs[1].start > 1);
    }

    #[test]
    fn test_starting_gaps_absorbed_as_incomplete() {
        // s2 starts mid-codon; without the flag this is a long frameshift,
        // with it the leading dephasing is absorbed
        let a = aln(&[("ref", "ATGAAAGGGCCC"), ("s2", "--GAAAGGGCCC")]);
        let without = a.frameshifts(false);
        assert!(without[1].end - without[1].start > 1);
        let with = a.frameshifts(true);
        assert_eq!(with[1], FrameshiftRegion { start: 0, end: 0 });
    }

    #[test]
    fn test_stop_codon_position_and_halt() {
        // s2 reads ATG TAA ...: stop after the 6th ungapped nucleotide
        let a = aln(&[("ref", "ATGAAAGGGCCC"), ("s2", "ATGTAAGGGCCC")]);
        let stops = a.stop_codons(false, standard_genetic_code);
        assert_eq!(stops[1], Some(6));
        // Reference row is never scanned
        assert_eq!(stops[0], None);
    }

    #[test]
    fn test_stop_codon_u_to_t_and_case_normalization() {
        let a = aln(&[("ref", "ATGAAAGGGCCC"), ("s2", "atguaagggccc")]);
        let stops = a.stop_codons(false, standard_genetic_code);
        assert_eq!(stops[1], Some(6));
    }

    #[test]
    fn test_stop_codon_respects_scanned_row_gaps() {
        // The gap splits the triplet: s2 reads ATG A,AG -> no TAA codon
        let a = aln(&[("ref", "ATGTAAGGGCCC"), ("s2", "ATGA-AGGGCCC")]);
        let stops = a.stop_codons(false, standard_genetic_code);
        assert_eq!(stops[1], None);
    }
}
