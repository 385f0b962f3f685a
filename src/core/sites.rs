// sites.rs - Column filtering, trimming, masking and sub-alignment extraction

use rand::Rng;

use crate::data::alphabet::{GAP, POINT};
use crate::data::Alignment;
use crate::error::{AlnError, Result};

/// Clamp a gap cutoff to [0,1]; out-of-range values fall back to 0.
fn clamp_cutoff(cutoff: f64) -> f64 {
    if !(0.0..=1.0).contains(&cutoff) {
        0.0
    } else {
        cutoff
    }
}

/// True when `nbgaps` gaps out of `total` positions meet the removal rule:
/// cutoff 0 removes anything with at least one gap, cutoffs in (0,1] remove
/// when the gap count reaches cutoff*total.
fn gappy_enough(nbgaps: usize, total: usize, cutoff: f64) -> bool {
    if cutoff > 0.0 {
        nbgaps as f64 >= cutoff * total as f64
    } else {
        nbgaps > 0
    }
}

impl Alignment {
    /// Remove columns whose gap proportion meets the cutoff.
    ///
    /// If `ends` is true, only removable columns belonging to an unbroken
    /// removable run touching the first or the last column are deleted;
    /// interior removable columns survive. Columns are dropped by a single
    /// retained-index rebuild of every row.
    ///
    /// Returns the number of consecutive removed columns at the start and at
    /// the end of the alignment.
    pub fn remove_gap_sites(&mut self, cutoff: f64, ends: bool) -> (usize, usize) {
        let cutoff = clamp_cutoff(cutoff);
        let length = self.length();
        let nseq = self.nb_sequences();

        let mut removable = vec![false; length];
        for site in 0..length {
            let nbgaps = self
                .store()
                .iter()
                .filter(|rec| rec.chars[site] == GAP)
                .count();
            removable[site] = gappy_enough(nbgaps, nseq, cutoff);
        }

        let leading = removable.iter().take_while(|&&r| r).count();
        let trailing = if leading == length {
            length
        } else {
            removable.iter().rev().take_while(|&&r| r).count()
        };

        let retained: Vec<usize> = (0..length)
            .filter(|&site| {
                if !removable[site] {
                    true
                } else if ends {
                    // Keep interior removable columns
                    site >= leading && site < length - trailing
                } else {
                    false
                }
            })
            .collect();

        if retained.len() != length {
            for rec in self.store_mut().iter_mut() {
                rec.chars = retained.iter().map(|&site| rec.chars[site]).collect();
            }
            self.set_length(Some(retained.len()));
        }

        (leading, trailing)
    }

    /// Remove rows whose gap proportion meets the cutoff (same rule as
    /// `remove_gap_sites`). Surviving rows keep their relative order.
    pub fn remove_gap_seqs(&mut self, cutoff: f64) {
        let cutoff = clamp_cutoff(cutoff);
        let length = self.length();
        self.store_mut().retain_rows(|rec| {
            let nbgaps = rec.chars.iter().filter(|&&c| c == GAP).count();
            !gappy_enough(nbgaps, length, cutoff)
        });
        if self.is_empty() {
            self.set_length(None);
        }
    }

    /// Remove `size` characters from the start or the end of every row.
    pub fn trim_sequences(&mut self, size: usize, from_start: bool) -> Result<()> {
        if size >= self.length() {
            return Err(AlnError::InvalidArgument(format!(
                "trim size must be < alignment length ({})",
                self.length()
            )));
        }
        let new_len = self.length() - size;
        for rec in self.store_mut().iter_mut() {
            if from_start {
                rec.chars.drain(..size);
            } else {
                rec.chars.truncate(new_len);
            }
        }
        self.set_length(Some(new_len));
        Ok(())
    }

    /// Mask `len` columns starting at `start` with the alphabet's
    /// all-ambiguous character ('N' or 'X'). The run is clipped at the end
    /// of the alignment.
    pub fn mask(&mut self, start: usize, len: usize) -> Result<()> {
        if start > self.length() {
            return Err(AlnError::InvalidArgument(format!(
                "mask start position cannot be > alignment length ({})",
                self.length()
            )));
        }
        let rep = self.alphabet().ambiguity()?;
        let stop = (start + len).min(self.length());
        for rec in self.store_mut().iter_mut() {
            for c in &mut rec.chars[start..stop] {
                *c = rep;
            }
        }
        Ok(())
    }

    /// Extract the columns `[start, start+len)` as a new alignment.
    pub fn sub_align(&self, start: usize, len: usize) -> Result<Alignment> {
        if start > self.length() {
            return Err(AlnError::OutOfRange {
                what: "start",
                index: start,
            });
        }
        if start + len > self.length() {
            return Err(AlnError::OutOfRange {
                what: "start+length",
                index: start + len,
            });
        }
        let mut sub = Alignment::new(self.alphabet());
        for rec in self.iter() {
            sub.add_sequence(&rec.name, rec.chars[start..start + len].to_vec(), &rec.comment)?;
        }
        Ok(sub)
    }

    /// Extract a sub-alignment of the given length at a random start column.
    pub fn rand_sub_align<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Result<Alignment> {
        if len > self.length() {
            return Err(AlnError::InvalidArgument(
                "sub alignment is larger than original alignment".to_string(),
            ));
        }
        if len == 0 {
            return Err(AlnError::InvalidArgument(
                "sub alignment cannot have zero length".to_string(),
            ));
        }
        let start = rng.gen_range(0..=self.length() - len);
        self.sub_align(start, len)
    }

    /// Replace match-point characters ('.') with the corresponding character
    /// of the first row. A '.' in the first row itself is left unchanged.
    pub fn replace_match_chars(&mut self) {
        if self.nb_sequences() <= 1 {
            return;
        }
        let length = self.length();
        let reference = self.store().record(0).chars.clone();
        for row in 1..self.nb_sequences() {
            let rec = self.store_mut().record_mut(row);
            for site in 0..length {
                if reference[site] != POINT && rec.chars[site] == POINT {
                    rec.chars[site] = reference[site];
                }
            }
        }
    }

    /// Replace, in every row but the first, characters identical to the
    /// first row with the match-point character.
    pub fn diff_with_first(&mut self) {
        if self.nb_sequences() < 2 {
            return;
        }
        let reference = self.store().record(0).chars.clone();
        for row in 1..self.nb_sequences() {
            let rec = self.store_mut().record_mut(row);
            for (site, c) in rec.chars.iter_mut().enumerate() {
                if *c == reference[site] {
                    *c = POINT;
                }
            }
        }
    }
}
