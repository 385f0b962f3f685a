// stats.rs - Per-site and per-alignment summaries: distributions, consensus,
// entropy, conservation, position-weight matrices

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::alphabet::{is_special, GAP, OTHER, POINT};
use crate::data::{Alignment, Alphabet};
use crate::error::{AlnError, Result};

/// Clustal "strong" physicochemical substitution groups
const STRONG_GROUPS: &[&[u8]] = &[
    b"STA", b"NEQK", b"NHQK", b"NDEQ", b"QHRK", b"MILV", b"MILF", b"HY", b"FYW",
];

/// Clustal "weak" physicochemical substitution groups
const WEAK_GROUPS: &[&[u8]] = &[
    b"CSA", b"ATV", b"SAG", b"STNK", b"STPA", b"SGND", b"SNDEQK", b"NDEQHK", b"NEQHRK", b"FVLIM",
    b"HFY",
];

/// Conservation status of one alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteConservation {
    /// All rows share one non-gap character
    Identical,
    /// Every row's character falls in one shared strong group (amino acids)
    Conserved,
    /// Every row's character falls in one shared weak group (amino acids)
    SemiConserved,
    NotConserved,
}

/// PSSM normalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Raw counts
    None,
    /// Frequency divided by the uniform frequency (1/alphabet size)
    Uniform,
    /// Per-site frequency
    Frequency,
    /// Per-site frequency divided by the character's global frequency
    Data,
    /// Per-site frequency rescaled by the column information content
    Logo,
}

impl std::str::FromStr for Normalization {
    type Err = AlnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Normalization::None),
            "unif" | "uniform" => Ok(Normalization::Uniform),
            "freq" | "frequency" => Ok(Normalization::Frequency),
            "data" => Ok(Normalization::Data),
            "logo" => Ok(Normalization::Logo),
            _ => Err(AlnError::UnsupportedNormalization(format!(
                "{}. Use: none, uniform, frequency, data, logo",
                s
            ))),
        }
    }
}

impl Normalization {
    pub fn description(&self) -> &str {
        match self {
            Normalization::None => "raw counts",
            Normalization::Uniform => "site frequency over uniform frequency",
            Normalization::Frequency => "site frequency",
            Normalization::Data => "site frequency over global character frequency",
            Normalization::Logo => "sequence-logo information content",
        }
    }
}

/// Position-specific scoring matrix: one score row per alphabet character,
/// in alphabet order, each with one value per alignment column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pssm {
    pub characters: Vec<u8>,
    pub scores: Vec<Vec<f64>>,
}

impl Pssm {
    /// Scores of one character across all columns.
    pub fn get(&self, c: u8) -> Option<&[f64]> {
        self.characters
            .iter()
            .position(|&x| x == c)
            .map(|i| self.scores[i].as_slice())
    }
}

impl Alignment {
    /// Character→count distribution (upper-cased) at one column.
    pub fn char_stats_site(&self, site: usize) -> Result<HashMap<u8, usize>> {
        if site >= self.length() {
            return Err(AlnError::OutOfRange {
                what: "site",
                index: site,
            });
        }
        let mut out = HashMap::new();
        for rec in self.iter() {
            *out.entry(rec.chars[site].to_ascii_uppercase()).or_insert(0) += 1;
        }
        Ok(out)
    }

    /// Global character→count distribution (upper-cased) over the whole
    /// matrix. Feeds the PSSM data normalization.
    pub fn char_stats(&self) -> HashMap<u8, usize> {
        let mut out = HashMap::new();
        for rec in self.iter() {
            for &c in &rec.chars {
                *out.entry(c.to_ascii_uppercase()).or_insert(0) += 1;
            }
        }
        out
    }

    /// Most frequent character per column, with its occurrence count.
    ///
    /// The gap character is the initial default (reported with the full row
    /// count when nothing beats it); ties keep the first character
    /// encountered, scanning rows top to bottom. With `exclude_gaps`, gaps
    /// are never selected, even as the tiebreak winner.
    pub fn max_char_stats(&self, exclude_gaps: bool) -> (Vec<u8>, Vec<usize>) {
        let length = self.length();
        let nseq = self.nb_sequences();
        let mut out = vec![GAP; length];
        let mut occur = vec![nseq; length];

        for site in 0..length {
            // First-seen order makes the tiebreak deterministic
            let mut counts: Vec<(u8, usize)> = Vec::new();
            for rec in self.iter() {
                let c = rec.chars[site].to_ascii_uppercase();
                match counts.iter_mut().find(|(k, _)| *k == c) {
                    Some(entry) => entry.1 += 1,
                    None => counts.push((c, 1)),
                }
            }
            let mut max = 0;
            for &(c, n) in &counts {
                if !(exclude_gaps && c == GAP) && n > max {
                    out[site] = c;
                    occur[site] = n;
                    max = n;
                }
            }
        }
        (out, occur)
    }

    /// Majority consensus: a single-row alignment built from
    /// [`max_char_stats`](Alignment::max_char_stats).
    pub fn consensus(&self, exclude_gaps: bool) -> Alignment {
        let (chars, _) = self.max_char_stats(exclude_gaps);
        let mut cons = Alignment::new(self.alphabet());
        // Single fixed-width row, cannot fail
        let _ = cons.add_sequence("consensus", chars, "");
        cons
    }

    /// Shannon entropy (natural log) of one column.
    ///
    /// MATCH-POINT and OTHER characters are always excluded, gaps only when
    /// `remove_gaps` is set. Returns NaN when the effective sample is empty.
    pub fn entropy(&self, site: usize, remove_gaps: bool) -> Result<f64> {
        if site >= self.length() {
            return Err(AlnError::OutOfRange {
                what: "site",
                index: site,
            });
        }
        let mut occur: HashMap<u8, usize> = HashMap::new();
        let mut total = 0usize;
        for rec in self.iter() {
            let c = rec.chars[site].to_ascii_uppercase();
            if c != OTHER && c != POINT && (!remove_gaps || c != GAP) {
                *occur.entry(c).or_insert(0) += 1;
                total += 1;
            }
        }
        if total == 0 {
            return Ok(f64::NAN);
        }
        let mut entropy = 0.0;
        for &count in occur.values() {
            let proba = count as f64 / total as f64;
            entropy -= proba * proba.ln();
        }
        Ok(entropy)
    }

    /// Mean number of distinct non-gap/non-special characters per column,
    /// over the columns holding at least one such character.
    pub fn avg_alleles_per_site(&self) -> f64 {
        let mut nb_alleles = 0usize;
        let mut nb_sites = 0usize;
        for site in 0..self.length() {
            let mut alleles: Vec<u8> = Vec::new();
            let mut only_gap = true;
            for rec in self.iter() {
                let c = rec.chars[site].to_ascii_uppercase();
                if !is_special(c) {
                    if !alleles.contains(&c) {
                        alleles.push(c);
                    }
                    only_gap = false;
                }
            }
            if !only_gap {
                nb_sites += 1;
            }
            nb_alleles += alleles.len();
        }
        nb_alleles as f64 / nb_sites as f64
    }

    /// Number of columns holding at least two distinct characters, gaps and
    /// special characters not counting.
    pub fn nb_variable_sites(&self) -> usize {
        let mut nb = 0;
        for site in 0..self.length() {
            let mut seen: Vec<u8> = Vec::new();
            for rec in self.iter() {
                let c = rec.chars[site];
                if !is_special(c) && !seen.contains(&c) {
                    seen.push(c);
                    if seen.len() > 1 {
                        break;
                    }
                }
            }
            if seen.len() > 1 {
                nb += 1;
            }
        }
        nb
    }

    /// Conservation status of one column.
    ///
    /// Identical when all rows share one non-gap character; the strong/weak
    /// group classification only applies to amino-acid alignments.
    pub fn site_conservation(&self, position: usize) -> Result<SiteConservation> {
        if position >= self.length() {
            return Err(AlnError::OutOfRange {
                what: "position",
                index: position,
            });
        }

        let mut strong_counts = vec![0usize; STRONG_GROUPS.len()];
        let mut weak_counts = vec![0usize; WEAK_GROUPS.len()];
        let mut same = true;
        let mut prev: Option<u8> = None;

        for rec in self.iter() {
            let c = rec.chars[position].to_ascii_uppercase();
            if self.alphabet() == Alphabet::AminoAcid {
                for (i, group) in STRONG_GROUPS.iter().enumerate() {
                    if group.contains(&c) {
                        strong_counts[i] += 1;
                    }
                }
                for (i, group) in WEAK_GROUPS.iter().enumerate() {
                    if group.contains(&c) {
                        weak_counts[i] += 1;
                    }
                }
            }
            if prev.map_or(false, |p| p != c) || c == GAP {
                same = false;
            }
            prev = Some(c);
        }

        if same {
            return Ok(SiteConservation::Identical);
        }
        let nseq = self.nb_sequences();
        if strong_counts.iter().any(|&n| n == nseq) {
            return Ok(SiteConservation::Conserved);
        }
        if weak_counts.iter().any(|&n| n == nseq) {
            return Ok(SiteConservation::SemiConserved);
        }
        Ok(SiteConservation::NotConserved)
    }

    /// Position-specific scoring matrix.
    ///
    /// Raw per-character, per-column counts (upper-cased, alphabet
    /// characters only), with `pseudocount` added to every cell when
    /// positive, put through the chosen [`Normalization`]. `use_log2`
    /// applies a final log2 transform, except under `Logo` which carries its
    /// own information-content rescaling.
    pub fn pssm(
        &self,
        use_log2: bool,
        pseudocount: f64,
        normalization: Normalization,
    ) -> Result<Pssm> {
        let characters = self.alphabet().characters()?.to_vec();
        let nchars = characters.len();
        let length = self.length();
        let nseq = self.nb_sequences() as f64;

        // Per-character normalization factors
        let denom = nseq + nchars as f64 * pseudocount;
        let mut factors = vec![1.0; nchars];
        match normalization {
            Normalization::None => {}
            Normalization::Uniform => {
                let f = 1.0 / denom / (1.0 / nchars as f64);
                factors.iter_mut().for_each(|x| *x = f);
            }
            Normalization::Frequency => {
                factors.iter_mut().for_each(|x| *x = 1.0 / denom);
            }
            Normalization::Logo => {
                factors.iter_mut().for_each(|x| *x = 1.0 / nseq);
            }
            Normalization::Data => {
                let stats = self.char_stats();
                let mut total = 0.0;
                for &c in &characters {
                    match stats.get(&c) {
                        Some(&n) => total += n as f64,
                        None => return Err(AlnError::UnknownCharacter(c)),
                    }
                }
                for (i, &c) in characters.iter().enumerate() {
                    let freq = stats[&c] as f64 / total;
                    factors[i] = 1.0 / denom / freq;
                }
            }
        }

        // Raw counts
        let mut scores = vec![vec![0.0f64; length]; nchars];
        for rec in self.iter() {
            for (site, &raw) in rec.chars.iter().enumerate() {
                let c = raw.to_ascii_uppercase();
                if let Some(i) = characters.iter().position(|&x| x == c) {
                    scores[i][site] += 1.0;
                }
            }
        }

        if pseudocount > 0.0 {
            for row in &mut scores {
                for v in row.iter_mut() {
                    *v += pseudocount;
                }
            }
        }

        // Normalize, accumulating per-column entropy (bits) for Logo
        let mut entropy = vec![0.0f64; length];
        for (i, row) in scores.iter_mut().enumerate() {
            for (site, v) in row.iter_mut().enumerate() {
                *v *= factors[i];
                if normalization == Normalization::Logo && *v > 0.0 {
                    entropy[site] -= *v * v.log2();
                }
            }
        }

        if normalization == Normalization::Logo {
            let max_bits = (nchars as f64).log2();
            for row in &mut scores {
                for (site, v) in row.iter_mut().enumerate() {
                    *v *= max_bits - entropy[site];
                }
            }
        } else if use_log2 {
            for row in &mut scores {
                for v in row.iter_mut() {
                    *v = v.log2();
                }
            }
        }

        Ok(Pssm { characters, scores })
    }
}
