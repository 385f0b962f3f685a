// perturb.rs - Simulation operators: shuffling, swapping, recombination,
// gap injection, point mutation, bootstrap and subsampling

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::alphabet::{is_special, GAP};
use crate::data::{Alignment, Alphabet};
use crate::error::{AlnError, Result};

/// Random permutation of 0..n.
fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

impl Alignment {
    /// Shuffle characters vertically within randomly chosen columns.
    ///
    /// `rate * length` columns get a full vertical shuffle among all rows;
    /// `rate * (1-rate) * length` further columns get a partial shuffle
    /// restricted to `rogue_rate * nb_sequences` "rogue" rows. With
    /// `rogue_first`, the row permutation is drawn before the column
    /// permutation, so a fixed seed designates the same rogues across
    /// alignments of different lengths.
    ///
    /// Returns the names of the rogue rows.
    pub fn shuffle_sites<R: Rng + ?Sized>(
        &mut self,
        rate: f64,
        rogue_rate: f64,
        rogue_first: bool,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(AlnError::InvalidArgument(
                "shuffle site rate must be in [0,1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&rogue_rate) {
            return Err(AlnError::InvalidArgument(
                "shuffle rogue rate must be in [0,1]".to_string(),
            ));
        }

        let length = self.length();
        let nseq = self.nb_sequences();
        let nb_sites = (rate * length as f64) as usize;
        let nb_rogue_sites = (rate * (1.0 - rate) * length as f64) as usize;
        let nb_rogue_seqs = (rogue_rate * nseq as f64) as usize;

        let (tax_perm, site_perm) = if rogue_first {
            let tax = permutation(nseq, rng);
            let sites = permutation(length, rng);
            (tax, sites)
        } else {
            let sites = permutation(length, rng);
            let tax = permutation(nseq, rng);
            (tax, sites)
        };

        if nb_sites + nb_rogue_sites > length {
            return Err(AlnError::InvalidArgument(format!(
                "too many sites to shuffle ({}+{}>{})",
                nb_rogue_sites, nb_sites, length
            )));
        }

        // Full vertical shuffle on the first batch of columns
        for &site in &site_perm[..nb_sites] {
            let mut n = nseq;
            while n > 1 {
                let r = rng.gen_range(0..n);
                n -= 1;
                let (a, b) = if n == r {
                    continue;
                } else {
                    self.store_mut().pair_mut(n, r)
                };
                std::mem::swap(&mut a.chars[site], &mut b.chars[site]);
            }
        }

        // Partial shuffle restricted to the rogue rows
        for &site in &site_perm[nb_sites..nb_sites + nb_rogue_sites] {
            for r in 0..nb_rogue_seqs {
                let j = rng.gen_range(0..r + 1);
                if tax_perm[r] != tax_perm[j] {
                    let (a, b) = self.store_mut().pair_mut(tax_perm[r], tax_perm[j]);
                    std::mem::swap(&mut a.chars[site], &mut b.chars[site]);
                }
            }
        }

        Ok(tax_perm[..nb_rogue_seqs]
            .iter()
            .map(|&row| self.store().record(row).name.clone())
            .collect())
    }

    /// Exchange sequence tails between `rate * nb_sequences / 2` row pairs,
    /// each from a random column to the end. Out-of-range rates are a
    /// silent no-op.
    pub fn swap<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        if !(0.0..=1.0).contains(&rate) {
            return;
        }
        let nb_sites = self.length();
        let nseq = self.nb_sequences();
        if nb_sites == 0 || nseq == 0 {
            return;
        }
        let nb_to_shuffle = (rate * nseq as f64) as usize;
        let perm = permutation(nseq, rng);

        for i in 0..nb_to_shuffle / 2 {
            let pos = rng.gen_range(0..nb_sites);
            let (a, b) = self.store_mut().pair_mut(perm[i], perm[i + nb_to_shuffle / 2]);
            for site in pos..nb_sites {
                std::mem::swap(&mut a.chars[site], &mut b.chars[site]);
            }
        }
    }

    /// Copy a contiguous block of `len_prop * length` columns from one row
    /// of each pair onto the other, at a random offset, over
    /// `prop * nb_sequences` pairs. `prop` above 0.5 (pairs would overlap)
    /// or out-of-range proportions are a silent no-op.
    pub fn recombine<R: Rng + ?Sized>(&mut self, prop: f64, len_prop: f64, rng: &mut R) {
        if !(0.0..=0.5).contains(&prop) || !(0.0..=1.0).contains(&len_prop) {
            return;
        }
        let length = self.length();
        let nseq = self.nb_sequences();
        if length == 0 || nseq == 0 {
            return;
        }
        let nb = (prop * nseq as f64) as usize;
        let len_to_recomb = (len_prop * length as f64) as usize;
        let perm = permutation(nseq, rng);

        for i in 0..nb {
            let pos = rng.gen_range(0..=length - len_to_recomb);
            let (dst, src) = self.store_mut().pair_mut(perm[i], perm[i + nb]);
            dst.chars[pos..pos + len_to_recomb]
                .copy_from_slice(&src.chars[pos..pos + len_to_recomb]);
        }
    }

    /// Overwrite `len_prop * length` randomly chosen columns with gaps, in
    /// `prop * nb_sequences` randomly chosen rows. Out-of-range proportions
    /// are a silent no-op.
    pub fn add_gaps<R: Rng + ?Sized>(&mut self, len_prop: f64, prop: f64, rng: &mut R) {
        if !(0.0..=1.0).contains(&prop) || !(0.0..=1.0).contains(&len_prop) {
            return;
        }
        let length = self.length();
        let nseq = self.nb_sequences();
        let nb = (prop * nseq as f64) as usize;
        let nb_gaps = (len_prop * length as f64) as usize;
        let row_perm = permutation(nseq, rng);

        for &row in &row_perm[..nb] {
            let site_perm = permutation(length, rng);
            let rec = self.store_mut().record_mut(row);
            for &site in &site_perm[..nb_gaps] {
                rec.chars[site] = GAP;
            }
        }
    }

    /// Replace each non-gap, non-special character with a uniformly random
    /// alphabet character with probability `rate` (sequencing-error style
    /// noise). Rates above 1 are clamped; rates at or below 0 are a no-op.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        if rate <= 0.0 {
            return;
        }
        let rate = rate.min(1.0);
        let characters: &[u8] = if self.alphabet() == Alphabet::AminoAcid {
            crate::data::alphabet::AMINO_ACIDS
        } else {
            crate::data::alphabet::NUCLEOTIDES
        };
        for rec in self.store_mut().iter_mut() {
            for c in rec.chars.iter_mut() {
                let r: f64 = rng.gen();
                if r <= rate && !is_special(*c) {
                    *c = characters[rng.gen_range(0..characters.len())];
                }
            }
        }
    }

    /// Pick `prop * nb_sequences` rows as "rogue" taxa and shuffle
    /// `prop_len * length` randomly chosen positions within each of them.
    ///
    /// Returns (rogue names, intact names). Out-of-range proportions return
    /// empty lists without touching the alignment.
    pub fn simulate_rogue<R: Rng + ?Sized>(
        &mut self,
        prop: f64,
        prop_len: f64,
        rng: &mut R,
    ) -> (Vec<String>, Vec<String>) {
        if !(0.0..=1.0).contains(&prop) || !(0.0..=1.0).contains(&prop_len) {
            return (Vec::new(), Vec::new());
        }
        let prop = if prop_len == 0.0 { 0.0 } else { prop };

        let length = self.length();
        let nseq = self.nb_sequences();
        let nb = (prop * nseq as f64) as usize;
        let nb_sites = (prop_len * length as f64) as usize;
        let perm = permutation(nseq, rng);

        for &row in &perm[..nb] {
            let sites = permutation(length, rng);
            // In-place Fisher-Yates over the chosen positions
            for i in 0..nb_sites {
                let j = rng.gen_range(0..i + 1);
                let rec = self.store_mut().record_mut(row);
                rec.chars.swap(sites[i], sites[j]);
            }
        }

        let names = |rows: &[usize]| -> Vec<String> {
            rows.iter()
                .map(|&r| self.store().record(r).name.clone())
                .collect()
        };
        (names(&perm[..nb]), names(&perm[nb..]))
    }

    /// Classic nonparametric bootstrap: draw `length` column indices
    /// uniformly with replacement and rebuild every row from them.
    pub fn build_bootstrap<R: Rng + ?Sized>(&self, rng: &mut R) -> Alignment {
        let length = self.length();
        let indices: Vec<usize> = (0..length).map(|_| rng.gen_range(0..length)).collect();

        let mut boot = Alignment::new(self.alphabet());
        for rec in self.iter() {
            let chars: Vec<u8> = indices.iter().map(|&i| rec.chars[i]).collect();
            // Same width for every row, cannot fail
            let _ = boot.add_sequence(&rec.name, chars, &rec.comment);
        }
        boot
    }

    /// Draw `nb` rows without replacement into a new alignment.
    pub fn sample<R: Rng + ?Sized>(&self, nb: usize, rng: &mut R) -> Result<Alignment> {
        if nb < 1 || nb > self.nb_sequences() {
            return Err(AlnError::InvalidArgument(format!(
                "sample size must be in [1,{}]",
                self.nb_sequences()
            )));
        }
        let perm = permutation(self.nb_sequences(), rng);
        let mut out = Alignment::new(self.alphabet());
        for &row in &perm[..nb] {
            let rec = self.store().record(row);
            out.add_sequence(&rec.name, rec.chars.clone(), &rec.comment)?;
        }
        Ok(out)
    }

    /// Downsample (rarefy) the underlying dataset described by per-row
    /// multiplicities: draw `nb` individuals without replacement from the
    /// implied population and keep the distinct rows that were hit, in
    /// original row order.
    ///
    /// A count naming an unknown row is an error; rows missing from
    /// `counts` weigh 0. `nb` larger than the population is an error.
    pub fn rarefy<R: Rng + ?Sized>(
        &self,
        nb: usize,
        counts: &HashMap<String, usize>,
        rng: &mut R,
    ) -> Result<Alignment> {
        for name in counts.keys() {
            if !self.contains(name) {
                return Err(AlnError::UnknownSequence(name.clone()));
            }
        }

        let mut population: Vec<usize> = Vec::new();
        for (row, rec) in self.iter().enumerate() {
            let count = counts.get(&rec.name).copied().unwrap_or(0);
            population.extend(std::iter::repeat(row).take(count));
        }
        if nb > population.len() {
            return Err(AlnError::InvalidArgument(format!(
                "cannot sample {} individuals from a population of {}",
                nb,
                population.len()
            )));
        }

        population.shuffle(rng);
        let mut hit = vec![false; self.nb_sequences()];
        for &row in &population[..nb] {
            hit[row] = true;
        }

        let mut out = Alignment::new(self.alphabet());
        for (row, rec) in self.iter().enumerate() {
            if hit[row] {
                out.add_sequence(&rec.name, rec.chars.clone(), &rec.comment)?;
            }
        }
        Ok(out)
    }
}

/// Generate an alignment of uniformly random characters, rows named
/// `Seq0000`, `Seq0001`, ...
pub fn random_alignment<R: Rng + ?Sized>(
    alphabet: Alphabet,
    length: usize,
    nb_seqs: usize,
    rng: &mut R,
) -> Result<Alignment> {
    let characters = alphabet.characters()?;
    let mut out = Alignment::new(alphabet);
    for i in 0..nb_seqs {
        let chars: Vec<u8> = (0..length)
            .map(|_| characters[rng.gen_range(0..characters.len())])
            .collect();
        out.add_sequence(&format!("Seq{:04}", i), chars, "")?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn check_invariant(a: &Alignment) {
        for rec in a.iter() {
            assert_eq!(rec.chars.len(), a.length());
        }
    }

    fn column_multiset(a: &Alignment, site: usize) -> Vec<u8> {
        let mut col: Vec<u8> = a.iter().map(|r| r.chars[site]).collect();
        col.sort_unstable();
        col
    }

    #[test]
    fn test_shuffle_sites_preserves_column_content() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = random_alignment(Alphabet::Nucleotide, 50, 10, &mut rng).unwrap();
        let before: Vec<Vec<u8>> = (0..50).map(|s| column_multiset(&a, s)).collect();
        let rogues = a.shuffle_sites(0.5, 0.3, true, &mut rng).unwrap();
        assert_eq!(rogues.len(), 3);
        check_invariant(&a);
        // Vertical shuffling never moves characters across columns
        for site in 0..50 {
            assert_eq!(column_multiset(&a, site), before[site]);
        }
    }

    #[test]
    fn test_shuffle_sites_rejects_bad_rates() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = random_alignment(Alphabet::Nucleotide, 10, 4, &mut rng).unwrap();
        assert!(a.shuffle_sites(1.5, 0.0, true, &mut rng).is_err());
        assert!(a.shuffle_sites(0.5, -0.1, true, &mut rng).is_err());
    }

    #[test]
    fn test_shuffle_sites_reproducible() {
        let mut a = random_alignment(
            Alphabet::Nucleotide,
            30,
            8,
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        let mut b = a.clone();
        let rogues_a = a
            .shuffle_sites(0.4, 0.25, true, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let rogues_b = b
            .shuffle_sites(0.4, 0.25, true, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(rogues_a, rogues_b);
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.chars, rb.chars);
        }
    }

    #[test]
    fn test_swap_out_of_range_is_noop() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut a = random_alignment(Alphabet::Nucleotide, 20, 6, &mut rng).unwrap();
        let before: Vec<Vec<u8>> = a.iter().map(|r| r.chars.clone()).collect();
        a.swap(1.5, &mut rng);
        a.swap(-0.1, &mut rng);
        let after: Vec<Vec<u8>> = a.iter().map(|r| r.chars.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_swap_preserves_row_multiset_per_column() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut a = random_alignment(Alphabet::Nucleotide, 30, 8, &mut rng).unwrap();
        let before: Vec<Vec<u8>> = (0..30).map(|s| column_multiset(&a, s)).collect();
        a.swap(1.0, &mut rng);
        check_invariant(&a);
        for site in 0..30 {
            assert_eq!(column_multiset(&a, site), before[site]);
        }
    }

    #[test]
    fn test_recombine_copies_blocks() {
        let mut a = Alignment::new(Alphabet::Nucleotide);
        a.add_sequence("s1", b"AAAAAAAA".to_vec(), "").unwrap();
        a.add_sequence("s2", b"CCCCCCCC".to_vec(), "").unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        a.recombine(0.5, 0.5, &mut rng);
        check_invariant(&a);
        // One row received a 4-column block from the other
        let total_a: usize = a
            .iter()
            .map(|r| r.chars.iter().filter(|&&c| c == b'A').count())
            .sum();
        assert!(total_a == 4 || total_a == 12);
        // prop > 0.5 is a silent no-op
        let before: Vec<Vec<u8>> = a.iter().map(|r| r.chars.clone()).collect();
        a.recombine(0.6, 0.5, &mut rng);
        let after: Vec<Vec<u8>> = a.iter().map(|r| r.chars.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_gaps_counts() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut a = random_alignment(Alphabet::Nucleotide, 40, 10, &mut rng).unwrap();
        a.add_gaps(0.25, 0.5, &mut rng);
        check_invariant(&a);
        let gappy_rows = a
            .iter()
            .filter(|r| r.chars.iter().filter(|&&c| c == GAP).count() == 10)
            .count();
        let clean_rows = a
            .iter()
            .filter(|r| !r.chars.contains(&GAP))
            .count();
        assert_eq!(gappy_rows, 5);
        assert_eq!(clean_rows, 5);
    }

    #[test]
    fn test_mutate_spares_gaps_and_specials() {
        let mut a = Alignment::new(Alphabet::Nucleotide);
        a.add_sequence("s1", b"A-C.G*TT".to_vec(), "").unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        a.mutate(1.0, &mut rng);
        let chars = &a.get("s1").unwrap().chars;
        assert_eq!(chars[1], b'-');
        assert_eq!(chars[3], b'.');
        assert_eq!(chars[5], b'*');
        for &c in chars {
            assert!(is_special(c) || crate::data::alphabet::NUCLEOTIDES.contains(&c));
        }
    }

    #[test]
    fn test_simulate_rogue_names_partition() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut a = random_alignment(Alphabet::Nucleotide, 30, 10, &mut rng).unwrap();
        let (rogues, intact) = a.simulate_rogue(0.3, 0.5, &mut rng);
        assert_eq!(rogues.len(), 3);
        assert_eq!(intact.len(), 7);
        for name in rogues.iter().chain(intact.iter()) {
            assert!(a.contains(name));
        }
        check_invariant(&a);
        // Out-of-range proportions: no-op with empty lists
        let (r, i) = a.simulate_rogue(1.2, 0.5, &mut rng);
        assert!(r.is_empty() && i.is_empty());
    }

    #[test]
    fn test_build_bootstrap_shape_and_provenance() {
        let mut rng = StdRng::seed_from_u64(29);
        let a = random_alignment(Alphabet::Nucleotide, 25, 6, &mut rng).unwrap();
        let boot = a.build_bootstrap(&mut rng);
        assert_eq!(boot.nb_sequences(), a.nb_sequences());
        assert_eq!(boot.length(), a.length());
        // Every bootstrap column is a copy of some source column
        let source_cols: Vec<Vec<u8>> = (0..a.length())
            .map(|s| a.iter().map(|r| r.chars[s]).collect())
            .collect();
        for site in 0..boot.length() {
            let col: Vec<u8> = boot.iter().map(|r| r.chars[site]).collect();
            assert!(source_cols.contains(&col));
        }
    }

    #[test]
    fn test_sample() {
        let mut rng = StdRng::seed_from_u64(31);
        let a = random_alignment(Alphabet::Nucleotide, 10, 8, &mut rng).unwrap();
        let s = a.sample(3, &mut rng).unwrap();
        assert_eq!(s.nb_sequences(), 3);
        assert_eq!(s.length(), 10);
        for rec in s.iter() {
            assert_eq!(a.get(&rec.name).unwrap().chars, rec.chars);
        }
        assert!(a.sample(0, &mut rng).is_err());
        assert!(a.sample(9, &mut rng).is_err());
    }

    #[test]
    fn test_rarefy() {
        let mut rng = StdRng::seed_from_u64(37);
        let a = random_alignment(Alphabet::Nucleotide, 10, 4, &mut rng).unwrap();
        let mut counts = HashMap::new();
        counts.insert("Seq0000".to_string(), 5);
        counts.insert("Seq0001".to_string(), 3);
        // Seq0002/Seq0003 weigh 0 and can never be drawn
        let r = a.rarefy(4, &counts, &mut rng).unwrap();
        assert!(r.nb_sequences() <= 2 && r.nb_sequences() >= 1);
        assert!(!r.contains("Seq0002"));
        // Population is 8: asking for more fails
        assert!(a.rarefy(9, &counts, &mut rng).is_err());
        // Unknown name in counts fails
        counts.insert("nope".to_string(), 1);
        assert!(matches!(
            a.rarefy(2, &counts, &mut rng),
            Err(AlnError::UnknownSequence(_))
        ));
    }

    #[test]
    fn test_random_alignment() {
        let mut rng = StdRng::seed_from_u64(41);
        let a = random_alignment(Alphabet::AminoAcid, 12, 3, &mut rng).unwrap();
        assert_eq!(a.length(), 12);
        assert_eq!(a.nb_sequences(), 3);
        assert!(a.contains("Seq0002"));
        assert!(random_alignment(Alphabet::Unknown, 5, 2, &mut rng).is_err());
    }
}
