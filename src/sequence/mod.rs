//! Locus alignments and their summary statistics.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Gap and missing data characters, plus the IUPAC ambiguity codes.
pub const DEFAULT_SKIP_CHARS: &str = "-N?.RYKMSWBDHV";

const GAP: u8 = b'-';

/// Locus alignments, keyed by locus id and then by taxon.
pub type Loci = BTreeMap<String, BTreeMap<String, String>>;

/// Reads [`Loci`] from a JSON file.
///
/// ```rust
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("alignments.json");
/// std::fs::write(&path, r#"{"locus1": {"A": "ACGT", "B": "ACGA"}}"#)?;
///
/// let loci = phyloacc::sequence::read_loci(&path)?;
/// assert_eq!(loci["locus1"]["B"], "ACGA");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn read_loci<P>(path: &P) -> Result<Loci, Report>
where
    P: AsRef<Path> + Debug,
{
    let input = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read alignments: {path:?}"))?;
    let loci = serde_json::from_str(&input)
        .wrap_err_with(|| format!("Failed to deserialize alignments: {path:?}"))
        .suggestion("Alignments must be a JSON object of loci, each mapping taxa to sequences.")?;
    Ok(loci)
}

// ----------------------------------------------------------------------------
// Skip Characters
// ----------------------------------------------------------------------------

/// Characters that make an alignment column unusable (gaps, missing and ambiguous bases).
///
/// Matching is case-insensitive.
///
/// ```rust
/// use phyloacc::sequence::SkipChars;
/// let skip = SkipChars::default();
/// assert!(skip.contains(b'-'));
/// assert!(skip.contains(b'n'));
/// assert!(skip.contains(b'R'));
/// assert!(!skip.contains(b'A'));
///
/// let skip: SkipChars = "-N".parse()?;
/// assert!(!skip.contains(b'R'));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub struct SkipChars {
    chars: String,
    lookup: Vec<bool>,
}

impl Default for SkipChars {
    fn default() -> Self {
        SkipChars::new(DEFAULT_SKIP_CHARS)
    }
}

#[rustfmt::skip]
impl Display for SkipChars { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.chars) } }
#[rustfmt::skip]
impl From<String> for SkipChars { fn from(chars: String) -> Self { SkipChars::new(&chars) } }
#[rustfmt::skip]
impl From<SkipChars> for String { fn from(skip: SkipChars) -> Self { skip.chars } }

impl FromStr for SkipChars {
    type Err = Report;
    fn from_str(s: &str) -> Result<Self, Report> {
        match s.is_ascii() {
            true => Ok(SkipChars::new(s)),
            false => Err(eyre!("Skip characters must be ASCII: {s:?}")),
        }
    }
}

impl SkipChars {
    pub fn new(chars: &str) -> Self {
        let mut lookup = vec![false; 256];
        for c in chars.bytes() {
            lookup[c.to_ascii_uppercase() as usize] = true;
            lookup[c.to_ascii_lowercase() as usize] = true;
        }
        SkipChars { chars: chars.to_string(), lookup }
    }

    #[inline]
    pub fn contains(&self, base: u8) -> bool {
        self.lookup[base as usize]
    }
}

// ----------------------------------------------------------------------------
// Alignment
// ----------------------------------------------------------------------------

/// One locus: aligned sequences of equal length, keyed by taxon.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Alignment {
    pub id: String,
    pub sequences: BTreeMap<String, Vec<u8>>,
    pub length: usize,
}

impl Alignment {
    /// Create an alignment from taxon and sequence pairs.
    ///
    /// If `tips` is provided, sequences of taxa that are not tips of the tree are dropped.
    /// Returns an error if no sequences remain, or if the sequences differ in length.
    ///
    /// ```rust
    /// use phyloacc::sequence::Alignment;
    /// use std::collections::BTreeSet;
    ///
    /// let tips = BTreeSet::from(["A".to_string(), "B".to_string()]);
    /// let aln = Alignment::new("locus1", [("A", "ACGT"), ("B", "ACGA"), ("Z", "TTTT")], Some(&tips))?;
    /// assert_eq!(aln.sequences.len(), 2);
    /// assert_eq!(aln.length, 4);
    /// assert_eq!(aln.get("B"), Some(&b"ACGA"[..]));
    ///
    /// assert!(Alignment::new("locus2", [("A", "ACGT"), ("B", "ACG")], None).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new<I, K, V>(
        id: &str,
        sequences: I,
        tips: Option<&BTreeSet<String>>,
    ) -> Result<Self, Report>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sequences: BTreeMap<String, Vec<u8>> = sequences
            .into_iter()
            .filter(|(taxon, _)| tips.map(|t| t.contains(taxon.as_ref())).unwrap_or(true))
            .map(|(taxon, seq)| {
                (taxon.as_ref().to_string(), seq.as_ref().trim().as_bytes().to_vec())
            })
            .collect();

        if sequences.is_empty() {
            return Err(eyre!("Alignment {id} has no sequences from the tree.")
                .suggestion("Check that the sequence names match the tip labels of the tree."));
        }

        let lengths = sequences.values().map(|s| s.len()).unique().collect_vec();
        if lengths.len() > 1 {
            let details =
                sequences.iter().map(|(taxon, s)| format!("{taxon}: {}", s.len())).join(", ");
            return Err(eyre!("Alignment {id} has sequences of different lengths ({details}).")
                .suggestion(format!("Are you sure {id} is aligned correctly?")));
        }

        Ok(Alignment { id: id.to_string(), length: lengths[0], sequences })
    }

    /// Returns the sequence of a taxon, [`None`] if the taxon is missing from this locus.
    pub fn get(&self, taxon: &str) -> Option<&[u8]> {
        self.sequences.get(taxon).map(|s| s.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the summary statistics of this alignment.
    ///
    /// ```rust
    /// use phyloacc::sequence::{Alignment, SkipChars};
    /// let aln = Alignment::new("locus1", [("A", "AAC-"), ("B", "AAC-"), ("C", "ATGA"), ("D", "ATGA")], None)?;
    /// let stats = aln.stats(&SkipChars::default());
    /// assert_eq!(stats.variable_sites, 2);
    /// assert_eq!(stats.informative_sites, 2);
    /// assert_eq!(stats.num_sites_w_gap, 1);
    /// assert_eq!(stats.num_sites_half_gap, 1);
    /// assert_eq!(stats.avg_nogap_seq_len, 3.5);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn stats(&self, skip: &SkipChars) -> AlignmentStats {
        let mut stats = AlignmentStats {
            num_seqs: self.sequences.len(),
            length: self.length,
            ..Default::default()
        };
        let num_seqs = stats.num_seqs;

        // (allele, count), a column rarely holds more than a handful of alleles
        let mut alleles: Vec<(u8, usize)> = Vec::with_capacity(8);

        for i in 0..self.length {
            alleles.clear();
            let mut gaps = 0;

            for seq in self.sequences.values() {
                let base = seq[i].to_ascii_uppercase();
                if base == GAP {
                    gaps += 1;
                }
                if skip.contains(base) {
                    continue;
                }
                match alleles.iter_mut().find(|(a, _)| *a == base) {
                    Some((_, count)) => *count += 1,
                    None => alleles.push((base, 1)),
                }
            }

            if alleles.len() > 1 {
                stats.variable_sites += 1;
                if alleles.iter().filter(|(_, count)| *count >= 2).count() >= 2 {
                    stats.informative_sites += 1;
                }
            }
            if gaps > 0 {
                stats.num_sites_w_gap += 1;
                if gaps * 2 >= num_seqs {
                    stats.num_sites_half_gap += 1;
                }
            }
        }

        let nogap: usize =
            self.sequences.values().map(|s| s.iter().filter(|b| **b != GAP).count()).sum();
        stats.avg_nogap_seq_len = nogap as f64 / num_seqs as f64;

        stats
    }
}

// ----------------------------------------------------------------------------
// Alignment Statistics
// ----------------------------------------------------------------------------

/// Summary statistics of one [`Alignment`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AlignmentStats {
    pub num_seqs: usize,
    pub length: usize,
    /// Columns with more than one allele (skip characters excluded).
    pub variable_sites: usize,
    /// Columns with at least two alleles that are each present in at least two sequences.
    pub informative_sites: usize,
    pub num_sites_w_gap: usize,
    /// Columns where at least half of the sequences are gaps.
    pub num_sites_half_gap: usize,
    pub avg_nogap_seq_len: f64,
}
