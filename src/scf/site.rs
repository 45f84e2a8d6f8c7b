//! Classify one alignment column against one quartet.

use crate::sequence::SkipChars;
use serde::{Deserialize, Serialize};

/// Relationship of the four bases `[a, b, c, d]` of a quartet `((a, b), (c, d))` at one column.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SiteClass {
    /// At least one base is a gap, missing or ambiguous.
    Gapped,
    /// Supports the split `ab|cd`.
    Concordant,
    /// Supports one of the alternative splits `ac|bd` or `ad|bc`.
    Discordant,
    /// Supports no split.
    Uninformative,
}

impl SiteClass {
    /// Concordant and discordant sites decide between the three possible splits.
    pub fn is_decisive(&self) -> bool {
        matches!(self, SiteClass::Concordant | SiteClass::Discordant)
    }
}

/// Classify the bases of a quartet at one alignment column.
///
/// Bases are compared case-insensitively.
///
/// ```rust
/// use phyloacc::scf::site::{classify, SiteClass};
/// use phyloacc::sequence::SkipChars;
/// let skip = SkipChars::default();
///
/// assert_eq!(classify(*b"AACC", &skip), SiteClass::Concordant);
/// assert_eq!(classify(*b"aaCC", &skip), SiteClass::Concordant);
/// assert_eq!(classify(*b"ACAC", &skip), SiteClass::Discordant);
/// assert_eq!(classify(*b"ACCA", &skip), SiteClass::Discordant);
/// assert_eq!(classify(*b"AAAA", &skip), SiteClass::Uninformative);
/// assert_eq!(classify(*b"AACG", &skip), SiteClass::Uninformative);
/// assert_eq!(classify(*b"AA-C", &skip), SiteClass::Gapped);
/// ```
pub fn classify(bases: [u8; 4], skip: &SkipChars) -> SiteClass {
    if bases.iter().any(|b| skip.contains(*b)) {
        return SiteClass::Gapped;
    }
    let [a, b, c, d] = bases.map(|b| b.to_ascii_uppercase());

    if a == b && c == d && a != c {
        SiteClass::Concordant
    } else if (a == c && b == d && a != b) || (a == d && b == c && a != b) {
        SiteClass::Discordant
    } else {
        SiteClass::Uninformative
    }
}

/// Returns true if all four bases are identical (case-insensitive).
///
/// ```rust
/// use phyloacc::scf::site::is_invariant;
/// assert!(is_invariant(*b"AaAA"));
/// assert!(!is_invariant(*b"AAAC"));
/// ```
pub fn is_invariant(bases: [u8; 4]) -> bool {
    let first = bases[0].to_ascii_uppercase();
    bases.iter().all(|b| b.to_ascii_uppercase() == first)
}
