//! Small example trees used throughout the documentation and tests.

use crate::{FromNewick, Phylogeny};
use color_eyre::eyre::{Report, Result};

/// Four tips, one internal branch: `((A,B),(C,D))`.
pub const QUARTET: &str = "((A:0.1,B:0.1):0.2,(C:0.1,D:0.1):0.2);";

/// Six tips with a multifurcating node.
pub const POLYTOMY: &str = "((A:0.1,B:0.1,C:0.1):0.2,(D:0.1,(E:0.1,F:0.1):0.1):0.2);";

/// A subset of the ratite tree shipped with PhyloAcc, unlabelled internal nodes.
pub const RATITE: &str = "(((((strCam:0.1,((rhePen:0.05,rheAme:0.05):0.1,(aptHaa:0.06,(casCas:0.04,droNov:0.04):0.02):0.03):0.02):0.01,tinGut:0.2):0.05,(galGal:0.15,anaPla:0.15):0.05):0.3,allMis:0.5):0.1,chrPic:0.6);";

/// Returns the [`QUARTET`] example.
///
/// ```rust
/// let phylo = phyloacc_phylo::examples::quartet()?;
/// assert_eq!(phylo.get_tip_labels(), ["A", "B", "C", "D"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn quartet() -> Result<Phylogeny, Report> {
    Phylogeny::from_newick(QUARTET)
}

/// Returns the [`POLYTOMY`] example.
pub fn polytomy() -> Result<Phylogeny, Report> {
    Phylogeny::from_newick(POLYTOMY)
}

/// Returns the [`RATITE`] example.
pub fn ratite() -> Result<Phylogeny, Report> {
    Phylogeny::from_newick(RATITE)
}
