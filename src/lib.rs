//! `phyloacc` summarizes multi-species locus alignments on a fixed species tree.
//!
//! For every internal branch of the tree, representative four-taxon samples (quartets) are
//! drawn from the groups of tips on either side of the branch. Every locus alignment is then
//! scanned column by column, and each column is classified as concordant, discordant,
//! uninformative or gapped with respect to each quartet. The counts are aggregated per branch
//! into site concordance factors (sCF), the fraction of decisive sites that support the branch.
//!
//! ```rust
//! use phyloacc::run::ScfArgs;
//! use phyloacc::scf::Aggregator;
//! use phyloacc::sequence::Loci;
//! use phyloacc_phylo::{FromNewick, Phylogeny};
//!
//! let phylo = Phylogeny::from_newick("((A,B),(C,D));")?;
//! let aggregator = Aggregator::new(&phylo, &ScfArgs::default())?;
//!
//! let loci: Loci = serde_json::from_str(r#"{"locus1": {"A": "AC", "B": "AC", "C": "GC", "D": "GC"}}"#)?;
//! let summary = aggregator.run(&loci)?;
//! assert_eq!(summary.annotate(&phylo)?, "((A,B)<1>_1.00,(C,D)<2>_NA)<3>_NA;");
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod export;
pub mod run;
pub mod scf;
pub mod sequence;
mod utils;

#[doc(inline)]
#[cfg(feature = "cli")]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::run::{run, ScfArgs};
#[doc(inline)]
pub use crate::scf::{Aggregator, ScfSummary};
#[doc(inline)]
pub use utils::verbosity::Verbosity;
