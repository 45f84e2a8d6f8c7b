//! Species tree model for PhyloAcc.
//!
//! A [`Phylogeny`] is parsed from a [Newick](https://en.wikipedia.org/wiki/Newick_format)
//! string into an arena of [`Node`]s joined by [`Branch`]es. Internal nodes without a label
//! receive a generated `<N>` label so that statistics can be reported per branch. The
//! [`TopologyIndex`] provides the cached tip sets and bipartitions that quartet sampling
//! is built on.

use color_eyre::eyre::{Report, Result};

mod branch;
mod error;
pub mod examples;
pub mod mod_file;
pub mod newick;
mod node;
mod phylogeny;
mod topology;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use branch::Branch;
#[doc(inline)]
pub use error::TreeError;
#[doc(inline)]
pub use newick::NewickOptions;
#[doc(inline)]
pub use node::{Node, NodeKind};
#[doc(inline)]
pub use phylogeny::Phylogeny;
#[doc(inline)]
pub use topology::{AdjacentGroups, TopologyIndex};

/// Re-exported so callers can hold node handles without depending on petgraph directly.
pub use petgraph::graph::NodeIndex;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Returns an object created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`].
pub trait FromNewick {
    fn from_newick(newick: &str) -> Result<Self, Report>
    where
        Self: Sized;
}

/// Returns a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`] created from an object.
pub trait ToNewick {
    fn to_newick(&self) -> Result<String, Report>;
}
