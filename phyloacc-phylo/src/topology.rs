use crate::{NodeIndex, Phylogeny, TreeError};

use color_eyre::eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Groups of tips reachable through each neighbour of a branch.
///
/// `below` holds one group per child of the branch's lower node. `above` holds one group per
/// sibling, plus one group for everything above the parent. Tips are sorted in every group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AdjacentGroups {
    pub below: Vec<Vec<String>>,
    pub above: Vec<Vec<String>>,
}

impl AdjacentGroups {
    /// A branch needs at least two groups on either side to be resolved by a quartet.
    pub fn is_degenerate(&self) -> bool {
        self.below.len() < 2 || self.above.len() < 2
    }
}

/// Read-only views over a [`Phylogeny`]: tip sets, bipartitions and adjacent groups.
///
/// Tip sets are computed once, bottom-up, when the index is created.
///
/// ## Examples
///
/// ```rust
/// use phyloacc_phylo::{FromNewick, Phylogeny, TopologyIndex};
///
/// let phylo = Phylogeny::from_newick("(((A,B),C),(D,E));")?;
/// let index = TopologyIndex::new(&phylo);
/// let node  = phylo.get_node_index("<1>")?;
///
/// let (below, rest) = index.bipartition(node)?;
/// assert_eq!(below.into_iter().collect::<Vec<_>>(), ["A", "B"]);
/// assert_eq!(rest.into_iter().collect::<Vec<_>>(), ["C", "D", "E"]);
///
/// let groups = index.adjacent_groups(node)?;
/// assert_eq!(groups.below, [vec!["A"], vec!["B"]]);
/// assert_eq!(groups.above, [vec!["C"], vec!["D", "E"]]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug)]
pub struct TopologyIndex<'p> {
    phylo: &'p Phylogeny,
    tips: BTreeSet<String>,
    below: HashMap<NodeIndex, BTreeSet<String>>,
}

impl<'p> TopologyIndex<'p> {
    /// Create the index, caching the tips below every node.
    pub fn new(phylo: &'p Phylogeny) -> Self {
        let mut below: HashMap<NodeIndex, BTreeSet<String>> = HashMap::with_capacity(phylo.len());

        // children are always visited before their parent
        for node_index in phylo.postorder() {
            let node = &phylo.graph[node_index];
            let tips = match node.is_tip() {
                true => BTreeSet::from([node.label.clone()]),
                false => phylo
                    .get_children(node_index)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|child| below.get(child))
                    .flatten()
                    .cloned()
                    .collect(),
            };
            below.insert(node_index, tips);
        }

        let tips = below.get(&phylo.get_root()).cloned().unwrap_or_default();
        TopologyIndex { phylo, tips, below }
    }

    /// Returns the [`Phylogeny`] this index was built from.
    pub fn phylogeny(&self) -> &'p Phylogeny {
        self.phylo
    }

    /// Returns all tips of the tree.
    pub fn get_tips(&self) -> &BTreeSet<String> {
        &self.tips
    }

    /// Returns the tips in the subtree rooted at `node`.
    pub fn tips_below(&self, node: NodeIndex) -> Result<&BTreeSet<String>, Report> {
        self.below
            .get(&node)
            .ok_or_else(|| Report::new(TreeError::NodeNotFound(format!("{node:?}"))))
    }

    /// Returns the tips that are not in the subtree rooted at `node`.
    pub fn complement(&self, node: NodeIndex) -> Result<BTreeSet<String>, Report> {
        let below = self.tips_below(node)?;
        Ok(self.tips.difference(below).cloned().collect())
    }

    /// Returns the split of all tips induced by the branch above `node`: (below, rest).
    pub fn bipartition(
        &self,
        node: NodeIndex,
    ) -> Result<(BTreeSet<String>, BTreeSet<String>), Report> {
        Ok((self.tips_below(node)?.clone(), self.complement(node)?))
    }

    /// Returns the groups of tips adjacent to the branch above `node`.
    ///
    /// When the parent is a bifurcating root, the sibling subtree is split into its own
    /// children, since the two branches below the root form a single unrooted branch.
    ///
    /// ```rust
    /// use phyloacc_phylo::{FromNewick, Phylogeny, TopologyIndex};
    /// let phylo = Phylogeny::from_newick("((A,B),(C,D));")?;
    /// let index = TopologyIndex::new(&phylo);
    /// let groups = index.adjacent_groups(phylo.get_node_index("<1>")?)?;
    /// assert_eq!(groups.below, [vec!["A"], vec!["B"]]);
    /// assert_eq!(groups.above, [vec!["C"], vec!["D"]]);
    ///
    /// // the root has nothing above it
    /// let groups = index.adjacent_groups(phylo.get_root())?;
    /// assert!(groups.is_degenerate());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn adjacent_groups(&self, node: NodeIndex) -> Result<AdjacentGroups, Report> {
        let group = |n: NodeIndex| -> Result<Vec<String>, Report> {
            Ok(self.tips_below(n)?.iter().cloned().collect())
        };

        let children = self.phylo.get_children(node)?;
        let below = match children.is_empty() {
            true => vec![group(node)?],
            false => children.into_iter().map(group).collect::<Result<Vec<_>, Report>>()?,
        };

        let mut above = Vec::new();
        if let Some(parent) = self.phylo.get_parent(node)? {
            let siblings: Vec<_> =
                self.phylo.get_children(parent)?.into_iter().filter(|s| *s != node).collect();
            let parent_is_root = self.phylo.get_parent(parent)?.is_none();

            match (parent_is_root, siblings.as_slice()) {
                // unroot: the lone sibling's children are the neighbours of this branch
                (true, [sibling]) => {
                    let nephews = self.phylo.get_children(*sibling)?;
                    match nephews.is_empty() {
                        true => above.push(group(*sibling)?),
                        false => {
                            for nephew in nephews {
                                above.push(group(nephew)?);
                            }
                        }
                    }
                }
                _ => {
                    for sibling in siblings {
                        above.push(group(sibling)?);
                    }
                    if !parent_is_root {
                        above.push(self.complement(parent)?.into_iter().collect());
                    }
                }
            }
        }

        Ok(AdjacentGroups {
            below: below.into_iter().filter(|g| !g.is_empty()).collect(),
            above: above.into_iter().filter(|g| !g.is_empty()).collect(),
        })
    }

    /// Returns true if `node` is the second child of a bifurcating root.
    ///
    /// Both branches below such a root are one unrooted branch, and the first child
    /// (in input order) carries its split.
    ///
    /// ```rust
    /// use phyloacc_phylo::{FromNewick, Phylogeny, TopologyIndex};
    /// let phylo = Phylogeny::from_newick("((A,B),(C,D));")?;
    /// let index = TopologyIndex::new(&phylo);
    /// assert!(!index.folds_into_sibling(phylo.get_node_index("<1>")?)?);
    /// assert!(index.folds_into_sibling(phylo.get_node_index("<2>")?)?);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn folds_into_sibling(&self, node: NodeIndex) -> Result<bool, Report> {
        let Some(parent) = self.phylo.get_parent(node)? else {
            return Ok(false);
        };
        if self.phylo.get_parent(parent)?.is_some() {
            return Ok(false);
        }
        match self.phylo.get_children(parent)?.as_slice() {
            [_, second] => Ok(*second == node),
            _ => Ok(false),
        }
    }
}
