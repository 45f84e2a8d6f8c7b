//! Sample representative quartets for every internal branch of the tree.

#[cfg(feature = "cli")]
use clap::Args as ClapArgs;
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::{iproduct, Itertools};
use log::debug;
use phyloacc_phylo::{NodeIndex, TopologyIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// Quartet
// ----------------------------------------------------------------------------

/// Four taxa `((a, b), (c, d))`, where `a` and `b` are below a branch and `c` and `d` are above it.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Quartet {
    pub below: [String; 2],
    pub above: [String; 2],
}

impl Display for Quartet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b] = &self.below;
        let [c, d] = &self.above;
        write!(f, "(({a},{b}),({c},{d}))")
    }
}

impl Quartet {
    pub fn new(a: &str, b: &str, c: &str, d: &str) -> Self {
        Quartet { below: [a.to_string(), b.to_string()], above: [c.to_string(), d.to_string()] }
    }

    /// Returns the taxa in the order `[a, b, c, d]`.
    pub fn taxa(&self) -> [&str; 4] {
        [&self.below[0], &self.below[1], &self.above[0], &self.above[1]].map(|t| t.as_str())
    }
}

// ----------------------------------------------------------------------------
// Sampling Policy
// ----------------------------------------------------------------------------

/// How many tips represent each adjacent group of a branch, and how they are chosen.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(ClapArgs))]
pub struct SamplingPolicy {
    /// Number of representative tips sampled from each group adjacent to a branch.
    ///
    /// Every combination of representatives becomes a quartet, so each branch receives
    /// breadth^4 quartets per pair of groups.
    #[cfg_attr(
        feature = "cli",
        arg(short = 'b', long, default_value_t = SamplingPolicy::default().breadth)
    )]
    pub breadth: usize,

    /// Random seed for choosing representatives.
    ///
    /// Without a seed, the first tips of each group (sorted by name) are used.
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        SamplingPolicy { breadth: 1, seed: None }
    }
}

impl SamplingPolicy {
    /// Choose the representatives of one group, returned sorted.
    fn representatives(&self, group: &[String], rng: &mut Option<StdRng>) -> Vec<String> {
        match rng {
            Some(rng) => group.choose_multiple(rng, self.breadth).cloned().sorted().collect(),
            None => group.iter().take(self.breadth).cloned().collect(),
        }
    }
}

// ----------------------------------------------------------------------------
// Quartet Set
// ----------------------------------------------------------------------------

/// Quartets sampled for one branch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BranchQuartets {
    pub quartets: Vec<Quartet>,
    /// Number of distinct quartets that the branch could have been sampled from.
    pub total: usize,
}

impl BranchQuartets {
    /// A degenerate branch has no quartets.
    pub fn is_degenerate(&self) -> bool {
        self.quartets.is_empty()
    }
}

/// Sampled quartets of every internal branch, iterated in post-order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuartetSet {
    branches: BTreeMap<NodeIndex, BranchQuartets>,
    order: Vec<NodeIndex>,
}

impl QuartetSet {
    /// Sample quartets for every internal (non-root) node of the tree.
    ///
    /// Below a bifurcating root, only the first child's branch is sampled. The second child's
    /// branch is the same unrooted split and is recorded as degenerate.
    ///
    /// For every pair of groups below the branch and every pair of groups above it,
    /// representatives are chosen from each of the four groups and all of their
    /// combinations are emitted. With a seed, each branch draws from its own
    /// generator, seeded with `seed + position` where `position` is the branch's
    /// post-order rank among internal nodes.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use phyloacc::scf::quartet::{Quartet, QuartetSet, SamplingPolicy};
    /// use phyloacc_phylo::{examples, TopologyIndex};
    ///
    /// let phylo = examples::quartet()?;
    /// let index = TopologyIndex::new(&phylo);
    /// let quartets = QuartetSet::new(&index, &SamplingPolicy::default())?;
    ///
    /// let branch = quartets.get(phylo.get_node_index("<1>")?).unwrap();
    /// assert_eq!(branch.quartets, [Quartet::new("A", "B", "C", "D")]);
    /// assert_eq!(branch.total, 1);
    /// assert!(quartets.get(phylo.get_node_index("<2>")?).unwrap().is_degenerate());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new(index: &TopologyIndex, policy: &SamplingPolicy) -> Result<Self, Report> {
        if policy.breadth == 0 {
            return Err(eyre!("Sampling breadth must be at least 1.")
                .suggestion("Use --breadth 1 to sample one tip per group."));
        }

        let phylo = index.phylogeny();
        let mut set = QuartetSet::default();

        for (position, node) in phylo.get_internal().into_iter().enumerate() {
            let label = phylo.get_label(node)?;
            let groups = index.adjacent_groups(node)?;

            if groups.is_degenerate() {
                debug!("Branch {label} is degenerate, no quartets can be sampled.");
                set.insert(node, BranchQuartets::default());
                continue;
            }
            if index.folds_into_sibling(node)? {
                debug!("Branch {label} folds into its sibling at the root, no quartets sampled.");
                set.insert(node, BranchQuartets::default());
                continue;
            }

            let seed = policy.seed.map(|seed| seed.wrapping_add(position as u64));
            let mut rng = seed.map(StdRng::seed_from_u64);
            let mut sample = |groups: &[Vec<String>]| {
                groups.iter().map(|g| policy.representatives(g, &mut rng)).collect_vec()
            };
            let below = sample(&groups.below);
            let above = sample(&groups.above);

            let mut branch = BranchQuartets::default();
            for (i, j) in (0..below.len()).tuple_combinations() {
                for (k, l) in (0..above.len()).tuple_combinations() {
                    branch.total += groups.below[i].len()
                        * groups.below[j].len()
                        * groups.above[k].len()
                        * groups.above[l].len();
                    branch.quartets.extend(
                        iproduct!(&below[i], &below[j], &above[k], &above[l])
                            .map(|(a, b, c, d)| Quartet::new(a, b, c, d)),
                    );
                }
            }

            let (sampled, total) = (branch.quartets.len(), branch.total);
            debug!("Branch {label}: {sampled} quartets sampled of {total} possible.");
            set.insert(node, branch);
        }

        Ok(set)
    }

    fn insert(&mut self, node: NodeIndex, branch: BranchQuartets) {
        self.order.push(node);
        self.branches.insert(node, branch);
    }

    /// Returns the quartets of the branch above `node`, [`None`] for tips and the root.
    pub fn get(&self, node: NodeIndex) -> Option<&BranchQuartets> {
        self.branches.get(&node)
    }

    /// Iterate over branches in post-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &BranchQuartets)> {
        self.order.iter().filter_map(|node| self.branches.get(node).map(|b| (*node, b)))
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
