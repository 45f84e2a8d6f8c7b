use crate::newick::{self, NewickOptions, Subtree};
use crate::{Branch, FromNewick, Node, NodeKind, ToNewick, TreeError};

use color_eyre::eyre::{Report, Result};
use log::debug;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A rooted species tree.
///
/// Nodes live in a [`petgraph`] arena and are addressed by [`NodeIndex`]. Edges point from
/// parent to child and carry the child's [`Branch`]. The tree is built once by
/// [`Phylogeny::from_newick`] and is read-only afterwards.
///
/// ## Examples
///
/// ```rust
/// use phyloacc_phylo::{FromNewick, Phylogeny, ToNewick};
///
/// let phylo = Phylogeny::from_newick("((A:0.1,B:0.2):0.05,(C:0.3,D:0.4):0.05);")?;
/// assert_eq!(phylo.get_tip_labels(), ["A", "B", "C", "D"]);
/// assert_eq!(phylo.to_newick()?, "((A:0.1,B:0.2)<1>:0.05,(C:0.3,D:0.4)<2>:0.05)<3>;");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Phylogeny {
    /// Directed graph of parents and children.
    pub graph: Graph<Node, Branch>,
    root: NodeIndex,
    labels: HashMap<String, NodeIndex>,
}

impl FromNewick for Phylogeny {
    /// Returns a [`Phylogeny`] parsed from a Newick string.
    ///
    /// Failures are reported as [`TreeError::Format`].
    fn from_newick(newick: &str) -> Result<Self, Report> {
        let root = newick::parse(newick)?;

        let mut phylo =
            Phylogeny { graph: Graph::new(), root: NodeIndex::new(0), labels: HashMap::new() };
        phylo.root = phylo.add_subtree(root, None);

        // guaranteed by construction, kept as a final sanity check of the arena
        if is_cyclic_directed(&phylo.graph) {
            return Err(Report::new(TreeError::format(newick, "tree contains a cycle")));
        }

        debug!(
            "Parsed tree with {} nodes ({} tips): {newick}",
            phylo.len(),
            phylo.get_tips().len()
        );
        Ok(phylo)
    }
}

impl ToNewick for Phylogeny {
    /// Returns the Newick string of the [`Phylogeny`] with all internal nodes labelled.
    fn to_newick(&self) -> Result<String, Report> {
        self.to_newick_with(&NewickOptions::default(), |_, node| node.label.clone())
    }
}

impl Phylogeny {
    /// Recursively move a parsed subtree into the arena, returns the index of its root.
    fn add_subtree(&mut self, subtree: Subtree, parent: Option<NodeIndex>) -> NodeIndex {
        let kind = match (parent, subtree.is_tip()) {
            (None, _) => NodeKind::Root,
            (Some(_), true) => NodeKind::Tip,
            (Some(_), false) => NodeKind::Internal,
        };
        // parse() labels every node, tips cannot be empty
        let label = subtree.label.unwrap_or_default();
        let node = Node { support: subtree.support, ..Node::new(label.clone(), kind) };
        let node_index = self.graph.add_node(node);
        self.labels.insert(label, node_index);

        if let Some(parent) = parent {
            self.graph.add_edge(parent, node_index, subtree.branch);
        }
        for child in subtree.children {
            self.add_subtree(child, Some(node_index));
        }
        node_index
    }

    /// Returns a Newick string, with node labels provided by `label`.
    ///
    /// ## Examples
    ///
    /// Remove internal labels and branch lengths.
    ///
    /// ```rust
    /// use phyloacc_phylo::{FromNewick, NewickOptions, Phylogeny};
    /// let phylo = Phylogeny::from_newick("((A:1,B:1):1,C:2);")?;
    /// let options = NewickOptions { internal_labels: false, branch_lengths: false };
    /// let newick = phylo.to_newick_with(&options, |_, node| node.label.clone())?;
    /// assert_eq!(newick, "((A,B),C);");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// Suffix internal labels.
    ///
    /// ```rust
    /// # use phyloacc_phylo::{FromNewick, NewickOptions, Phylogeny};
    /// let phylo = Phylogeny::from_newick("((A,B),C);")?;
    /// let newick = phylo.to_newick_with(&NewickOptions::default(), |_, node| match node.is_tip() {
    ///     true => node.label.clone(),
    ///     false => format!("{}_x", node.label),
    /// })?;
    /// assert_eq!(newick, "((A,B)<1>_x,C)<2>_x;");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn to_newick_with<F>(&self, options: &NewickOptions, label: F) -> Result<String, Report>
    where
        F: Fn(NodeIndex, &Node) -> String,
    {
        newick::write(self, options, label)
    }

    /// Returns the [`NodeIndex`] of the root.
    pub fn get_root(&self) -> NodeIndex {
        self.root
    }

    /// Returns the [`Node`] at the [`NodeIndex`].
    pub fn get_node(&self, node_index: NodeIndex) -> Result<&Node, Report> {
        self.graph
            .node_weight(node_index)
            .ok_or_else(|| Report::new(TreeError::NodeNotFound(format!("{node_index:?}"))))
    }

    /// Returns the [`NodeIndex`] of the node with this label.
    ///
    /// ```rust
    /// use phyloacc_phylo::{FromNewick, Phylogeny, TreeError};
    /// let phylo = Phylogeny::from_newick("((A,B),C);")?;
    /// assert_eq!(phylo.get_node(phylo.get_node_index("<1>")?)?.label, "<1>");
    /// let report = phylo.get_node_index("Z").unwrap_err();
    /// assert_eq!(report.downcast_ref::<TreeError>(), Some(&TreeError::NodeNotFound("Z".to_string())));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_node_index(&self, label: &str) -> Result<NodeIndex, Report> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| Report::new(TreeError::NodeNotFound(label.to_string())))
    }

    /// Returns the label of the node at the [`NodeIndex`].
    pub fn get_label(&self, node_index: NodeIndex) -> Result<&str, Report> {
        Ok(self.get_node(node_index)?.label.as_str())
    }

    /// Returns the parent of a node, [`None`] for the root.
    pub fn get_parent(&self, node_index: NodeIndex) -> Result<Option<NodeIndex>, Report> {
        self.get_node(node_index)?;
        Ok(self.graph.neighbors_directed(node_index, Direction::Incoming).next())
    }

    /// Returns the children of a node, in the order they appear in the Newick string.
    pub fn get_children(&self, node_index: NodeIndex) -> Result<Vec<NodeIndex>, Report> {
        self.get_node(node_index)?;
        let mut edges: Vec<_> =
            self.graph.edges_directed(node_index, Direction::Outgoing).collect();
        // petgraph iterates edges from last added to first added
        edges.sort_by_key(|e| e.id());
        Ok(edges.into_iter().map(|e| e.target()).collect())
    }

    /// Returns the branch above a node, [`None`] for the root.
    pub fn get_branch(&self, node_index: NodeIndex) -> Result<Option<&Branch>, Report> {
        self.get_node(node_index)?;
        Ok(self.graph.edges_directed(node_index, Direction::Incoming).next().map(|e| e.weight()))
    }

    /// Returns all nodes in post-order (children before parents, children in input order).
    pub fn postorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.len());
        // (node, children visited)
        let mut stack = vec![(self.root, false)];
        while let Some((node_index, visited)) = stack.pop() {
            if visited {
                order.push(node_index);
                continue;
            }
            stack.push((node_index, true));
            let children = self.get_children(node_index).unwrap_or_default();
            stack.extend(children.into_iter().rev().map(|c| (c, false)));
        }
        order
    }

    /// Returns the tips in post-order.
    pub fn get_tips(&self) -> Vec<NodeIndex> {
        self.postorder().into_iter().filter(|n| self.graph[*n].is_tip()).collect()
    }

    /// Returns the tip labels in post-order.
    pub fn get_tip_labels(&self) -> Vec<&str> {
        self.get_tips().into_iter().map(|n| self.graph[n].label.as_str()).collect()
    }

    /// Returns the internal nodes (not tips, not root) in post-order.
    ///
    /// These are the nodes whose branch can carry a bipartition.
    pub fn get_internal(&self) -> Vec<NodeIndex> {
        self.postorder()
            .into_iter()
            .filter(|n| self.graph[*n].kind == NodeKind::Internal)
            .collect()
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
