use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while building or querying a [`Phylogeny`](crate::Phylogeny).
///
/// These are carried inside a [`color_eyre::eyre::Report`], use
/// [`Report::downcast_ref`](color_eyre::eyre::Report::downcast_ref) to inspect them.
///
/// ```rust
/// use phyloacc_phylo::{FromNewick, Phylogeny, TreeError};
/// let report = Phylogeny::from_newick("((A,B),(C,D);").unwrap_err();
/// assert!(matches!(report.downcast_ref::<TreeError>(), Some(TreeError::Format { .. })));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TreeError {
    /// The tree string could not be parsed into a single connected, acyclic tree.
    Format { tree: String, reason: String },
    /// A node was requested that is not part of the tree.
    NodeNotFound(String),
}

impl TreeError {
    pub(crate) fn format(tree: &str, reason: impl Into<String>) -> Self {
        TreeError::Format { tree: tree.to_string(), reason: reason.into() }
    }
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::Format { tree, reason } => {
                write!(f, "Failed to parse tree ({reason}): {tree}")
            }
            TreeError::NodeNotFound(node) => write!(f, "Node was not found in the tree: {node}"),
        }
    }
}

impl Error for TreeError {}
