use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum::{Display as StrumDisplay, EnumString};

/// Position of a [`Node`] in the tree.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Tip,
    Internal,
    Root,
}

/// A [`Node`] in the [`Phylogeny`](crate::Phylogeny) arena.
///
/// ```rust
/// use phyloacc_phylo::{Node, NodeKind};
/// let node = Node::new("strCam", NodeKind::Tip);
/// assert_eq!(node.to_string(), "strCam");
/// assert!(node.is_tip());
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Node {
    /// Unique label, tip labels are taxon names.
    pub label: String,
    pub kind: NodeKind,
    /// Support value given as an internal label in the input (e.g. a repeated bootstrap value).
    pub support: Option<String>,
}

#[rustfmt::skip]
impl Display for Node { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.label) } }

impl Node {
    pub fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        Node { label: label.into(), kind, support: None }
    }

    pub fn is_tip(&self) -> bool {
        self.kind == NodeKind::Tip
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }
}
