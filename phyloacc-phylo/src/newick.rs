use crate::{Branch, FromNewick, Node, NodeIndex, Phylogeny, TreeError};
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// Characters that end an unquoted label or branch length.
const DELIMITERS: &[u8] = b"(),:;[";

/// Controls how a [`Phylogeny`] is written back to a Newick string.
#[derive(Clone, Debug, PartialEq)]
pub struct NewickOptions {
    /// Write labels of internal nodes (including generated `<N>` labels).
    pub internal_labels: bool,
    /// Write `:length` suffixes for branches that have one.
    pub branch_lengths: bool,
}

impl Default for NewickOptions {
    fn default() -> Self {
        NewickOptions { internal_labels: true, branch_lengths: true }
    }
}

/// One parsed subtree before it is placed into the [`Phylogeny`] arena.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subtree {
    pub label: Option<String>,
    /// Internal label that could not be used as an id, such as a repeated bootstrap value.
    pub support: Option<String>,
    pub branch: Branch,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }
}

/// Returns the root [`Subtree`] parsed from a Newick string, with every internal node labelled.
///
/// Internal nodes without a label are named `<N>` in post-order, starting from 1 and skipping
/// any value already used as a label in the input. An internal label that is repeated, or that
/// is also a tip label, is kept as [`Subtree::support`] and the node gets a generated label.
///
/// # Examples
///
/// ```rust
/// use phyloacc_phylo::newick;
/// let root = newick::parse("((A:0.1,B:0.2):0.3,(C,D)X);")?;
/// assert_eq!(root.label.as_deref(), Some("<2>"));
/// assert_eq!(root.children[0].label.as_deref(), Some("<1>"));
/// assert_eq!(root.children[1].label.as_deref(), Some("X"));
/// assert_eq!(root.children[0].branch.length, Some(0.3));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// ```rust
/// use phyloacc_phylo::newick;
/// let root = newick::parse("(((A,B)100,C)100,(D,E)95);")?;
/// assert_eq!(root.children[0].label.as_deref(), Some("<2>"));
/// assert_eq!(root.children[0].support.as_deref(), Some("100"));
/// assert_eq!(root.children[1].label.as_deref(), Some("95"));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// Unbalanced parentheses, duplicate tip labels and bad branch lengths are rejected.
///
/// ```rust
/// use phyloacc_phylo::newick;
/// assert!(newick::parse("((A,B),C;").is_err());
/// assert!(newick::parse("(A,B),C);").is_err());
/// assert!(newick::parse("(A,A);").is_err());
/// assert!(newick::parse("(A:0.1,B:abc);").is_err());
/// ```
pub fn parse(newick: &str) -> Result<Subtree, Report> {
    let mut parser = Parser { newick, bytes: newick.as_bytes(), pos: 0 };

    parser.skip_ignored()?;
    if parser.peek().is_none() {
        return Err(parser.error("tree string is empty"));
    }
    let mut root = parser.subtree()?;

    // an optional ';' is the only thing allowed after the root
    parser.skip_ignored()?;
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_ignored()?;
    }
    if parser.pos < parser.bytes.len() {
        let rest = &newick[parser.pos..];
        return Err(parser.error(format!("unexpected characters after the root: {rest}")));
    }
    if root.is_tip() {
        return Err(parser.error("tree has no internal nodes"));
    }

    // tip labels are taxon names and must be unique
    let (mut tips, mut internal) = (Vec::new(), Vec::new());
    collect_labels(&root, &mut tips, &mut internal);
    let duplicates = tips.iter().duplicates().join(", ");
    if !duplicates.is_empty() {
        return Err(parser.error(format!("duplicate tip labels: {duplicates}")));
    }

    // internal labels that are repeated or shared with a tip are support values, not ids
    let tips: HashSet<String> = tips.into_iter().collect();
    let internal: HashMap<String, usize> = internal.into_iter().counts();
    let (support, unique): (Vec<_>, Vec<_>) =
        internal.into_iter().partition(|(label, count)| *count > 1 || tips.contains(label));
    let support: HashSet<String> = support.into_iter().map(|(label, _)| label).collect();
    let existing: HashSet<String> =
        tips.into_iter().chain(unique.into_iter().map(|(label, _)| label)).collect();

    let mut counter = 1;
    label_internal(&mut root, &support, &existing, &mut counter);

    Ok(root)
}

fn collect_labels(subtree: &Subtree, tips: &mut Vec<String>, internal: &mut Vec<String>) {
    if let Some(label) = &subtree.label {
        match subtree.is_tip() {
            true => tips.push(label.clone()),
            false => internal.push(label.clone()),
        }
    }
    subtree.children.iter().for_each(|child| collect_labels(child, tips, internal));
}

/// Post-order labelling of internal nodes that are unlabelled or whose label is a support value.
fn label_internal(
    subtree: &mut Subtree,
    support: &HashSet<String>,
    existing: &HashSet<String>,
    counter: &mut usize,
) {
    for child in subtree.children.iter_mut() {
        label_internal(child, support, existing, counter);
    }
    if subtree.is_tip() {
        return;
    }
    if subtree.label.as_ref().is_some_and(|label| support.contains(label)) {
        subtree.support = subtree.label.take();
    }
    if subtree.label.is_none() {
        let label = loop {
            let candidate = format!("<{counter}>");
            *counter += 1;
            if !existing.contains(&candidate) {
                break candidate;
            }
        };
        subtree.label = Some(label);
    }
}

struct Parser<'n> {
    newick: &'n str,
    bytes: &'n [u8],
    pos: usize,
}

impl<'n> Parser<'n> {
    fn error(&self, reason: impl Into<String>) -> Report {
        Report::new(TreeError::format(self.newick, reason))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skip whitespace and bracketed comments.
    fn skip_ignored(&mut self) -> Result<(), Report> {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else if c == b'[' {
                let start = self.pos;
                match self.bytes[self.pos..].iter().position(|b| *b == b']') {
                    Some(end) => self.pos += end + 1,
                    None => return Err(self.error(format!("unclosed comment at position {start}"))),
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn subtree(&mut self) -> Result<Subtree, Report> {
        self.skip_ignored()?;
        let mut subtree = Subtree::default();

        if self.peek() == Some(b'(') {
            let open = self.pos;
            self.pos += 1;
            loop {
                subtree.children.push(self.subtree()?);
                self.skip_ignored()?;
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => {
                        let c = c as char;
                        return Err(self.error(format!("expected ',' or ')' but found '{c}'")));
                    }
                    None => {
                        let reason = format!("unbalanced parentheses at position {open}");
                        return Err(self.error(reason));
                    }
                }
            }
        }

        subtree.label = self.label()?;
        if subtree.is_tip() && subtree.label.is_none() {
            return Err(self.error(format!("missing tip label at position {}", self.pos)));
        }

        self.skip_ignored()?;
        if self.peek() == Some(b':') {
            self.pos += 1;
            self.skip_ignored()?;
            let start = self.pos;
            while let Some(c) = self.peek() {
                if DELIMITERS.contains(&c) || c.is_ascii_whitespace() {
                    break;
                }
                self.pos += 1;
            }
            let length = &self.newick[start..self.pos];
            subtree.branch = Branch::from_newick(&format!(":{length}"))
                .map_err(|e| self.error(format!("{e}")))?;
        }

        Ok(subtree)
    }

    fn label(&mut self) -> Result<Option<String>, Report> {
        self.skip_ignored()?;
        match self.peek() {
            // quoted label, '' is an escaped quote
            Some(b'\'') => {
                let open = self.pos;
                self.pos += 1;
                let mut label = String::new();
                loop {
                    let rest = &self.newick[self.pos..];
                    let Some(end) = rest.find('\'') else {
                        return Err(self.error(format!("unclosed quote at position {open}")));
                    };
                    label.push_str(&rest[..end]);
                    self.pos += end + 1;
                    if self.peek() == Some(b'\'') {
                        label.push('\'');
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Ok(Some(label))
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if DELIMITERS.contains(&c) || c.is_ascii_whitespace() {
                        break;
                    }
                    self.pos += 1;
                }
                let label = &self.newick[start..self.pos];
                Ok((!label.is_empty()).then(|| label.to_string()))
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Writing

/// Quote a label if it contains characters with meaning in Newick.
fn quote(label: &str) -> String {
    let special = label
        .bytes()
        .any(|c| DELIMITERS.contains(&c) || c == b'\'' || c == b']' || c.is_ascii_whitespace());
    match special {
        true => format!("'{}'", label.replace('\'', "''")),
        false => label.to_string(),
    }
}

/// Returns a Newick string for the [`Phylogeny`], with node labels provided by `label`.
///
/// `label` receives every node and returns the text to write for it. Tip labels are always
/// written, internal labels only when [`NewickOptions::internal_labels`] is set.
pub fn write<F>(phylo: &Phylogeny, options: &NewickOptions, label: F) -> Result<String, Report>
where
    F: Fn(NodeIndex, &Node) -> String,
{
    let mut newick = String::new();
    write_subtree(phylo, phylo.get_root(), options, &label, &mut newick)?;
    newick.push(';');
    Ok(newick)
}

fn write_subtree<F>(
    phylo: &Phylogeny,
    node_index: NodeIndex,
    options: &NewickOptions,
    label: &F,
    newick: &mut String,
) -> Result<(), Report>
where
    F: Fn(NodeIndex, &Node) -> String,
{
    let node = phylo.get_node(node_index)?;
    let children = phylo.get_children(node_index)?;

    if !children.is_empty() {
        newick.push('(');
        for (i, child) in children.into_iter().enumerate() {
            if i > 0 {
                newick.push(',');
            }
            write_subtree(phylo, child, options, label, newick)?;
        }
        newick.push(')');
    }

    if node.is_tip() || options.internal_labels {
        newick.push_str(&quote(&label(node_index, node)));
    }

    if options.branch_lengths {
        if let Some(length) = phylo.get_branch(node_index)?.and_then(|b| b.length) {
            newick.push_str(&format!(":{length}"));
        }
    }

    Ok(())
}
