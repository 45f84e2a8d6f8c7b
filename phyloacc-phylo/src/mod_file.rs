//! Extract the species tree from a [PHAST](http://compgen.cshl.edu/phast/) `.mod` file.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use std::fmt::Debug;
use std::path::Path;

const TREE_KEY: &str = "TREE:";

/// Returns the Newick string from the `TREE:` line of a `.mod` file's contents.
///
/// ## Examples
///
/// ```rust
/// use phyloacc_phylo::mod_file;
/// let contents = "ALPHABET: A C G T\nORDER: 0\nSUBST_MOD: REV\nTREE: ((A:0.1,B:0.2):0.3,C:0.4);\n";
/// assert_eq!(mod_file::tree_from_str(contents)?, "((A:0.1,B:0.2):0.3,C:0.4);");
/// assert!(mod_file::tree_from_str("ALPHABET: A C G T\n").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn tree_from_str(contents: &str) -> Result<String, Report> {
    contents
        .lines()
        .find_map(|line| line.trim().strip_prefix(TREE_KEY))
        .map(|tree| tree.trim().to_string())
        .filter(|tree| !tree.is_empty())
        .ok_or_else(|| {
            let suggestion =
                format!("The model file must contain a line starting with '{TREE_KEY}'.");
            eyre!("Failed to find a tree in the model file.").suggestion(suggestion)
        })
}

/// Reads a `.mod` file and returns its Newick tree string.
pub fn read<P>(path: &P) -> Result<String, Report>
where
    P: AsRef<Path> + Debug,
{
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read model file: {path:?}"))?;
    tree_from_str(&contents).wrap_err_with(|| format!("Failed to parse model file: {path:?}"))
}
