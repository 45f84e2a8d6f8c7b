//! Compute site concordance factors for every branch of a species tree.

use crate::export;
use crate::scf::quartet::SamplingPolicy;
use crate::scf::Aggregator;
use crate::sequence::{self, SkipChars};

#[cfg(feature = "cli")]
use clap::{Args as ClapArgs, Parser};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::info;
use phyloacc_phylo::{mod_file, FromNewick, Phylogeny};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Compute sCF for every internal branch, then write statistics and the annotated tree.
///
/// ## Examples
///
/// ```rust
/// use phyloacc::run::{ScfArgs, TreeInput};
///
/// let dir = tempfile::tempdir()?;
/// let alignments = dir.path().join("alignments.json");
/// std::fs::write(&alignments, r#"{"locus1": {"A": "AAT", "B": "AAT", "C": "CCT", "D": "CCT"}}"#)?;
///
/// let args = ScfArgs {
///     tree: TreeInput { tree: Some(phyloacc_phylo::examples::QUARTET.to_string()), mod_file: None },
///     alignments,
///     output_dir: dir.path().join("output"),
///     ..Default::default()
/// };
/// phyloacc::run(&args)?;
///
/// let tree = std::fs::read_to_string(dir.path().join("output").join("phyloacc-scf.tree"))?;
/// assert_eq!(tree.trim(), "((A:0.1,B:0.1)<1>_1.00:0.2,(C:0.1,D:0.1)<2>_NA:0.2)<3>_NA;");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn run(args: &ScfArgs) -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // Tree

    let newick = args.tree.read()?;
    let phylo = Phylogeny::from_newick(&newick)?;
    let (tips, internal) = (phylo.get_tips().len(), phylo.get_internal().len());
    info!("Loaded tree with {tips} tips and {internal} internal branches.");

    // ------------------------------------------------------------------------
    // Alignments

    info!("Reading alignments: {:?}", args.alignments);
    let loci = sequence::read_loci(&args.alignments)?;
    info!("Loaded {} loci.", loci.len());

    // ------------------------------------------------------------------------
    // Site Concordance Factors

    let aggregator = Aggregator::new(&phylo, args)?;
    let summary = aggregator.run(&loci)?;

    // ------------------------------------------------------------------------
    // Export

    std::fs::create_dir_all(&args.output_dir)
        .wrap_err_with(|| format!("Failed to create output directory: {:?}", args.output_dir))?;
    export::write(&phylo, &summary, &args.output_dir)?;
    args.write(&args.output_dir.join("run_args.json"))?;

    info!("Done.");
    Ok(())
}

// ----------------------------------------------------------------------------
// ScfArgs
// ----------------------------------------------------------------------------

/// Compute site concordance factors (sCF) from locus alignments on a species tree.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct ScfArgs {
    #[cfg_attr(feature = "cli", command(flatten))]
    pub tree: TreeInput,

    /// JSON file of locus alignments.
    ///
    /// An object of locus ids, each an object of taxon names and aligned sequences.
    #[cfg_attr(feature = "cli", clap(short = 'a', long, required = true))]
    pub alignments: PathBuf,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output_dir: PathBuf,

    /// Branches with an sCF below this value are reported as low sCF nodes in the locus statistics.
    #[cfg_attr(feature = "cli", arg(long, default_value_t = ScfArgs::default().min_scf))]
    pub min_scf: f64,

    #[cfg_attr(feature = "cli", command(flatten))]
    pub sampling: SamplingPolicy,

    /// Characters that exclude an alignment column from a quartet (case-insensitive).
    #[cfg_attr(
        feature = "cli",
        arg(long, allow_hyphen_values = true, default_value_t = ScfArgs::default().skip_chars)
    )]
    pub skip_chars: SkipChars,

    /// Number of CPU threads to use.
    #[cfg_attr(
        feature = "cli",
        clap(short = 't', long, default_value_t = ScfArgs::default().threads)
    )]
    pub threads: usize,

    /// Display a progress bar while loci are processed.
    #[cfg_attr(feature = "cli", arg(long))]
    pub progress: bool,
}

impl Default for ScfArgs {
    fn default() -> Self {
        ScfArgs {
            tree: TreeInput::default(),
            alignments: PathBuf::new(),
            output_dir: PathBuf::new(),
            min_scf: 0.5,
            sampling: SamplingPolicy::default(),
            skip_chars: SkipChars::default(),
            threads: 1,
            progress: false,
        }
    }
}

impl ScfArgs {
    /// Reads [`ScfArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<ScfArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run arguments: {path:?}."))?;
        let args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize run arguments: {input}"))?;
        Ok(args)
    }

    /// Write [`ScfArgs`] to a JSON file.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use phyloacc::run::ScfArgs;
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("run_args.json");
    ///
    /// let args = ScfArgs { min_scf: 0.25, ..Default::default() };
    /// args.write(&path)?;
    /// assert_eq!(ScfArgs::read(&path)?.min_scf, 0.25);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize run arguments: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err(format!("Failed to write run arguments: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// TreeInput
// ----------------------------------------------------------------------------

/// Species tree, given directly or inside a PHAST model file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "cli", derive(ClapArgs))]
#[cfg_attr(feature = "cli", group(required = true, multiple = false))]
pub struct TreeInput {
    /// PHAST model (.mod) file, the tree is read from its 'TREE:' line.
    #[cfg_attr(feature = "cli", arg(short = 'm', long))]
    pub mod_file: Option<PathBuf>,

    /// Newick tree string.
    #[cfg_attr(feature = "cli", arg(long))]
    pub tree: Option<String>,
}

impl TreeInput {
    /// Returns the Newick string of the species tree.
    pub fn read(&self) -> Result<String, Report> {
        match (&self.tree, &self.mod_file) {
            (Some(tree), _) => Ok(tree.clone()),
            (None, Some(path)) => {
                info!("Reading tree from model file: {path:?}");
                mod_file::read(path)
            }
            (None, None) => Err(eyre!("No species tree was provided.")
                .suggestion("Provide a tree with --tree or a PHAST model file with --mod-file.")),
        }
    }
}
