//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::run::ScfArgs;
use crate::Verbosity;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = phyloacc::Cli::parse();
/// ```
/// The command-line arguments from `std::env::args` are simply a vector of space separated strings. Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use phyloacc::{cli::Command, Cli};
///
/// let input = ["phyloacc", "scf", "--tree", "((A,B),(C,D));", "--alignments", "loci.json", "--output-dir", "output", "--breadth", "2"];
/// let args = Cli::parse_from(input);
/// let Command::Scf(scf_args) = &args.command;
/// assert_eq!(scf_args.sampling.breadth, 2);
/// assert_eq!(scf_args.min_scf, 0.5);
///
/// serde_json::to_string_pretty(&args)?;
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "phyloacc", author, version)]
#[clap(about = "Summarize locus alignments on a species tree with site concordance factors.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Compute site concordance factors of every internal branch.
    ///
    /// ```rust
    /// use clap::Parser;
    /// use phyloacc::Cli;
    /// let input = ["phyloacc", "scf", "--mod-file", "ratite.mod", "-a", "loci.json", "-o", "output"];
    /// assert!(Cli::try_parse_from(input).is_ok());
    ///
    /// // the tree is required
    /// let input = ["phyloacc", "scf", "-a", "loci.json", "-o", "output"];
    /// assert!(Cli::try_parse_from(input).is_err());
    /// ```
    #[clap(about = "Compute site concordance factors (sCF).")]
    Scf(ScfArgs),
}
