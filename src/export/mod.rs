//! Tables and trees written at the end of a run.

use crate::scf::ScfSummary;

use color_eyre::eyre::{Report, Result, WrapErr};
use log::info;
use phyloacc_phylo::Phylogeny;
use phyloacc_table::Table;
use std::fmt::Display;
use std::path::Path;

#[cfg(test)]
mod tests;

pub const SCF_STATS: &str = "phyloacc-scf-stats.csv";
pub const ALN_STATS: &str = "phyloacc-aln-stats.csv";
pub const QUARTETS: &str = "phyloacc-quartets.tsv";
pub const SCF_TREE: &str = "phyloacc-scf.tree";

const NA: &str = "NA";

// ----------------------------------------------------------------------------
// Branch Statistics

const SCF_STATS_HEADERS: [&str; 9] = [
    "node",
    "variable-sites",
    "decisive-sites",
    "concordant-sites",
    "quartet-scf-sum",
    "num-quartets",
    "total-quartets",
    "decisive-quartets",
    "avg-quartet-scf",
];

/// Returns one row per internal branch, in post-order.
pub fn scf_stats(phylo: &Phylogeny, summary: &ScfSummary) -> Result<Table<String>, Report> {
    let mut table = Table::new();
    table.headers = SCF_STATS_HEADERS.iter().map(|h| h.to_string()).collect();

    for node in phylo.get_internal() {
        let stats = summary.branches.get(&node).cloned().unwrap_or_default();
        table.add_row([
            phylo.get_label(node)?.to_string(),
            stats.variable_sites.to_string(),
            stats.decisive_sites.to_string(),
            stats.concordant_sites.to_string(),
            stats.quartet_scf_sum.to_string(),
            stats.num_quartets.to_string(),
            stats.total_quartets.to_string(),
            stats.decisive_quartets.to_string(),
            or_na(stats.avg_scf()),
        ])?;
    }

    Ok(table)
}

// ----------------------------------------------------------------------------
// Alignment Statistics

const ALN_STATS_HEADERS: [&str; 10] = [
    "locus",
    "num-seqs",
    "length",
    "variable-sites",
    "informative-sites",
    "num-sites-w-gap",
    "num-sites-half-gap",
    "avg-nogap-seq-len",
    "node-scf-avg",
    "perc-low-scf-nodes",
];

/// Returns one row per scanned locus.
pub fn aln_stats(summary: &ScfSummary) -> Result<Table<String>, Report> {
    let mut table = Table::new();
    table.headers = ALN_STATS_HEADERS.iter().map(|h| h.to_string()).collect();

    for locus in &summary.loci {
        let aln = &locus.alignment;
        table.add_row([
            locus.locus.clone(),
            aln.num_seqs.to_string(),
            aln.length.to_string(),
            aln.variable_sites.to_string(),
            aln.informative_sites.to_string(),
            aln.num_sites_w_gap.to_string(),
            aln.num_sites_half_gap.to_string(),
            aln.avg_nogap_seq_len.to_string(),
            or_na(locus.node_scf_avg),
            or_na(locus.perc_low_scf_nodes),
        ])?;
    }

    Ok(table)
}

// ----------------------------------------------------------------------------
// Quartets

const QUARTETS_HEADERS: [&str; 3] = ["node", "quartet", "total-quartets"];

/// Returns one row per sampled quartet. Degenerate branches get a single row with an empty quartet.
pub fn quartets(phylo: &Phylogeny, summary: &ScfSummary) -> Result<Table<String>, Report> {
    let mut table = Table::new();
    table.headers = QUARTETS_HEADERS.iter().map(|h| h.to_string()).collect();

    for (node, branch) in summary.quartets.iter() {
        let label = phylo.get_label(node)?.to_string();
        let total = branch.total.to_string();
        if branch.is_degenerate() {
            table.add_row([label, String::new(), total])?;
            continue;
        }
        for quartet in &branch.quartets {
            table.add_row([label.clone(), quartet.to_string(), total.clone()])?;
        }
    }

    Ok(table)
}

// ----------------------------------------------------------------------------
// Write

/// Write all tables and the annotated tree to `output_dir`.
pub fn write<P>(phylo: &Phylogeny, summary: &ScfSummary, output_dir: &P) -> Result<(), Report>
where
    P: AsRef<Path>,
{
    let output_dir = output_dir.as_ref();

    let mut table = scf_stats(phylo, summary)?;
    info!("Branch statistics:\n\n{}", table.to_markdown());
    table.write(&output_dir.join(SCF_STATS), None)?;

    aln_stats(summary)?.write(&output_dir.join(ALN_STATS), None)?;
    quartets(phylo, summary)?.write(&output_dir.join(QUARTETS), None)?;

    let path = output_dir.join(SCF_TREE);
    let tree = summary.annotate(phylo)?;
    std::fs::write(&path, format!("{tree}\n"))
        .wrap_err_with(|| format!("Failed to write annotated tree: {path:?}"))?;

    info!("Outputs written to: {output_dir:?}");
    Ok(())
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| NA.to_string())
}
