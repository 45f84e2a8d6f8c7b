//! Site concordance factors (sCF) of every internal branch, aggregated across loci.
//!
//! Each locus is scanned independently into an immutable [`LocusScf`] partial, and the
//! partials are folded into one [`BranchStats`] per branch. Loci can be scanned in parallel,
//! the fold is always sequential and in locus order.

pub mod quartet;
pub mod site;


use crate::run::ScfArgs;
use crate::scf::quartet::{QuartetSet, SamplingPolicy};
use crate::scf::site::{classify, is_invariant, SiteClass};
use crate::sequence::{Alignment, AlignmentStats, Loci, SkipChars};

use color_eyre::eyre::{Report, Result, WrapErr};
use indicatif::{style::ProgressStyle, ProgressBar};
use itertools::Itertools;
use log::{debug, info, warn};
use phyloacc_phylo::{NewickOptions, NodeIndex, NodeKind, Phylogeny, TopologyIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ----------------------------------------------------------------------------
// Branch Statistics
// ----------------------------------------------------------------------------

/// Site and quartet counts of one branch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BranchStats {
    /// Columns that are not gapped and not invariant, summed over quartets and loci.
    pub variable_sites: usize,
    /// Concordant or discordant columns.
    pub decisive_sites: usize,
    pub concordant_sites: usize,
    /// Sum of concordant/decisive over every (locus, quartet) with at least one decisive site.
    pub quartet_scf_sum: f64,
    pub num_quartets: usize,
    pub total_quartets: usize,
    /// Number of (locus, quartet) pairs that contributed to `quartet_scf_sum`.
    pub decisive_quartets: usize,
}

impl BranchStats {
    /// Mean sCF over contributing quartets, [`None`] if no quartet had a decisive site.
    ///
    /// ```rust
    /// use phyloacc::scf::BranchStats;
    /// let stats = BranchStats { quartet_scf_sum: 1.5, decisive_quartets: 2, ..Default::default() };
    /// assert_eq!(stats.avg_scf(), Some(0.75));
    /// assert_eq!(BranchStats::default().avg_scf(), None);
    /// ```
    pub fn avg_scf(&self) -> Option<f64> {
        match self.decisive_quartets {
            0 => None,
            n => Some(self.quartet_scf_sum / n as f64),
        }
    }

    /// Add the site and quartet counts of a partial.
    pub fn merge(&mut self, other: &BranchStats) {
        self.variable_sites += other.variable_sites;
        self.decisive_sites += other.decisive_sites;
        self.concordant_sites += other.concordant_sites;
        self.quartet_scf_sum += other.quartet_scf_sum;
        self.decisive_quartets += other.decisive_quartets;
    }
}

// ----------------------------------------------------------------------------
// Locus Partials
// ----------------------------------------------------------------------------

/// Per-branch counts contributed by one locus.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocusScf {
    pub locus: String,
    pub branches: BTreeMap<NodeIndex, BranchStats>,
    /// Quartets skipped because at least one of their taxa has no sequence in this locus.
    pub missing_taxon_skips: usize,
    pub alignment: AlignmentStats,
}

/// Alignment statistics and sCF summary of one locus.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LocusSummary {
    pub locus: String,
    pub alignment: AlignmentStats,
    /// Mean over branches of the locus sCF of each branch.
    pub node_scf_avg: Option<f64>,
    /// Branches with an sCF below the minimum.
    pub low_scf_nodes: usize,
    /// Fraction of branches with a defined sCF that are below the minimum.
    pub perc_low_scf_nodes: Option<f64>,
    pub missing_taxon_skips: usize,
}

impl LocusSummary {
    fn new(partial: &LocusScf, min_scf: f64) -> Self {
        let scfs = partial.branches.values().filter_map(|b| b.avg_scf()).collect_vec();
        let low_scf_nodes = scfs.iter().filter(|scf| **scf < min_scf).count();
        let (node_scf_avg, perc_low_scf_nodes) = match scfs.len() {
            0 => (None, None),
            n => {
                let avg = scfs.iter().sum::<f64>() / n as f64;
                (Some(avg), Some(low_scf_nodes as f64 / n as f64))
            }
        };

        LocusSummary {
            locus: partial.locus.clone(),
            alignment: partial.alignment.clone(),
            node_scf_avg,
            low_scf_nodes,
            perc_low_scf_nodes,
            missing_taxon_skips: partial.missing_taxon_skips,
        }
    }
}

/// A locus that was dropped from the analysis.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Diagnostic {
    pub locus: String,
    pub message: String,
}

// ----------------------------------------------------------------------------
// Summary
// ----------------------------------------------------------------------------

/// Final statistics of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScfSummary {
    /// Statistics of every internal (non-root) node's branch.
    pub branches: BTreeMap<NodeIndex, BranchStats>,
    pub quartets: QuartetSet,
    /// One summary per locus that was scanned, in locus order.
    pub loci: Vec<LocusSummary>,
    /// Loci that failed validation.
    pub diagnostics: Vec<Diagnostic>,
    pub missing_taxon_skips: usize,
}

impl ScfSummary {
    /// Returns the tree with every internal label suffixed by its branch's average sCF.
    ///
    /// Averages are rounded to 2 decimals, branches without a defined sCF (and the root)
    /// are suffixed with `NA`.
    pub fn annotate(&self, phylo: &Phylogeny) -> Result<String, Report> {
        phylo.to_newick_with(&NewickOptions::default(), |node_index, node| match node.kind {
            NodeKind::Tip => node.label.clone(),
            NodeKind::Internal | NodeKind::Root => {
                match self.branches.get(&node_index).and_then(|b| b.avg_scf()) {
                    Some(scf) => format!("{}_{scf:.2}", node.label),
                    None => format!("{}_NA", node.label),
                }
            }
        })
    }
}

// ----------------------------------------------------------------------------
// Aggregator
// ----------------------------------------------------------------------------

/// Scans loci against the sampled quartets and folds the results per branch.
///
/// ## Examples
///
/// ```rust
/// use phyloacc::run::ScfArgs;
/// use phyloacc::scf::Aggregator;
/// use phyloacc::sequence::Loci;
/// use std::collections::BTreeMap;
///
/// let phylo = phyloacc_phylo::examples::quartet()?;
/// let aggregator = Aggregator::new(&phylo, &ScfArgs::default())?;
///
/// let locus = [("A", "AAT"), ("B", "AAT"), ("C", "CCT"), ("D", "CCT")];
/// let locus: BTreeMap<String, String> =
///     locus.into_iter().map(|(t, s)| (t.to_string(), s.to_string())).collect();
/// let loci = Loci::from([("locus1".to_string(), locus)]);
///
/// let summary = aggregator.run(&loci)?;
/// let stats = &summary.branches[&phylo.get_node_index("<1>")?];
/// assert_eq!(stats.concordant_sites, 2);
/// assert_eq!(stats.avg_scf(), Some(1.0));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Debug)]
pub struct Aggregator<'p> {
    index: TopologyIndex<'p>,
    quartets: QuartetSet,
    skip_chars: SkipChars,
    min_scf: f64,
    threads: usize,
    progress: bool,
}

impl<'p> Aggregator<'p> {
    /// Index the tree and sample quartets for every branch.
    pub fn new(phylo: &'p Phylogeny, args: &ScfArgs) -> Result<Self, Report> {
        let index = TopologyIndex::new(phylo);
        let quartets = QuartetSet::new(&index, &args.sampling)?;
        let num_quartets: usize = quartets.iter().map(|(_, b)| b.quartets.len()).sum();
        info!("Sampled {num_quartets} quartets over {} branches.", quartets.len());

        Ok(Aggregator {
            index,
            quartets,
            skip_chars: args.skip_chars.clone(),
            min_scf: args.min_scf,
            threads: args.threads,
            progress: args.progress,
        })
    }

    /// Returns an aggregator with quartets sampled by a different policy.
    pub fn with_sampling(mut self, policy: &SamplingPolicy) -> Result<Self, Report> {
        self.quartets = QuartetSet::new(&self.index, policy)?;
        Ok(self)
    }

    pub fn quartets(&self) -> &QuartetSet {
        &self.quartets
    }

    /// Scan one locus against every quartet, returns the locus's counts per branch.
    ///
    /// Quartets with a taxon missing from the locus are skipped.
    pub fn scan(&self, alignment: &Alignment) -> LocusScf {
        let mut partial = LocusScf {
            locus: alignment.id.clone(),
            alignment: alignment.stats(&self.skip_chars),
            ..Default::default()
        };

        for (node, branch) in self.quartets.iter().filter(|(_, b)| !b.is_degenerate()) {
            let mut stats = BranchStats::default();

            for quartet in &branch.quartets {
                let taxa = quartet.taxa().map(|t| alignment.get(t));
                let [Some(a), Some(b), Some(c), Some(d)] = taxa else {
                    let locus = &alignment.id;
                    debug!("Locus {locus} is missing a taxon of quartet {quartet}, skipping.");
                    partial.missing_taxon_skips += 1;
                    continue;
                };

                let (mut decisive, mut concordant) = (0, 0);
                for i in 0..alignment.length {
                    let bases = [a[i], b[i], c[i], d[i]];
                    let class = classify(bases, &self.skip_chars);
                    if class != SiteClass::Gapped && !is_invariant(bases) {
                        stats.variable_sites += 1;
                    }
                    if class.is_decisive() {
                        decisive += 1;
                    }
                    if class == SiteClass::Concordant {
                        concordant += 1;
                    }
                }

                stats.decisive_sites += decisive;
                stats.concordant_sites += concordant;
                if decisive > 0 {
                    stats.quartet_scf_sum += concordant as f64 / decisive as f64;
                    stats.decisive_quartets += 1;
                }
            }

            partial.branches.insert(node, stats);
        }

        partial
    }

    /// Validate and scan every locus, then fold the partials into an [`ScfSummary`].
    ///
    /// Loci that fail validation are dropped with a [`Diagnostic`].
    pub fn run(&self, loci: &Loci) -> Result<ScfSummary, Report> {
        let tips = self.index.get_tips();
        let loci = loci.iter().collect_vec();

        // create a progress bar, will only be displayed/updated if progress=true
        let progress_bar = match self.progress {
            true => ProgressBar::new(loci.len() as u64),
            false => ProgressBar::hidden(),
        };
        let template = "{bar:40} {pos}/{len} ({percent}%) | Loci/s: {per_sec} | {elapsed_precise}";
        let progress_bar_style = ProgressStyle::with_template(template)
            .wrap_err("Failed to create progress bar from template.")?;
        progress_bar.set_style(progress_bar_style);

        let scan = |(id, sequences): &(&String, &BTreeMap<String, String>)| {
            let partial = Alignment::new(id, *sequences, Some(tips)).map(|aln| self.scan(&aln));
            progress_bar.inc(1);
            partial
        };

        info!("Scanning {} loci with {} thread(s).", loci.len(), self.threads.max(1));
        let partials: Vec<Result<LocusScf, Report>> = match self.threads > 1 {
            true => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.threads)
                    .build()
                    .wrap_err("Failed to create thread pool.")?;
                pool.install(|| loci.par_iter().map(scan).collect())
            }
            false => loci.iter().map(scan).collect(),
        };
        progress_bar.finish();

        let ids = loci.iter().map(|(id, _)| id.as_str());
        Ok(self.fold(ids.zip(partials)))
    }

    /// Fold locus partials, in the order given, into an [`ScfSummary`].
    pub fn fold<'a, I>(&self, partials: I) -> ScfSummary
    where
        I: IntoIterator<Item = (&'a str, Result<LocusScf, Report>)>,
    {
        let phylo = self.index.phylogeny();
        let mut summary = ScfSummary { quartets: self.quartets.clone(), ..Default::default() };

        for node in phylo.get_internal() {
            let quartets = self.quartets.get(node);
            let stats = BranchStats {
                num_quartets: quartets.map(|q| q.quartets.len()).unwrap_or_default(),
                total_quartets: quartets.map(|q| q.total).unwrap_or_default(),
                ..Default::default()
            };
            summary.branches.insert(node, stats);
        }

        for (locus, partial) in partials {
            let partial = match partial {
                Ok(partial) => partial,
                Err(e) => {
                    warn!("Skipping locus {locus}: {e}");
                    let (locus, message) = (locus.to_string(), e.to_string());
                    summary.diagnostics.push(Diagnostic { locus, message });
                    continue;
                }
            };
            for (node, stats) in &partial.branches {
                if let Some(branch) = summary.branches.get_mut(node) {
                    branch.merge(stats);
                }
            }
            summary.missing_taxon_skips += partial.missing_taxon_skips;
            summary.loci.push(LocusSummary::new(&partial, self.min_scf));
        }

        if summary.missing_taxon_skips > 0 {
            let skips = summary.missing_taxon_skips;
            info!("{skips} quartets were skipped in loci missing one of their taxa.");
        }
        if !summary.diagnostics.is_empty() {
            warn!("{} loci were dropped.", summary.diagnostics.len());
        }

        for (node, stats) in &summary.branches {
            let avg = stats.avg_scf().map(|s| format!("{s:.4}")).unwrap_or_else(|| "NA".into());
            let (label, decisive) = (&phylo.graph[*node], stats.decisive_sites);
            debug!("Branch {label}: {decisive} decisive sites, sCF {avg}");
        }

        summary
    }
}
