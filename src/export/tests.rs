use crate::export::{self, ALN_STATS, QUARTETS, SCF_STATS, SCF_TREE};
use crate::run::ScfArgs;
use crate::scf::{Aggregator, ScfSummary};
use crate::sequence::Loci;

use color_eyre::eyre::{Report, Result};
use phyloacc_phylo::{examples, FromNewick, Phylogeny};

fn summary(phylo: &Phylogeny) -> Result<ScfSummary, Report> {
    let loci: Loci = serde_json::from_str(
        r#"{
            "locus1": {"A": "AAT", "B": "AAT", "C": "CCT", "D": "CCT"},
            "locus2": {"A": "AG-", "B": "CT-", "C": "AG-", "D": "CTA"}
        }"#,
    )?;
    Aggregator::new(phylo, &ScfArgs::default())?.run(&loci)
}

#[test]
fn scf_stats_table() -> Result<(), Report> {
    let phylo = examples::quartet()?;
    let table = export::scf_stats(&phylo, &summary(&phylo)?)?;

    assert_eq!(table.headers.len(), 9);
    assert_eq!(table.get_column(&"node".to_string())?, [&"<1>", &"<2>"]);
    // locus1 is fully concordant, locus2 fully discordant
    assert_eq!(table.get(&"decisive-sites".to_string(), 0)?, "4");
    assert_eq!(table.get(&"concordant-sites".to_string(), 0)?, "2");
    assert_eq!(table.get(&"decisive-quartets".to_string(), 0)?, "2");
    assert_eq!(table.get(&"avg-quartet-scf".to_string(), 0)?, "0.5");
    Ok(())
}

#[test]
fn aln_stats_table() -> Result<(), Report> {
    let phylo = examples::quartet()?;
    let table = export::aln_stats(&summary(&phylo)?)?;

    let expected = [
        ["locus1", "4", "3", "2", "2", "0", "0", "3", "1", "0"],
        ["locus2", "4", "3", "2", "2", "1", "1", "2.25", "0", "1"],
    ];
    assert_eq!(table.rows, expected);
    Ok(())
}

#[test]
fn quartets_table_degenerate() -> Result<(), Report> {
    let phylo = Phylogeny::from_newick("(((A,B),C),(D,E));")?;
    let summary = Aggregator::new(&phylo, &ScfArgs::default())?.run(&Loci::new())?;
    let table = export::quartets(&phylo, &summary)?;

    let expected = [
        ["<1>", "((A,B),(C,D))", "2"],
        ["<2>", "((A,C),(D,E))", "2"],
        ["<3>", "", "0"],
    ];
    assert_eq!(table.rows, expected);

    let phylo = Phylogeny::from_newick("((A,B),C);")?;
    let summary = Aggregator::new(&phylo, &ScfArgs::default())?.run(&Loci::new())?;
    let table = export::quartets(&phylo, &summary)?;
    assert_eq!(table.rows, [["<1>", "", "0"]]);
    Ok(())
}

#[test]
fn write_outputs() -> Result<(), Report> {
    let phylo = examples::quartet()?;
    let dir = tempfile::tempdir()?;
    export::write(&phylo, &summary(&phylo)?, &dir.path())?;

    let scf_stats = std::fs::read_to_string(dir.path().join(SCF_STATS))?;
    let mut lines = scf_stats.lines();
    let headers = [
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
    assert_eq!(lines.next(), Some(headers.join(",").as_str()));
    assert_eq!(lines.next(), Some("<1>,4,4,2,1,1,1,2,0.5"));
    assert_eq!(lines.next(), Some("<2>,0,0,0,0,0,0,0,NA"));

    let quartets = std::fs::read_to_string(dir.path().join(QUARTETS))?;
    let expected = "node\tquartet\ttotal-quartets\n<1>\t((A,B),(C,D))\t1\n<2>\t\t0\n";
    assert_eq!(quartets, expected);

    assert!(dir.path().join(ALN_STATS).exists());
    let tree = std::fs::read_to_string(dir.path().join(SCF_TREE))?;
    let expected = "((A:0.1,B:0.1)<1>_0.50:0.2,(C:0.1,D:0.1)<2>_NA:0.2)<3>_NA;\n";
    assert_eq!(tree, expected);
    Ok(())
}

#[test]
fn labels_with_delimiters_are_quoted() -> Result<(), Report> {
    let phylo = Phylogeny::from_newick("((A,B)'anc, 1',(C,D));")?;
    let summary = Aggregator::new(&phylo, &ScfArgs::default())?.run(&Loci::new())?;
    let dir = tempfile::tempdir()?;
    export::write(&phylo, &summary, &dir.path())?;

    let scf_stats = std::fs::read_to_string(dir.path().join(SCF_STATS))?;
    let rows: Vec<_> = scf_stats.lines().skip(1).collect();
    assert_eq!(rows, ["\"anc, 1\",0,0,0,0,1,1,0,NA", "<1>,0,0,0,0,0,0,0,NA"]);

    let tree = std::fs::read_to_string(dir.path().join(SCF_TREE))?;
    assert_eq!(tree, "((A,B)'anc, 1_NA',(C,D)<1>_NA)<2>_NA;\n");
    Ok(())
}
