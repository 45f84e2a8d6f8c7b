use crate::export::{ALN_STATS, QUARTETS, SCF_STATS, SCF_TREE};
use crate::run::{run, ScfArgs, TreeInput};

use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use phyloacc_phylo::examples;

const MOD_FILE: &str = indoc! {"
    ALPHABET: A C G T
    ORDER: 0
    SUBST_MOD: REV
    TRAINING_LNL: -1000.0
    BACKGROUND: 0.25 0.25 0.25 0.25
    TREE: ((A:0.1,B:0.1):0.2,(C:0.1,D:0.1):0.2);
"};

#[test]
fn tree_from_mod_file() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("neut.mod");
    std::fs::write(&path, MOD_FILE)?;

    let input = TreeInput { mod_file: Some(path), tree: None };
    assert_eq!(input.read()?, examples::QUARTET);
    Ok(())
}

#[test]
fn tree_missing() {
    assert!(TreeInput::default().read().is_err());
}

#[test]
fn run_writes_outputs() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let alignments = dir.path().join("alignments.json");
    let loci = r#"{"locus1": {"A": "AAT", "B": "AAT", "C": "CCT", "D": "CCT", "E": "GGT"}}"#;
    std::fs::write(&alignments, loci)?;

    let output_dir = dir.path().join("output");
    let args = ScfArgs {
        tree: TreeInput { tree: Some(examples::QUARTET.to_string()), mod_file: None },
        alignments,
        output_dir: output_dir.clone(),
        threads: 2,
        ..Default::default()
    };
    run(&args)?;

    for file in [SCF_STATS, ALN_STATS, QUARTETS, SCF_TREE, "run_args.json"] {
        assert!(output_dir.join(file).exists(), "{file} was not written");
    }
    // taxon E is not in the tree
    let aln_stats = std::fs::read_to_string(output_dir.join(ALN_STATS))?;
    assert_eq!(aln_stats.lines().nth(1), Some("locus1,4,3,2,2,0,0,3,1,0"));

    let observed = ScfArgs::read(&output_dir.join("run_args.json"))?;
    assert_eq!(observed.threads, 2);
    assert_eq!(observed.tree, args.tree);
    Ok(())
}

#[test]
fn run_invalid_tree() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = ScfArgs {
        tree: TreeInput { tree: Some("((A,B),(C,D);".to_string()), mod_file: None },
        alignments: dir.path().join("alignments.json"),
        output_dir: dir.path().join("output"),
        ..Default::default()
    };
    let report = run(&args).unwrap_err();
    assert!(report.to_string().contains("((A,B),(C,D);"));
    assert!(!dir.path().join("output").exists());
    Ok(())
}
