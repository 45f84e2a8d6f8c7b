use crate::{
    examples, FromNewick, NewickOptions, NodeKind, Phylogeny, ToNewick, TopologyIndex, TreeError,
};
use color_eyre::eyre::{Report, Result};
use std::collections::BTreeSet;

/// Parent label, child labels and branch lengths of every node, in post-order.
fn structure(phylo: &Phylogeny) -> Result<Vec<(String, Vec<String>, Option<f64>)>, Report> {
    phylo
        .postorder()
        .into_iter()
        .map(|n| {
            let children = phylo
                .get_children(n)?
                .into_iter()
                .map(|c| phylo.get_label(c).map(String::from))
                .collect::<Result<Vec<_>, Report>>()?;
            let length = phylo.get_branch(n)?.and_then(|b| b.length);
            Ok((phylo.get_label(n)?.to_string(), children, length))
        })
        .collect()
}

fn format_error(newick: &str) -> bool {
    match Phylogeny::from_newick(newick) {
        Ok(_) => false,
        Err(report) => matches!(report.downcast_ref::<TreeError>(), Some(TreeError::Format { .. })),
    }
}

#[test]
fn round_trip() -> Result<(), Report> {
    for newick in [examples::QUARTET, examples::POLYTOMY, examples::RATITE] {
        let phylo = Phylogeny::from_newick(newick)?;
        let annotated = phylo.to_newick()?;
        let reparsed = Phylogeny::from_newick(&annotated)?;

        assert_eq!(structure(&phylo)?, structure(&reparsed)?);
        assert_eq!(annotated, reparsed.to_newick()?);
    }
    Ok(())
}

#[test]
fn labels_are_idempotent() -> Result<(), Report> {
    let first = Phylogeny::from_newick(examples::RATITE)?.to_newick()?;
    let second = Phylogeny::from_newick(examples::RATITE)?.to_newick()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn labels_postorder() -> Result<(), Report> {
    let phylo = Phylogeny::from_newick("((A,B),((C,D),E));")?;
    assert_eq!(phylo.to_newick()?, "((A,B)<1>,((C,D)<2>,E)<3>)<4>;");
    assert_eq!(phylo.get_node(phylo.get_root())?.kind, NodeKind::Root);
    assert_eq!(phylo.get_internal().len(), 3);
    Ok(())
}

#[test]
fn labels_keep_input_and_skip_collisions() -> Result<(), Report> {
    // "<1>" is taken by the input, so the first generated label is "<2>"
    let phylo = Phylogeny::from_newick("((A,B)<1>,(C,D));")?;
    assert_eq!(phylo.to_newick()?, "((A,B)<1>,(C,D)<2>)<3>;");

    let phylo = Phylogeny::from_newick("((A,B)anc,(C,D));")?;
    assert_eq!(phylo.to_newick()?, "((A,B)anc,(C,D)<1>)<2>;");
    Ok(())
}

#[test]
fn generated_labels_are_not_prefixes() -> Result<(), Report> {
    let phylo = examples::ratite()?;
    let labels: Vec<_> = phylo
        .postorder()
        .into_iter()
        .filter(|n| !phylo.graph[*n].is_tip())
        .map(|n| phylo.graph[n].label.clone())
        .collect();
    assert!(labels.len() > 10);
    for a in &labels {
        for b in &labels {
            assert!(a == b || !b.starts_with(a.as_str()), "{a} is a prefix of {b}");
        }
    }
    Ok(())
}

#[test]
fn whitespace_comments_and_quotes() -> Result<(), Report> {
    let phylo = Phylogeny::from_newick(" ( 'taxon one':0.5 , B [comment] :1e-3 ) ; \n")?;
    assert_eq!(phylo.get_tip_labels(), ["taxon one", "B"]);
    assert_eq!(phylo.to_newick()?, "('taxon one':0.5,B:0.001)<1>;");
    Ok(())
}

#[test]
fn format_errors() {
    assert!(format_error(""));
    assert!(format_error(";"));
    assert!(format_error("A;"));
    assert!(format_error("((A,B),(C,D);"));
    assert!(format_error("((A,B)),(C,D));"));
    assert!(format_error("((A,B),(C,D)));"));
    assert!(format_error("((A,B),(A,D));"));
    assert!(format_error("((A:0.1,B:zero),C);"));
    assert!(format_error("((A:-0.1,B),C);"));
    assert!(format_error("((A,),C);"));
    assert!(format_error("((A,B),C); extra"));
    assert!(format_error("((A,B),'C);"));
}

#[test]
fn repeated_internal_labels_are_support() -> Result<(), Report> {
    let newick = "(((A,B)100:0.1,C)100:0.1,(D,E)95:0.1);";
    assert!(!format_error(newick));

    let phylo = Phylogeny::from_newick(newick)?;
    assert_eq!(phylo.to_newick()?, "(((A,B)<1>:0.1,C)<2>:0.1,(D,E)95:0.1)<3>;");
    for label in ["<1>", "<2>"] {
        let node = phylo.get_node(phylo.get_node_index(label)?)?;
        assert_eq!(node.support.as_deref(), Some("100"));
    }
    assert_eq!(phylo.get_node(phylo.get_node_index("95")?)?.support, None);

    // an internal label that names a tip is a support value too
    let phylo = Phylogeny::from_newick("((A,B)A,(C,D)X);")?;
    assert_eq!(phylo.to_newick()?, "((A,B)<1>,(C,D)X)<2>;");
    Ok(())
}

#[test]
fn format_error_names_tree() {
    let newick = "((A,B),(C,D);";
    let report = Phylogeny::from_newick(newick).unwrap_err();
    assert!(report.to_string().contains(newick));
}

#[test]
fn node_not_found() -> Result<(), Report> {
    let phylo = examples::quartet()?;
    let index = TopologyIndex::new(&phylo);
    let missing = petgraph::graph::NodeIndex::new(1000);

    let report = index.tips_below(missing).unwrap_err();
    assert!(matches!(report.downcast_ref::<TreeError>(), Some(TreeError::NodeNotFound(_))));
    assert!(phylo.get_children(missing).is_err());
    assert!(index.adjacent_groups(missing).is_err());
    Ok(())
}

#[test]
fn bipartition_completeness() -> Result<(), Report> {
    for phylo in [examples::quartet()?, examples::polytomy()?, examples::ratite()?] {
        let index = TopologyIndex::new(&phylo);
        let tips: BTreeSet<String> = phylo.get_tip_labels().into_iter().map(String::from).collect();
        assert_eq!(index.get_tips(), &tips);

        for node in phylo.postorder() {
            let (below, rest) = index.bipartition(node)?;
            assert!(below.is_disjoint(&rest));
            assert_eq!(below.len() + rest.len(), tips.len());
            assert_eq!(below.union(&rest).cloned().collect::<BTreeSet<_>>(), tips);
        }
    }
    Ok(())
}

#[test]
fn adjacent_groups_partition_tips() -> Result<(), Report> {
    let phylo = examples::ratite()?;
    let index = TopologyIndex::new(&phylo);

    for node in phylo.get_internal() {
        let groups = index.adjacent_groups(node)?;
        let (below, rest) = index.bipartition(node)?;

        let below_tips: BTreeSet<_> = groups.below.iter().flatten().cloned().collect();
        let above_tips: BTreeSet<_> = groups.above.iter().flatten().cloned().collect();
        assert_eq!(below_tips, below);
        assert_eq!(above_tips, rest);

        for group in groups.below.iter().chain(groups.above.iter()) {
            let mut sorted = group.clone();
            sorted.sort();
            assert_eq!(&sorted, group);
        }
    }
    Ok(())
}

#[test]
fn adjacent_groups_polytomy() -> Result<(), Report> {
    let phylo = examples::polytomy()?;
    let index = TopologyIndex::new(&phylo);

    // (A,B,C) below a bifurcating root, sibling (D,(E,F)) is unrooted into its children
    let groups = index.adjacent_groups(phylo.get_node_index("<1>")?)?;
    assert_eq!(groups.below, [vec!["A"], vec!["B"], vec!["C"]]);
    assert_eq!(groups.above, [vec!["D"], vec!["E", "F"]]);

    // (E,F) sits below a regular internal node
    let groups = index.adjacent_groups(phylo.get_node_index("<2>")?)?;
    assert_eq!(groups.below, [vec!["E"], vec!["F"]]);
    assert_eq!(groups.above, [vec!["D"], vec!["A", "B", "C"]]);
    Ok(())
}

#[test]
fn root_branch_folds_into_first_child() -> Result<(), Report> {
    let phylo = examples::polytomy()?;
    let index = TopologyIndex::new(&phylo);
    let folded: Vec<_> = phylo
        .postorder()
        .into_iter()
        .filter(|n| index.folds_into_sibling(*n).unwrap_or(false))
        .map(|n| phylo.graph[n].label.clone())
        .collect();
    assert_eq!(folded, ["<3>"]);

    // a multifurcating root has a branch above each child
    let phylo = Phylogeny::from_newick("((A,B),(C,D),(E,F));")?;
    let index = TopologyIndex::new(&phylo);
    for node in phylo.postorder() {
        assert!(!index.folds_into_sibling(node)?);
    }
    Ok(())
}

#[test]
fn strip_labels_and_lengths() -> Result<(), Report> {
    let phylo = examples::quartet()?;
    let options = NewickOptions { internal_labels: false, branch_lengths: true };
    let newick = phylo.to_newick_with(&options, |_, node| node.label.clone())?;
    assert_eq!(newick, examples::QUARTET);
    Ok(())
}
