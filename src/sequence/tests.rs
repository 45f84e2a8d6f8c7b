use crate::sequence::{read_loci, Alignment, AlignmentStats, SkipChars, DEFAULT_SKIP_CHARS};
use color_eyre::eyre::{Report, Result};
use std::collections::BTreeSet;

fn tips(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

#[test]
fn skip_chars_default() {
    let skip = SkipChars::default();
    for c in DEFAULT_SKIP_CHARS.bytes() {
        assert!(skip.contains(c));
        assert!(skip.contains(c.to_ascii_lowercase()));
    }
    for c in b"ACGTUacgtu" {
        assert!(!skip.contains(*c));
    }
}

#[test]
fn skip_chars_serde() -> Result<(), Report> {
    let skip: SkipChars = serde_json::from_str("\"-n\"")?;
    assert!(skip.contains(b'N'));
    assert!(!skip.contains(b'?'));
    assert_eq!(serde_json::to_string(&skip)?, "\"-n\"");
    Ok(())
}

#[test]
fn alignment_drops_taxa_not_in_tree() -> Result<(), Report> {
    let tips = tips(&["A", "B", "C"]);
    let sequences = [("A", "ACGT"), ("B", "ACGT"), ("outgroup", "AC")];
    let aln = Alignment::new("locus1", sequences, Some(&tips))?;
    assert_eq!(aln.sequences.keys().collect::<Vec<_>>(), ["A", "B"]);
    assert_eq!(aln.get("C"), None);
    assert_eq!(aln.length, 4);
    Ok(())
}

#[test]
fn alignment_unequal_lengths() {
    let result = Alignment::new("locus1", [("A", "ACGT"), ("B", "ACG")], None);
    let report = result.unwrap_err();
    assert!(report.to_string().contains("locus1"));
}

#[test]
fn alignment_no_taxa_in_tree() {
    let tips = tips(&["A", "B"]);
    assert!(Alignment::new("locus1", [("X", "ACGT"), ("Y", "ACGT")], Some(&tips)).is_err());
}

#[test]
fn alignment_empty_sequences() -> Result<(), Report> {
    let aln = Alignment::new("locus1", [("A", ""), ("B", "")], None)?;
    assert!(aln.is_empty());
    let stats = aln.stats(&SkipChars::default());
    assert_eq!(stats.variable_sites, 0);
    assert_eq!(stats.avg_nogap_seq_len, 0.0);
    Ok(())
}

#[test]
fn alignment_stats() -> Result<(), Report> {
    let aln = Alignment::new(
        "locus1",
        [("A", "ACGTN"), ("B", "ACGAN"), ("C", "ATGA-"), ("D", "RTGA-")],
        None,
    )?;
    let observed = aln.stats(&SkipChars::default());
    let expected = AlignmentStats {
        num_seqs: 4,
        length: 5,
        variable_sites: 2,
        informative_sites: 1,
        num_sites_w_gap: 1,
        num_sites_half_gap: 1,
        avg_nogap_seq_len: 4.5,
    };
    assert_eq!(expected, observed);
    Ok(())
}

#[test]
fn alignment_stats_case_insensitive() -> Result<(), Report> {
    let aln = Alignment::new("locus1", [("A", "acgt"), ("B", "ACGT")], None)?;
    assert_eq!(aln.stats(&SkipChars::default()).variable_sites, 0);
    Ok(())
}

#[test]
fn read_loci_invalid_json() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("alignments.json");
    std::fs::write(&path, "[\"not\", \"loci\"]")?;
    assert!(read_loci(&path).is_err());
    assert!(read_loci(&dir.path().join("missing.json")).is_err());
    Ok(())
}
