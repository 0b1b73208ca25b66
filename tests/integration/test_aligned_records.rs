//! Reference lookup feeding the local-alignment constructor.

use bamrec::{AlignmentRecord, GenomicRegion, ReferenceGenomeIndex, Strand};

use crate::helpers::{create_indexed_fasta, create_indexed_fasta_with_width, pseudo_random_bases};

#[test]
fn test_query_region_matches_source_sequence() {
    let chr1 = pseudo_random_bases(500, 1);
    let chr2 = pseudo_random_bases(137, 2);
    let fasta = create_indexed_fasta(&[("chr1", &chr1), ("chr2", &chr2)]);
    let mut reference = ReferenceGenomeIndex::from_path(&fasta.path).unwrap();

    for (start, end) in [(0, 0), (0, 59), (59, 60), (61, 300), (499, 499)] {
        assert_eq!(
            reference.query_region("chr1", start, end).unwrap(),
            chr1[start as usize..=end as usize],
            "chr1:{start}-{end}"
        );
    }
    assert_eq!(reference.query_region("chr2", 100, 136).unwrap(), chr2[100..]);
    assert_eq!(reference.sequence_length("chr2"), Some(137));
}

#[test]
fn test_align_read_against_fetched_window() {
    let chr1 = pseudo_random_bases(1_000, 7);
    let fasta = create_indexed_fasta_with_width(&[("chr1", &chr1)], 50);
    let mut reference = ReferenceGenomeIndex::from_path(&fasta.path).unwrap();

    let window = GenomicRegion::new(0, 200, 400);
    let bases = reference.query_region("chr1", window.start, window.end - 1).unwrap();
    assert_eq!(bases.len(), 200);

    let read_seq = &chr1[250..300];
    let read = AlignmentRecord::aligned("aligned", read_seq, &bases, &window).unwrap();
    assert!(read.is_mapped());
    assert_eq!(read.position(), 250);
    assert_eq!(read.cigar().to_string(), "50M");
    assert_eq!(read.position_end(), 300);
    assert_eq!(read.get_int_tag(b"AS"), 100);
    assert!(read.validate().is_ok());
}

#[test]
fn test_aligned_read_with_deletion() {
    let chr1 = pseudo_random_bases(400, 11);
    let fasta = create_indexed_fasta(&[("chr1", &chr1)]);
    let mut reference = ReferenceGenomeIndex::from_path(&fasta.path).unwrap();
    let window = GenomicRegion::new(0, 0, 400).with_strand(Strand::Reverse);
    let bases = reference.query_region("chr1", 0, 399).unwrap();

    // 40 bases, skip 5 reference bases, 40 more
    let mut read_seq = String::new();
    read_seq.push_str(&chr1[100..140]);
    read_seq.push_str(&chr1[145..185]);
    let read = AlignmentRecord::aligned("del", &read_seq, &bases, &window).unwrap();

    assert!(read.is_reverse());
    assert_eq!(read.position(), 100);
    assert_eq!(read.cigar().reference_length(), 85);
    assert_eq!(read.max_deletion_bases(), 5);
    assert_eq!(read.alignment_length(), 80);
    assert!(read.validate().is_ok());
}
