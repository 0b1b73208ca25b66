//! Error path integration tests.
//!
//! Invalid inputs surface as typed errors rather than panics.

use bamrec::{AlignerScoring, AlignmentRecord, BamRecError, Cigar, GenomicRegion, ReferenceGenomeIndex};
use rstest::rstest;

use crate::helpers::{ReadBuilder, assert_invalid_argument, create_indexed_fasta};

// ==================== CIGAR parsing ====================

#[rstest]
#[case("10M5Q")]
#[case("M")]
#[case("12")]
#[case("300000000M")]
fn test_malformed_cigar_is_format_error(#[case] text: &str) {
    assert!(matches!(Cigar::parse(text), Err(BamRecError::Format { .. })));
}

// ==================== Record construction ====================

#[test]
fn test_perfect_rejects_mismatched_cigar() {
    let result = AlignmentRecord::perfect(
        "r",
        "ACGT",
        &GenomicRegion::new(0, 0, 4),
        &Cigar::parse("2S3M").unwrap(),
    );
    assert!(matches!(result, Err(BamRecError::InvariantViolation { .. })));
}

#[test]
fn test_oversized_name_leaves_record_untouched() {
    let mut read = ReadBuilder::new().name("keep").build();
    let before = read.bytes().to_vec();
    assert_invalid_argument(read.set_name(&"x".repeat(300)), "name");
    assert_eq!(*read.bytes(), before[..]);
}

#[test]
fn test_truncated_raw_bytes() {
    let bytes = ReadBuilder::new().build().bytes().to_vec();
    assert_invalid_argument(AlignmentRecord::from_raw(bytes[..40].to_vec()), "bytes");
}

#[test]
fn test_bad_quality_text() {
    let mut read = ReadBuilder::new().build();
    assert_invalid_argument(read.set_qualities("short"), "qualities");
    assert_invalid_argument(read.set_qualities("IIIII IIII"), "qualities");
}

#[test]
fn test_positive_gap_extend() {
    let scoring = AlignerScoring { gap_extend: 2, ..AlignerScoring::default() };
    let result =
        AlignmentRecord::aligned_with("r", "ACGT", "ACGT", &GenomicRegion::new(0, 0, 4), &scoring);
    assert_invalid_argument(result, "gap_extend");
}

// ==================== Reference lookup ====================

#[test]
fn test_reference_query_errors() {
    let fasta = create_indexed_fasta(&[("chr1", "ACGTACGTAC")]);
    let mut reference = ReferenceGenomeIndex::from_path(&fasta.path).unwrap();

    assert_invalid_argument(reference.query_region("chr1", 5, 2), "p1");
    assert_invalid_argument(reference.query_region("chr1", -1, 2), "p1");
    assert_invalid_argument(reference.query_region("chrUn", 0, 2), "chrom");
    assert_invalid_argument(reference.query_region("chr1", 10, 12), "p1");
    assert_eq!(reference.query_region("chr1", 8, 12).unwrap(), "AC");
}

#[test]
fn test_reference_without_index() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("plain.fa");
    std::fs::write(&path, ">chr1\nACGT\n").unwrap();
    assert_invalid_argument(ReferenceGenomeIndex::from_path(&path), "fasta");
}
