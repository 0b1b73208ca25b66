//! CIGAR, position and codec behaviour of whole records.

use bamrec::{AlignmentRecord, Cigar, Flags, GenomicRegion};
use rstest::rstest;

use crate::helpers::{ReadBuilder, assert_tagless_length};

#[test]
fn test_cigar_text_round_trip() {
    let cigar = Cigar::parse("35M10I5M").unwrap();
    assert_eq!(cigar.to_string(), "35M10I5M");

    let read = ReadBuilder::new().cigar("35M10I5M", 50).build();
    assert_eq!(read.cigar().to_string(), "35M10I5M");
    assert_eq!(read.reverse_cigar().to_string(), "5M10I35M");
    assert_eq!(read.cigar_size(), 3);
}

#[test]
fn test_soft_clipped_read_positions() {
    let read = ReadBuilder::new().cigar("10S80M10S", 100).at(0, 1000).build();
    assert_eq!(read.length(), 100);
    assert_eq!(read.alignment_position(), 10);
    assert_eq!(read.alignment_end_position(), 90);
    assert_eq!(read.position_end(), 1080);
    for pos in 0..100 {
        assert_eq!(read.covered_base(pos), (10..90).contains(&pos), "offset {pos}");
    }
}

#[rstest]
#[case("100M", 100)]
#[case("10S80M10S", 100)]
#[case("5H20S75M", 95)]
#[case("3H10M2I10M4H", 22)]
#[case("5S10M5S10M5H", 30)]
fn test_clip_sum(#[case] cigar: &str, #[case] len: usize) {
    let read = ReadBuilder::new().cigar(cigar, len).build();
    assert_eq!(read.num_soft_clip() + read.num_hard_clip(), read.num_clip());
}

#[test]
fn test_sequence_decoding_is_sparse() {
    let read = ReadBuilder::new().bases("ACGTNMRWSYKVHDB=", "16M").build();
    assert_eq!(read.sequence(), "ACGTN           ");
    assert_eq!(read.count_n_bases(), 1);
}

#[test]
fn test_qualities_and_trimming() {
    let read = ReadBuilder::new().bases("ACGTACGTAC", "10M").quals("##5?IIII+#").build();
    assert_eq!(read.qualities(), "##5?IIII+#");
    assert_eq!(read.quality_trim_range(20), 2..8);
    assert_eq!(read.quality_trimmed_sequence(20), "GTACGT");

    let low = ReadBuilder::new().quals("##########").build();
    let range = low.quality_trim_range(20);
    assert_eq!(range.start, range.end);
    assert_eq!(low.quality_trimmed_sequence(20), "");
}

#[test]
fn test_remove_all_tags_length_is_recomputed() {
    for n in [0, 1, 5, 40] {
        let mut read = ReadBuilder::new().cigar("3S7M", 10).build();
        for i in 0..n {
            read.add_int_tag(b"X0", i);
            read.add_z_tag(b"XZ", &"v".repeat(usize::try_from(i).unwrap()));
        }
        read.remove_all_tags();
        assert_tagless_length(&read);
        assert!(read.tags().is_empty());
    }
}

#[test]
fn test_perfect_record_display() {
    let region = GenomicRegion::new(1, 99, 103);
    let read = AlignmentRecord::perfect("p", "ACGT", &region, &Cigar::parse("4M").unwrap()).unwrap();
    assert_eq!(read.to_string(), "p\t0\t2\t100\t60\t4M\t0\t0\t0\tACGT\t*");
}

#[test]
fn test_unmapped_position_end() {
    let read = ReadBuilder::new().flags(Flags::UNMAPPED).at(0, 50).build();
    assert_eq!(read.position_end(), 51);
}

#[test]
fn test_validate_catches_inconsistent_edits() {
    let mut read = ReadBuilder::new().cigar("10M", 10).build();
    read.set_sequence("ACGTACGTACGT").unwrap();
    assert!(read.validate().is_err());
    read.set_cigar(&Cigar::parse("2S10M").unwrap()).unwrap();
    assert!(read.validate().is_ok());
}
