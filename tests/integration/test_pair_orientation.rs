//! Pair orientation of mapped pairs.

use bamrec::{Flags, PairOrientation};
use proptest::prelude::*;

use crate::helpers::ReadBuilder;

fn pair_flags(reverse: bool, mate_reverse: bool) -> Flags {
    let mut flags = Flags::SEGMENTED;
    flags.set(Flags::REVERSE_COMPLEMENTED, reverse);
    flags.set(Flags::MATE_REVERSE_COMPLEMENTED, mate_reverse);
    flags
}

proptest! {
    #[test]
    fn test_mapped_pair_never_undefined(
        reverse in any::<bool>(),
        mate_reverse in any::<bool>(),
        pos in 0i32..1_000_000,
        mate_pos in 0i32..1_000_000,
    ) {
        let read = ReadBuilder::new()
            .flags(pair_flags(reverse, mate_reverse))
            .at(0, pos)
            .mate(0, mate_pos)
            .build();
        prop_assert!(read.is_pair_mapped());
        prop_assert_ne!(read.pair_orientation(), PairOrientation::Undefined);
    }
}

#[test]
fn test_orientation_table() {
    // (reverse, mate_reverse, pos, mate_pos, expected)
    let cases = [
        (false, true, 100, 300, PairOrientation::ForwardReverse),
        (true, false, 300, 100, PairOrientation::ForwardReverse),
        (true, false, 100, 300, PairOrientation::ReverseForward),
        (false, true, 300, 100, PairOrientation::ReverseForward),
        (false, false, 100, 300, PairOrientation::ForwardForward),
        (true, true, 100, 300, PairOrientation::ReverseReverse),
    ];
    for (reverse, mate_reverse, pos, mate_pos, expected) in cases {
        let read = ReadBuilder::new()
            .flags(pair_flags(reverse, mate_reverse))
            .at(0, pos)
            .mate(0, mate_pos)
            .build();
        assert_eq!(read.pair_orientation(), expected, "{reverse} {mate_reverse} {pos} {mate_pos}");
    }
}

#[test]
fn test_unmapped_mate_is_undefined() {
    let read = ReadBuilder::new()
        .flags(Flags::SEGMENTED | Flags::MATE_UNMAPPED)
        .at(0, 100)
        .mate(0, 100)
        .build();
    assert_eq!(read.pair_orientation(), PairOrientation::Undefined);
    assert_eq!(read.full_insert_size(), 0);
}

#[test]
fn test_insert_size_and_mate_region() {
    let read = ReadBuilder::new()
        .flags(pair_flags(false, true))
        .at(4, 1_000)
        .mate(4, 1_250)
        .build();
    assert!(read.proper_orientation());
    assert_eq!(read.full_insert_size(), 260);
    assert_eq!(read.as_mate_region().to_string(), "4:1250-1260(-)");
    assert_eq!(read.brief_mate(None), "5:1,250(-)");
}
