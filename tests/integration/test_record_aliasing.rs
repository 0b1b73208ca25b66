//! Shared-buffer semantics of `AlignmentRecord`.

use bamrec::{AlignmentRecord, Cigar};

use crate::helpers::ReadBuilder;

#[test]
fn test_clones_observe_every_kind_of_mutation() {
    let mut read = ReadBuilder::new().name("r1").cigar("5S45M", 50).at(1, 500).build();
    let alias = read.clone();
    assert!(alias.shares_buffer_with(&read));
    assert_eq!(read.handle_count(), 2);

    read.set_position(900);
    read.set_map_quality(3);
    read.add_z_tag(b"RG", "lib");
    read.set_cigar(&Cigar::parse("50M").unwrap()).unwrap();
    read.set_name("renamed").unwrap();
    read.set_sequence(&"C".repeat(50)).unwrap();

    assert_eq!(alias.position(), 900);
    assert_eq!(alias.map_quality(), 3);
    assert_eq!(alias.get_z_tag(b"RG"), "lib");
    assert_eq!(alias.cigar().to_string(), "50M");
    assert_eq!(alias.name(), "renamed");
    assert_eq!(alias.sequence(), "C".repeat(50));
    assert_eq!(alias, read);
}

#[test]
fn test_mutation_through_alias_reaches_original() {
    let read = ReadBuilder::new().build();
    let mut alias = read.clone();
    alias.remove_all_tags();
    alias.add_int_tag(b"XP", 7);
    assert_eq!(read.get_int_tag(b"XP"), 7);
}

#[test]
fn test_deep_copy_diverges() {
    let mut read = ReadBuilder::new().z_tag(b"RG", "a").build();
    let copy = read.deep_copy();
    assert_eq!(copy, read);
    assert_eq!(read.handle_count(), 1);

    read.remove_tag(b"RG");
    read.set_position(42);
    assert_eq!(copy.get_z_tag(b"RG"), "a");
    assert_eq!(copy.position(), 0);
    assert_ne!(copy, read);
}

#[test]
fn test_raw_round_trip_preserves_bytes() {
    let read = ReadBuilder::new()
        .name("q:1:2")
        .bases("ACGTNACGTN", "2S6M2S")
        .at(3, 12_345)
        .mate(3, 12_600)
        .quals("IIIII#####")
        .z_tag(b"RG", "grp")
        .build();
    let bytes = read.bytes().to_vec();

    let adopted = AlignmentRecord::from_raw(bytes.clone()).unwrap();
    assert_eq!(adopted.to_string(), read.to_string());
    assert_eq!(adopted.into_raw().unwrap(), bytes);
}

#[test]
fn test_into_raw_refused_while_aliased() {
    let read = ReadBuilder::new().build();
    let alias = read.clone();
    let read = read.into_raw().unwrap_err();
    drop(alias);
    assert_eq!(read.into_raw().unwrap().len(), 33 + "read".len() + 4 + 5 + 10);
}
