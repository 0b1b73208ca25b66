//! Typed and smart tags on records.

use bamrec::{SMART_TAG_DELIMITER, TagValue};

use crate::helpers::{ReadBuilder, assert_tag_keys};

#[test]
fn test_int_tag_absent_then_present() {
    let mut read = ReadBuilder::new().build();
    assert_eq!(read.get_int_tag(b"XP"), 0);
    read.add_int_tag(b"XP", 7);
    assert_eq!(read.get_int_tag(b"XP"), 7);
}

#[test]
fn test_smart_int_tag_keeps_insertion_order() {
    let mut read = ReadBuilder::new().build();
    read.smart_add_tag(b"AL", "5");
    read.smart_add_tag(b"AL", "9");
    assert_eq!(read.get_smart_int_tag(b"AL"), vec![5, 9]);
    assert_eq!(read.get_z_tag(b"AL"), format!("5{SMART_TAG_DELIMITER}9"));
}

#[test]
fn test_tag_order_through_edits() {
    let mut read = ReadBuilder::new().z_tag(b"RG", "a").build();
    read.add_int_tag(b"NM", 2);
    read.smart_add_tag(b"AL", "1");
    read.smart_add_tag(b"RG", "b");
    assert_tag_keys(&read, &["RG", "NM", "AL"]);
    assert_eq!(read.get_smart_string_tag(b"RG"), vec!["a", "b"]);

    read.remove_tag(b"NM");
    assert_tag_keys(&read, &["RG", "AL"]);
}

#[test]
fn test_tags_render_in_display() {
    let read = ReadBuilder::new()
        .name("t")
        .bases("ACG", "3M")
        .z_tag(b"RG", "grp")
        .build();
    let line = read.to_string();
    assert!(line.ends_with("\tRG:Z:grp"), "{line}");
    assert_eq!(read.tags(), vec![("RG".to_string(), TagValue::String("grp".to_string()))]);
}

#[test]
fn test_read_group_fallbacks() {
    assert_eq!(ReadBuilder::new().name("HWI:3:11").build().parse_read_group(), "HWI");
    assert_eq!(ReadBuilder::new().name("plain").build().parse_read_group(), "NA");
    assert_eq!(
        ReadBuilder::new().name("HWI:3:11").z_tag(b"RG", "rg1").build().parse_read_group(),
        "rg1"
    );
}

#[test]
fn test_secondary_alignment_count() {
    let read = ReadBuilder::new()
        .z_tag(b"XA", "chr1,+10,10M,0;chr1,-99,10M,1;")
        .z_tag(b"XP", "chr2,+5,10M,0;")
        .build();
    assert_eq!(read.count_secondary_alignments(), 3);
}
