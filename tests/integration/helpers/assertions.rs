//! Custom assertion helpers for integration tests.

#![allow(dead_code)]

use bamrec::{AlignmentRecord, BamRecError};

/// Asserts that `result` failed with [`BamRecError::InvalidArgument`] naming `parameter`.
///
/// # Panics
///
/// Panics if the result is `Ok` or a different error.
pub fn assert_invalid_argument<T: std::fmt::Debug>(result: bamrec::Result<T>, parameter: &str) {
    match result {
        Err(BamRecError::InvalidArgument { parameter: p, .. }) => {
            assert_eq!(p, parameter, "InvalidArgument names the wrong parameter");
        }
        other => panic!("expected InvalidArgument for '{parameter}', got {other:?}"),
    }
}

/// Asserts the tag keys of a record, in storage order.
///
/// # Panics
///
/// Panics if the keys differ.
pub fn assert_tag_keys(record: &AlignmentRecord, expected: &[&str]) {
    let keys: Vec<String> = record.tags().into_iter().map(|(key, _)| key).collect();
    assert_eq!(keys, expected, "tag keys of {}", record.name());
}

/// Asserts that a record's byte length matches its length fields with no tags.
///
/// # Panics
///
/// Panics if the lengths differ.
pub fn assert_tagless_length(record: &AlignmentRecord) {
    let name_len = record.name().len() + 1;
    let expected = 32 + name_len + 4 * record.cigar_size() + record.length().div_ceil(2) + record.length();
    assert_eq!(record.bytes().len(), expected, "tagless length of {}", record.name());
}
