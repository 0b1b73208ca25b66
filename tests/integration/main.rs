//! Integration tests for the bamrec library.
//!
//! These tests exercise the public API across modules: record construction,
//! aliasing, tag storage, pair orientation and reference lookup.

mod helpers;
mod test_aligned_records;
mod test_error_paths;
mod test_pair_orientation;
mod test_record_aliasing;
mod test_record_layout;
mod test_tag_store;
