//! Zero-copy access to alignment records stored in the BAM record layout.
//!
//! Everything here operates on `&[u8]` / `&mut Vec<u8>` holding one record
//! (without the leading `block_size`). Higher-level, typed access lives in
//! the `bamrec` crate.

#![deny(unsafe_code)]

pub mod builder;
pub mod cigar;
pub mod fields;
pub mod sequence;
pub mod tags;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

// Flat re-exports so callers can use bamrec_raw::flags() etc.
pub use builder::*;
pub use cigar::*;
pub use fields::*;
pub use sequence::*;
pub use tags::*;

#[cfg(any(test, feature = "test-utils"))]
pub use testutil::*;
