#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: BAM fields are fixed-width integers converted at the edges
// - missing_panics_doc: panics are limited to RefCell borrow conflicts, documented on the type
// - module_name_repetitions: record types are named for what they are
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # bamrec - BAM-layout alignment records
//!
//! One sequencing-read alignment held in its binary BAM layout, with typed
//! access to everything packed inside it.
//!
//! ## Overview
//!
//! ### The record
//!
//! - **[`record`]** - [`AlignmentRecord`], a shared handle to one record buffer
//! - **[`cigar`]** - [`Cigar`] and [`CigarOp`] with clip and position arithmetic
//! - **[`orientation`]** - pair orientation over the `noodles` [`Flags`]
//! - **[`tags`]** - typed and "smart" auxiliary tags
//! - **[`quality`]** - base and quality codecs, quality trimming
//!
//! ### Collaborators
//!
//! - **[`reference`][mod@reference]** - indexed FASTA lookup
//! - **[`dictionary`]** - chromosome id to name resolution
//! - **[`align`]** - records built by local alignment to a reference window
//!
//! Byte-level layout helpers live in the `bamrec-raw` crate.
//!
//! ## Aliasing
//!
//! `AlignmentRecord::clone` shares the underlying buffer: a mutation through
//! one handle is visible through every clone. Use
//! [`AlignmentRecord::deep_copy`] for an independent record.
//!
//! ```
//! use bamrec::{AlignmentRecord, Cigar, GenomicRegion};
//!
//! # fn main() -> bamrec::Result<()> {
//! let cigar = Cigar::parse("2S8M")?;
//! let mut read = AlignmentRecord::perfect("r1", "ACGTACGTAC", &GenomicRegion::new(0, 100, 110), &cigar)?;
//! let alias = read.clone();
//! let copy = read.deep_copy();
//!
//! read.add_z_tag(b"RG", "lib1");
//! assert_eq!(alias.get_z_tag(b"RG"), "lib1");
//! assert_eq!(copy.get_z_tag(b"RG"), "");
//! assert_eq!(read.alignment_position(), 2);
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod cigar;
pub mod dictionary;
pub mod errors;
pub mod logging;
pub mod orientation;
pub mod quality;
pub mod record;
pub mod reference;
pub mod region;
pub mod tags;

pub use align::AlignerScoring;
pub use bamrec_raw::{MAX_CIGAR_OP_LEN, MAX_READ_NAME_LEN};
pub use cigar::{Cigar, CigarOp, Kind};
pub use dictionary::ChromosomeDictionary;
pub use errors::{BamRecError, Result};
pub use noodles::sam::alignment::record::Flags;
pub use orientation::PairOrientation;
pub use record::AlignmentRecord;
pub use reference::ReferenceGenomeIndex;
pub use region::{GenomicRegion, Strand};
pub use tags::{SMART_TAG_DELIMITER, TagValue};
