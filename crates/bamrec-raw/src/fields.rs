//! Direct field access on BAM-layout record buffers.
//!
//! Every alignment record in this workspace is stored as one contiguous
//! buffer in the BAM record layout, so buffers produced by any BAM reader can
//! be adopted as-is and every field below is bit-exact with the format.
//!
//! # Record Binary Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0-3     4     refID (i32) - reference sequence ID
//! 4-7     4     pos (i32) - 0-based leftmost position
//! 8       1     l_read_name (u8) - length of read name + NUL
//! 9       1     mapq (u8) - mapping quality
//! 10-11   2     bin (u16) - BAM bin
//! 12-13   2     n_cigar_op (u16) - number of CIGAR operations
//! 14-15   2     flag (u16) - bitwise flags
//! 16-19   4     l_seq (u32) - length of sequence
//! 20-23   4     next_refID (i32) - mate reference sequence ID
//! 24-27   4     next_pos (i32) - mate 0-based position
//! 28-31   4     tlen (i32) - template length
//! 32+     var   read_name (l_read_name bytes, null-terminated)
//! ...     var   cigar (n_cigar_op * u32)
//! ...     var   seq ((l_seq + 1) / 2 bytes, 4 bits per base)
//! ...     var   qual (l_seq bytes, raw Phred)
//! ...     var   auxiliary tags until end of buffer
//! ```
//!
//! The fixed-offset accessors index the buffer directly and panic when it is
//! shorter than [`MIN_BAM_HEADER_LEN`]. Buffers adopted from outside are
//! length-checked once through [`RecordLayout::from_record`].

use std::ops::Range;

/// Length of the fixed core that precedes the variable-length data.
pub const MIN_BAM_HEADER_LEN: usize = 32;

/// Longest read name that fits in `l_read_name` (254 bytes + NUL).
pub const MAX_READ_NAME_LEN: usize = 254;

/// BAM flag bits.
pub mod flags {
    pub const PAIRED: u16 = 0x1;
    pub const PROPER_PAIR: u16 = 0x2;
    pub const UNMAPPED: u16 = 0x4;
    pub const MATE_UNMAPPED: u16 = 0x8;
    pub const REVERSE: u16 = 0x10;
    pub const MATE_REVERSE: u16 = 0x20;
    /// First segment in template (R1).
    pub const FIRST_SEGMENT: u16 = 0x40;
    /// Last segment in template (R2).
    pub const LAST_SEGMENT: u16 = 0x80;
    pub const SECONDARY: u16 = 0x100;
    pub const QC_FAIL: u16 = 0x200;
    pub const DUPLICATE: u16 = 0x400;
    pub const SUPPLEMENTARY: u16 = 0x800;
}

/// Width in bytes of a scalar tag or array element of type `val_type`.
///
/// `None` for variable-width (`Z`, `H`, `B`) and unknown types.
#[inline]
#[must_use]
pub const fn fixed_value_size(val_type: u8) -> Option<usize> {
    match val_type {
        b'A' | b'c' | b'C' => Some(1),
        b's' | b'S' => Some(2),
        b'i' | b'I' | b'f' => Some(4),
        _ => None,
    }
}

/// Size of the tag value starting at `data[0]`, excluding the 3-byte key and type.
///
/// `None` when the type is unknown or a string lacks its terminator.
#[inline]
#[must_use]
pub fn tag_value_size(val_type: u8, data: &[u8]) -> Option<usize> {
    if let Some(size) = fixed_value_size(val_type) {
        return Some(size);
    }
    match val_type {
        b'Z' | b'H' => data.iter().position(|&b| b == 0).map(|nul| nul + 1),
        b'B' => {
            let (&sub_type, rest) = data.split_first()?;
            let count: [u8; 4] = rest.get(..4)?.try_into().ok()?;
            let width = fixed_value_size(sub_type)?;
            Some(5 + u32::from_le_bytes(count) as usize * width)
        }
        _ => None,
    }
}

#[inline]
fn le_bytes<const N: usize>(bam: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bam[at..at + N]);
    out
}

/// Getter and setter pair for a fixed-width little-endian core field.
macro_rules! core_field {
    ($(#[$doc:meta])* $get:ident, $set:ident, $ty:ty, $at:expr) => {
        $(#[$doc])*
        #[inline]
        #[must_use]
        pub fn $get(bam: &[u8]) -> $ty {
            <$ty>::from_le_bytes(le_bytes(bam, $at))
        }

        $(#[$doc])*
        #[inline]
        pub fn $set(bam: &mut [u8], value: $ty) {
            bam[$at..$at + size_of::<$ty>()].copy_from_slice(&value.to_le_bytes());
        }
    };
}

core_field!(
    /// Reference sequence id, -1 when unplaced.
    ref_id, set_ref_id, i32, 0
);
core_field!(
    /// 0-based leftmost position, -1 when unplaced.
    pos, set_pos, i32, 4
);
core_field!(
    /// Mapping quality.
    mapq, set_mapq, u8, 9
);
core_field!(
    /// BAM index bin.
    bin, set_bin, u16, 10
);
core_field!(
    /// Bitwise flags.
    flags, set_flags, u16, 14
);
core_field!(
    /// Mate reference sequence id.
    mate_ref_id, set_mate_ref_id, i32, 20
);
core_field!(
    /// Mate 0-based position.
    mate_pos, set_mate_pos, i32, 24
);
core_field!(
    /// Observed template length (tlen).
    template_length, set_template_length, i32, 28
);

/// Length of the read name including its NUL.
#[inline]
#[must_use]
pub fn l_read_name(bam: &[u8]) -> u8 {
    bam[8]
}

/// Number of CIGAR operations.
#[inline]
#[must_use]
pub fn n_cigar_op(bam: &[u8]) -> u16 {
    u16::from_le_bytes(le_bytes(bam, 12))
}

/// Number of bases.
#[inline]
#[must_use]
pub fn l_seq(bam: &[u8]) -> u32 {
    u32::from_le_bytes(le_bytes(bam, 16))
}

/// Read name without the NUL terminator.
#[inline]
#[must_use]
pub fn read_name(bam: &[u8]) -> &[u8] {
    let end = MIN_BAM_HEADER_LEN + usize::from(l_read_name(bam));
    &bam[MIN_BAM_HEADER_LEN..end.saturating_sub(1).max(MIN_BAM_HEADER_LEN)]
}

/// Start of the auxiliary data, or `None` when the core is truncated.
///
/// The offset may exceed `bam.len()` for records whose variable-length
/// sections are themselves truncated.
#[inline]
#[must_use]
pub fn aux_data_offset_from_record(bam: &[u8]) -> Option<usize> {
    (bam.len() >= MIN_BAM_HEADER_LEN).then(|| RecordLayout::of(bam).aux.start)
}

/// Auxiliary data, empty when the record is truncated or carries no tags.
#[inline]
#[must_use]
pub fn aux_data_slice(bam: &[u8]) -> &[u8] {
    aux_data_offset_from_record(bam).and_then(|start| bam.get(start..)).unwrap_or(&[])
}

/// Start of the packed bases.
#[inline]
#[must_use]
pub fn seq_offset(bam: &[u8]) -> usize {
    RecordLayout::of(bam).seq.start
}

/// Start of the Phred qualities.
#[inline]
#[must_use]
pub fn qual_offset(bam: &[u8]) -> usize {
    RecordLayout::of(bam).qual.start
}

/// First bin number and shift of each `reg2bin` level, finest first.
const BIN_LEVELS: [(i32, i32); 5] = [(4681, 14), (585, 17), (73, 20), (9, 23), (1, 26)];

/// Compute the BAM bin for a 0-based half-open interval `[beg, end)`.
///
/// `reg2bin(-1, 0)` is the unmapped bin 4680.
#[must_use]
pub fn reg2bin(beg: i32, end: i32) -> u16 {
    let last = end - 1;
    BIN_LEVELS
        .iter()
        .find(|&&(_, shift)| beg >> shift == last >> shift)
        .map_or(0, |&(first, shift)| u16::try_from(first + (beg >> shift)).unwrap_or(0))
}

/// Byte ranges of the typed sub-regions of a record.
///
/// Recomputed from the core fields on demand; structural mutations never
/// patch these ranges incrementally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Read name including the NUL terminator.
    pub name: Range<usize>,
    pub cigar: Range<usize>,
    pub seq: Range<usize>,
    pub qual: Range<usize>,
    /// Auxiliary tags, to the end of the buffer.
    pub aux: Range<usize>,
}

impl RecordLayout {
    /// Compute the layout, returning `None` when the buffer is shorter than
    /// its own length fields claim.
    #[must_use]
    pub fn from_record(bam: &[u8]) -> Option<Self> {
        if bam.len() < MIN_BAM_HEADER_LEN {
            return None;
        }
        let layout = Self::of(bam);
        (layout.aux.start <= bam.len()).then_some(layout)
    }

    /// Layout without the truncation check; the core must be present.
    fn of(bam: &[u8]) -> Self {
        Self::from_lengths(
            usize::from(l_read_name(bam)),
            usize::from(n_cigar_op(bam)),
            l_seq(bam) as usize,
            bam.len(),
        )
    }

    /// Compute the layout from the length fields alone.
    #[must_use]
    pub fn from_lengths(
        l_read_name: usize,
        n_cigar_op: usize,
        l_seq: usize,
        total_len: usize,
    ) -> Self {
        let cigar_start = MIN_BAM_HEADER_LEN + l_read_name;
        let seq_start = cigar_start + 4 * n_cigar_op;
        let qual_start = seq_start + l_seq.div_ceil(2);
        let aux_start = qual_start + l_seq;
        Self {
            name: MIN_BAM_HEADER_LEN..cigar_start,
            cigar: cigar_start..seq_start,
            seq: seq_start..qual_start,
            qual: qual_start..aux_start,
            aux: aux_start..total_len.max(aux_start),
        }
    }

    /// Length of the record without any auxiliary tags.
    #[inline]
    #[must_use]
    pub fn core_len(&self) -> usize {
        self.aux.start
    }
}
