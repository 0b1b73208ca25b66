//! Raw CIGAR words.
//!
//! A CIGAR operation is packed into a `u32`: the low 4 bits hold the op code
//! and the high 28 bits hold the length.

use crate::fields::{l_read_name, n_cigar_op};

/// Op code for `M` (alignment match).
pub const OP_MATCH: u32 = 0;
/// Op code for `I` (insertion to the reference).
pub const OP_INSERTION: u32 = 1;
/// Op code for `D` (deletion from the reference).
pub const OP_DELETION: u32 = 2;
/// Op code for `N` (skipped reference region).
pub const OP_REF_SKIP: u32 = 3;
/// Op code for `S` (soft clip).
pub const OP_SOFT_CLIP: u32 = 4;
/// Op code for `H` (hard clip).
pub const OP_HARD_CLIP: u32 = 5;
/// Op code for `P` (padding).
pub const OP_PADDING: u32 = 6;
/// Op code for `=` (sequence match).
pub const OP_SEQ_MATCH: u32 = 7;
/// Op code for `X` (sequence mismatch).
pub const OP_SEQ_MISMATCH: u32 = 8;

/// CIGAR text alphabet indexed by op code (`B` is code 9).
pub const CIGAR_OP_CHARS: &[u8; 10] = b"MIDNSHP=XB";

/// Largest length that fits in the 28 high bits of a CIGAR word.
pub const MAX_CIGAR_OP_LEN: u32 = (1 << 28) - 1;

const CONSUMES_QUERY: u8 = 0b01;
const CONSUMES_REF: u8 = 0b10;

/// Consumption properties indexed by op code.
const CIGAR_CONSUMES: [u8; 16] = [
    CONSUMES_QUERY | CONSUMES_REF, // M
    CONSUMES_QUERY,                // I
    CONSUMES_REF,                  // D
    CONSUMES_REF,                  // N
    CONSUMES_QUERY,                // S
    0,                             // H
    0,                             // P
    CONSUMES_QUERY | CONSUMES_REF, // =
    CONSUMES_QUERY | CONSUMES_REF, // X
    0,                             // B
    0,
    0,
    0,
    0,
    0,
    0,
];

/// Pack an op code and length into a CIGAR word.
#[inline]
#[must_use]
pub fn encode_op(op_type: u32, len: u32) -> u32 {
    (len << 4) | (op_type & 0xF)
}

/// Op code (low 4 bits) of a CIGAR word.
#[inline]
#[must_use]
pub fn op_type(op: u32) -> u32 {
    op & 0xF
}

/// Length (high 28 bits) of a CIGAR word.
#[inline]
#[must_use]
pub fn op_len(op: u32) -> u32 {
    op >> 4
}

/// Text character for a CIGAR word; codes past `B` render as `?`.
#[inline]
#[must_use]
pub fn op_char(op: u32) -> u8 {
    CIGAR_OP_CHARS.get(op_type(op) as usize).copied().unwrap_or(b'?')
}

/// Op code for a text character, if the character names a CIGAR kind.
///
/// `B` is accepted by the alphabet for printing only and is not parsed.
#[inline]
#[must_use]
pub fn op_code_for_char(c: u8) -> Option<u32> {
    match c {
        b'M' => Some(OP_MATCH),
        b'I' => Some(OP_INSERTION),
        b'D' => Some(OP_DELETION),
        b'N' => Some(OP_REF_SKIP),
        b'S' => Some(OP_SOFT_CLIP),
        b'H' => Some(OP_HARD_CLIP),
        b'P' => Some(OP_PADDING),
        b'=' => Some(OP_SEQ_MATCH),
        b'X' => Some(OP_SEQ_MISMATCH),
        _ => None,
    }
}

/// Whether the op consumes reference bases (M, D, N, =, X).
#[inline]
#[must_use]
pub fn consumes_reference(op: u32) -> bool {
    CIGAR_CONSUMES[op_type(op) as usize] & CONSUMES_REF != 0
}

/// Whether the op consumes query bases (M, I, S, =, X).
#[inline]
#[must_use]
pub fn consumes_query(op: u32) -> bool {
    CIGAR_CONSUMES[op_type(op) as usize] & CONSUMES_QUERY != 0
}

/// Whether the op is a soft or hard clip.
#[inline]
#[must_use]
pub fn is_clip(op: u32) -> bool {
    matches!(op_type(op), OP_SOFT_CLIP | OP_HARD_CLIP)
}

/// Extract CIGAR operations from a record.
#[inline]
#[must_use]
pub fn get_cigar_ops(bam: &[u8]) -> Vec<u32> {
    let l_read_name = l_read_name(bam) as usize;
    let n_cigar_op = n_cigar_op(bam) as usize;

    if n_cigar_op == 0 {
        return Vec::new();
    }

    let cigar_start = 32 + l_read_name;
    let cigar_end = cigar_start + n_cigar_op * 4;

    if cigar_end > bam.len() {
        return Vec::new();
    }

    // Read CIGAR ops bytewise to avoid alignment issues; the CIGAR data offset
    // (32 + l_read_name) is not guaranteed to be 4-byte aligned.
    let cigar_bytes = &bam[cigar_start..cigar_end];
    cigar_bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

/// Append CIGAR words to `dst` in little-endian order.
#[inline]
pub fn write_cigar_ops(dst: &mut Vec<u8>, cigar_ops: &[u32]) {
    dst.reserve(cigar_ops.len() * 4);
    for &op in cigar_ops {
        dst.extend_from_slice(&op.to_le_bytes());
    }
}

/// Calculate reference-consuming length from CIGAR operations.
///
/// This is the sum of M/D/N/=/X operations, which represents how many
/// reference bases the alignment spans. Summed in `i64`: 65,535 ops of up to
/// 2^28 - 1 bases each exceed `i32`.
#[inline]
#[must_use]
pub fn reference_length_from_cigar(cigar_ops: &[u32]) -> i64 {
    cigar_ops.iter().filter(|&&op| consumes_reference(op)).map(|&op| i64::from(op_len(op))).sum()
}

/// Compute the query-consuming length of CIGAR operations (the "read length").
///
/// This is the sum of M/I/S/=/X operations.
#[inline]
#[must_use]
pub fn query_length_from_cigar(cigar_ops: &[u32]) -> usize {
    cigar_ops.iter().filter(|&&op| consumes_query(op)).map(|&op| op_len(op) as usize).sum()
}

/// Total S+H length at the start of the CIGAR, stopping at the first non-clip.
#[inline]
#[must_use]
pub fn leading_clips(cigar_ops: &[u32]) -> usize {
    cigar_ops.iter().take_while(|&&op| is_clip(op)).map(|&op| op_len(op) as usize).sum()
}

/// Total S+H length at the end of the CIGAR, stopping at the first non-clip.
#[inline]
#[must_use]
pub fn trailing_clips(cigar_ops: &[u32]) -> usize {
    cigar_ops.iter().rev().take_while(|&&op| is_clip(op)).map(|&op| op_len(op) as usize).sum()
}
