//! Helpers for building raw record bytes in tests.

use crate::fields::{
    MIN_BAM_HEADER_LEN, RecordLayout, set_flags, set_mate_pos, set_mate_ref_id, set_pos,
    set_ref_id,
};

/// Build a record with zeroed bases and qualities, mapq 0, bin 0 and tlen 0.
///
/// # Panics
///
/// Panics if the name, CIGAR or sequence lengths do not fit their header fields.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn make_bam_bytes(
    tid: i32,
    pos: i32,
    flag: u16,
    name: &[u8],
    cigar_ops: &[u32],
    seq_len: usize,
    mate_tid: i32,
    mate_pos: i32,
    aux_data: &[u8],
) -> Vec<u8> {
    let layout = RecordLayout::from_lengths(name.len() + 1, cigar_ops.len(), seq_len, 0);
    let mut buf = vec![0u8; layout.core_len()];

    set_ref_id(&mut buf, tid);
    set_pos(&mut buf, pos);
    buf[8] = u8::try_from(layout.name.len()).unwrap();
    buf[12..14].copy_from_slice(&u16::try_from(cigar_ops.len()).unwrap().to_le_bytes());
    set_flags(&mut buf, flag);
    buf[16..20].copy_from_slice(&u32::try_from(seq_len).unwrap().to_le_bytes());
    set_mate_ref_id(&mut buf, mate_tid);
    set_mate_pos(&mut buf, mate_pos);

    buf[MIN_BAM_HEADER_LEN..MIN_BAM_HEADER_LEN + name.len()].copy_from_slice(name);
    for (word, &op) in buf[layout.cigar].chunks_exact_mut(4).zip(cigar_ops) {
        word.copy_from_slice(&op.to_le_bytes());
    }
    buf.extend_from_slice(aux_data);
    buf
}

/// `B` array tag from already-encoded little-endian elements.
///
/// # Panics
///
/// Panics if `count` does not fit in `u32`.
#[must_use]
pub fn make_b_array_tag(tag: [u8; 2], sub_type: u8, count: usize, elements: &[u8]) -> Vec<u8> {
    let mut aux = vec![tag[0], tag[1], b'B', sub_type];
    aux.extend_from_slice(&u32::try_from(count).unwrap().to_le_bytes());
    aux.extend_from_slice(elements);
    aux
}

#[must_use]
pub fn make_b_int_array_tag(tag: [u8; 2], values: &[i32]) -> Vec<u8> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    make_b_array_tag(tag, b'i', values.len(), &bytes)
}

#[must_use]
pub fn make_b_uint8_array_tag(tag: [u8; 2], values: &[u8]) -> Vec<u8> {
    make_b_array_tag(tag, b'C', values.len(), values)
}

#[must_use]
pub fn make_b_int16_array_tag(tag: [u8; 2], values: &[i16]) -> Vec<u8> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    make_b_array_tag(tag, b's', values.len(), &bytes)
}
