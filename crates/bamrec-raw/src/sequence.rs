//! 4-bit packed bases and raw Phred qualities.

use crate::fields::{l_seq, qual_offset, seq_offset};

/// 4-bit base code -> ASCII decode table.
///
/// Only the codes for A (1), C (2), G (4), T (8) and N (15) decode to a
/// letter; every other code (including `=` and the IUPAC ambiguity codes)
/// decodes to a blank.
pub const BASE_DECODE: [u8; 16] = *b" AC G   T      N";

/// Raw quality value marking a record whose qualities are absent.
pub const MISSING_QUALITY: u8 = 0xFF;

const N_CODE: u8 = 0x0F;

/// ASCII -> 4-bit code, case-insensitive; anything outside `=ACMGRSVTWYHKDBN` is N.
const ENCODE: [u8; 256] = {
    let alphabet = b"=ACMGRSVTWYHKDBN";
    let mut codes = [N_CODE; 256];
    let mut code = 0u8;
    while code < 16 {
        let base = alphabet[code as usize];
        codes[base as usize] = code;
        codes[base.to_ascii_lowercase() as usize] = code;
        code += 1;
    }
    codes
};

/// Extract a 4-bit base from packed sequence data.
///
/// Two bases per byte: high nibble = even index, low nibble = odd index.
#[inline]
#[must_use]
pub fn get_base(bam: &[u8], seq_off: usize, position: usize) -> u8 {
    let byte = bam[seq_off + position / 2];
    if position.is_multiple_of(2) { byte >> 4 } else { byte & 0xF }
}

/// Encode one ASCII base as a 4-bit code. Unknown bases become N (0xF).
#[inline]
#[must_use]
pub fn encode_base(base: u8) -> u8 {
    ENCODE[usize::from(base)]
}

/// The 4-bit codes of every base in the record, in read order.
fn packed_codes(bam: &[u8]) -> impl Iterator<Item = u8> + '_ {
    let off = seq_offset(bam);
    (0..l_seq(bam) as usize).map(move |i| get_base(bam, off, i))
}

/// Decode the full sequence of a record through [`BASE_DECODE`].
#[must_use]
pub fn extract_sequence(bam: &[u8]) -> Vec<u8> {
    packed_codes(bam).map(|code| BASE_DECODE[usize::from(code)]).collect()
}

#[must_use]
pub fn count_n_bases(bam: &[u8]) -> usize {
    packed_codes(bam).filter(|&code| code == N_CODE).count()
}

/// Pack ASCII bases two per byte, appending to `dst`.
///
/// When the length is odd the low 4 bits of the last byte are zero.
pub fn pack_sequence_into(dst: &mut Vec<u8>, bases: &[u8]) {
    dst.reserve(bases.len().div_ceil(2));
    let mut pairs = bases.chunks_exact(2);
    dst.extend(pairs.by_ref().map(|pair| (encode_base(pair[0]) << 4) | encode_base(pair[1])));
    if let [last] = pairs.remainder() {
        dst.push(encode_base(*last) << 4);
    }
}

/// Raw Phred scores (not Phred+33), one per base.
#[inline]
#[must_use]
pub fn quality_scores_slice(bam: &[u8]) -> &[u8] {
    let off = qual_offset(bam);
    &bam[off..off + l_seq(bam) as usize]
}

/// Whether the record carries the missing-quality marker.
#[inline]
#[must_use]
pub fn qualities_missing(bam: &[u8]) -> bool {
    quality_scores_slice(bam).first() == Some(&MISSING_QUALITY)
}
