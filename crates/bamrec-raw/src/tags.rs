//! Auxiliary tag scanning and in-place editing.
//!
//! Tags occupy the tail of a record, so every edit here is local to that
//! tail and never disturbs the core or variable-length sections.

use std::ops::Range;

use crate::fields::{aux_data_offset_from_record, tag_value_size};

/// One raw auxiliary field: key, type byte, and value bytes.
///
/// For `Z`/`H` values the NUL terminator is excluded; for `B` arrays the
/// value starts at the element sub-type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawAuxField<'a> {
    pub tag: [u8; 2],
    pub val_type: u8,
    pub value: &'a [u8],
}

impl<'a> RawAuxField<'a> {
    /// Integer value of a `c`/`C`/`s`/`S`/`i`/`I` field, widened to `i64`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        decode_int(self.val_type, self.value)
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self.val_type {
            b'f' => Some(f32::from_le_bytes(self.value.get(..4)?.try_into().ok()?)),
            _ => None,
        }
    }

    /// Value of a `Z` field, without the terminator.
    #[must_use]
    pub fn as_string(&self) -> Option<&'a [u8]> {
        (self.val_type == b'Z').then_some(self.value)
    }
}

/// Decode one little-endian integer of BAM type `int_type` from the front of `bytes`.
#[must_use]
pub fn decode_int(int_type: u8, bytes: &[u8]) -> Option<i64> {
    let value = match int_type {
        b'c' => i64::from(bytes.first()?.cast_signed()),
        b'C' => i64::from(*bytes.first()?),
        b's' => i64::from(i16::from_le_bytes(bytes.get(..2)?.try_into().ok()?)),
        b'S' => i64::from(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?)),
        b'i' => i64::from(i32::from_le_bytes(bytes.get(..4)?.try_into().ok()?)),
        b'I' => i64::from(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?)),
        _ => return None,
    };
    Some(value)
}

/// Forward iterator over the auxiliary fields of a record.
///
/// Stops at the first malformed entry (unknown type or truncated value).
pub struct AuxFields<'a> {
    aux_data: &'a [u8],
    pos: usize,
}

impl<'a> AuxFields<'a> {
    /// Iterate the fields in `aux_data` (the bytes after the qualities).
    #[must_use]
    pub fn new(aux_data: &'a [u8]) -> Self {
        Self { aux_data, pos: 0 }
    }

    /// Pair each field with the byte range of its whole entry (key, type and value).
    pub fn spanned(mut self) -> impl Iterator<Item = (Range<usize>, RawAuxField<'a>)> {
        std::iter::from_fn(move || {
            let start = self.pos;
            let field = self.next()?;
            Some((start..self.pos, field))
        })
    }
}

impl<'a> Iterator for AuxFields<'a> {
    type Item = RawAuxField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.aux_data.get(self.pos..)?;
        let [t0, t1, val_type, rest @ ..] = entry else {
            return None;
        };
        let val_type = *val_type;
        let Some(size) = tag_value_size(val_type, rest).filter(|&size| size <= rest.len()) else {
            self.pos = self.aux_data.len();
            return None;
        };
        let value_len = if matches!(val_type, b'Z' | b'H') { size - 1 } else { size };
        self.pos += 3 + size;
        Some(RawAuxField { tag: [*t0, *t1], val_type, value: &rest[..value_len] })
    }
}

fn first_field<'a>(aux_data: &'a [u8], tag: &[u8; 2]) -> Option<RawAuxField<'a>> {
    AuxFields::new(aux_data).find(|field| field.tag == *tag)
}

/// Value of the first `tag` entry when it is a `Z` string, without the terminator.
#[must_use]
pub fn find_string_tag<'a>(aux_data: &'a [u8], tag: &[u8; 2]) -> Option<&'a [u8]> {
    first_field(aux_data, tag)?.as_string()
}

/// Type byte of the first `tag` entry.
#[must_use]
pub fn find_tag_type(aux_data: &[u8], tag: &[u8; 2]) -> Option<u8> {
    first_field(aux_data, tag).map(|field| field.val_type)
}

/// Byte range of the first whole `tag` entry, relative to `aux_data`.
#[must_use]
pub fn find_tag_bounds(aux_data: &[u8], tag: &[u8; 2]) -> Option<Range<usize>> {
    AuxFields::new(aux_data).spanned().find(|(_, field)| field.tag == *tag).map(|(span, _)| span)
}

#[must_use]
pub fn find_float_tag(aux_data: &[u8], tag: &[u8; 2]) -> Option<f32> {
    first_field(aux_data, tag)?.as_float()
}

/// Integer value of the first `tag` entry, for any of the types `c`/`C`/`s`/`S`/`i`/`I`.
#[must_use]
pub fn find_int_tag(aux_data: &[u8], tag: &[u8; 2]) -> Option<i64> {
    first_field(aux_data, tag)?.as_int()
}

/// Append a `Z` tag to the end of the record.
pub fn append_string_tag(record: &mut Vec<u8>, tag: &[u8; 2], value: &[u8]) {
    record.extend_from_slice(&[tag[0], tag[1], b'Z']);
    record.extend_from_slice(value);
    record.push(0);
}

/// Append an `i` tag to the end of the record, always four bytes wide.
pub fn append_i32_tag(record: &mut Vec<u8>, tag: &[u8; 2], value: i32) {
    record.extend_from_slice(&[tag[0], tag[1], b'i']);
    record.extend_from_slice(&value.to_le_bytes());
}

/// Absolute byte range of the first `tag` entry in a whole record.
fn entry_range(record: &[u8], tag: &[u8; 2]) -> Option<Range<usize>> {
    let aux_start = aux_data_offset_from_record(record)?;
    let span = find_tag_bounds(record.get(aux_start..)?, tag)?;
    Some(aux_start + span.start..aux_start + span.end)
}

/// Remove the first entry with key `tag`. Returns `true` when one was removed.
pub fn remove_tag(record: &mut Vec<u8>, tag: &[u8; 2]) -> bool {
    let Some(range) = entry_range(record, tag) else {
        return false;
    };
    record.drain(range);
    true
}

/// Replace the first `tag` entry with a `Z` entry holding `new_value`, or
/// append one when the key is absent.
///
/// An existing entry of any type is replaced. A `Z` entry whose value keeps
/// its length is overwritten without moving the bytes after it.
pub fn update_string_tag(record: &mut Vec<u8>, tag: &[u8; 2], new_value: &[u8]) {
    let Some(range) = entry_range(record, tag) else {
        append_string_tag(record, tag, new_value);
        return;
    };
    let value_start = range.start + 3;
    if record[range.start + 2] == b'Z' && range.end - value_start - 1 == new_value.len() {
        record[value_start..range.end - 1].copy_from_slice(new_value);
        return;
    }
    let mut entry = Vec::with_capacity(new_value.len() + 4);
    append_string_tag(&mut entry, tag, new_value);
    record.splice(range, entry);
}
