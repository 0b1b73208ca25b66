//! Auxiliary tag access on [`AlignmentRecord`].
//!
//! Keys are two bytes (`b"RG"`). Duplicate keys are allowed; every lookup and
//! [`remove_tag`](AlignmentRecord::remove_tag) acts on the first entry with a
//! matching key.
//!
//! "Smart" tags pack several values into one `Z` tag joined by
//! [`SMART_TAG_DELIMITER`], e.g. `XS:Z:12x7x30`.

use std::fmt;

use bamrec_raw::{self as raw, AuxFields, RawAuxField};
use log::warn;

use crate::record::AlignmentRecord;

/// Separator between the values of a smart tag.
pub const SMART_TAG_DELIMITER: char = 'x';

/// Read group reported when neither an `RG` tag nor a `:` in the name is present.
pub const UNKNOWN_READ_GROUP: &str = "NA";

/// A decoded auxiliary value.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    /// `A`
    Character(u8),
    /// `c`, `C`, `s`, `S`, `i` or `I`, widened
    Int(i64),
    /// `f`
    Float(f32),
    /// `Z`
    String(String),
    /// `H`
    Hex(String),
    /// `B` with an integer subtype
    IntArray { subtype: u8, values: Vec<i64> },
    /// `B` with subtype `f`
    FloatArray(Vec<f32>),
}

impl TagValue {
    /// Decode one raw field. `None` for a type byte with no known layout.
    #[must_use]
    pub fn from_raw(field: &RawAuxField<'_>) -> Option<Self> {
        let value = match field.val_type {
            b'A' => Self::Character(*field.value.first()?),
            b'f' => Self::Float(field.as_float()?),
            b'Z' => Self::String(String::from_utf8_lossy(field.value).into_owned()),
            b'H' => Self::Hex(String::from_utf8_lossy(field.value).into_owned()),
            b'B' => return decode_array(field.value),
            _ => Self::Int(field.as_int()?),
        };
        Some(value)
    }

    /// The SAM type character (`A`, `i`, `f`, `Z`, `H` or `B`).
    #[must_use]
    pub fn sam_type(&self) -> char {
        match self {
            Self::Character(_) => 'A',
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::String(_) => 'Z',
            Self::Hex(_) => 'H',
            Self::IntArray { .. } | Self::FloatArray(_) => 'B',
        }
    }
}

/// Decode a `B` value: subtype byte, little-endian count, then the elements.
fn decode_array(v: &[u8]) -> Option<TagValue> {
    let (&subtype, rest) = v.split_first()?;
    let count = u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as usize;
    let width = raw::fixed_value_size(subtype)?;
    let elems = rest.get(4..4 + count * width)?.chunks_exact(width);
    if subtype == b'f' {
        let values = elems.map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
        return Some(TagValue::FloatArray(values));
    }
    let values = elems.map(|c| raw::decode_int(subtype, c)).collect::<Option<Vec<_>>>()?;
    Some(TagValue::IntArray { subtype, values })
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(c) => write!(f, "{}", char::from(*c)),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) | Self::Hex(s) => f.write_str(s),
            Self::IntArray { subtype, values } => {
                write!(f, "{}", char::from(*subtype))?;
                for v in values {
                    write!(f, ",{v}")?;
                }
                Ok(())
            }
            Self::FloatArray(values) => {
                f.write_str("f")?;
                for v in values {
                    write!(f, ",{v}")?;
                }
                Ok(())
            }
        }
    }
}

impl AlignmentRecord {
    fn with_aux<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        self.read(|bam| f(raw::aux_data_slice(bam)))
    }

    fn edit_tags<T>(&mut self, what: &str, f: impl FnOnce(&mut Vec<u8>) -> T) -> T {
        self.write(|bam| {
            let old_len = bam.len();
            let out = f(bam);
            crate::logging::log_rebuild(what, raw::read_name(bam), old_len, bam.len());
            out
        })
    }

    // ========================================================================
    // Typed access
    // ========================================================================

    /// Integer value of `tag` (any of `c C s S i I`), or 0 when absent or not an integer.
    #[must_use]
    pub fn get_int_tag(&self, tag: &[u8; 2]) -> i64 {
        self.with_aux(|aux| raw::find_int_tag(aux, tag)).unwrap_or(0)
    }

    /// String value of a `Z` tag, or `""` when absent or not a string.
    #[must_use]
    pub fn get_z_tag(&self, tag: &[u8; 2]) -> String {
        self.with_aux(|aux| {
            raw::find_string_tag(aux, tag)
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .unwrap_or_default()
        })
    }

    /// Value of an `f` tag, or 0.0 when absent or not a float.
    #[must_use]
    pub fn get_float_tag(&self, tag: &[u8; 2]) -> f32 {
        self.with_aux(|aux| raw::find_float_tag(aux, tag)).unwrap_or(0.0)
    }

    #[must_use]
    pub fn has_tag(&self, tag: &[u8; 2]) -> bool {
        self.with_aux(|aux| raw::find_tag_type(aux, tag).is_some())
    }

    /// Every tag in storage order.
    ///
    /// Decoding stops at the first malformed entry.
    #[must_use]
    pub fn tags(&self) -> Vec<(String, TagValue)> {
        self.with_aux(|aux| {
            AuxFields::new(aux)
                .map_while(|field| {
                    let value = TagValue::from_raw(&field)?;
                    Some((String::from_utf8_lossy(&field.tag).into_owned(), value))
                })
                .collect()
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a `Z` tag. An existing entry with the same key is kept.
    pub fn add_z_tag(&mut self, tag: &[u8; 2], value: &str) {
        self.edit_tags("add_z_tag", |bam| raw::append_string_tag(bam, tag, value.as_bytes()));
    }

    /// Append an `i` tag (always 4 bytes). An existing entry with the same key is kept.
    pub fn add_int_tag(&mut self, tag: &[u8; 2], value: i32) {
        self.edit_tags("add_int_tag", |bam| raw::append_i32_tag(bam, tag, value));
    }

    /// Remove the first entry for `tag`. Returns whether one was found.
    pub fn remove_tag(&mut self, tag: &[u8; 2]) -> bool {
        self.edit_tags("remove_tag", |bam| raw::remove_tag(bam, tag))
    }

    /// Drop every tag, keeping the core, name, CIGAR, bases and qualities.
    pub fn remove_all_tags(&mut self) {
        self.edit_tags("remove_all_tags", |bam| {
            let keep = raw::tagless_len(bam).min(bam.len());
            bam.truncate(keep);
        });
    }

    // ========================================================================
    // Smart tags
    // ========================================================================

    /// Add `value` to the smart tag `tag`, creating it when absent.
    ///
    /// An existing `Z` entry is extended with [`SMART_TAG_DELIMITER`] and
    /// `value`. A first entry of any other type is replaced by `Z:value`.
    pub fn smart_add_tag(&mut self, tag: &[u8; 2], value: &str) {
        let joined = self.with_aux(|aux| match raw::find_string_tag(aux, tag) {
            Some(existing) => {
                let mut joined = String::from_utf8_lossy(existing).into_owned();
                joined.push(SMART_TAG_DELIMITER);
                joined.push_str(value);
                joined
            }
            None => value.to_string(),
        });
        self.edit_tags("smart_add_tag", |bam| raw::update_string_tag(bam, tag, joined.as_bytes()));
    }

    /// Fields of a smart tag; empty when the tag is absent or not a `Z` string.
    ///
    /// A trailing delimiter yields a trailing empty field.
    #[must_use]
    pub fn get_smart_string_tag(&self, tag: &[u8; 2]) -> Vec<String> {
        self.with_aux(|aux| {
            raw::find_string_tag(aux, tag).map_or_else(Vec::new, |v| {
                String::from_utf8_lossy(v).split(SMART_TAG_DELIMITER).map(str::to_string).collect()
            })
        })
    }

    /// Integer fields of a smart tag. Fields that do not parse are skipped.
    #[must_use]
    pub fn get_smart_int_tag(&self, tag: &[u8; 2]) -> Vec<i32> {
        self.get_smart_string_tag(tag)
            .iter()
            .filter_map(|field| match field.parse::<i32>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(
                        "Skipping non-integer field '{field}' in smart tag {}",
                        String::from_utf8_lossy(tag)
                    );
                    None
                }
            })
            .collect()
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Read group: the `RG` tag, else the read name up to the first `:`,
    /// else [`UNKNOWN_READ_GROUP`].
    #[must_use]
    pub fn parse_read_group(&self) -> String {
        let rg = self.get_z_tag(b"RG");
        if !rg.is_empty() {
            return rg;
        }
        let name = self.name();
        match name.split_once(':') {
            Some((prefix, _)) => prefix.to_string(),
            None => UNKNOWN_READ_GROUP.to_string(),
        }
    }

    /// Number of `;`-terminated entries in the `XA` and `XP` tags.
    #[must_use]
    pub fn count_secondary_alignments(&self) -> usize {
        [b"XA", b"XP"].iter().map(|tag| self.get_z_tag(tag).matches(';').count()).sum()
    }

    /// The `QT` tag when present, else the read sequence.
    #[must_use]
    pub fn quality_sequence(&self) -> String {
        let qt = self.get_z_tag(b"QT");
        if qt.is_empty() { self.sequence() } else { qt }
    }
}
