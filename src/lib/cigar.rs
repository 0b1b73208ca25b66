//! Typed CIGAR operations and sequences.
//!
//! [`CigarOp`] keeps the packed BAM word (`len << 4 | code`), so a [`Cigar`]
//! can be written into a record buffer without re-encoding. The clip and
//! position arithmetic used by [`AlignmentRecord`](crate::record::AlignmentRecord)
//! lives here so it can be exercised on a bare `Cigar`.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use bamrec_raw::{
    CIGAR_OP_CHARS, MAX_CIGAR_OP_LEN, OP_DELETION, OP_HARD_CLIP, OP_INSERTION, OP_MATCH,
    OP_PADDING, OP_REF_SKIP, OP_SEQ_MATCH, OP_SEQ_MISMATCH, OP_SOFT_CLIP,
};

use crate::errors::{BamRecError, Result};

/// The nine CIGAR operation kinds with a defined meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `M`: alignment match (sequence match or mismatch)
    Match,
    /// `I`: insertion to the reference
    Insertion,
    /// `D`: deletion from the reference
    Deletion,
    /// `N`: skipped region from the reference
    RefSkip,
    /// `S`: soft clip (bases present in the stored sequence)
    SoftClip,
    /// `H`: hard clip (bases absent from the stored sequence)
    HardClip,
    /// `P`: padding
    Padding,
    /// `=`: sequence match
    SeqMatch,
    /// `X`: sequence mismatch
    SeqMismatch,
}

impl Kind {
    /// The 4-bit BAM code for this kind.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Match => OP_MATCH,
            Self::Insertion => OP_INSERTION,
            Self::Deletion => OP_DELETION,
            Self::RefSkip => OP_REF_SKIP,
            Self::SoftClip => OP_SOFT_CLIP,
            Self::HardClip => OP_HARD_CLIP,
            Self::Padding => OP_PADDING,
            Self::SeqMatch => OP_SEQ_MATCH,
            Self::SeqMismatch => OP_SEQ_MISMATCH,
        }
    }

    /// The kind for a 4-bit BAM code; codes 9..=15 have no kind.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            OP_MATCH => Some(Self::Match),
            OP_INSERTION => Some(Self::Insertion),
            OP_DELETION => Some(Self::Deletion),
            OP_REF_SKIP => Some(Self::RefSkip),
            OP_SOFT_CLIP => Some(Self::SoftClip),
            OP_HARD_CLIP => Some(Self::HardClip),
            OP_PADDING => Some(Self::Padding),
            OP_SEQ_MATCH => Some(Self::SeqMatch),
            OP_SEQ_MISMATCH => Some(Self::SeqMismatch),
            _ => None,
        }
    }

    /// The kind named by a CIGAR text character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(bamrec_raw::op_code_for_char).and_then(Self::from_code)
    }

    /// The CIGAR text character for this kind.
    #[must_use]
    pub fn as_char(self) -> char {
        char::from(CIGAR_OP_CHARS[self.code() as usize])
    }

    /// Whether this kind consumes reference bases (M, D, N, =, X).
    #[must_use]
    pub fn consumes_reference(self) -> bool {
        bamrec_raw::consumes_reference(self.code())
    }

    /// Whether this kind consumes query bases (M, I, S, =, X).
    #[must_use]
    pub fn consumes_query(self) -> bool {
        bamrec_raw::consumes_query(self.code())
    }

    /// Whether this kind is a soft or hard clip.
    #[must_use]
    pub fn is_clip(self) -> bool {
        matches!(self, Self::SoftClip | Self::HardClip)
    }
}

/// One CIGAR operation, stored as the packed BAM word.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarOp(u32);

impl CigarOp {
    /// Build an op from its text character and length.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::Format`] if `kind` is not one of `MIDNSHP=X` or
    /// `len` does not fit in 28 bits.
    pub fn new(kind: char, len: u32) -> Result<Self> {
        let k = Kind::from_char(kind).ok_or_else(|| {
            BamRecError::format(format!("{len}{kind}"), format!("unrecognized CIGAR operation '{kind}'"))
        })?;
        Self::from_kind(k, len)
    }

    /// Build an op from a [`Kind`] and length.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::Format`] if `len` does not fit in 28 bits.
    pub fn from_kind(kind: Kind, len: u32) -> Result<Self> {
        if len > MAX_CIGAR_OP_LEN {
            return Err(BamRecError::format(
                format!("{len}{}", kind.as_char()),
                format!("operation length exceeds {MAX_CIGAR_OP_LEN}"),
            ));
        }
        Ok(Self(bamrec_raw::encode_op(kind.code(), len)))
    }

    /// Wrap a packed BAM word as-is.
    #[must_use]
    pub const fn from_raw(word: u32) -> Self {
        Self(word)
    }

    /// The packed BAM word.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The 4-bit kind code, including codes with no [`Kind`].
    #[must_use]
    pub fn raw_kind(self) -> u32 {
        bamrec_raw::op_type(self.0)
    }

    #[must_use]
    pub fn kind(self) -> Option<Kind> {
        Kind::from_code(self.raw_kind())
    }

    /// The text character from the `MIDNSHP=XB` alphabet, `?` past `B`.
    #[must_use]
    pub fn op_char(self) -> char {
        char::from(bamrec_raw::op_char(self.0))
    }

    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> u32 {
        bamrec_raw::op_len(self.0)
    }

    #[must_use]
    pub fn consumes_reference(self) -> bool {
        bamrec_raw::consumes_reference(self.0)
    }

    #[must_use]
    pub fn consumes_query(self) -> bool {
        bamrec_raw::consumes_query(self.0)
    }

    fn is(self, kind: Kind) -> bool {
        self.raw_kind() == kind.code()
    }

    fn is_clip(self) -> bool {
        bamrec_raw::is_clip(self.0)
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.op_char())
    }
}

impl fmt::Debug for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CigarOp({self})")
    }
}

/// An ordered, append-only sequence of CIGAR operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `Cigar` from packed BAM words.
    #[must_use]
    pub fn from_raw(words: &[u32]) -> Self {
        Self { ops: words.iter().copied().map(CigarOp::from_raw).collect() }
    }

    /// The packed BAM words, in order.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u32> {
        self.ops.iter().map(|op| op.raw()).collect()
    }

    /// Parse CIGAR text such as `35M10I5M`.
    ///
    /// An empty string or `*` parses to an empty `Cigar`.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::Format`] on an unrecognized character, a digit
    /// run with no following kind, a kind with no preceding digits, or a
    /// length that does not fit in 28 bits.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cigar = Self::new();
        if text.is_empty() || text == "*" {
            return Ok(cigar);
        }

        let mut len: Option<u32> = None;
        for c in text.chars() {
            if let Some(digit) = c.to_digit(10) {
                let next = len.unwrap_or(0).checked_mul(10).and_then(|v| v.checked_add(digit));
                match next {
                    Some(v) if v <= MAX_CIGAR_OP_LEN => len = Some(v),
                    _ => {
                        return Err(BamRecError::format(
                            text,
                            format!("operation length exceeds {MAX_CIGAR_OP_LEN}"),
                        ));
                    }
                }
                continue;
            }
            let kind = Kind::from_char(c).ok_or_else(|| {
                BamRecError::format(text, format!("unrecognized CIGAR operation '{c}'"))
            })?;
            let n = len.take().ok_or_else(|| {
                BamRecError::format(text, format!("operation '{c}' has no length"))
            })?;
            cigar.add(CigarOp::from_kind(kind, n)?);
        }

        if len.is_some() {
            return Err(BamRecError::format(text, "trailing length with no operation"));
        }
        Ok(cigar)
    }

    /// Append an operation.
    pub fn add(&mut self, op: CigarOp) {
        self.ops.push(op);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<CigarOp> {
        self.ops.get(index).copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<CigarOp> {
        self.ops.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<CigarOp> {
        self.ops.last().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = CigarOp> + '_ {
        self.ops.iter().copied()
    }

    /// A copy with the operations in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self { ops: self.ops.iter().rev().copied().collect() }
    }

    /// Reference bases spanned (M/D/N/=/X).
    #[must_use]
    pub fn reference_length(&self) -> u64 {
        self.iter().filter(|op| op.consumes_reference()).map(|op| u64::from(op.len())).sum()
    }

    /// Query bases consumed (M/I/S/=/X); equals the stored sequence length.
    #[must_use]
    pub fn query_length(&self) -> usize {
        self.iter().filter(|op| op.consumes_query()).map(|op| op.len() as usize).sum()
    }

    // ------------------------------------------------------------------------
    // Clip arithmetic
    // ------------------------------------------------------------------------

    /// S+H length of the leading clip run.
    #[must_use]
    pub fn leading_clip(&self) -> usize {
        bamrec_raw::leading_clips(&self.to_raw())
    }

    /// S+H length of the trailing clip run.
    #[must_use]
    pub fn trailing_clip(&self) -> usize {
        bamrec_raw::trailing_clips(&self.to_raw())
    }

    /// Query offset where the alignment starts (leading clips).
    #[must_use]
    pub fn alignment_position(&self) -> usize {
        self.leading_clip()
    }

    /// Query offset where the alignment ends (`query_len` minus trailing clips).
    #[must_use]
    pub fn alignment_end_position(&self, query_len: usize) -> usize {
        query_len.saturating_sub(self.trailing_clip())
    }

    /// [`alignment_position`](Self::alignment_position) scanning from the end.
    #[must_use]
    pub fn alignment_position_reverse(&self) -> usize {
        self.trailing_clip()
    }

    /// [`alignment_end_position`](Self::alignment_end_position) scanning from the start.
    #[must_use]
    pub fn alignment_end_position_reverse(&self, query_len: usize) -> usize {
        query_len.saturating_sub(self.leading_clip())
    }

    fn sum_of(&self, kind: Kind) -> usize {
        self.iter().filter(|op| op.is(kind)).map(|op| op.len() as usize).sum()
    }

    fn max_of(&self, kind: Kind) -> u32 {
        self.iter().filter(|op| op.is(kind)).map(CigarOp::len).max().unwrap_or(0)
    }

    /// Total soft-clipped bases anywhere in the CIGAR.
    #[must_use]
    pub fn num_soft_clip(&self) -> usize {
        self.sum_of(Kind::SoftClip)
    }

    /// Total hard-clipped bases anywhere in the CIGAR.
    #[must_use]
    pub fn num_hard_clip(&self) -> usize {
        self.sum_of(Kind::HardClip)
    }

    #[must_use]
    pub fn num_clip(&self) -> usize {
        self.iter().filter(|op| op.is_clip()).map(|op| op.len() as usize).sum()
    }

    /// Longest single insertion.
    #[must_use]
    pub fn max_insertion_bases(&self) -> u32 {
        self.max_of(Kind::Insertion)
    }

    /// Longest single deletion.
    #[must_use]
    pub fn max_deletion_bases(&self) -> u32 {
        self.max_of(Kind::Deletion)
    }

    /// Total length of `M` operations.
    #[must_use]
    pub fn num_match_bases(&self) -> usize {
        self.sum_of(Kind::Match)
    }

    /// Original read length: query-consuming length plus hard clips.
    #[must_use]
    pub fn alignment_length(&self) -> usize {
        self.query_length() + self.num_hard_clip()
    }

    /// Kind of the op covering 0-based query offset `pos`, if any.
    fn kind_at_query_offset(&self, pos: usize) -> Option<Kind> {
        let mut offset = 0usize;
        for op in self.iter().filter(|op| op.consumes_query()) {
            let end = offset + op.len() as usize;
            if pos < end {
                return op.kind();
            }
            offset = end;
        }
        None
    }

    /// Whether query offset `pos` falls in an `M` or `I` op. `=` and `X` do not count.
    ///
    /// ```
    /// use bamrec::Cigar;
    ///
    /// let cigar = Cigar::parse("50M10I10M20S").unwrap();
    /// assert!(cigar.covered_base(55));
    /// assert!(cigar.covered_base(69));
    /// assert!(!cigar.covered_base(70));
    /// ```
    #[must_use]
    pub fn covered_base(&self, pos: usize) -> bool {
        self.kind_at_query_offset(pos).is_some_and(|k| matches!(k, Kind::Match | Kind::Insertion))
    }

    /// Whether query offset `pos` falls in an `M` op.
    #[must_use]
    pub fn covered_match_base(&self, pos: usize) -> bool {
        self.kind_at_query_offset(pos) == Some(Kind::Match)
    }

    /// Whether every clip op sits in the leading or trailing clip run.
    #[must_use]
    pub fn clips_at_ends_only(&self) -> bool {
        let n = self.ops.len();
        let lead = self.ops.iter().take_while(|op| op.is_clip()).count();
        if lead == n {
            return true;
        }
        let trail = self.ops.iter().rev().take_while(|op| op.is_clip()).count();
        !self.ops[lead..n - trail].iter().any(|op| op.is_clip())
    }
}

impl Index<usize> for Cigar {
    type Output = CigarOp;

    fn index(&self, index: usize) -> &Self::Output {
        &self.ops[index]
    }
}

impl<'a> IntoIterator for &'a Cigar {
    type Item = CigarOp;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, CigarOp>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter().copied()
    }
}

impl FromIterator<CigarOp> for Cigar {
    fn from_iter<I: IntoIterator<Item = CigarOp>>(iter: I) -> Self {
        Self { ops: iter.into_iter().collect() }
    }
}

impl FromStr for Cigar {
    type Err = BamRecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
