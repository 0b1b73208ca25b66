//! The alignment record.
//!
//! An [`AlignmentRecord`] is a handle to one BAM-layout buffer
//! (`Rc<RefCell<Vec<u8>>>`). Everything the record knows (core fields,
//! CIGAR, bases, qualities and tags) lives in that buffer and is decoded on
//! demand.
//!
//! # Aliasing
//!
//! **Cloning a record does not copy it.** `clone()` returns a second handle
//! to the same buffer, so a mutation through either handle is visible through
//! both. This is aliasing, not copy-on-write. Use
//! [`deep_copy`](AlignmentRecord::deep_copy) for an independent record.
//!
//! The handle is `!Send` and `!Sync`, so aliases cannot cross threads.
//!
//! Structural mutations (tag add/remove, [`remove_all_tags`](AlignmentRecord::remove_all_tags),
//! [`set_name`](AlignmentRecord::set_name), [`set_cigar`](AlignmentRecord::set_cigar),
//! [`set_sequence`](AlignmentRecord::set_sequence)) may move the buffer. A view
//! obtained from [`bytes`](AlignmentRecord::bytes) must be dropped first;
//! mutating while one is alive panics with a borrow error.

use std::cell::{Ref, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use bamrec_raw::{self as raw, AuxFields, CoreFields, RecordLayout, RecordParts};
use log::warn;
use noodles::sam::alignment::record::Flags;

use crate::cigar::Cigar;
use crate::dictionary::ChromosomeDictionary;
use crate::errors::{BamRecError, Result};
use crate::logging::{format_count, log_rebuild};
use crate::orientation::{PairOrientation, pair_mapped, proper_orientation};
use crate::region::{GenomicRegion, Strand};

/// Mapping quality given to records built by the synthetic constructors.
pub const CONSTRUCTED_MAPQ: u8 = 60;

/// Shared handle to one BAM-layout alignment record. See the [module docs](self)
/// for the aliasing contract.
#[derive(Clone)]
pub struct AlignmentRecord {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl AlignmentRecord {
    fn wrap(bytes: Vec<u8>) -> Self {
        Self { buf: Rc::new(RefCell::new(bytes)) }
    }

    pub(crate) fn from_parts(parts: &RecordParts) -> Result<Self> {
        Ok(Self::wrap(parts.build()?))
    }

    #[inline]
    pub(crate) fn read<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        f(&self.buf.borrow())
    }

    #[inline]
    pub(crate) fn write<T>(&mut self, f: impl FnOnce(&mut Vec<u8>) -> T) -> T {
        f(&mut self.buf.borrow_mut())
    }

    /// Decompose the buffer, apply `edit`, and write the rebuilt bytes back
    /// into the shared buffer so every alias observes the change.
    pub(crate) fn rebuild(
        &mut self,
        what: &str,
        edit: impl FnOnce(&mut RecordParts) -> Result<()>,
    ) -> Result<()> {
        let mut parts = self.read(RecordParts::split).ok_or_else(|| {
            BamRecError::invariant("record buffer is shorter than its length fields")
        })?;
        edit(&mut parts)?;
        let bytes = parts.build()?;
        let old_len = self.read(<[u8]>::len);
        log_rebuild(what, &parts.name, old_len, bytes.len());
        *self.buf.borrow_mut() = bytes;
        Ok(())
    }

    // ========================================================================
    // Construction and ownership
    // ========================================================================

    /// Adopt raw record bytes (without the `block_size` prefix).
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if the buffer is shorter than
    /// its own length fields require.
    pub fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        let layout = RecordLayout::from_record(&bytes).ok_or_else(|| {
            BamRecError::invalid_argument(
                "bytes",
                format!("{} bytes is shorter than the record's length fields require", bytes.len()),
            )
        })?;

        if layout.name.is_empty() || bytes[layout.name.end - 1] != 0 {
            warn!("Adopted record has no NUL-terminated read name");
        }
        let aux = &bytes[layout.aux];
        let parsed: usize = AuxFields::new(aux)
            .map(|f| 3 + f.value.len() + usize::from(matches!(f.val_type, b'Z' | b'H')))
            .sum();
        if parsed != aux.len() {
            warn!(
                "Adopted record {} has {} trailing bytes of unparseable tag data",
                String::from_utf8_lossy(raw::read_name(&bytes)),
                aux.len() - parsed
            );
        }
        Ok(Self::wrap(bytes))
    }

    /// Release the raw bytes if this is the only handle; otherwise return the handle.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` when other aliases still share the buffer.
    pub fn into_raw(self) -> std::result::Result<Vec<u8>, Self> {
        Rc::try_unwrap(self.buf).map(RefCell::into_inner).map_err(|buf| Self { buf })
    }

    /// An independent record with a copy of this record's bytes.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self::wrap(self.read(<[u8]>::to_vec))
    }

    /// Borrow the raw record bytes. Drop the view before mutating.
    #[must_use]
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.buf.borrow(), Vec::as_slice)
    }

    /// Whether `self` and `other` are aliases of one buffer.
    #[must_use]
    pub fn shares_buffer_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }

    /// Number of live handles to this record's buffer.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.buf)
    }

    /// A record placed exactly at `region.start` with the given CIGAR.
    ///
    /// Mapping quality is 60, qualities are missing (`0xFF`), the reverse flag
    /// follows the region strand, and the mate is unplaced.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvariantViolation`] if the CIGAR's query length
    /// differs from the sequence length, or [`BamRecError::InvalidArgument`]
    /// if the name or CIGAR does not fit the record layout.
    pub fn perfect(name: &str, seq: &str, region: &GenomicRegion, cigar: &Cigar) -> Result<Self> {
        if cigar.query_length() != seq.len() {
            return Err(BamRecError::invariant(format!(
                "CIGAR {cigar} consumes {} query bases but the sequence has {}",
                cigar.query_length(),
                seq.len()
            )));
        }
        let mut flags = Flags::empty();
        flags.set(Flags::REVERSE_COMPLEMENTED, region.is_reverse());
        let mut parts = RecordParts::new(CoreFields {
            ref_id: region.ref_id,
            pos: region.start,
            mapq: CONSTRUCTED_MAPQ,
            flags: flags.bits(),
            mate_ref_id: -1,
            mate_pos: -1,
            template_length: 0,
        });
        parts.name = name.as_bytes().to_vec();
        parts.cigar = cigar.to_raw();
        parts.set_bases(seq.as_bytes());
        Self::from_parts(&parts)
    }

    /// Check the structural invariants of the stored CIGAR.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvariantViolation`] if the CIGAR contains an op
    /// code with no kind, its query length differs from the stored sequence
    /// length, or a clip op sits inside the alignment.
    pub fn validate(&self) -> Result<()> {
        let cigar = self.cigar();
        if let Some(op) = cigar.iter().find(|op| op.kind().is_none()) {
            return Err(BamRecError::invariant(format!(
                "CIGAR op code {} has no defined kind",
                op.raw_kind()
            )));
        }
        if !cigar.is_empty() && cigar.query_length() != self.length() {
            return Err(BamRecError::invariant(format!(
                "CIGAR {cigar} consumes {} query bases but the sequence has {}",
                cigar.query_length(),
                self.length()
            )));
        }
        if !cigar.clips_at_ends_only() {
            return Err(BamRecError::invariant(format!(
                "CIGAR {cigar} has a clip inside the alignment"
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Core fields
    // ========================================================================

    /// Read name.
    #[must_use]
    pub fn name(&self) -> String {
        self.read(|bam| String::from_utf8_lossy(raw::read_name(bam)).into_owned())
    }

    #[must_use]
    pub fn flags(&self) -> Flags {
        Flags::from(self.read(raw::flags))
    }

    #[must_use]
    pub fn ref_id(&self) -> i32 {
        self.read(raw::ref_id)
    }

    /// 0-based leftmost position.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.read(raw::pos)
    }

    #[must_use]
    pub fn map_quality(&self) -> u8 {
        self.read(raw::mapq)
    }

    #[must_use]
    pub fn bin(&self) -> u16 {
        self.read(raw::bin)
    }

    #[must_use]
    pub fn mate_ref_id(&self) -> i32 {
        self.read(raw::mate_ref_id)
    }

    #[must_use]
    pub fn mate_position(&self) -> i32 {
        self.read(raw::mate_pos)
    }

    /// Signed template length as stored.
    #[must_use]
    pub fn insert_size(&self) -> i32 {
        self.read(raw::template_length)
    }

    /// Number of stored query bases.
    #[must_use]
    pub fn length(&self) -> usize {
        self.read(raw::l_seq) as usize
    }

    #[must_use]
    pub fn cigar(&self) -> Cigar {
        self.read(|bam| Cigar::from_raw(&raw::get_cigar_ops(bam)))
    }

    /// The CIGAR with its operations in reverse order.
    #[must_use]
    pub fn reverse_cigar(&self) -> Cigar {
        self.cigar().reversed()
    }

    #[must_use]
    pub fn cigar_size(&self) -> usize {
        usize::from(self.read(raw::n_cigar_op))
    }

    // ========================================================================
    // Flags and orientation
    // ========================================================================

    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.flags().is_segmented()
    }

    /// The stored proper-pair bit.
    #[must_use]
    pub fn is_proper_pair(&self) -> bool {
        self.flags().is_properly_segmented()
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        !self.flags().is_unmapped()
    }

    #[must_use]
    pub fn is_mate_mapped(&self) -> bool {
        !self.flags().is_mate_unmapped()
    }

    #[must_use]
    pub fn is_pair_mapped(&self) -> bool {
        pair_mapped(self.flags())
    }

    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.flags().is_reverse_complemented()
    }

    #[must_use]
    pub fn is_mate_reverse(&self) -> bool {
        self.flags().is_mate_reverse_complemented()
    }

    #[must_use]
    pub fn is_first_of_pair(&self) -> bool {
        self.flags().is_first_segment()
    }

    #[must_use]
    pub fn is_last_of_pair(&self) -> bool {
        self.flags().is_last_segment()
    }

    #[must_use]
    pub fn is_secondary(&self) -> bool {
        self.flags().is_secondary()
    }

    #[must_use]
    pub fn is_supplementary(&self) -> bool {
        self.flags().is_supplementary()
    }

    #[must_use]
    pub fn is_qc_fail(&self) -> bool {
        self.flags().is_qc_fail()
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.flags().is_duplicate()
    }

    /// Pair mapped with the mate on another reference sequence.
    #[must_use]
    pub fn is_interchromosomal(&self) -> bool {
        self.ref_id() != self.mate_ref_id() && self.is_pair_mapped()
    }

    #[must_use]
    pub fn pair_orientation(&self) -> PairOrientation {
        let flags = self.flags();
        PairOrientation::classify(
            pair_mapped(flags),
            flags.is_reverse_complemented(),
            flags.is_mate_reverse_complemented(),
            self.position(),
            self.mate_position(),
        )
    }

    /// Same-chromosome FR check, ignoring the stored proper-pair bit.
    #[must_use]
    pub fn proper_orientation(&self) -> bool {
        let flags = self.flags();
        proper_orientation(
            self.ref_id(),
            self.mate_ref_id(),
            flags.is_reverse_complemented(),
            flags.is_mate_reverse_complemented(),
            self.position(),
            self.mate_position(),
        )
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_flags(&mut self, flags: Flags) {
        self.write(|bam| raw::set_flags(bam, flags.bits()));
    }

    pub fn set_map_quality(&mut self, mapq: u8) {
        self.write(|bam| raw::set_mapq(bam, mapq));
    }

    pub fn set_ref_id(&mut self, ref_id: i32) {
        self.write(|bam| raw::set_ref_id(bam, ref_id));
    }

    /// Set the 0-based position and recompute the bin.
    pub fn set_position(&mut self, pos: i32) {
        self.write(|bam| {
            raw::set_pos(bam, pos);
            let bin = raw::record_bin(pos, &raw::get_cigar_ops(bam));
            raw::set_bin(bam, bin);
        });
    }

    pub fn set_mate_ref_id(&mut self, ref_id: i32) {
        self.write(|bam| raw::set_mate_ref_id(bam, ref_id));
    }

    pub fn set_mate_position(&mut self, pos: i32) {
        self.write(|bam| raw::set_mate_pos(bam, pos));
    }

    pub fn set_insert_size(&mut self, tlen: i32) {
        self.write(|bam| raw::set_template_length(bam, tlen));
    }

    /// Replace the read name.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if `name` is longer than 254 bytes.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if name.len() > raw::MAX_READ_NAME_LEN {
            return Err(BamRecError::invalid_argument(
                "name",
                format!("{} bytes exceeds the maximum of {}", name.len(), raw::MAX_READ_NAME_LEN),
            ));
        }
        self.rebuild("set_name", |parts| {
            parts.name = name.as_bytes().to_vec();
            Ok(())
        })
    }

    /// Replace the CIGAR and recompute the bin. Use [`validate`](Self::validate)
    /// to check it against the stored sequence.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if the CIGAR has more than 65535 ops.
    pub fn set_cigar(&mut self, cigar: &Cigar) -> Result<()> {
        self.rebuild("set_cigar", |parts| {
            parts.cigar = cigar.to_raw();
            Ok(())
        })
    }

    // ========================================================================
    // Position and clip arithmetic
    // ========================================================================

    /// Query offset where the alignment starts (leading S+H run).
    #[must_use]
    pub fn alignment_position(&self) -> usize {
        self.cigar().alignment_position()
    }

    /// Query offset where the alignment ends (length minus trailing S+H run).
    #[must_use]
    pub fn alignment_end_position(&self) -> usize {
        self.cigar().alignment_end_position(self.length())
    }

    #[must_use]
    pub fn alignment_position_reverse(&self) -> usize {
        self.cigar().alignment_position_reverse()
    }

    #[must_use]
    pub fn alignment_end_position_reverse(&self) -> usize {
        self.cigar().alignment_end_position_reverse(self.length())
    }

    #[must_use]
    pub fn num_soft_clip(&self) -> usize {
        self.cigar().num_soft_clip()
    }

    #[must_use]
    pub fn num_hard_clip(&self) -> usize {
        self.cigar().num_hard_clip()
    }

    #[must_use]
    pub fn num_clip(&self) -> usize {
        self.cigar().num_clip()
    }

    #[must_use]
    pub fn max_insertion_bases(&self) -> u32 {
        self.cigar().max_insertion_bases()
    }

    #[must_use]
    pub fn max_deletion_bases(&self) -> u32 {
        self.cigar().max_deletion_bases()
    }

    #[must_use]
    pub fn num_match_bases(&self) -> usize {
        self.cigar().num_match_bases()
    }

    /// Original read length, counting hard-clipped bases.
    #[must_use]
    pub fn alignment_length(&self) -> usize {
        self.cigar().alignment_length()
    }

    #[must_use]
    pub fn covered_base(&self, pos: usize) -> bool {
        self.cigar().covered_base(pos)
    }

    #[must_use]
    pub fn covered_match_base(&self, pos: usize) -> bool {
        self.cigar().covered_match_base(pos)
    }

    /// Exclusive end of the alignment on the reference.
    ///
    /// `-1` for an unplaced record; `position + 1` when unmapped or when the
    /// CIGAR consumes no reference. Saturates at `i32::MAX`.
    #[must_use]
    pub fn position_end(&self) -> i32 {
        let pos = self.position();
        if pos < 0 {
            return -1;
        }
        let ref_len = self.read(|bam| raw::reference_length_from_cigar(&raw::get_cigar_ops(bam)));
        let span = if self.is_mapped() { ref_len.max(1) } else { 1 };
        i32::try_from(i64::from(pos) + span).unwrap_or(i32::MAX)
    }

    /// Absolute distance between the mates plus the read length, for a mapped
    /// pair on one chromosome; otherwise 0.
    #[must_use]
    pub fn full_insert_size(&self) -> i32 {
        if self.ref_id() != self.mate_ref_id() || !self.is_pair_mapped() {
            return 0;
        }
        let len = i32::try_from(self.length()).unwrap_or(i32::MAX);
        let gap = i32::try_from(self.position().abs_diff(self.mate_position())).unwrap_or(i32::MAX);
        gap.saturating_add(len)
    }

    /// The reference interval this read covers.
    #[must_use]
    pub fn as_region(&self) -> GenomicRegion {
        GenomicRegion::new(self.ref_id(), self.position(), self.position_end())
            .with_strand(Strand::from_reverse(self.is_reverse()))
    }

    /// The mate's interval, assuming the mate has this read's length.
    #[must_use]
    pub fn as_mate_region(&self) -> GenomicRegion {
        let len = i32::try_from(self.length()).unwrap_or(i32::MAX);
        let mpos = self.mate_position();
        GenomicRegion::new(self.mate_ref_id(), mpos, mpos.saturating_add(len))
            .with_strand(Strand::from_reverse(self.is_mate_reverse()))
    }

    // ========================================================================
    // Naming and rendering
    // ========================================================================

    /// Chromosome name of this read.
    ///
    /// Without a dictionary the 1-based id (`ref_id + 1`) is returned. With
    /// one, an unplaced read (`ref_id < 0`) gives `""` and an id the
    /// dictionary does not know falls back to `ref_id + 1`.
    #[must_use]
    pub fn chr_name(&self, dict: Option<&dyn ChromosomeDictionary>) -> String {
        resolve_chr_name(self.ref_id(), dict)
    }

    /// Chromosome name of the mate; see [`chr_name`](Self::chr_name).
    #[must_use]
    pub fn mate_chr_name(&self, dict: Option<&dyn ChromosomeDictionary>) -> String {
        resolve_chr_name(self.mate_ref_id(), dict)
    }

    /// Short `chr:pos(strand)` description, e.g. `chr1:1,234,567(+)`.
    #[must_use]
    pub fn brief(&self, dict: Option<&dyn ChromosomeDictionary>) -> String {
        format!(
            "{}:{}({})",
            self.chr_name(dict),
            format_count(i64::from(self.position())),
            Strand::from_reverse(self.is_reverse()).as_char()
        )
    }

    /// [`brief`](Self::brief) for the mate.
    #[must_use]
    pub fn brief_mate(&self, dict: Option<&dyn ChromosomeDictionary>) -> String {
        format!(
            "{}:{}({})",
            self.mate_chr_name(dict),
            format_count(i64::from(self.mate_position())),
            Strand::from_reverse(self.is_mate_reverse()).as_char()
        )
    }

    /// Orders by reference id, then position.
    ///
    /// ```ignore
    /// records.sort_by(AlignmentRecord::by_read_position);
    /// ```
    #[must_use]
    pub fn by_read_position(a: &Self, b: &Self) -> Ordering {
        (a.ref_id(), a.position()).cmp(&(b.ref_id(), b.position()))
    }

    /// Orders by mate reference id, then mate position.
    #[must_use]
    pub fn by_mate_position(a: &Self, b: &Self) -> Ordering {
        (a.mate_ref_id(), a.mate_position()).cmp(&(b.mate_ref_id(), b.mate_position()))
    }
}

fn resolve_chr_name(tid: i32, dict: Option<&dyn ChromosomeDictionary>) -> String {
    let numeric = || (i64::from(tid) + 1).to_string();
    match dict {
        None => numeric(),
        Some(_) if tid < 0 => String::new(),
        Some(d) => usize::try_from(tid).ok().and_then(|id| d.name_of(id)).unwrap_or_else(numeric),
    }
}

impl Default for AlignmentRecord {
    /// An unmapped, unplaced record with an empty name and no bases.
    fn default() -> Self {
        let mut bam = vec![0u8; raw::MIN_BAM_HEADER_LEN + 1];
        raw::set_ref_id(&mut bam, -1);
        raw::set_pos(&mut bam, -1);
        bam[8] = 1; // l_read_name: just the NUL
        raw::set_bin(&mut bam, raw::UNMAPPED_BIN);
        raw::set_flags(&mut bam, raw::flags::UNMAPPED);
        raw::set_mate_ref_id(&mut bam, -1);
        raw::set_mate_pos(&mut bam, -1);
        Self::wrap(bam)
    }
}

impl PartialEq for AlignmentRecord {
    /// Byte equality of the underlying buffers.
    fn eq(&self, other: &Self) -> bool {
        *self.bytes() == *other.bytes()
    }
}

impl Eq for AlignmentRecord {}

impl fmt::Debug for AlignmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignmentRecord")
            .field("name", &self.name())
            .field("flags", &self.flags())
            .field("ref_id", &self.ref_id())
            .field("pos", &self.position())
            .field("cigar", &self.cigar().to_string())
            .field("len", &self.length())
            .field("handles", &self.handle_count())
            .finish()
    }
}

impl fmt::Display for AlignmentRecord {
    /// SAM-lite line: name, flag, chr, 1-based pos, mapq, CIGAR, mate chr,
    /// 1-based mate pos, insert size, bases, qualities, then tags.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cigar = self.cigar();
        let seq = self.sequence();
        let quals = self.qualities();
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.name(),
            self.flags().bits(),
            self.chr_name(None),
            i64::from(self.position()) + 1,
            self.map_quality(),
            if cigar.is_empty() { "*".to_string() } else { cigar.to_string() },
            self.mate_chr_name(None),
            i64::from(self.mate_position()) + 1,
            self.insert_size(),
            if seq.is_empty() { "*" } else { seq.as_str() },
            if quals.is_empty() { "*" } else { quals.as_str() },
        )?;
        for (key, value) in self.tags() {
            write!(f, "\t{key}:{}:{value}", value.sam_type())?;
        }
        Ok(())
    }
}
