//! Build an [`AlignmentRecord`] by local alignment of a read to a reference window.

use bamrec_raw::{CoreFields, RecordParts};
use bio::alignment::pairwise::{Aligner, Scoring};
use bio::alignment::{Alignment, AlignmentOperation};
use log::debug;
use noodles::sam::alignment::record::Flags;

use crate::cigar::{Cigar, CigarOp, Kind};
use crate::errors::{BamRecError, Result};
use crate::record::{AlignmentRecord, CONSTRUCTED_MAPQ};
use crate::region::GenomicRegion;

/// Tag holding the alignment score.
pub const ALIGNMENT_SCORE_TAG: &[u8; 2] = b"AS";

/// Smith-Waterman scores. Gap scores must not be positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignerScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for AlignerScoring {
    fn default() -> Self {
        Self { match_score: 2, mismatch_score: -2, gap_open: -3, gap_extend: -1 }
    }
}

impl AlignerScoring {
    fn validate(&self) -> Result<()> {
        for (parameter, value) in [("gap_open", self.gap_open), ("gap_extend", self.gap_extend)] {
            if value > 0 {
                return Err(BamRecError::invalid_argument(
                    parameter,
                    format!("gap score must be zero or negative, got {value}"),
                ));
            }
        }
        Ok(())
    }

    fn align(&self, query: &[u8], reference: &[u8]) -> Alignment {
        let scoring =
            Scoring::from_scores(self.gap_open, self.gap_extend, self.match_score, self.mismatch_score);
        let mut aligner = Aligner::with_scoring(scoring);
        aligner.local(query, reference)
    }
}

/// CIGAR for a local alignment: the unaligned query ends become soft clips.
fn alignment_cigar(aln: &Alignment) -> Result<Cigar> {
    let mut runs: Vec<(Kind, u32)> = Vec::new();
    let mut push = |kind: Kind, len: u32| {
        if len == 0 {
            return;
        }
        match runs.last_mut() {
            Some((k, n)) if *k == kind => *n += len,
            _ => runs.push((kind, len)),
        }
    };

    push(Kind::SoftClip, count(aln.xstart)?);
    for op in &aln.operations {
        match op {
            AlignmentOperation::Match | AlignmentOperation::Subst => push(Kind::Match, 1),
            AlignmentOperation::Ins => push(Kind::Insertion, 1),
            AlignmentOperation::Del => push(Kind::Deletion, 1),
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
        }
    }
    push(Kind::SoftClip, count(aln.xlen - aln.xend)?);

    runs.into_iter().map(|(kind, len)| CigarOp::from_kind(kind, len)).collect()
}

fn count(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| BamRecError::invalid_argument("seq", format!("{n} bases is too long")))
}

impl AlignmentRecord {
    /// Align `seq` to `reference` (the bases of `region`) with the default
    /// [`AlignerScoring`].
    ///
    /// # Errors
    ///
    /// See [`aligned_with`](Self::aligned_with).
    pub fn aligned(name: &str, seq: &str, reference: &str, region: &GenomicRegion) -> Result<Self> {
        Self::aligned_with(name, seq, reference, region, &AlignerScoring::default())
    }

    /// Align `seq` to `reference` by local Smith-Waterman and build the record.
    ///
    /// The record is placed at `region.start` plus the reference offset of the
    /// alignment, with mapping quality 60, an `AS:i` score tag and the reverse
    /// flag taken from the region strand. Unaligned read ends are soft
    /// clipped. A read with no positive-scoring alignment gives an unmapped
    /// record that still carries the bases.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if a gap score is positive or
    /// the name or read does not fit the record layout.
    pub fn aligned_with(
        name: &str,
        seq: &str,
        reference: &str,
        region: &GenomicRegion,
        scoring: &AlignerScoring,
    ) -> Result<Self> {
        scoring.validate()?;
        let aln = scoring.align(seq.as_bytes(), reference.as_bytes());
        debug!(
            "Aligned {name}: score {} query {}..{} reference {}..{}",
            aln.score, aln.xstart, aln.xend, aln.ystart, aln.yend
        );

        let mut flags = Flags::empty();
        flags.set(Flags::REVERSE_COMPLEMENTED, region.is_reverse());
        let mut parts = if aln.operations.is_empty() {
            flags.set(Flags::UNMAPPED, true);
            RecordParts::new(CoreFields::unmapped(flags.bits()))
        } else {
            let offset = i32::try_from(aln.ystart).map_err(|_| {
                BamRecError::invalid_argument("reference", "window is too long")
            })?;
            let mut parts = RecordParts::new(CoreFields {
                ref_id: region.ref_id,
                pos: region.start.saturating_add(offset),
                mapq: CONSTRUCTED_MAPQ,
                flags: flags.bits(),
                mate_ref_id: -1,
                mate_pos: -1,
                template_length: 0,
            });
            parts.cigar = alignment_cigar(&aln)?.to_raw();
            parts
        };
        parts.name = name.as_bytes().to_vec();
        parts.set_bases(seq.as_bytes());

        let mut record = Self::from_parts(&parts)?;
        if !aln.operations.is_empty() {
            record.add_int_tag(ALIGNMENT_SCORE_TAG, aln.score);
        }
        Ok(record)
    }
}
