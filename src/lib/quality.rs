//! Bases and qualities of an [`AlignmentRecord`].

use std::ops::Range;

use bamrec_raw as raw;

use crate::errors::{BamRecError, Result};
use crate::record::AlignmentRecord;

/// ASCII offset of Phred+33 quality text.
pub const PHRED_OFFSET: u8 = 33;

/// Highest Phred score representable as printable Phred+33 (`~`).
const MAX_PHRED: u8 = 93;

impl AlignmentRecord {
    /// Decoded bases. Only `A`, `C`, `G`, `T` and `N` decode to letters;
    /// every other code decodes to a blank.
    #[must_use]
    pub fn sequence(&self) -> String {
        self.read(|bam| String::from_utf8_lossy(&raw::extract_sequence(bam)).into_owned())
    }

    /// Phred+33 quality text, or `"*"` when qualities are missing.
    #[must_use]
    pub fn qualities(&self) -> String {
        self.read(|bam| {
            if raw::qualities_missing(bam) {
                return "*".to_string();
            }
            raw::quality_scores_slice(bam)
                .iter()
                .map(|&q| char::from(q.saturating_add(PHRED_OFFSET)))
                .collect()
        })
    }

    /// Whether the record carries the missing-quality marker.
    #[must_use]
    pub fn qualities_missing(&self) -> bool {
        self.read(raw::qualities_missing)
    }

    /// Replace the qualities from Phred+33 text.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if the text length differs
    /// from the sequence length or holds a character outside `!`..=`~`.
    pub fn set_qualities(&mut self, text: &str) -> Result<()> {
        let quals = text
            .bytes()
            .map(|b| {
                b.checked_sub(PHRED_OFFSET).filter(|&q| q <= MAX_PHRED).ok_or_else(|| {
                    BamRecError::invalid_argument(
                        "qualities",
                        format!("'{}' is not a Phred+33 quality", char::from(b)),
                    )
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        if quals.len() != self.length() {
            return Err(BamRecError::invalid_argument(
                "qualities",
                format!("{} qualities for {} bases", quals.len(), self.length()),
            ));
        }
        self.write(|bam| {
            let off = raw::qual_offset(bam);
            bam[off..off + quals.len()].copy_from_slice(&quals);
        });
        Ok(())
    }

    /// Replace the bases. Qualities become missing and the CIGAR is kept; use
    /// [`validate`](Self::validate) to check the two still agree.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if the sequence is too long for
    /// the record layout.
    pub fn set_sequence(&mut self, seq: &str) -> Result<()> {
        self.rebuild("set_sequence", |parts| {
            parts.set_bases(seq.as_bytes());
            Ok(())
        })
    }

    /// Drop bases, qualities and tags, keeping the core, name and CIGAR.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvariantViolation`] if the buffer is shorter
    /// than its own length fields.
    pub fn clear_seq_qual_and_tags(&mut self) -> Result<()> {
        self.rebuild("clear_seq_qual_and_tags", |parts| {
            parts.clear_seq_qual_and_tags();
            Ok(())
        })
    }

    /// Number of bases encoded as `N`.
    #[must_use]
    pub fn count_n_bases(&self) -> usize {
        self.read(raw::count_n_bases)
    }

    /// Mean Phred score, or 0.0 for an empty read or missing qualities.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_phred(&self) -> f64 {
        self.read(|bam| {
            let quals = raw::quality_scores_slice(bam);
            if quals.is_empty() || raw::qualities_missing(bam) {
                return 0.0;
            }
            let total: u64 = quals.iter().map(|&q| u64::from(q)).sum();
            total as f64 / quals.len() as f64
        })
    }

    /// Widest query range bounded by bases whose Phred score reaches `threshold`.
    ///
    /// The range starts at the first passing base and ends after the last one.
    /// No passing base gives `0..0`; missing qualities give the full read.
    #[must_use]
    pub fn quality_trim_range(&self, threshold: u8) -> Range<usize> {
        self.read(|bam| {
            let quals = raw::quality_scores_slice(bam);
            if raw::qualities_missing(bam) {
                return 0..quals.len();
            }
            let Some(start) = quals.iter().position(|&q| q >= threshold) else {
                return 0..0;
            };
            let end = quals.iter().rposition(|&q| q >= threshold).map_or(start, |i| i + 1);
            start..end
        })
    }

    /// Bases inside [`quality_trim_range`](Self::quality_trim_range).
    #[must_use]
    pub fn quality_trimmed_sequence(&self, threshold: u8) -> String {
        let range = self.quality_trim_range(threshold);
        self.sequence().get(range).map(str::to_string).unwrap_or_default()
    }
}
