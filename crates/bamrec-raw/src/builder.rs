use thiserror::Error;

use crate::cigar::{reference_length_from_cigar, write_cigar_ops};
use crate::fields::{MAX_READ_NAME_LEN, RecordLayout, l_read_name, l_seq, n_cigar_op, reg2bin};
use crate::sequence::{MISSING_QUALITY, pack_sequence_into};

/// Unmapped BAM bin (`reg2bin(-1, 0)` = 4680).
pub const UNMAPPED_BIN: u16 = 4680;

/// A length field that does not fit the record layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("read name too long ({0} bytes, max {max})", max = MAX_READ_NAME_LEN)]
    NameTooLong(usize),
    #[error("too many CIGAR operations ({0}, max {max})", max = u16::MAX)]
    TooManyCigarOps(usize),
    #[error("sequence too long ({0} bases)")]
    SequenceTooLong(usize),
    #[error("quality length {quals} does not match sequence length {bases}")]
    QualityLengthMismatch { bases: usize, quals: usize },
}

/// Fixed-width core fields of a record (everything but the length fields and bin).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreFields {
    pub ref_id: i32,
    pub pos: i32,
    pub mapq: u8,
    pub flags: u16,
    pub mate_ref_id: i32,
    pub mate_pos: i32,
    pub template_length: i32,
}

impl CoreFields {
    /// Core fields of an unmapped, unplaced record with the given flags.
    #[must_use]
    pub fn unmapped(flags: u16) -> Self {
        Self { ref_id: -1, pos: -1, mapq: 0, flags, mate_ref_id: -1, mate_pos: -1, template_length: 0 }
    }

    /// Read the core fields of an existing record.
    #[must_use]
    pub fn from_record(bam: &[u8]) -> Self {
        Self {
            ref_id: crate::fields::ref_id(bam),
            pos: crate::fields::pos(bam),
            mapq: crate::fields::mapq(bam),
            flags: crate::fields::flags(bam),
            mate_ref_id: crate::fields::mate_ref_id(bam),
            mate_pos: crate::fields::mate_pos(bam),
            template_length: crate::fields::template_length(bam),
        }
    }
}

/// Bin for a record at `pos` with the given CIGAR.
///
/// Records with no reference-consuming op occupy one base; unplaced records
/// (`pos < 0`) get [`UNMAPPED_BIN`]. Ends past `i32::MAX` are clamped.
#[must_use]
pub fn record_bin(pos: i32, cigar_ops: &[u32]) -> u16 {
    if pos < 0 {
        return UNMAPPED_BIN;
    }
    let span = reference_length_from_cigar(cigar_ops).max(1);
    let end = i32::try_from(i64::from(pos) + span).unwrap_or(i32::MAX);
    reg2bin(pos, end)
}

/// Owned copy of every region of a record, for structural edits.
///
/// A record is decomposed with [`RecordParts::split`], edited, and written
/// back with [`RecordParts::build`], which recomputes every length field and
/// the bin from scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordParts {
    pub core: CoreFields,
    /// Read name without the NUL terminator.
    pub name: Vec<u8>,
    pub cigar: Vec<u32>,
    /// Number of bases (the packed form cannot tell odd from even lengths).
    pub l_seq: usize,
    /// Packed 4-bit bases, `(l_seq + 1) / 2` bytes.
    pub packed_seq: Vec<u8>,
    /// Raw Phred qualities, `l_seq` bytes.
    pub qual: Vec<u8>,
    pub aux: Vec<u8>,
}

impl RecordParts {
    /// An empty record with the given core fields.
    #[must_use]
    pub fn new(core: CoreFields) -> Self {
        Self {
            core,
            name: Vec::new(),
            cigar: Vec::new(),
            l_seq: 0,
            packed_seq: Vec::new(),
            qual: Vec::new(),
            aux: Vec::new(),
        }
    }

    /// Decompose a record whose layout has already been validated.
    ///
    /// Returns `None` if the buffer is shorter than its length fields claim.
    #[must_use]
    pub fn split(bam: &[u8]) -> Option<Self> {
        let layout = RecordLayout::from_record(bam)?;
        let name = &bam[layout.name.clone()];
        let name = name.strip_suffix(&[0]).unwrap_or(name);
        let cigar = bam[layout.cigar.clone()]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Some(Self {
            core: CoreFields::from_record(bam),
            name: name.to_vec(),
            cigar,
            l_seq: l_seq(bam) as usize,
            packed_seq: bam[layout.seq].to_vec(),
            qual: bam[layout.qual].to_vec(),
            aux: bam[layout.aux].to_vec(),
        })
    }

    /// Replace the sequence with ASCII `bases`; qualities become missing (`0xFF`).
    pub fn set_bases(&mut self, bases: &[u8]) {
        self.packed_seq.clear();
        pack_sequence_into(&mut self.packed_seq, bases);
        self.l_seq = bases.len();
        self.qual.clear();
        self.qual.resize(bases.len(), MISSING_QUALITY);
    }

    /// Replace the raw qualities.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::QualityLengthMismatch`] if `quals` is not `l_seq` long.
    pub fn set_qualities(&mut self, quals: &[u8]) -> Result<(), BuildError> {
        if quals.len() != self.l_seq {
            return Err(BuildError::QualityLengthMismatch { bases: self.l_seq, quals: quals.len() });
        }
        self.qual.clear();
        self.qual.extend_from_slice(quals);
        Ok(())
    }

    /// Drop the sequence, qualities and auxiliary data.
    pub fn clear_seq_qual_and_tags(&mut self) {
        self.l_seq = 0;
        self.packed_seq.clear();
        self.qual.clear();
        self.aux.clear();
    }

    /// Serialize to record bytes (without the `block_size` prefix).
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if a length does not fit its header field.
    pub fn build(&self) -> Result<Vec<u8>, BuildError> {
        if self.name.len() > MAX_READ_NAME_LEN {
            return Err(BuildError::NameTooLong(self.name.len()));
        }
        let l_read_name = u8::try_from(self.name.len() + 1)
            .map_err(|_| BuildError::NameTooLong(self.name.len()))?;
        let n_cigar_op = u16::try_from(self.cigar.len())
            .map_err(|_| BuildError::TooManyCigarOps(self.cigar.len()))?;
        let l_seq =
            u32::try_from(self.l_seq).map_err(|_| BuildError::SequenceTooLong(self.l_seq))?;
        if self.qual.len() != self.l_seq {
            return Err(BuildError::QualityLengthMismatch {
                bases: self.l_seq,
                quals: self.qual.len(),
            });
        }

        let core = &self.core;
        let mut buf = Vec::with_capacity(
            32 + self.name.len()
                + 1
                + self.cigar.len() * 4
                + self.packed_seq.len()
                + self.qual.len()
                + self.aux.len(),
        );

        // === Fixed 32-byte header ===
        buf.extend_from_slice(&core.ref_id.to_le_bytes());
        buf.extend_from_slice(&core.pos.to_le_bytes());
        buf.push(l_read_name);
        buf.push(core.mapq);
        buf.extend_from_slice(&record_bin(core.pos, &self.cigar).to_le_bytes());
        buf.extend_from_slice(&n_cigar_op.to_le_bytes());
        buf.extend_from_slice(&core.flags.to_le_bytes());
        buf.extend_from_slice(&l_seq.to_le_bytes());
        buf.extend_from_slice(&core.mate_ref_id.to_le_bytes());
        buf.extend_from_slice(&core.mate_pos.to_le_bytes());
        buf.extend_from_slice(&core.template_length.to_le_bytes());

        // === Read name + NUL ===
        buf.extend_from_slice(&self.name);
        buf.push(0);

        // === CIGAR, packed sequence, qualities, tags ===
        write_cigar_ops(&mut buf, &self.cigar);
        buf.extend_from_slice(&self.packed_seq);
        buf.extend_from_slice(&self.qual);
        buf.extend_from_slice(&self.aux);
        Ok(buf)
    }
}

/// Length of `bam` with its auxiliary data removed, from the length fields alone.
#[must_use]
pub fn tagless_len(bam: &[u8]) -> usize {
    RecordLayout::from_lengths(
        l_read_name(bam) as usize,
        n_cigar_op(bam) as usize,
        l_seq(bam) as usize,
        0,
    )
    .core_len()
}
