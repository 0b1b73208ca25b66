//! Fluent construction of test records.

#![allow(dead_code)]

use bamrec::{AlignmentRecord, Cigar, Flags, GenomicRegion, Strand};

/// Builds an [`AlignmentRecord`] through [`AlignmentRecord::perfect`] and setters.
///
/// Defaults: name `read`, 10 `A` bases with CIGAR `10M` at `0:0`, unpaired.
#[derive(Clone, Debug)]
pub struct ReadBuilder {
    name: String,
    bases: String,
    cigar: String,
    ref_id: i32,
    pos: i32,
    flags: Flags,
    mate: Option<(i32, i32)>,
    quals: Option<String>,
    z_tags: Vec<([u8; 2], String)>,
}

impl Default for ReadBuilder {
    fn default() -> Self {
        Self {
            name: "read".to_string(),
            bases: "A".repeat(10),
            cigar: "10M".to_string(),
            ref_id: 0,
            pos: 0,
            flags: Flags::empty(),
            mate: None,
            quals: None,
            z_tags: Vec::new(),
        }
    }
}

impl ReadBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Bases and a CIGAR that must consume exactly that many query bases.
    #[must_use]
    pub fn bases(mut self, bases: &str, cigar: &str) -> Self {
        self.bases = bases.to_string();
        self.cigar = cigar.to_string();
        self
    }

    /// `len` `A` bases with the given CIGAR.
    #[must_use]
    pub fn cigar(mut self, cigar: &str, len: usize) -> Self {
        self.bases = "A".repeat(len);
        self.cigar = cigar.to_string();
        self
    }

    #[must_use]
    pub fn at(mut self, ref_id: i32, pos: i32) -> Self {
        self.ref_id = ref_id;
        self.pos = pos;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Paired with the mate at `ref_id:pos`.
    #[must_use]
    pub fn mate(mut self, ref_id: i32, pos: i32) -> Self {
        self.mate = Some((ref_id, pos));
        self.flags |= Flags::SEGMENTED;
        self
    }

    #[must_use]
    pub fn quals(mut self, quals: &str) -> Self {
        self.quals = Some(quals.to_string());
        self
    }

    #[must_use]
    pub fn z_tag(mut self, tag: &[u8; 2], value: &str) -> Self {
        self.z_tags.push((*tag, value.to_string()));
        self
    }

    /// # Panics
    ///
    /// Panics if the CIGAR does not parse or does not match the bases.
    #[must_use]
    pub fn build(self) -> AlignmentRecord {
        let cigar = Cigar::parse(&self.cigar).expect("valid CIGAR");
        let end = self.pos + i32::try_from(self.bases.len()).expect("short read");
        let strand = Strand::from_reverse(self.flags.is_reverse_complemented());
        let region = GenomicRegion::new(self.ref_id, self.pos, end).with_strand(strand);
        let mut record =
            AlignmentRecord::perfect(&self.name, &self.bases, &region, &cigar).expect("perfect record");
        record.set_flags(self.flags);
        if let Some((ref_id, pos)) = self.mate {
            record.set_mate_ref_id(ref_id);
            record.set_mate_position(pos);
        }
        if let Some(quals) = &self.quals {
            record.set_qualities(quals).expect("qualities match bases");
        }
        for (tag, value) in &self.z_tags {
            record.add_z_tag(tag, value);
        }
        record
    }
}
