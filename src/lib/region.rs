//! Coordinate regions produced by record "as-region" conversions.

use std::fmt;

/// Strand of a [`GenomicRegion`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    #[must_use]
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Reverse } else { Self::Forward }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
            Self::Unknown => '*',
        }
    }
}

/// A 0-based, half-open interval `[start, end)` on reference `ref_id`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GenomicRegion {
    pub ref_id: i32,
    pub start: i32,
    pub end: i32,
    pub strand: Strand,
}

impl GenomicRegion {
    #[must_use]
    pub fn new(ref_id: i32, start: i32, end: i32) -> Self {
        Self { ref_id, start, end, strand: Strand::Unknown }
    }

    #[must_use]
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Width of the interval; zero for empty or inverted intervals.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::try_from(self.end - self.start).unwrap_or(0)
    }

    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.strand == Strand::Reverse
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}({})", self.ref_id, self.start, self.end, self.strand.as_char())
    }
}
