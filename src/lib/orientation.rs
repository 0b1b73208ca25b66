//! Read-pair orientation classification.

use std::cmp::Ordering;
use std::fmt;

use noodles::sam::alignment::record::Flags;

/// Relative strand layout of a mapped read pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairOrientation {
    /// Lower read forward, higher read reverse.
    ForwardReverse,
    /// Both reads forward.
    ForwardForward,
    /// Lower read reverse, higher read forward.
    ReverseForward,
    /// Both reads reverse.
    ReverseReverse,
    /// Not a mapped pair.
    Undefined,
}

impl PairOrientation {
    /// Classify a pair from its own and mate strand and positions.
    ///
    /// Total over its inputs: every pair-mapped combination yields one of the
    /// four defined orientations; only `pair_mapped == false` yields
    /// [`Undefined`](Self::Undefined).
    #[must_use]
    pub fn classify(
        pair_mapped: bool,
        reverse: bool,
        mate_reverse: bool,
        pos: i32,
        mate_pos: i32,
    ) -> Self {
        use Ordering::{Equal, Greater, Less};
        match (pair_mapped, reverse, mate_reverse, pos.cmp(&mate_pos)) {
            (false, ..) => Self::Undefined,
            (true, false, true, Less | Equal) | (true, true, false, Greater | Equal) => {
                Self::ForwardReverse
            }
            (true, false, false, _) => Self::ForwardForward,
            (true, true, true, _) => Self::ReverseReverse,
            (true, true, false, Less) | (true, false, true, Greater) => Self::ReverseForward,
        }
    }

    /// Two-letter code (`FR`, `FF`, `RF`, `RR`, `UD`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::ForwardReverse => "FR",
            Self::ForwardForward => "FF",
            Self::ReverseForward => "RF",
            Self::ReverseReverse => "RR",
            Self::Undefined => "UD",
        }
    }
}

impl fmt::Display for PairOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Paired, mapped, and mate mapped.
#[must_use]
pub fn pair_mapped(flags: Flags) -> bool {
    flags.is_segmented() && !flags.is_unmapped() && !flags.is_mate_unmapped()
}

/// Same-chromosome FR check, independent of the stored proper-pair bit.
///
/// True when the lower-position read is forward and the higher-position read
/// is reverse. At equal positions the reads must be on opposite strands.
#[must_use]
pub fn proper_orientation(
    ref_id: i32,
    mate_ref_id: i32,
    reverse: bool,
    mate_reverse: bool,
    pos: i32,
    mate_pos: i32,
) -> bool {
    if ref_id != mate_ref_id {
        return false;
    }
    match pos.cmp(&mate_pos) {
        Ordering::Less => !reverse && mate_reverse,
        Ordering::Greater => reverse && !mate_reverse,
        Ordering::Equal => reverse != mate_reverse,
    }
}
