//! Indexed reference FASTA lookup.
//!
//! [`ReferenceGenomeIndex`] reads the `.fai` index of a FASTA file at
//! construction and fetches bases on demand by seeking into the FASTA with the
//! index's line geometry (htsjdk-style raw byte reads). Nothing but the index
//! is held in memory.
//!
//! The reader owns one file handle, so [`query_region`](ReferenceGenomeIndex::query_region)
//! takes `&mut self`. Open one index per thread.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use noodles::fasta::fai;

use crate::errors::{BamRecError, Result};

/// Find the FAI index for a FASTA file: `<stem>.fa.fai`, then `<path>.fai`.
fn find_fai_path(fasta_path: &Path) -> Option<PathBuf> {
    let fai_path = fasta_path.with_extension("fa.fai");
    if fai_path.exists() {
        return Some(fai_path);
    }
    let fai_path = PathBuf::from(format!("{}.fai", fasta_path.display()));
    fai_path.exists().then_some(fai_path)
}

/// Prefix an I/O error with what failed and on which file, keeping its kind.
fn with_path(e: io::Error, what: &str, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{what} {}: {e}", path.display()))
}

/// Byte offset of base `i` of a contig, from the index line geometry.
fn base_offset(record: &fai::Record, i: u64) -> u64 {
    let line_bases = record.line_bases().max(1);
    record.offset() + (i / line_bases) * record.line_width() + i % line_bases
}

/// Read bases `start..=end` (0-based) of a contig, stripping line terminators.
fn read_bases(file: &mut File, record: &fai::Record, start: u64, end: u64) -> anyhow::Result<Vec<u8>> {
    let first = base_offset(record, start);
    let last = base_offset(record, end);
    let span = usize::try_from(last - first + 1).context("region too large to read")?;

    file.seek(SeekFrom::Start(first))?;
    let mut raw = vec![0u8; span];
    file.read_exact(&mut raw)
        .with_context(|| format!("FASTA ends before byte {}", first + span as u64))?;
    raw.retain(|b| !matches!(b, b'\n' | b'\r'));
    Ok(raw)
}

/// An indexed reference FASTA.
#[derive(Debug)]
pub struct ReferenceGenomeIndex {
    path: PathBuf,
    file: File,
    records: HashMap<String, fai::Record>,
}

impl ReferenceGenomeIndex {
    /// Open `fasta` and load its `.fai` index.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if there is no index next to
    /// the FASTA, and [`BamRecError::Io`] if the index or the FASTA cannot be
    /// read.
    pub fn from_path<P: AsRef<Path>>(fasta: P) -> Result<Self> {
        let path = fasta.as_ref();
        let fai_path = find_fai_path(path).ok_or_else(|| {
            BamRecError::invalid_argument("fasta", format!("No FAI index found for {}", path.display()))
        })?;
        let index = fai::fs::read(&fai_path)
            .map_err(|e| with_path(e, "Failed to read FAI index", &fai_path))?;
        let file = File::open(path).map_err(|e| with_path(e, "Failed to open FASTA", path))?;

        let entries: &[fai::Record] = index.as_ref();
        let records: HashMap<String, fai::Record> = entries
            .iter()
            .map(|r| (String::from_utf8_lossy(r.name().as_ref()).into_owned(), r.clone()))
            .collect();
        debug!("Indexed {} contigs from {}", records.len(), fai_path.display());
        Ok(Self { path: path.to_path_buf(), file, records })
    }

    /// Path of the FASTA file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contains(&self, chrom: &str) -> bool {
        self.records.contains_key(chrom)
    }

    /// Length of `chrom` in bases, if indexed.
    #[must_use]
    pub fn sequence_length(&self, chrom: &str) -> Option<u64> {
        self.records.get(chrom).map(fai::Record::length)
    }

    /// Bases `p1..=p2` (0-based, inclusive) of `chrom`, as stored in the FASTA.
    ///
    /// A `p2` past the end of the contig is clamped to its last base.
    ///
    /// # Errors
    ///
    /// Returns [`BamRecError::InvalidArgument`] if `p1 > p2`, either position
    /// is negative, `chrom` is not indexed, `p1` lies past the contig end, or
    /// the bytes cannot be read.
    pub fn query_region(&mut self, chrom: &str, p1: i32, p2: i32) -> Result<String> {
        if p1 > p2 {
            return Err(BamRecError::invalid_argument("p1", format!("{p1} is greater than p2 ({p2})")));
        }
        let (Ok(start), Ok(end)) = (u64::try_from(p1), u64::try_from(p2)) else {
            return Err(BamRecError::invalid_argument(
                "p1",
                format!("positions must be non-negative, got {p1}..={p2}"),
            ));
        };
        let record = self.records.get(chrom).ok_or_else(|| {
            BamRecError::invalid_argument("chrom", format!("'{chrom}' is not in the index"))
        })?;
        if start >= record.length() {
            return Err(BamRecError::invalid_argument(
                "p1",
                format!("{p1} is past the end of {chrom} ({} bases)", record.length()),
            ));
        }
        let end = end.min(record.length() - 1);

        debug!("Fetching {chrom}:{start}-{end} from {}", self.path.display());
        let bases = read_bases(&mut self.file, record, start, end).map_err(|e| {
            BamRecError::invalid_argument("chrom", format!("could not read {chrom}:{p1}-{p2}: {e:#}"))
        })?;
        Ok(String::from_utf8_lossy(&bases).into_owned())
    }
}
