//! Indexed FASTA fixtures.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// Line width used by [`create_indexed_fasta`].
pub const FASTA_LINE_WIDTH: usize = 60;

/// A FASTA file and its `.fai` in a temporary directory.
///
/// The directory is removed when this value is dropped.
pub struct IndexedFasta {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write `sequences` as a FASTA wrapped at `width` bases with a matching `.fai`.
///
/// # Panics
///
/// Panics if the temporary files cannot be written.
#[must_use]
pub fn create_indexed_fasta_with_width(sequences: &[(&str, &str)], width: usize) -> IndexedFasta {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("ref.fa");
    let mut fasta = File::create(&path).expect("create FASTA");
    let mut fai = File::create(dir.path().join("ref.fa.fai")).expect("create FAI");

    let mut offset = 0usize;
    for (name, seq) in sequences {
        let header = format!(">{name}\n");
        fasta.write_all(header.as_bytes()).expect("write header");
        offset += header.len();
        writeln!(fai, "{name}\t{}\t{offset}\t{width}\t{}", seq.len(), width + 1)
            .expect("write FAI line");
        for line in seq.as_bytes().chunks(width) {
            fasta.write_all(line).expect("write bases");
            fasta.write_all(b"\n").expect("write newline");
            offset += line.len() + 1;
        }
    }
    IndexedFasta { dir, path }
}

/// [`create_indexed_fasta_with_width`] at [`FASTA_LINE_WIDTH`].
#[must_use]
pub fn create_indexed_fasta(sequences: &[(&str, &str)]) -> IndexedFasta {
    create_indexed_fasta_with_width(sequences, FASTA_LINE_WIDTH)
}

/// A deterministic, non-repetitive sequence of `len` bases.
#[must_use]
pub fn pseudo_random_bases(len: usize, seed: u64) -> String {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            b"ACGT"[(state >> 62) as usize] as char
        })
        .collect()
}
