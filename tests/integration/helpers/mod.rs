//! Helper utilities for integration tests.

pub mod assertions;
pub mod fasta;
pub mod read_builder;

pub use assertions::*;
pub use fasta::*;
pub use read_builder::*;
