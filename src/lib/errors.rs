//! Custom error types for alignment record operations.

use thiserror::Error;

/// Result type alias for bamrec operations
pub type Result<T> = std::result::Result<T, BamRecError>;

/// Error type for bamrec operations
#[derive(Error, Debug)]
pub enum BamRecError {
    /// Malformed text input, such as a CIGAR string
    #[error("Invalid format '{input}': {reason}")]
    Format {
        /// The offending input
        input: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Invalid argument at an API boundary (coordinates, names, lengths)
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument {
        /// The argument name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// Record contents contradict one of the record's structural invariants
    #[error("Invariant violated: {reason}")]
    InvariantViolation {
        /// Explanation of the violation
        reason: String,
    },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BamRecError {
    pub(crate) fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format { input: input.into(), reason: reason.into() }
    }

    pub(crate) fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { parameter: parameter.into(), reason: reason.into() }
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation { reason: reason.into() }
    }
}

impl From<bamrec_raw::BuildError> for BamRecError {
    fn from(error: bamrec_raw::BuildError) -> Self {
        use bamrec_raw::BuildError;
        let parameter = match error {
            BuildError::NameTooLong(_) => "name",
            BuildError::TooManyCigarOps(_) => "cigar",
            BuildError::SequenceTooLong(_) => "sequence",
            BuildError::QualityLengthMismatch { .. } => "qualities",
        };
        Self::invalid_argument(parameter, error.to_string())
    }
}
