//! Key registry and regulatory database errors.

use thiserror::Error;

/// Errors returned by registry lookups and limb decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// No key at the requested position.
    #[error("Trusted key not found: index {0}")]
    NotFound(String),

    /// Byte input does not hold a whole number of 32-bit limbs.
    #[error("Limb data length {0} is not a multiple of 4")]
    MisalignedLength(usize),
}

/// Errors raised while reading a regulatory database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Malformed input; `line` is 1-based.
    #[error("Syntax error in line {line} ({message})")]
    Syntax { line: usize, message: String },

    /// Flag name outside the known set.
    #[error("Unknown flag '{0}'")]
    Flag(String),

    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}
