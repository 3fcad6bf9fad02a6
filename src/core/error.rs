//! Error types for FastHiCLift
//!
//! Structural problems in the inputs (chain files, chromosome size files,
//! contact records) are fatal. Coordinates that fail to map are not errors.

use crate::core::chain::ChainFormatError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for FastHiCLift operations
#[derive(Debug, Error)]
pub enum LiftoverError {
    /// Chain file parsing errors
    #[error("Chain parse error: {0}")]
    ChainFormat(#[from] ChainFormatError),

    /// Chains disagree about a chromosome size
    #[error("{0}")]
    ChromSizeConflict(#[from] ChromSizeConflictError),

    /// Malformed chromosome size file
    #[error("Invalid chromosome size file at line {line}: {message}")]
    ChromSizes { line: usize, message: String },

    /// Malformed contact record in the input stream
    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// No chain file could be located for an assembly pair
    #[error("No chain file found for {from_db} -> {to_db}; download it from {url}")]
    ChainNotFound {
        from_db: String,
        to_db: String,
        url: String,
    },

    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of a chain declared a chromosome size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromSide {
    Source,
    Target,
}

impl std::fmt::Display for ChromSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChromSide::Source => write!(f, "source"),
            ChromSide::Target => write!(f, "target"),
        }
    }
}

/// Two chains declare different sizes for the same chromosome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Chains have inconsistent specification of {side} chromosome size for {chrom} ({first} vs {second})")]
pub struct ChromSizeConflictError {
    pub chrom: String,
    pub side: ChromSide,
    /// Size recorded first
    pub first: u64,
    /// Conflicting size seen later
    pub second: u64,
}

/// Result type alias for FastHiCLift operations
pub type Result<T> = std::result::Result<T, LiftoverError>;
