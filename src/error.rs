//! Error type for the Hi-C reader.
//!
//! One enum, `#[from] io::Error`, struct variants carrying enough context
//! (path, chrom pair, resolution, byte offset) to reproduce a failure
//! without re-running the query.

use std::fmt;

/// Errors produced while parsing or querying a block-compressed contact
/// matrix file.
#[derive(Debug, thiserror::Error)]
pub enum HicError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported version {0} (supported: 6..=9)")]
    UnsupportedVersion(i32),

    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    #[error("corrupted block at offset {offset}: {message}")]
    CorruptedBlock { offset: u64, message: String },

    #[error("normalization {method} not found for chromosome {chrom}")]
    NormalizationNotFound { method: String, chrom: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl HicError {
    pub fn invalid_format(msg: impl fmt::Display) -> Self {
        HicError::InvalidFormat(msg.to_string())
    }

    pub fn out_of_bounds(msg: impl fmt::Display) -> Self {
        HicError::OutOfBounds(msg.to_string())
    }

    pub fn invalid_query(msg: impl fmt::Display) -> Self {
        HicError::InvalidQuery(msg.to_string())
    }

    pub fn corrupted_block(offset: u64, msg: impl fmt::Display) -> Self {
        HicError::CorruptedBlock {
            offset,
            message: msg.to_string(),
        }
    }

    pub fn normalization_not_found(method: impl fmt::Display, chrom: impl fmt::Display) -> Self {
        HicError::NormalizationNotFound {
            method: method.to_string(),
            chrom: chrom.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HicError>;
