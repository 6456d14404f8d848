//! On-disk format decoding: header, footer, block index, block reader.
//!
//! `sniff` is the format-ambiguous entry point: a closed sum type at the
//! `File` boundary, not an open trait-object hierarchy. Only
//! `BlockCompressed` has an implementation in this crate; the variant
//! for it exists so a future backend slots into the same dispatch point
//! instead of requiring a redesign.

pub mod block_index;
pub mod block_reader;
pub mod footer;
pub mod header;

use crate::error::{HicError, Result};
use crate::stream::ByteStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    BlockCompressed,
}

/// Detect the on-disk format by its magic byte sequence.
pub fn sniff(stream: &mut dyn ByteStream) -> Result<Format> {
    stream.seek(0)?;
    let magic = stream.read_bytes(4)?;
    stream.seek(0)?;
    if &magic[..] == header::MAGIC {
        Ok(Format::BlockCompressed)
    } else {
        Err(HicError::invalid_format(
            "unrecognized magic bytes; not a block-compressed contact matrix file",
        ))
    }
}
