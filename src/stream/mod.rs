//! Seekable byte stream abstraction.
//!
//! Two backends share one capability set: a buffered/memory-mapped local
//! file, and an HTTP-range remote source with a chunked forward-biased
//! prefetch cache. The core only depends on the `ByteStream` trait, not on
//! either backend directly, so a caller can plug in a third (e.g. an
//! in-memory buffer for tests) without touching the format decoders.

mod file;
mod memory;
mod remote;

pub use file::FileStream;
pub use memory::MemoryStream;
pub use remote::{RangeFetcher, RemoteStream};

use crate::error::{HicError, Result};

/// A seekable source of known total size, with size-checked primitive
/// reads for the integer/float widths the binary format uses.
///
/// All multi-byte integers in the on-disk format are little-endian;
/// implementations of the read_* helpers below assume that and do not
/// need to be reimplemented per backend.
pub trait ByteStream {
    /// Total size of the stream in bytes.
    fn size(&self) -> u64;

    /// Current stream position.
    fn position(&self) -> u64;

    /// Move the stream position to `pos`. Fails with `OutOfBounds` when
    /// `pos` is not in `[0, size]`.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Read exactly `buf.len()` bytes starting at the current position,
    /// advancing the position. Fails with `OutOfBounds` if the read would
    /// run past `size()`, or `Transport`/`Io` on a backend failure.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Read up to (and including, if found) the next occurrence of
    /// `delim`, or to end-of-stream. Returns the bytes read, with the
    /// delimiter stripped.
    fn read_until(&mut self, delim: u8) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            if self.position() >= self.size() {
                break;
            }
            self.read_exact(&mut byte)?;
            if byte[0] == delim {
                break;
            }
            out.push(byte[0]);
        }
        Ok(out)
    }

    fn read_cstring(&mut self) -> Result<String> {
        let bytes = self.read_until(0)?;
        String::from_utf8(bytes)
            .map_err(|e| HicError::invalid_format(format!("invalid UTF-8 in cstring: {e}")))
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}
