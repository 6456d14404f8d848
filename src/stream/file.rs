//! Local-file byte stream backend, memory-mapped.
//!
//! A binary, random-access format is better served by mapping the whole
//! file once and treating reads as slices than by a `BufReader`'s
//! sequential buffer, so this backend goes through `memmap2`.

use super::ByteStream;
use crate::error::{HicError, Result};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

pub struct FileStream {
    mmap: Mmap,
    pos: u64,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self { mmap, pos: 0 })
    }
}

impl ByteStream for FileStream {
    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size() {
            return Err(HicError::out_of_bounds(format!(
                "seek to {pos} past end of file (size {})",
                self.size()
            )));
        }
        self.pos = pos;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len() as u64;
        if end > self.size() {
            return Err(HicError::out_of_bounds(format!(
                "read of {} bytes at {} past end of file (size {})",
                buf.len(),
                self.pos,
                self.size()
            )));
        }
        let start = self.pos as usize;
        buf.copy_from_slice(&self.mmap[start..start + buf.len()]);
        self.pos = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_and_seeks() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"HIC\0hello").unwrap();
        tmp.flush().unwrap();

        let mut stream = FileStream::open(tmp.path()).unwrap();
        assert_eq!(stream.size(), 9);
        let magic = stream.read_bytes(4).unwrap();
        assert_eq!(&magic, b"HIC\0");
        stream.seek(4).unwrap();
        let rest = stream.read_bytes(5).unwrap();
        assert_eq!(&rest, b"hello");
    }

    #[test]
    fn out_of_bounds_read_fails() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"ab").unwrap();
        tmp.flush().unwrap();

        let mut stream = FileStream::open(tmp.path()).unwrap();
        assert!(stream.read_bytes(10).is_err());
    }

    #[test]
    fn seek_past_end_fails() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"ab").unwrap();
        tmp.flush().unwrap();

        let mut stream = FileStream::open(tmp.path()).unwrap();
        assert!(stream.seek(100).is_err());
    }
}
