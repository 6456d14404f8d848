//! In-memory byte stream, used by the test suite to build small
//! synthetic `.hic`-shaped fixtures without writing to disk.

use super::ByteStream;
use crate::error::{HicError, Result};

pub struct MemoryStream {
    data: Vec<u8>,
    pos: u64,
}

impl MemoryStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteStream for MemoryStream {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size() {
            return Err(HicError::out_of_bounds(format!(
                "seek to {pos} past end of buffer (size {})",
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
                "read of {} bytes at {} past end of buffer (size {})",
                buf.len(),
                self.pos,
                self.size()
            )));
        }
        let start = self.pos as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        self.pos = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_until_strips_delimiter() {
        let mut s = MemoryStream::new(b"genome_id\0rest".to_vec());
        assert_eq!(s.read_cstring().unwrap(), "genome_id");
        assert_eq!(s.read_bytes(4).unwrap(), b"rest");
    }
}
