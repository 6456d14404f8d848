//! Remote byte stream with a chunked, forward-biased prefetch cache.
//!
//! HTTP transport itself is out of scope here; this module implements
//! only the caching policy, against a minimal `RangeFetcher` trait. A
//! caller supplies the actual HTTP client.

use super::ByteStream;
use crate::error::{HicError, Result};

/// Fetches a single byte range `[offset, offset + len)` from a remote
/// resource of known total size. The only transport seam the core
/// depends on.
pub trait RangeFetcher {
    fn total_size(&self) -> Result<u64>;
    fn fetch_range(&self, offset: u64, len: u64) -> Result<Vec<u8>>;
}

/// A `[stream_pos, stream_pos + buffer_size)` prefetch window, held until
/// a seek or read leaves it").
struct Window {
    start: u64,
    data: Vec<u8>,
}

impl Window {
    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }

    fn contains_range(&self, start: u64, len: u64) -> bool {
        start >= self.start && start + len <= self.end()
    }
}

pub struct RemoteStream<F: RangeFetcher> {
    fetcher: F,
    size: u64,
    chunk_size: u64,
    pos: u64,
    window: Option<Window>,
}

impl<F: RangeFetcher> RemoteStream<F> {
    pub fn new(fetcher: F, chunk_size: u64) -> Result<Self> {
        let size = fetcher.total_size()?;
        Ok(Self {
            fetcher,
            size,
            chunk_size: chunk_size.max(1),
            pos: 0,
            window: None,
        })
    }

    fn ensure_window(&mut self, start: u64, len: u64) -> Result<()> {
        if let Some(w) = &self.window {
            if w.contains_range(start, len) {
                return Ok(());
            }
        }
        let want = len.max(self.chunk_size);
        let remaining = self.size.saturating_sub(start);
        let fetch_len = want.min(remaining);
        let data = self
            .fetcher
            .fetch_range(start, fetch_len)
            .map_err(|e| HicError::Transport(e.to_string()))?;
        self.window = Some(Window { start, data });
        Ok(())
    }
}

impl<F: RangeFetcher> ByteStream for RemoteStream<F> {
    fn size(&self) -> u64 {
        self.size
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size {
            return Err(HicError::out_of_bounds(format!(
                "seek to {pos} past end of stream (size {})",
                self.size
            )));
        }
        self.pos = pos;
        if let Some(w) = &self.window {
            if pos < w.start || pos >= w.end() {
                self.window = None;
            }
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let len = buf.len() as u64;
        if self.pos + len > self.size {
            return Err(HicError::out_of_bounds(format!(
                "read of {len} bytes at {} past end of stream (size {})",
                self.pos, self.size
            )));
        }
        self.ensure_window(self.pos, len)?;
        let w = self.window.as_ref().expect("window just ensured");
        let offset = (self.pos - w.start) as usize;
        buf.copy_from_slice(&w.data[offset..offset + buf.len()]);
        self.pos += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeRemote {
        data: Vec<u8>,
        requests: RefCell<Vec<(u64, u64)>>,
    }

    impl RangeFetcher for FakeRemote {
        fn total_size(&self) -> Result<u64> {
            Ok(self.data.len() as u64)
        }
        fn fetch_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push((offset, len));
            let start = offset as usize;
            let end = (start + len as usize).min(self.data.len());
            Ok(self.data[start..end].to_vec())
        }
    }

    #[test]
    fn served_from_window_without_refetch() {
        let remote = FakeRemote {
            data: (0u8..=255).collect(),
            requests: RefCell::new(Vec::new()),
        };
        let mut stream = RemoteStream::new(remote, 16).unwrap();
        let a = stream.read_bytes(4).unwrap();
        let b = stream.read_bytes(4).unwrap();
        assert_eq!(a, vec![0, 1, 2, 3]);
        assert_eq!(b, vec![4, 5, 6, 7]);
        assert_eq!(stream.fetcher.requests.borrow().len(), 1);
    }

    #[test]
    fn read_spanning_window_end_refetches() {
        let remote = FakeRemote {
            data: (0u8..=255).collect(),
            requests: RefCell::new(Vec::new()),
        };
        let mut stream = RemoteStream::new(remote, 8).unwrap();
        stream.seek(6).unwrap();
        let chunk = stream.read_bytes(8).unwrap();
        assert_eq!(chunk, vec![6, 7, 8, 9, 10, 11, 12, 13]);
        assert!(stream.fetcher.requests.borrow().len() >= 2);
    }

    #[test]
    fn seek_outside_window_invalidates_it() {
        let remote = FakeRemote {
            data: (0u8..=255).collect(),
            requests: RefCell::new(Vec::new()),
        };
        let mut stream = RemoteStream::new(remote, 8).unwrap();
        let _ = stream.read_bytes(4).unwrap();
        stream.seek(200).unwrap();
        assert!(stream.window.is_none());
    }
}
