//! Sorted pixel iterator.
//!
//! Two strategies, selected by format version and query shape, both
//! forward-only and bounded to at most one chunk's worth of pixels at a
//! time:
//!   - v6 or any inter-chromosomal query: decode a whole row-tile group,
//!     clip, transform, sort, yield; advance to the next row-tile.
//!   - v7+ intra-chromosomal: an adaptive chunked sweep that blacklists
//!     (and evicts) blocks once they stop overlapping the query, so they
//!     are never revisited in the same sweep.

use super::{compute_chunk_size, PixelSelector};
use crate::cache::BlockKey;
use crate::error::{HicError, Result};
use crate::format::block_reader::read_block;
use crate::pixel::{PixelValue, ThinPixel};
use crate::transformers::RowAdvance;
use std::collections::{HashSet, VecDeque};

enum Strategy {
    RowGroup {
        groups: std::vec::IntoIter<(u64, Vec<u64>)>,
    },
    ChunkedSweep {
        cursor: u64,
        row_end: u64,
        col_start: u64,
        col_end: u64,
        blacklist: HashSet<u64>,
    },
}

pub struct SortedPixelIter<'a, N: PixelValue> {
    selector: &'a PixelSelector,
    buffer: VecDeque<ThinPixel<N>>,
    strategy: Strategy,
    done: bool,
    error: Option<HicError>,
}

impl<'a, N: PixelValue> SortedPixelIter<'a, N> {
    pub(super) fn new(selector: &'a PixelSelector) -> Self {
        if selector.is_empty() {
            return Self {
                selector,
                buffer: VecDeque::new(),
                strategy: Strategy::RowGroup {
                    groups: Vec::new().into_iter(),
                },
                done: true,
                error: None,
            };
        }

        let (row_start, row_end) = selector.rel_bin1_range();
        let (col_start, col_end) = selector.rel_bin2_range();
        let use_chunked_sweep = selector.context.version >= 7 && selector.query.is_intra();

        let strategy = if use_chunked_sweep {
            Strategy::ChunkedSweep {
                cursor: row_start,
                row_end,
                col_start,
                col_end,
                blacklist: HashSet::new(),
            }
        } else {
            let index = selector.block_index.as_ref().expect("checked non-empty above");
            let groups = index.overlapping_by_row(row_start, row_end, col_start, col_end);
            Strategy::RowGroup {
                groups: groups.into_iter(),
            }
        };

        Self {
            selector,
            buffer: VecDeque::new(),
            strategy,
            done: false,
            error: None,
        }
    }

    fn fill_buffer(&mut self) {
        if self.done || !self.buffer.is_empty() {
            return;
        }
        match &mut self.strategy {
            Strategy::RowGroup { groups } => {
                let Some((_, block_ids)) = groups.next() else {
                    self.done = true;
                    return;
                };
                let mut chunk = match self.selector.decode_and_clip(&block_ids) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        self.error = Some(e);
                        self.done = true;
                        return;
                    }
                };
                chunk.sort_unstable_by_key(|p| (p.bin1_id, p.bin2_id));
                self.buffer.extend(chunk);
            }
            Strategy::ChunkedSweep {
                cursor,
                row_end,
                col_start,
                col_end,
                blacklist,
            } => {
                if *cursor >= *row_end {
                    self.done = true;
                    return;
                }
                let index = self.selector.block_index.as_ref().expect("non-empty");
                let row_span = *row_end - *cursor;
                let chunk_size = compute_chunk_size(row_span, index.block_bin_count.max(1) as u64);
                let chunk_end = (*cursor + chunk_size).min(*row_end);

                let block_ids = index.overlapping(*cursor, chunk_end, *col_start, *col_end);
                let live_ids: Vec<u64> = block_ids
                    .into_iter()
                    .filter(|id| !blacklist.contains(id))
                    .collect();

                let (pixels, newly_dead) = match self
                    .selector
                    .decode_and_clip_tracking_overlap(&live_ids, *cursor, chunk_end)
                {
                    Ok(result) => result,
                    Err(e) => {
                        self.error = Some(e);
                        self.done = true;
                        return;
                    }
                };
                for id in newly_dead {
                    blacklist.insert(id);
                    self.selector.evict_block(id);
                }

                let mut chunk = pixels;
                chunk.sort_unstable_by_key(|p| (p.bin1_id, p.bin2_id));
                self.buffer.extend(chunk);
                *cursor = chunk_end;
            }
        }
    }
}

impl<'a, N: PixelValue> RowAdvance for SortedPixelIter<'a, N> {
    /// Drop whatever of the current row is still sitting in the buffer —
    /// cheap to do since a sorted iterator never buffers more than one
    /// chunk, so the remainder is at most one chunk's tail.
    fn jump_to_next_row(&mut self) {
        let Some(front) = self.buffer.front().copied() else {
            return;
        };
        while matches!(self.buffer.front(), Some(p) if p.bin1_id == front.bin1_id) {
            self.buffer.pop_front();
        }
    }
}

impl<'a, N: PixelValue> Iterator for SortedPixelIter<'a, N> {
    type Item = crate::error::Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(p) = self.buffer.pop_front() {
                return Some(Ok(p));
            }
            if let Some(err) = self.error.take() {
                return Some(Err(err));
            }
            if self.done {
                return None;
            }
            self.fill_buffer();
        }
    }
}

impl PixelSelector {
    pub(crate) fn block_cache_key(&self, block_id: u64) -> BlockKey {
        (self.query.chrom1, self.query.chrom2, block_id)
    }

    /// Decode (or fetch from cache) every block in `block_ids`, clip to
    /// the query rectangle, and apply the count transform, returning
    /// output-typed pixels with global bin ids.
    fn decode_and_clip<N: PixelValue>(&self, block_ids: &[u64]) -> Result<Vec<ThinPixel<N>>> {
        let (out, _) = self.decode_and_clip_tracking_overlap(block_ids, u64::MIN, u64::MAX)?;
        Ok(out)
    }

    /// As `decode_and_clip`, but also returns the ids of blocks whose
    /// decoded pixels never touched `[row_start, row_end)` at all —
    /// candidates for the sweep's blacklist. A block read/decode failure
    /// aborts the whole call and propagates rather than being treated as
    /// an empty block.
    pub(super) fn decode_and_clip_tracking_overlap<N: PixelValue>(
        &self,
        block_ids: &[u64],
        row_start: u64,
        row_end: u64,
    ) -> Result<(Vec<ThinPixel<N>>, Vec<u64>)> {
        let mut out = Vec::new();
        let mut dead = Vec::new();
        let index = self.block_index.as_ref().expect("non-empty selector");
        let (_, query_row_end) = self.rel_bin1_range_global();
        let (query_col_start, query_col_end) = self.rel_bin2_range_global();
        let chrom1_offset = self.chrom1_offset();
        let chrom2_offset = self.chrom2_offset();

        for &block_id in block_ids {
            let key = self.block_cache_key(block_id);
            let mut touched = false;

            let decoded = {
                let mut cache = self.cache.borrow_mut();
                if let Some(block) = cache.get(&key) {
                    block.pixels.clone()
                } else {
                    drop(cache);
                    let descriptor = index.get(block_id).expect("block id from overlap scan");
                    let mut stream = self.stream.borrow_mut();
                    let block = read_block(
                        &mut *stream,
                        descriptor,
                        self.context.version,
                        chrom1_offset,
                        chrom2_offset,
                    )?;
                    drop(stream);
                    let pixels = block.pixels.clone();
                    self.cache.borrow_mut().insert(key, block);
                    pixels
                }
            };

            for p in decoded {
                let in_query = p.bin1_id >= chrom1_offset
                    && p.bin1_id < chrom1_offset + query_row_end
                    && p.bin2_id >= chrom2_offset + query_col_start
                    && p.bin2_id < chrom2_offset + query_col_end;
                if !in_query {
                    continue;
                }
                touched = true;
                let in_sweep_chunk =
                    p.bin1_id >= chrom1_offset + row_start && p.bin1_id < chrom1_offset + row_end;
                if row_start == u64::MIN && row_end == u64::MAX || in_sweep_chunk {
                    let rel1 = p.bin1_id - chrom1_offset;
                    let rel2 = p.bin2_id - chrom2_offset;
                    let transformed = self.transform_count(rel1, rel2, p.count);
                    out.push(ThinPixel::new(p.bin1_id, p.bin2_id, N::from_f64(transformed)));
                }
            }

            if !touched {
                dead.push(block_id);
            }
        }
        Ok((out, dead))
    }

    fn rel_bin1_range_global(&self) -> (u64, u64) {
        self.rel_bin1_range()
    }

    fn rel_bin2_range_global(&self) -> (u64, u64) {
        self.rel_bin2_range()
    }

    fn evict_block(&self, block_id: u64) {
        let key = self.block_cache_key(block_id);
        self.cache.borrow_mut().evict(&key);
    }
}
