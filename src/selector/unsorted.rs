//! Unsorted pixel iterator.
//!
//! Streams the block-overlap set in descriptor order; for each block:
//! decode, clip to the query rectangle, transform, and add chromosome
//! offsets — no sort. Cheaper than the sorted path when the caller
//! immediately aggregates (a histogram, a dense matrix) rather than
//! needing global order.

use super::PixelSelector;
use crate::pixel::{PixelValue, ThinPixel};
use crate::transformers::RowAdvance;
use std::collections::VecDeque;

pub struct UnsortedPixelIter<'a, N: PixelValue> {
    selector: &'a PixelSelector,
    block_ids: std::vec::IntoIter<u64>,
    buffer: VecDeque<ThinPixel<N>>,
    failed: bool,
}

impl<'a, N: PixelValue> UnsortedPixelIter<'a, N> {
    pub(super) fn new(selector: &'a PixelSelector) -> Self {
        let block_ids = if selector.is_empty() {
            Vec::new()
        } else {
            let (row_start, row_end) = selector.rel_bin1_range();
            let (col_start, col_end) = selector.rel_bin2_range();
            selector
                .block_index
                .as_ref()
                .expect("checked non-empty above")
                .overlapping(row_start, row_end, col_start, col_end)
        };
        Self {
            selector,
            block_ids: block_ids.into_iter(),
            buffer: VecDeque::new(),
            failed: false,
        }
    }
}

/// Block-traversal order has no row structure to skip; the default no-op
/// is the correct (if non-optimal) implementation here.
impl<'a, N: PixelValue> RowAdvance for UnsortedPixelIter<'a, N> {}

impl<'a, N: PixelValue> Iterator for UnsortedPixelIter<'a, N> {
    type Item = crate::error::Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(p) = self.buffer.pop_front() {
                return Some(Ok(p));
            }
            if self.failed {
                return None;
            }
            let block_id = self.block_ids.next()?;
            let (pixels, _dead) = match self.selector.decode_and_clip_unsorted::<N>(&[block_id]) {
                Ok(result) => result,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            self.buffer.extend(pixels);
        }
    }
}

impl PixelSelector {
    pub(crate) fn decode_and_clip_unsorted<N: PixelValue>(
        &self,
        block_ids: &[u64],
    ) -> crate::error::Result<(Vec<ThinPixel<N>>, Vec<u64>)> {
        self.decode_and_clip_tracking_overlap(block_ids, u64::MIN, u64::MAX)
    }
}
