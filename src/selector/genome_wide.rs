//! Genome-wide composite selector.
//!
//! A k-way interleave of per-pair sorted streams, keyed by the first
//! pixel of each stream. Chromosome pairs that fail to construct a
//! sub-selector (e.g. an absent block for that pair) are filtered out
//! rather than aborting the whole genome-wide scan; `GenomeWideSelector::new`
//! is exactly that filter.

use super::{PixelSelector, SortedPixelIter};
use crate::error::{HicError, Result};
use crate::pixel::{PixelValue, ThinPixel};
use crate::transformers::RowAdvance;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A composite over every retainable `(c1, c2)` pair with `c1 <= c2`.
pub struct GenomeWideSelector {
    selectors: Vec<PixelSelector>,
}

impl GenomeWideSelector {
    /// `attempts` is one `Result<PixelSelector>` per `(c1, c2)` pair the
    /// caller tried to construct. A `NormalizationNotFound` failure drops
    /// that pair silently; any other error propagates. Fails only if
    /// every pair failed.
    pub fn new(attempts: Vec<Result<PixelSelector>>) -> Result<Self> {
        let mut selectors = Vec::with_capacity(attempts.len());
        let total = attempts.len();
        for attempt in attempts {
            match attempt {
                Ok(selector) => selectors.push(selector),
                Err(HicError::NormalizationNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        if selectors.is_empty() && total > 0 {
            return Err(HicError::normalization_not_found(
                "requested method",
                "every chromosome pair",
            ));
        }
        Ok(Self { selectors })
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter<N: PixelValue>(&self) -> GenomeWideIter<'_, N> {
        GenomeWideIter::new(self.selectors.iter().map(|s| s.sorted_iter::<N>()).collect())
    }
}

struct HeapNode<N: PixelValue> {
    pixel: ThinPixel<N>,
    source: usize,
}

impl<N: PixelValue> PartialEq for HeapNode<N> {
    fn eq(&self, other: &Self) -> bool {
        self.pixel.coords() == other.pixel.coords()
    }
}
impl<N: PixelValue> Eq for HeapNode<N> {}
impl<N: PixelValue> PartialOrd for HeapNode<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<N: PixelValue> Ord for HeapNode<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.pixel.coords().cmp(&other.pixel.coords())
    }
}

/// Interleaves the sorted sub-streams with a min-heap keyed on the first
/// pixel of each, restarting a sub-stream on advance.
pub struct GenomeWideIter<'a, N: PixelValue> {
    sources: Vec<SortedPixelIter<'a, N>>,
    heap: BinaryHeap<Reverse<HeapNode<N>>>,
    error: Option<HicError>,
}

impl<'a, N: PixelValue> GenomeWideIter<'a, N> {
    fn new(mut sources: Vec<SortedPixelIter<'a, N>>) -> Self {
        let mut heap = BinaryHeap::new();
        let mut error = None;
        for (source, iter) in sources.iter_mut().enumerate() {
            match iter.next() {
                Some(Ok(pixel)) => heap.push(Reverse(HeapNode { pixel, source })),
                Some(Err(e)) => error = error.or(Some(e)),
                None => {}
            }
        }
        Self {
            sources,
            heap,
            error,
        }
    }
}

/// Row numbering resets at every chromosome-pair boundary inside the
/// interleave, so skipping "the next row" has no single well-defined
/// meaning at this level; sub-streams still skip internally.
impl<'a, N: PixelValue> RowAdvance for GenomeWideIter<'a, N> {}

impl<'a, N: PixelValue> Iterator for GenomeWideIter<'a, N> {
    type Item = Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        let Reverse(node) = self.heap.pop()?;
        match self.sources[node.source].next() {
            Some(Ok(pixel)) => self.heap.push(Reverse(HeapNode {
                pixel,
                source: node.source,
            })),
            Some(Err(e)) => self.error = Some(e),
            None => {}
        }
        Some(Ok(node.pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_attempts_yield_empty_selector() {
        let selector = GenomeWideSelector::new(Vec::new()).unwrap();
        assert!(selector.is_empty());
    }

    #[test]
    fn all_pairs_failing_normalization_is_an_error() {
        let attempts = vec![Err(HicError::normalization_not_found("KR", "0/1"))];
        assert!(GenomeWideSelector::new(attempts).is_err());
    }
}
