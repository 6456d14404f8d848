//! K-way additive pixel merge: the write-path workhorse
//! behind format-to-format conversion and multi-file merges.
//!
//! A min-heap of `(pixel, source_index)` nodes, popped and combined
//! while the heap top shares the current coordinate.

use crate::error::Result;
use crate::pixel::{PixelValue, ThinPixel};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

struct Node<N: PixelValue> {
    pixel: ThinPixel<N>,
    source: usize,
}

impl<N: PixelValue> PartialEq for Node<N> {
    fn eq(&self, other: &Self) -> bool {
        self.pixel.coords() == other.pixel.coords()
    }
}
impl<N: PixelValue> Eq for Node<N> {}
impl<N: PixelValue> PartialOrd for Node<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<N: PixelValue> Ord for Node<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.pixel.coords().cmp(&other.pixel.coords())
    }
}

/// Merges `k` sorted pixel iterators into one sorted stream, summing
/// counts at colliding coordinates. Empty sources are never inserted into
/// the heap; exhausted sources are dropped, not re-inserted.
pub struct PixelMerger<I, N: PixelValue> {
    sources: Vec<I>,
    heap: BinaryHeap<Reverse<Node<N>>>,
    error: Option<crate::error::HicError>,
}

impl<I, N> PixelMerger<I, N>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    pub fn new(mut sources: Vec<I>) -> Self {
        let mut heap = BinaryHeap::new();
        let mut error = None;
        for (idx, source) in sources.iter_mut().enumerate() {
            match source.next() {
                Some(Ok(pixel)) => heap.push(Reverse(Node { pixel, source: idx })),
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

    fn pull(&mut self, source: usize) -> Option<ThinPixel<N>> {
        match self.sources[source].next() {
            Some(Ok(p)) => Some(p),
            Some(Err(e)) => {
                self.error = self.error.take().or(Some(e));
                None
            }
            None => None,
        }
    }
}

impl<I, N> Iterator for PixelMerger<I, N>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    type Item = Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        let Reverse(Node {
            pixel: mut current,
            source: current_source,
        }) = self.heap.pop()?;

        while let Some(Reverse(top)) = self.heap.peek() {
            if top.pixel.coords() != current.coords() {
                break;
            }
            let Reverse(Node { pixel, source }) = self.heap.pop().expect("peeked");
            current.count = current.count.add(pixel.count);
            if let Some(next) = self.pull(source) {
                self.heap.push(Reverse(Node {
                    pixel: next,
                    source,
                }));
            }
        }

        if let Some(next) = self.pull(current_source) {
            self.heap.push(Reverse(Node {
                pixel: next,
                source: current_source,
            }));
        }

        Some(Ok(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(v: Vec<(u64, u64, f32)>) -> std::vec::IntoIter<Result<ThinPixel<f32>>> {
        v.into_iter()
            .map(|(a, b, c)| Ok(ThinPixel::new(a, b, c)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn merges_and_sums_colliding_coordinates() {
        let a = src(vec![(0, 0, 1.0), (1, 1, 2.0)]);
        let b = src(vec![(0, 0, 5.0), (2, 2, 3.0)]);
        let merged: Vec<_> = PixelMerger::new(vec![a, b]).map(|r| r.unwrap()).collect();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].count, 6.0);
        assert!(merged.windows(2).all(|w| w[0].coords() <= w[1].coords()));
    }

    #[test]
    fn merging_two_copies_doubles_every_count() {
        let a = src(vec![(0, 1, 4.0), (2, 3, 9.0)]);
        let b = src(vec![(0, 1, 4.0), (2, 3, 9.0)]);
        let merged: Vec<_> = PixelMerger::new(vec![a, b]).map(|r| r.unwrap()).collect();
        for p in &merged {
            assert!(p.count == 8.0 || p.count == 18.0);
        }
    }

    #[test]
    fn empty_source_is_skipped() {
        let a = src(vec![]);
        let b = src(vec![(0, 0, 1.0)]);
        let merged: Vec<_> = PixelMerger::new(vec![a, b]).map(|r| r.unwrap()).collect();
        assert_eq!(merged.len(), 1);
    }
}
