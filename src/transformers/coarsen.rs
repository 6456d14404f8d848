//! Coarsen: integer-divide both bin ids by `k` and sum
//! counts for collisions, producing a stream over the coarsened bin table
//! `B/k`. Maintains a row buffer indexed by `bin2_id / k` for the current
//! output `bin1_id / k`, flushed when the output row advances.
//!
//! Requires the source stream sorted by `bin1_id` (any `bin2_id` order
//! within a row is fine, since collisions are summed into a map keyed by
//! the coarsened column) — a precondition the sorted pixel iterators
//! already guarantee.

use crate::error::Result;
use crate::pixel::{PixelValue, ThinPixel};
use std::collections::BTreeMap;

pub struct Coarsen<I, N: PixelValue> {
    inner: I,
    factor: u64,
    current_row: Option<u64>,
    /// A pixel already pulled from `inner` that belongs to the *next*
    /// output row; held until the current row has been fully flushed.
    pending: Option<(u64, u64, N)>,
    flush: std::collections::btree_map::IntoIter<u64, N>,
    inner_exhausted: bool,
}

impl<I, N: PixelValue> Coarsen<I, N> {
    pub fn new(inner: I, factor: u64) -> Self {
        assert!(factor > 0, "coarsen factor must be nonzero");
        Self {
            inner,
            factor,
            current_row: None,
            pending: None,
            flush: BTreeMap::new().into_iter(),
            inner_exhausted: false,
        }
    }
}

impl<I, N> Iterator for Coarsen<I, N>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    type Item = Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((col, count)) = self.flush.next() {
                let row = self.current_row.expect("flush only set after a row starts");
                return Some(Ok(ThinPixel::new(row, col, count)));
            }
            if self.inner_exhausted && self.pending.is_none() {
                return None;
            }

            let mut row_buffer: BTreeMap<u64, N> = BTreeMap::new();
            if let Some((row, col, count)) = self.pending.take() {
                self.current_row = Some(row);
                row_buffer.insert(col, count);
            }

            loop {
                match self.inner.next() {
                    None => {
                        self.inner_exhausted = true;
                        break;
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    Some(Ok(p)) => {
                        let row = p.bin1_id / self.factor;
                        let col = p.bin2_id / self.factor;
                        match self.current_row {
                            None => {
                                self.current_row = Some(row);
                                merge(&mut row_buffer, col, p.count);
                            }
                            Some(cur) if cur == row => {
                                merge(&mut row_buffer, col, p.count);
                            }
                            Some(_) => {
                                self.pending = Some((row, col, p.count));
                                break;
                            }
                        }
                    }
                }
            }

            if row_buffer.is_empty() {
                continue;
            }
            self.flush = row_buffer.into_iter();
        }
    }
}

fn merge<N: PixelValue>(buffer: &mut BTreeMap<u64, N>, col: u64, count: N) {
    buffer
        .entry(col)
        .and_modify(|c| *c = c.add(count))
        .or_insert(count);
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
    fn sums_collisions_within_coarsened_cell() {
        let input = src(vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (1, 1, 4.0)]);
        let mut coarse = Coarsen::new(input, 2);
        let p = coarse.next().unwrap().unwrap();
        assert_eq!(p.bin1_id, 0);
        assert_eq!(p.bin2_id, 0);
        assert_eq!(p.count, 10.0);
        assert!(coarse.next().is_none());
    }

    #[test]
    fn multiple_output_rows_flush_in_order() {
        let input = src(vec![(0, 0, 1.0), (2, 2, 5.0), (3, 3, 7.0)]);
        let mut coarse = Coarsen::new(input, 2);
        let first = coarse.next().unwrap().unwrap();
        assert_eq!((first.bin1_id, first.bin2_id), (0, 0));
        let second = coarse.next().unwrap().unwrap();
        assert_eq!((second.bin1_id, second.bin2_id), (1, 1));
        assert_eq!(second.count, 12.0);
        assert!(coarse.next().is_none());
    }

    #[test]
    fn composing_twice_equals_combined_factor() {
        let input: Vec<(u64, u64, f32)> = (0..16).map(|i| (i, i, 1.0)).collect();
        let once = Coarsen::new(src(input.clone()), 2);
        let twice = Coarsen::new(once, 2);
        let combined = Coarsen::new(src(input), 4);
        let twice_pixels: Vec<_> = twice.map(|r| r.unwrap()).collect();
        let combined_pixels: Vec<_> = combined.map(|r| r.unwrap()).collect();
        assert_eq!(
            twice_pixels.iter().map(|p| p.count).collect::<Vec<_>>(),
            combined_pixels.iter().map(|p| p.count).collect::<Vec<_>>()
        );
    }
}
