//! Pixel selector: binds a rectangular query to the footer + block index
//! and produces pixel iterators.
//!
//! The constructor's lower-triangle rejection, the count-transform
//! pipeline, and the two iterator strategies (sorted/unsorted) hang off
//! a `File` that owns the byte stream and caches, handing selectors a
//! shared immutable footer/bin-table handle plus an interior-mutable
//! handle to the caches. Since iterators from one `File` are only ever
//! used by one thread at a time, `Rc<RefCell<_>>` is the idiomatic
//! single-threaded interior-mutability primitive here rather than
//! `Arc<Mutex<_>>`.

pub mod genome_wide;
pub mod sorted;
pub mod unsorted;

use crate::bintable::BinTable;
use crate::cache::{BlockCache, WeightCache};
use crate::error::{HicError, Result};
use crate::format::block_index::BlockIndex;
use crate::format::footer::ExpectedValues;
use crate::normalization::{Normalization, Weights};
use crate::pixel::MatrixType;
use crate::stream::ByteStream;
use std::cell::RefCell;
use std::rc::Rc;

pub use genome_wide::GenomeWideSelector;
pub use sorted::SortedPixelIter;
pub use unsorted::UnsortedPixelIter;

/// A bound query: a rectangular bin-pair selection plus normalization and
/// matrix-type, at a specific resolution/unit.
#[derive(Debug, Clone)]
pub struct Query {
    pub chrom1: u32,
    pub start1: u64,
    pub end1: u64,
    pub chrom2: u32,
    pub start2: u64,
    pub end2: u64,
    pub unit: String,
    pub resolution: i32,
    pub normalization: Normalization,
    pub matrix_type: MatrixType,
}

impl Query {
    #[inline]
    pub fn is_intra(&self) -> bool {
        self.chrom1 == self.chrom2
    }

    /// Reject queries whose lower-left corner lies below the stored
    /// diagonal.
    fn validate(&self) -> Result<()> {
        if self.start1 >= self.end1 || self.start2 >= self.end2 {
            return Err(HicError::invalid_query("start must be less than end"));
        }
        if self.is_intra() {
            if self.start1 > self.start2 {
                return Err(HicError::invalid_query(
                    "intra-chromosomal query must have bin1.start <= bin2.start",
                ));
            }
        } else if self.chrom1 >= self.chrom2 {
            return Err(HicError::invalid_query(
                "inter-chromosomal query must have chrom1.id < chrom2.id",
            ));
        }
        Ok(())
    }
}

/// Shared, read-only resources a selector needs beyond its own block
/// index: the bin table (for offsets) and expected values (for
/// expected/oe matrix types).
pub struct SelectorContext {
    pub bin_table1: BinTable,
    pub bin_table2: BinTable,
    pub version: i32,
    pub weights1: Option<Weights>,
    pub weights2: Option<Weights>,
    pub expected: Option<ExpectedValues>,
}

/// A query bound to its block index, ready to produce iterators.
/// `block_index = None` means the footer was absent for this chromosome
/// pair.
pub struct PixelSelector {
    query: Query,
    block_index: Option<BlockIndex>,
    context: SelectorContext,
    stream: Rc<RefCell<dyn ByteStream>>,
    cache: Rc<RefCell<BlockCache>>,
}

impl PixelSelector {
    pub fn new(
        query: Query,
        block_index: Option<BlockIndex>,
        context: SelectorContext,
        stream: Rc<RefCell<dyn ByteStream>>,
        cache: Rc<RefCell<BlockCache>>,
    ) -> Result<Self> {
        query.validate()?;
        if !query.normalization.is_none() {
            let (w1, w2) = (&context.weights1, &context.weights2);
            if matches!(query.matrix_type, MatrixType::Observed) && (w1.is_none() || w2.is_none())
            {
                return Err(HicError::normalization_not_found(
                    query.normalization,
                    format!("{}/{}", query.chrom1, query.chrom2),
                ));
            }
        }
        Ok(Self {
            query,
            block_index,
            context,
            stream,
            cache,
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// `true` when this selector can never yield a pixel (no footer
    /// record, or an empty block index).
    pub fn is_empty(&self) -> bool {
        match &self.block_index {
            None => true,
            Some(idx) => idx.is_empty(),
        }
    }

    /// Pixel-rectangle area, with the intra-diagonal correction when
    /// `upper_triangle`.
    pub fn size(&self, upper_triangle: bool) -> u64 {
        let n1 = self.query.end1 - self.query.start1;
        let n2 = self.query.end2 - self.query.start2;
        if upper_triangle && self.query.is_intra() {
            // Count only cells with bin1 <= bin2 within the overlapping span.
            let overlap_start = self.query.start1.max(self.query.start2);
            let overlap_end = self.query.end1.min(self.query.end2);
            let diag = overlap_end.saturating_sub(overlap_start);
            n1 * n2 - (diag * diag.saturating_sub(1)) / 2
        } else {
            n1 * n2
        }
    }

    fn chrom1_offset(&self) -> u64 {
        self.context.bin_table1.chrom_offset(self.query.chrom1)
    }

    fn chrom2_offset(&self) -> u64 {
        self.context.bin_table2.chrom_offset(self.query.chrom2)
    }

    /// Query span converted from base pairs to chromosome-relative bin
    /// ids, `[rel_start, rel_end)`.
    fn rel_bin1_range(&self) -> (u64, u64) {
        let r = self.query.resolution as u64;
        (self.query.start1 / r, self.query.end1.div_ceil(r))
    }

    fn rel_bin2_range(&self) -> (u64, u64) {
        let r = self.query.resolution as u64;
        (self.query.start2 / r, self.query.end2.div_ceil(r))
    }

    /// Transform a raw on-disk count into the requested output type:
    /// normalize, then substitute/divide by expected.
    pub fn transform_count(&self, rel_bin1: u64, rel_bin2: u64, raw: f32) -> f64 {
        let mut value = raw as f64;

        if !self.query.normalization.is_none() {
            if let (Some(w1), Some(w2)) = (&self.context.weights1, &self.context.weights2) {
                value = w1.apply_pair(w2, rel_bin1, rel_bin2, value);
            } else {
                return f64::NAN;
            }
        }

        match self.query.matrix_type {
            MatrixType::Observed => value,
            MatrixType::Expected => self.expected_value(rel_bin1, rel_bin2),
            MatrixType::Oe => {
                let expected = self.expected_value(rel_bin1, rel_bin2);
                value / expected
            }
        }
    }

    fn expected_value(&self, rel_bin1: u64, rel_bin2: u64) -> f64 {
        if self.query.is_intra() {
            let Some(expected) = &self.context.expected else {
                return f64::NAN;
            };
            let dist = rel_bin2.abs_diff(rel_bin1);
            expected.at(self.query.chrom1, dist)
        } else {
            // Inter-chromosomal expected/oe has no distance-indexed vector
            // to consult; it collapses to the observed matrix's scalar
            // mean for this chromosome pair, sourced from the block
            // index's own stored sum rather than the expected-value table.
            let Some(index) = &self.block_index else {
                return f64::NAN;
            };
            let nbins1 = self.context.bin_table1.bins_for_chrom(self.query.chrom1) as f64;
            let nbins2 = self.context.bin_table2.bins_for_chrom(self.query.chrom2) as f64;
            if nbins1 == 0.0 || nbins2 == 0.0 {
                return f64::NAN;
            }
            index.sum / (nbins1 * nbins2)
        }
    }

    pub fn sorted_iter<N: crate::pixel::PixelValue>(&self) -> SortedPixelIter<N> {
        SortedPixelIter::new(self)
    }

    pub fn unsorted_iter<N: crate::pixel::PixelValue>(&self) -> UnsortedPixelIter<N> {
        UnsortedPixelIter::new(self)
    }
}

/// Adaptive chunk size for the v7+ intra-chromosomal sweep: ~0.5% of the
/// query's row span, clamped to at most `block_bin_count`.
pub(crate) fn compute_chunk_size(row_span: u64, block_bin_count: u64) -> u64 {
    let adaptive = (row_span as f64 * 0.005).ceil() as u64;
    adaptive.clamp(1, block_bin_count.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_query() -> Query {
        Query {
            chrom1: 0,
            start1: 0,
            end1: 100,
            chrom2: 0,
            start2: 0,
            end2: 100,
            unit: "BP".into(),
            resolution: 10,
            normalization: Normalization::None,
            matrix_type: MatrixType::Observed,
        }
    }

    #[test]
    fn rejects_lower_triangle_intra() {
        let mut q = base_query();
        q.start2 = 0;
        q.start1 = 50;
        assert!(q.validate().is_err());
    }

    #[test]
    fn rejects_descending_inter() {
        let mut q = base_query();
        q.chrom2 = 0;
        q.chrom1 = 1;
        assert!(q.validate().is_err());
    }

    #[test]
    fn accepts_valid_intra() {
        let q = base_query();
        assert!(q.validate().is_ok());
    }

    #[test]
    fn chunk_size_is_clamped() {
        assert_eq!(compute_chunk_size(1_000_000, 1000), 1000);
        assert_eq!(compute_chunk_size(100, 1000), 1);
    }

    fn inter_selector(sum: f64) -> PixelSelector {
        use crate::format::block_index::BlockIndex;
        use crate::format::footer::{BlockDescriptor, BlockIndexEntry};
        use crate::reference::Reference;
        use crate::stream::MemoryStream;

        let reference = Reference::new(vec![("chr1".into(), 1000), ("chr2".into(), 500)]).unwrap();
        let bin_table = BinTable::fixed(reference, 100).unwrap();
        let entry = BlockIndexEntry {
            unit: "BP".into(),
            resolution: 100,
            sum: sum as f32,
            occupied_cells: 0.0,
            p5: 0.0,
            p95: 0.0,
            block_bin_count: 10,
            block_column_count: 1,
            blocks: vec![BlockDescriptor {
                block_id: 0,
                file_offset: 0,
                compressed_size: 0,
            }],
        };
        let block_index = BlockIndex::from_entry(&entry);
        let query = Query {
            chrom1: 0,
            start1: 0,
            end1: 1000,
            chrom2: 1,
            start2: 0,
            end2: 500,
            unit: "BP".into(),
            resolution: 100,
            normalization: Normalization::None,
            matrix_type: MatrixType::Oe,
        };
        let context = SelectorContext {
            bin_table1: bin_table.clone(),
            bin_table2: bin_table,
            version: 9,
            weights1: None,
            weights2: None,
            expected: None,
        };
        let stream: Rc<RefCell<dyn ByteStream>> = Rc::new(RefCell::new(MemoryStream::new(Vec::new())));
        let cache = Rc::new(RefCell::new(BlockCache::with_capacity_bytes(1024)));
        PixelSelector::new(query, Some(block_index), context, stream, cache).unwrap()
    }

    #[test]
    fn inter_chromosomal_expected_is_sum_over_nbins_product() {
        // chr1 has 10 bins at resolution 100, chr2 has 5.
        let selector = inter_selector(100.0);
        let expected = selector.expected_value(0, 0);
        assert_eq!(expected, 100.0 / (10.0 * 5.0));
    }

    #[test]
    fn inter_chromosomal_expected_is_nan_without_block_index() {
        let mut selector = inter_selector(100.0);
        selector.block_index = None;
        assert!(selector.expected_value(0, 0).is_nan());
    }
}
