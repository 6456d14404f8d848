//! Block-index overlap queries.
//!
//! Implements the plain row-major tile-grid scheme: `block_id`
//! intersects a pixel rectangle via `(row, col)` against
//! `block_column_count`. DESIGN.md records why this crate does not
//! attempt the v9 diagonal-numbering optimization.

use crate::format::footer::{BlockDescriptor, BlockIndexEntry};
use rustc_hash::FxHashMap;

/// A chromosome pair's block descriptors, indexed by `block_id` for O(1)
/// lookup during an overlap scan.
pub struct BlockIndex {
    pub block_bin_count: i64,
    pub block_column_count: i64,
    /// Sum of observed counts over the whole chromosome-pair matrix, as
    /// stored in the footer's block-index record. Used as-is for the
    /// inter-chromosomal expected/oe scalar mean (`sum / (nbins1 ×
    /// nbins2)`); meaningless on its own for intra pairs, which use the
    /// distance-indexed expected-value vector instead.
    pub sum: f64,
    by_id: FxHashMap<u64, BlockDescriptor>,
}

impl BlockIndex {
    pub fn from_entry(entry: &BlockIndexEntry) -> Self {
        let mut by_id = FxHashMap::default();
        by_id.reserve(entry.blocks.len());
        for b in &entry.blocks {
            by_id.insert(b.block_id, *b);
        }
        Self {
            block_bin_count: entry.block_bin_count as i64,
            block_column_count: entry.block_column_count as i64,
            sum: entry.sum as f64,
            by_id,
        }
    }

    pub fn get(&self, block_id: u64) -> Option<&BlockDescriptor> {
        self.by_id.get(&block_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Every block descriptor in this index, in arbitrary order.
    pub fn descriptors(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.by_id.values()
    }

    /// Block ids overlapping row-relative bin range `[row_start, row_end)`
    /// and column-relative bin range `[col_start, col_end)`, in row-major
    /// `(row, col)` order, restricted to blocks that are actually present
    /// in the index (most tiles in a sparse matrix have no block at all).
    pub fn overlapping(
        &self,
        row_start: u64,
        row_end: u64,
        col_start: u64,
        col_end: u64,
    ) -> Vec<u64> {
        if self.block_bin_count <= 0 || self.block_column_count <= 0 {
            return Vec::new();
        }
        let bbc = self.block_bin_count as u64;
        let row_tile_start = row_start / bbc;
        let row_tile_end = row_end.saturating_sub(1) / bbc;
        let col_tile_start = col_start / bbc;
        let col_tile_end = col_end.saturating_sub(1) / bbc;

        let mut ids = Vec::new();
        for row in row_tile_start..=row_tile_end {
            for col in col_tile_start..=col_tile_end {
                let id = row as u64 * self.block_column_count as u64 + col;
                if self.by_id.contains_key(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Row-tile groups: `(row, block_ids)` pairs in ascending row order,
    /// used by the v6/inter sorted-iterator strategy,
    /// which decodes and sorts a whole row-tile at a time.
    pub fn overlapping_by_row(
        &self,
        row_start: u64,
        row_end: u64,
        col_start: u64,
        col_end: u64,
    ) -> Vec<(u64, Vec<u64>)> {
        if self.block_bin_count <= 0 {
            return Vec::new();
        }
        let bbc = self.block_bin_count as u64;
        let row_tile_start = row_start / bbc;
        let row_tile_end = row_end.saturating_sub(1) / bbc;
        let col_tile_start = col_start / bbc;
        let col_tile_end = col_end.saturating_sub(1) / bbc;

        let mut groups = Vec::new();
        for row in row_tile_start..=row_tile_end {
            let mut ids = Vec::new();
            for col in col_tile_start..=col_tile_end {
                let id = row * self.block_column_count as u64 + col;
                if self.by_id.contains_key(&id) {
                    ids.push(id);
                }
            }
            if !ids.is_empty() {
                groups.push((row, ids));
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(block_bin_count: i32, block_column_count: i32, ids: &[u64]) -> BlockIndex {
        let entry = BlockIndexEntry {
            unit: "BP".into(),
            resolution: 100000,
            sum: 0.0,
            occupied_cells: 0.0,
            p5: 0.0,
            p95: 0.0,
            block_bin_count,
            block_column_count,
            blocks: ids
                .iter()
                .map(|&id| BlockDescriptor {
                    block_id: id,
                    file_offset: 0,
                    compressed_size: 0,
                })
                .collect(),
        };
        BlockIndex::from_entry(&entry)
    }

    #[test]
    fn overlap_picks_correct_tiles() {
        // 3x3 grid, block_bin_count = 10, only the diagonal populated.
        let idx = index(10, 3, &[0, 4, 8]);
        let ids = idx.overlapping(5, 15, 5, 15);
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn overlap_spans_multiple_tiles_row_major() {
        let idx = index(10, 3, &[0, 1, 3, 4]);
        let ids = idx.overlapping(0, 20, 0, 20);
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn by_row_groups_drop_empty_rows() {
        let idx = index(10, 3, &[0, 6]);
        let groups = idx.overlapping_by_row(0, 30, 0, 30);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, 0);
        assert_eq!(groups[1].0, 2);
    }
}
