//! Bin table: maps a global, dense `bin_id` to `(chromosome, start, end)`
//! and back, for the fixed-resolution common path.
//!
//! Prefix-sum layout (`bin_id = prefix_sum(chrom) + floor(pos /
//! resolution)`): precompute per-chromosome offsets once, binary-search
//! at query time.

use crate::error::{HicError, Result};
use crate::reference::Reference;

/// One genomic interval `[start, end)` on a chromosome, plus its global id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub id: u64,
    pub chrom_id: u32,
    pub start: u32,
    pub end: u32,
}

impl Bin {
    /// Id of this bin relative to the start of its own chromosome.
    #[inline]
    pub fn rel_id(&self, table: &BinTable) -> u64 {
        self.id - table.chrom_offsets[self.chrom_id as usize]
    }
}

/// Either a uniform-width tiling (the common case) or an explicit list of
/// variable-width bins, dense from 0 across the whole reference.
#[derive(Debug, Clone)]
pub struct BinTable {
    reference: Reference,
    resolution: Option<u32>,
    /// Global bin id of the first bin of each chromosome, parallel to
    /// `reference`.
    chrom_offsets: Vec<u64>,
    /// Only populated for the variable-width case: `(chrom_id, start, end)`
    /// for every bin, in `(chrom_id, start)` order.
    variable_bins: Option<Vec<(u32, u32, u32)>>,
    n_bins: u64,
}

impl BinTable {
    /// Build a fixed-width bin table at the given resolution (bp).
    pub fn fixed(reference: Reference, resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(HicError::invalid_format("resolution must be nonzero"));
        }
        let mut chrom_offsets = Vec::with_capacity(reference.len());
        let mut offset = 0u64;
        for chrom in reference.iter() {
            chrom_offsets.push(offset);
            let n = (chrom.length() as u64).div_ceil(resolution as u64);
            offset += n;
        }
        Ok(Self {
            reference,
            resolution: Some(resolution),
            chrom_offsets,
            variable_bins: None,
            n_bins: offset,
        })
    }

    /// Build a variable-width bin table from an explicit, sorted bin list.
    /// `bins` must be sorted by `(chrom_id, start)` and fully tile every
    /// chromosome in `reference` with no gaps or overlaps.
    pub fn variable(reference: Reference, bins: Vec<(u32, u32, u32)>) -> Result<Self> {
        let mut chrom_offsets = vec![0u64; reference.len()];
        let mut offset = 0u64;
        let mut last_chrom: Option<u32> = None;
        for &(chrom_id, start, end) in &bins {
            if end <= start {
                return Err(HicError::invalid_format("bin with start >= end"));
            }
            if last_chrom != Some(chrom_id) {
                chrom_offsets[chrom_id as usize] = offset;
                last_chrom = Some(chrom_id);
            }
            offset += 1;
            let _ = end;
        }
        let n_bins = bins.len() as u64;
        Ok(Self {
            reference,
            resolution: None,
            chrom_offsets,
            variable_bins: Some(bins),
            n_bins,
        })
    }

    #[inline]
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    #[inline]
    pub fn resolution(&self) -> Option<u32> {
        self.resolution
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.n_bins
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_bins == 0
    }

    /// The global id of the first bin belonging to `chrom_id`.
    #[inline]
    pub fn chrom_offset(&self, chrom_id: u32) -> u64 {
        self.chrom_offsets[chrom_id as usize]
    }

    /// Number of bins that belong to `chrom_id`.
    pub fn bins_for_chrom(&self, chrom_id: u32) -> u64 {
        let start = self.chrom_offset(chrom_id);
        let end = if (chrom_id as usize + 1) < self.chrom_offsets.len() {
            self.chrom_offsets[chrom_id as usize + 1]
        } else {
            self.n_bins
        };
        end - start
    }

    /// Resolve a global `bin_id` to its `Bin`.
    pub fn at(&self, bin_id: u64) -> Result<Bin> {
        if bin_id >= self.n_bins {
            return Err(HicError::out_of_bounds(format!(
                "bin id {bin_id} out of range (0..{})",
                self.n_bins
            )));
        }
        if let Some(bins) = &self.variable_bins {
            let (chrom_id, start, end) = bins[bin_id as usize];
            return Ok(Bin {
                id: bin_id,
                chrom_id,
                start,
                end,
            });
        }
        let resolution = self.resolution.expect("fixed table always has a resolution");
        let chrom_id = self.chrom_index_for(bin_id) as u32;
        let rel = bin_id - self.chrom_offsets[chrom_id as usize];
        let start = rel as u32 * resolution;
        let chrom_len = self.reference.get(chrom_id).expect("valid chrom id").length();
        let end = (start.saturating_add(resolution)).min(chrom_len);
        Ok(Bin {
            id: bin_id,
            chrom_id,
            start,
            end,
        })
    }

    /// Resolve `(chrom, pos)` to the global bin id covering `pos`.
    pub fn bin_id_at(&self, chrom_id: u32, pos: u32) -> Result<u64> {
        let chrom = self
            .reference
            .get(chrom_id)
            .ok_or_else(|| HicError::out_of_bounds(format!("unknown chromosome id {chrom_id}")))?;
        if pos >= chrom.length() {
            return Err(HicError::out_of_bounds(format!(
                "position {pos} past end of chromosome '{}' (length {})",
                chrom.name(),
                chrom.length()
            )));
        }
        if let Some(resolution) = self.resolution {
            let rel = (pos / resolution) as u64;
            return Ok(self.chrom_offsets[chrom_id as usize] + rel);
        }
        let bins = self.variable_bins.as_ref().expect("variable table");
        let offset = self.chrom_offsets[chrom_id as usize] as usize;
        let count = self.bins_for_chrom(chrom_id) as usize;
        let slice = &bins[offset..offset + count];
        let idx = slice
            .binary_search_by(|&(_, start, end)| {
                if pos < start {
                    std::cmp::Ordering::Greater
                } else if pos >= end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map_err(|_| HicError::out_of_bounds("position not covered by any bin"))?;
        Ok((offset + idx) as u64)
    }

    fn chrom_index_for(&self, bin_id: u64) -> usize {
        match self.chrom_offsets.binary_search(&bin_id) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Reference {
        Reference::new(vec![("chr1".into(), 1000), ("chr2".into(), 450)]).unwrap()
    }

    #[test]
    fn fixed_resolution_round_trip() {
        let table = BinTable::fixed(reference(), 100).unwrap();
        // chr1: 10 bins (0..10), chr2: 5 bins (10..15, last one 50bp wide)
        assert_eq!(table.len(), 15);
        for bin_id in 0..table.len() {
            let bin = table.at(bin_id).unwrap();
            let round_tripped = table.bin_id_at(bin.chrom_id, bin.start).unwrap();
            assert_eq!(round_tripped, bin_id);
        }
    }

    #[test]
    fn last_bin_of_chromosome_is_short() {
        let table = BinTable::fixed(reference(), 100).unwrap();
        let last = table.at(14).unwrap();
        assert_eq!(last.chrom_id, 1);
        assert_eq!(last.start, 400);
        assert_eq!(last.end, 450);
    }

    #[test]
    fn out_of_bounds_bin_id() {
        let table = BinTable::fixed(reference(), 100).unwrap();
        assert!(table.at(table.len()).is_err());
    }
}
