//! Footer decoder for the block-compressed format: master table,
//! per-pair block index, expected-value tables, normalization-vector
//! index, and the branching rules per `(matrix_type, normalization)`
//! combination.
//!
//! Design decision (recorded in DESIGN.md): expected-value tables live
//! in a fixed, seek-then-restore location immediately following the
//! master table's own `n_entries` records — not derived from any
//! entry's `(entry_offset, size_bytes)`, which point to per-pair
//! block-index records written earlier in the file, before the master
//! table itself was finalized. This module captures that offset as the
//! stream position right after the master-table scan completes.

use crate::error::{HicError, Result};
use crate::normalization::Normalization;
use crate::stream::ByteStream;
use rustc_hash::FxHashMap;

/// `(block_id, file_offset, compressed_size)`.
#[derive(Debug, Clone, Copy)]
pub struct BlockDescriptor {
    pub block_id: u64,
    pub file_offset: u64,
    pub compressed_size: u32,
}

/// One `(unit, resolution)` slice of a chromosome pair's block index.
#[derive(Debug, Clone)]
pub struct BlockIndexEntry {
    pub unit: String,
    pub resolution: i32,
    pub sum: f32,
    pub occupied_cells: f32,
    pub p5: f32,
    pub p95: f32,
    pub block_bin_count: i32,
    pub block_column_count: i32,
    pub blocks: Vec<BlockDescriptor>,
}

/// The master (chrom1_id, chrom2_id) -> footer-offset lookup table at
/// `master_index_offset`.
pub struct MasterTable {
    entries: FxHashMap<(u32, u32), (i64, i32)>,
    /// Stream position immediately after the master table's own
    /// `n_entries` records; start of the expected-value section (see
    /// module doc comment).
    pub expected_values_offset: u64,
}

impl MasterTable {
    pub fn read(stream: &mut dyn ByteStream, version: i32) -> Result<Self> {
        let _n_bytes: i64 = if version >= 9 {
            stream.read_i64()?
        } else {
            stream.read_i32()? as i64
        };
        let n_entries = stream.read_i32()?;
        if n_entries < 0 {
            return Err(HicError::invalid_format("negative footer entry count"));
        }
        let mut entries = FxHashMap::default();
        for _ in 0..n_entries {
            let key = stream.read_cstring()?;
            let (c1, c2) = parse_pair_key(&key)?;
            let entry_offset = stream.read_i64()?;
            let size_bytes = stream.read_i32()?;
            entries.insert((c1, c2), (entry_offset, size_bytes));
        }
        let expected_values_offset = stream.position();
        Ok(Self {
            entries,
            expected_values_offset,
        })
    }

    /// Look up the footer offset for `(c1, c2)` with `c1 <= c2`.
    /// Returns `None` when absent: a legal "matrix is empty at this pair"
    /// state, not an error.
    pub fn lookup(&self, c1: u32, c2: u32) -> Option<(u64, u32)> {
        let (offset, size) = *self.entries.get(&(c1, c2))?;
        if offset < 0 {
            None
        } else {
            Some((offset as u64, size as u32))
        }
    }

    /// Every `(c1, c2)` pair with a non-empty footer record, in arbitrary
    /// order. Used by the §4.4.4 cache-size heuristic to enumerate
    /// candidates to sample block descriptors and row positions from.
    pub fn pairs(&self) -> Vec<(u32, u32)> {
        self.entries
            .iter()
            .filter(|(_, &(offset, _))| offset >= 0)
            .map(|(&key, _)| key)
            .collect()
    }
}

fn parse_pair_key(key: &str) -> Result<(u32, u32)> {
    let (a, b) = key
        .split_once('_')
        .ok_or_else(|| HicError::invalid_format(format!("malformed footer key '{key}'")))?;
    let c1 = a
        .parse()
        .map_err(|_| HicError::invalid_format(format!("malformed footer key '{key}'")))?;
    let c2 = b
        .parse()
        .map_err(|_| HicError::invalid_format(format!("malformed footer key '{key}'")))?;
    Ok((c1, c2))
}

/// Read the per-pair block index record at `offset`, keeping only the
/// `(wanted_unit, wanted_resolution)` slice; other resolutions are
/// skipped by seeking past their block entries rather than parsing them
///.
pub fn read_block_index(
    stream: &mut dyn ByteStream,
    offset: u64,
    wanted_unit: &str,
    wanted_resolution: i32,
) -> Result<Option<BlockIndexEntry>> {
    stream.seek(offset)?;
    let _c1 = stream.read_i32()?;
    let _c2 = stream.read_i32()?;
    let n_resolutions = stream.read_i32()?;
    let mut found = None;
    for _ in 0..n_resolutions {
        let unit = stream.read_cstring()?;
        let _old_index = stream.read_i32()?;
        let sum = stream.read_f32()?;
        let occupied_cells = stream.read_f32()?;
        let p5 = stream.read_f32()?;
        let p95 = stream.read_f32()?;
        let resolution = stream.read_i32()?;
        let block_bin_count = stream.read_i32()?;
        let block_column_count = stream.read_i32()?;
        let n_blocks = stream.read_i32()?;
        if n_blocks < 0 {
            return Err(HicError::invalid_format("negative block count"));
        }

        let matches = unit == wanted_unit && resolution == wanted_resolution;
        if matches {
            let mut blocks = Vec::with_capacity(n_blocks as usize);
            for _ in 0..n_blocks {
                let block_id = stream.read_i32()? as u64;
                let file_offset = stream.read_i64()? as u64;
                let compressed_size = stream.read_i32()? as u32;
                blocks.push(BlockDescriptor {
                    block_id,
                    file_offset,
                    compressed_size,
                });
            }
            found = Some(BlockIndexEntry {
                unit,
                resolution,
                sum,
                occupied_cells,
                p5,
                p95,
                block_bin_count,
                block_column_count,
                blocks,
            });
        } else {
            // 4 (id) + 8 (offset) + 4 (size) bytes per block entry.
            let skip = n_blocks as u64 * 16;
            stream.seek(stream.position() + skip)?;
        }
    }
    Ok(found)
}

/// An expected-value vector plus the per-chromosome divisors applied to
/// it (§16 supplement: `readNormalizationFactors`/
/// `applyNormalizationFactors` in `impl/file_reader_impl.hpp`).
#[derive(Debug, Clone)]
pub struct ExpectedValues {
    values: Vec<f64>,
    chrom_factors: FxHashMap<u32, f64>,
}

impl ExpectedValues {
    /// Expected count at genomic distance `dist` (in bins) for `chrom_id`,
    /// with that chromosome's normalization factor applied.
    pub fn at(&self, chrom_id: u32, dist: u64) -> f64 {
        let raw = self.values.get(dist as usize).copied().unwrap_or(0.0);
        let factor = self.chrom_factors.get(&chrom_id).copied().unwrap_or(1.0);
        raw / factor
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_expected_value_vector(stream: &mut dyn ByteStream, version: i32) -> Result<Vec<f64>> {
    let n_values: i64 = if version >= 9 {
        stream.read_i64()?
    } else {
        stream.read_i32()? as i64
    };
    if n_values < 0 {
        return Err(HicError::invalid_format("negative expected-value count"));
    }
    let mut values = Vec::with_capacity(n_values as usize);
    for _ in 0..n_values {
        values.push(if version >= 9 {
            stream.read_f64()?
        } else {
            stream.read_f32()? as f64
        });
    }
    Ok(values)
}

fn read_chrom_factors(stream: &mut dyn ByteStream, version: i32) -> Result<FxHashMap<u32, f64>> {
    let n_factors = stream.read_i32()?;
    if n_factors < 0 {
        return Err(HicError::invalid_format("negative normalization factor count"));
    }
    let mut factors = FxHashMap::default();
    for _ in 0..n_factors {
        let chrom_id = stream.read_i32()? as u32;
        let factor = if version >= 9 {
            stream.read_f64()?
        } else {
            stream.read_f32()? as f64
        };
        factors.insert(chrom_id, factor);
    }
    Ok(factors)
}

/// `(file_offset, n_bytes)` pointer to a weight vector block, from the
/// per-chromosome weight index.
#[derive(Debug, Clone, Copy)]
pub struct WeightVectorPointer {
    pub file_offset: u64,
    pub n_bytes: u64,
}

/// Everything parsed once, globally, from the expected-value and
/// normalization-vector-index sections of the footer (shared by every
/// chromosome-pair query at a matching unit/resolution).
pub struct GlobalFooterTables {
    unnormalized_expected: FxHashMap<(String, i32), ExpectedValues>,
    normalized_expected: FxHashMap<(Normalization, String, i32), ExpectedValues>,
    weight_index: FxHashMap<(Normalization, u32, String, i32), WeightVectorPointer>,
}

impl GlobalFooterTables {
    pub fn read(stream: &mut dyn ByteStream, offset: u64, version: i32) -> Result<Self> {
        stream.seek(offset)?;
        let mut unnormalized_expected = FxHashMap::default();
        if stream.position() < stream.size() {
            let n_tables = stream.read_i32()?;
            for _ in 0..n_tables {
                let unit = stream.read_cstring()?;
                let resolution = stream.read_i32()?;
                let values = read_expected_value_vector(stream, version)?;
                let chrom_factors = read_chrom_factors(stream, version)?;
                unnormalized_expected.insert(
                    (unit, resolution),
                    ExpectedValues {
                        values,
                        chrom_factors,
                    },
                );
            }
        }

        let mut normalized_expected = FxHashMap::default();
        if stream.position() < stream.size() {
            let n_tables = stream.read_i32()?;
            for _ in 0..n_tables {
                let method_str = stream.read_cstring()?;
                let unit = stream.read_cstring()?;
                let resolution = stream.read_i32()?;
                let values = read_expected_value_vector(stream, version)?;
                let chrom_factors = read_chrom_factors(stream, version)?;
                let method = Normalization::parse(&method_str).ok_or_else(|| {
                    HicError::invalid_format(format!("unknown normalization '{method_str}'"))
                })?;
                normalized_expected.insert(
                    (method, unit, resolution),
                    ExpectedValues {
                        values,
                        chrom_factors,
                    },
                );
            }
        }

        let mut weight_index = FxHashMap::default();
        if stream.position() < stream.size() {
            let n_entries = stream.read_i32()?;
            for _ in 0..n_entries {
                let method_str = stream.read_cstring()?;
                let chrom_id = stream.read_i32()? as u32;
                let unit = stream.read_cstring()?;
                let resolution = stream.read_i32()?;
                let file_offset = stream.read_i64()? as u64;
                let n_bytes = stream.read_i64()? as u64;
                let method = Normalization::parse(&method_str).ok_or_else(|| {
                    HicError::invalid_format(format!("unknown normalization '{method_str}'"))
                })?;
                weight_index.insert(
                    (method, chrom_id, unit, resolution),
                    WeightVectorPointer {
                        file_offset,
                        n_bytes,
                    },
                );
            }
        }

        Ok(Self {
            unnormalized_expected,
            normalized_expected,
            weight_index,
        })
    }

    pub fn unnormalized_expected(&self, unit: &str, resolution: i32) -> Option<&ExpectedValues> {
        self.unnormalized_expected
            .get(&(unit.to_string(), resolution))
    }

    pub fn normalized_expected(
        &self,
        method: Normalization,
        unit: &str,
        resolution: i32,
    ) -> Option<&ExpectedValues> {
        self.normalized_expected
            .get(&(method, unit.to_string(), resolution))
    }

    pub fn weight_pointer(
        &self,
        method: Normalization,
        chrom_id: u32,
        unit: &str,
        resolution: i32,
    ) -> Option<WeightVectorPointer> {
        self.weight_index
            .get(&(method, chrom_id, unit.to_string(), resolution))
            .copied()
    }

    /// Every normalization method with an available weight vector at this
    /// `(unit, resolution)` (§16 supplement: `list_avail_normalizations`).
    pub fn available_normalizations(&self, unit: &str, resolution: i32) -> Vec<Normalization> {
        let mut methods: Vec<Normalization> = self
            .weight_index
            .keys()
            .filter(|(_, _, u, r)| u == unit && *r == resolution)
            .map(|(m, ..)| *m)
            .collect();
        methods.sort_by_key(|m| m.as_str());
        methods.dedup();
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    #[test]
    fn parse_pair_key_roundtrip() {
        assert_eq!(parse_pair_key("0_3").unwrap(), (0, 3));
        assert!(parse_pair_key("bogus").is_err());
    }

    #[test]
    fn expected_values_at_indexes_by_distance() {
        let ev = ExpectedValues {
            values: vec![42.0, 1.0, 2.0],
            chrom_factors: FxHashMap::default(),
        };
        assert_eq!(ev.at(0, 0), 42.0);
        assert_eq!(ev.at(0, 1), 1.0);
    }

    #[test]
    fn chromosome_factor_divides_expected_value() {
        let mut chrom_factors = FxHashMap::default();
        chrom_factors.insert(5u32, 2.0);
        let ev = ExpectedValues {
            values: vec![10.0],
            chrom_factors,
        };
        assert_eq!(ev.at(5, 0), 5.0);
        assert_eq!(ev.at(6, 0), 10.0);
    }

    #[test]
    fn master_table_empty_pair_is_none() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i32.to_le_bytes()); // n_bytes
        buf.extend_from_slice(&2i32.to_le_bytes()); // n_entries
        buf.extend_from_slice(b"0_0\0");
        buf.extend_from_slice(&40i64.to_le_bytes());
        buf.extend_from_slice(&100i32.to_le_bytes());
        buf.extend_from_slice(b"0_1\0");
        buf.extend_from_slice(&(-1i64).to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        let mut stream = MemoryStream::new(buf);
        let table = MasterTable::read(&mut stream, 8).unwrap();
        assert!(table.lookup(0, 0).is_some());
        assert!(table.lookup(0, 1).is_none());
        // 4 (n_bytes) + 4 (n_entries) + 2 * (4-byte cstring + 8-byte offset
        // + 4-byte size) = 40: the stream position right after the master
        // table's own entries, independent of either entry's offset/size.
        assert_eq!(table.expected_values_offset, 40);
    }

    #[test]
    fn block_index_skips_non_matching_resolution() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i32.to_le_bytes()); // c1
        buf.extend_from_slice(&0i32.to_le_bytes()); // c2
        buf.extend_from_slice(&2i32.to_le_bytes()); // n_resolutions
        // first: BP/100000, 1 block (skipped)
        buf.extend_from_slice(b"BP\0");
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]); // sum/occupied/p5/p95
        buf.extend_from_slice(&100000i32.to_le_bytes());
        buf.extend_from_slice(&1000i32.to_le_bytes());
        buf.extend_from_slice(&10i32.to_le_bytes());
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_blocks
        buf.extend_from_slice(&7i32.to_le_bytes());
        buf.extend_from_slice(&999i64.to_le_bytes());
        buf.extend_from_slice(&55i32.to_le_bytes());
        // second: BP/50000, 0 blocks (matches)
        buf.extend_from_slice(b"BP\0");
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        buf.extend_from_slice(&50000i32.to_le_bytes());
        buf.extend_from_slice(&500i32.to_le_bytes());
        buf.extend_from_slice(&5i32.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());

        let mut stream = MemoryStream::new(buf);
        let entry = read_block_index(&mut stream, 0, "BP", 50000).unwrap().unwrap();
        assert_eq!(entry.resolution, 50000);
        assert_eq!(entry.block_column_count, 5);
        assert!(entry.blocks.is_empty());
    }
}
