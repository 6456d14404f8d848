//! `HicFile`: the top-level entry point. Opens a block-compressed contact matrix, owns its byte
//! stream and caches, and exposes the `fetch*` query surface that binds a
//! genomic region pair to a [`PixelSelector`](crate::selector::PixelSelector).
//!
//! One owner of the stream and caches, handing selectors shared handles
//! rather than re-opening the file per query.

use crate::bintable::BinTable;
use crate::cache::{BlockCache, WeightCache};
use crate::config;
use crate::error::{HicError, Result};
use crate::format::block_index::BlockIndex;
use crate::format::footer::{self, BlockDescriptor, GlobalFooterTables, MasterTable, WeightVectorPointer};
use crate::format::header::{Diagnostics, HicHeader};
use crate::format::{self, block_reader};
use crate::genomic_interval::{self, GenomicInterval};
use crate::normalization::{Normalization, WeightVectorType, Weights};
use crate::pixel::{MatrixType, PixelValue, ThinPixel};
use crate::reference::Reference;
use crate::selector::{GenomeWideSelector, PixelSelector, Query, SelectorContext};
use crate::stream::{ByteStream, FileStream, RangeFetcher, RemoteStream};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Which syntax [`HicFile::fetch_query`] should parse a string query with
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySyntax {
    /// `chrom`, `chrom:pos`, or `chrom:start-end`.
    Ucsc,
    /// `chrom<sep>start<sep>end`.
    Bed,
}

/// Two cache-size presets produced by [`HicFile::estimate_optimal_cache_size`]
///: one assuming only cis (intra-chromosomal) access, one
/// assuming the whole genome (cis and trans) is swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSizePresets {
    pub cis_only: u64,
    pub cis_and_trans: u64,
}

/// A random-access handle on one `(unit, resolution)` slice of a
/// block-compressed contact matrix file.
pub struct HicFile {
    stream: Rc<RefCell<dyn ByteStream>>,
    header: HicHeader,
    master: MasterTable,
    footer_tables: GlobalFooterTables,
    resolution: i32,
    matrix_unit: String,
    bin_table: BinTable,
    cache: Rc<RefCell<BlockCache>>,
    weight_cache: WeightCache,
    diagnostics: Diagnostics,
}

impl HicFile {
    /// Open a local file. `cache_bytes` overrides [`config::default_cache_bytes`].
    pub fn open(
        path: impl AsRef<Path>,
        resolution: i32,
        unit: impl Into<String>,
        cache_bytes: Option<u64>,
    ) -> Result<Self> {
        let stream = FileStream::open(path)?;
        Self::from_stream(stream, resolution, unit, cache_bytes)
    }

    /// Open a remote resource through a caller-supplied [`RangeFetcher`].
    /// `prefetch_chunk_bytes` overrides [`config::prefetch_chunk_size`].
    pub fn open_remote<F: RangeFetcher + 'static>(
        fetcher: F,
        resolution: i32,
        unit: impl Into<String>,
        cache_bytes: Option<u64>,
        prefetch_chunk_bytes: Option<u64>,
    ) -> Result<Self> {
        let chunk_bytes =
            prefetch_chunk_bytes.unwrap_or_else(|| config::prefetch_chunk_size(config::is_low_memory()));
        let stream = RemoteStream::new(fetcher, chunk_bytes)?;
        Self::from_stream(stream, resolution, unit, cache_bytes)
    }

    fn from_stream<S: ByteStream + 'static>(
        stream: S,
        resolution: i32,
        unit: impl Into<String>,
        cache_bytes: Option<u64>,
    ) -> Result<Self> {
        let unit = unit.into();
        let stream: Rc<RefCell<dyn ByteStream>> = Rc::new(RefCell::new(stream));

        {
            let mut s = stream.borrow_mut();
            format::sniff(&mut *s)?;
        }

        let mut diagnostics = Vec::new();
        let header = {
            let mut s = stream.borrow_mut();
            HicHeader::read(&mut *s, &mut diagnostics)?
        };

        let available = if unit == "FRAG" {
            &header.frag_resolutions
        } else {
            &header.resolutions
        };
        if !available.contains(&resolution) {
            return Err(HicError::invalid_query(format!(
                "resolution {resolution} not available for unit '{unit}'"
            )));
        }

        let master = {
            let mut s = stream.borrow_mut();
            s.seek(header.master_index_offset as u64)?;
            MasterTable::read(&mut *s, header.version)?
        };

        let footer_tables = {
            let mut s = stream.borrow_mut();
            GlobalFooterTables::read(&mut *s, master.expected_values_offset, header.version)?
        };

        let bin_table = BinTable::fixed(header.reference.clone(), resolution as u32)?;
        let cache_bytes = cache_bytes.unwrap_or_else(config::default_cache_bytes);

        Ok(Self {
            stream,
            header,
            master,
            footer_tables,
            resolution,
            matrix_unit: unit,
            bin_table,
            cache: Rc::new(RefCell::new(BlockCache::with_capacity_bytes(cache_bytes))),
            weight_cache: WeightCache::new(),
            diagnostics,
        })
    }

    #[inline]
    pub fn reference(&self) -> &Reference {
        &self.header.reference
    }

    #[inline]
    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    #[inline]
    pub fn matrix_unit(&self) -> &str {
        &self.matrix_unit
    }

    #[inline]
    pub fn version(&self) -> i32 {
        self.header.version
    }

    #[inline]
    pub fn genome_id(&self) -> &str {
        &self.header.genome_id
    }

    /// All BP resolutions stored in the file (not just the one this handle
    /// was opened at).
    #[inline]
    pub fn available_resolutions(&self) -> &[i32] {
        &self.header.resolutions
    }

    #[inline]
    pub fn bin_table(&self) -> &BinTable {
        &self.bin_table
    }

    /// Drain parse-time and query-time non-fatal notices accumulated so far
    ///: a nonzero `n_frag_resolutions`, a
    /// truncated weight vector, and the like.
    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Every normalization method with a weight vector at this file's
    /// `(unit, resolution)`.
    pub fn avail_normalizations(&self) -> Vec<Normalization> {
        self.footer_tables
            .available_normalizations(&self.matrix_unit, self.resolution)
    }

    /// Core query constructor: binds a rectangular `(chrom1, start1, end1)`
    /// x `(chrom2, start2, end2)` region (in base pairs) to its footer
    /// record, reordering to `chrom1 <= chrom2`.
    pub fn fetch_coords(
        &mut self,
        chrom1: u32,
        start1: u32,
        end1: u32,
        chrom2: u32,
        start2: u32,
        end2: u32,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        let (lo, lo_start, lo_end, hi, hi_start, hi_end) = if chrom1 <= chrom2 {
            (chrom1, start1, end1, chrom2, start2, end2)
        } else {
            (chrom2, start2, end2, chrom1, start1, end1)
        };

        let query = Query {
            chrom1: lo,
            start1: lo_start as u64,
            end1: lo_end as u64,
            chrom2: hi,
            start2: hi_start as u64,
            end2: hi_end as u64,
            unit: self.matrix_unit.clone(),
            resolution: self.resolution,
            normalization,
            matrix_type,
        };

        let block_index = match self.master.lookup(lo, hi) {
            None => None,
            Some((offset, _size)) => {
                let entry = {
                    let mut s = self.stream.borrow_mut();
                    footer::read_block_index(&mut *s, offset, &self.matrix_unit, self.resolution)?
                };
                entry.map(|e| BlockIndex::from_entry(&e))
            }
        };

        let (weights1, weights2) = if normalization.is_none() {
            (None, None)
        } else {
            (
                Some(self.load_weights(lo, normalization)?),
                Some(self.load_weights(hi, normalization)?),
            )
        };

        let expected = match matrix_type {
            MatrixType::Observed => None,
            MatrixType::Expected | MatrixType::Oe => self.expected_values(normalization),
        };

        let context = SelectorContext {
            bin_table1: self.bin_table.clone(),
            bin_table2: self.bin_table.clone(),
            version: self.header.version,
            weights1,
            weights2,
            expected,
        };

        PixelSelector::new(
            query,
            block_index,
            context,
            Rc::clone(&self.stream),
            Rc::clone(&self.cache),
        )
    }

    /// A single chromosome's cis region against itself.
    pub fn fetch(
        &mut self,
        chrom: u32,
        start: u32,
        end: u32,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        self.fetch_coords(chrom, start, end, chrom, start, end, normalization, matrix_type)
    }

    /// A single resolved [`GenomicInterval`] against itself.
    pub fn fetch_range(
        &mut self,
        interval: &GenomicInterval,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        self.fetch(
            interval.chrom_id,
            interval.start,
            interval.end,
            normalization,
            matrix_type,
        )
    }

    /// Two resolved [`GenomicInterval`]s, one per axis.
    pub fn fetch_pair(
        &mut self,
        first: &GenomicInterval,
        second: &GenomicInterval,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        self.fetch_coords(
            first.chrom_id,
            first.start,
            first.end,
            second.chrom_id,
            second.start,
            second.end,
            normalization,
            matrix_type,
        )
    }

    /// Bin-id variant of [`Self::fetch_coords`]: `bin*_end` is exclusive,
    /// like a Rust range.
    #[allow(clippy::too_many_arguments)]
    pub fn fetch_bins(
        &mut self,
        chrom1: u32,
        bin1_start: u64,
        bin1_end: u64,
        chrom2: u32,
        bin2_start: u64,
        bin2_end: u64,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        if bin1_end <= bin1_start || bin2_end <= bin2_start {
            return Err(HicError::invalid_query(
                "bin range end must be greater than start",
            ));
        }
        let (start1, end1) = self.bin_range_to_bp(chrom1, bin1_start, bin1_end)?;
        let (start2, end2) = self.bin_range_to_bp(chrom2, bin2_start, bin2_end)?;
        self.fetch_coords(chrom1, start1, end1, chrom2, start2, end2, normalization, matrix_type)
    }

    fn bin_range_to_bp(&self, chrom_id: u32, bin_start: u64, bin_end: u64) -> Result<(u32, u32)> {
        let offset = self.bin_table.chrom_offset(chrom_id);
        let start = self.bin_table.at(offset + bin_start)?.start;
        let end = self.bin_table.at(offset + bin_end - 1)?.end;
        Ok((start, end))
    }

    /// Parse `query` as `syntax` against this file's reference and fetch it
    /// against itself.
    pub fn fetch_query(
        &mut self,
        query: &str,
        syntax: QuerySyntax,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<PixelSelector> {
        let interval = match syntax {
            QuerySyntax::Ucsc => genomic_interval::parse_ucsc(&self.header.reference, query)?,
            QuerySyntax::Bed => genomic_interval::parse_bed(&self.header.reference, query, '\t')?,
        };
        self.fetch_range(&interval, normalization, matrix_type)
    }

    /// A composite selector over every chromosome pair in the reference,
    /// excluding the "All" pseudo-chromosome.
    pub fn fetch_all(
        &mut self,
        normalization: Normalization,
        matrix_type: MatrixType,
    ) -> Result<GenomeWideSelector> {
        let chroms: Vec<(u32, u32)> = self
            .header
            .reference
            .iter()
            .filter(|c| !c.is_all())
            .map(|c| (c.id(), c.length()))
            .collect();

        let mut attempts = Vec::with_capacity(chroms.len() * (chroms.len() + 1) / 2);
        for (i, &(c1, len1)) in chroms.iter().enumerate() {
            for &(c2, len2) in &chroms[i..] {
                attempts.push(self.fetch_coords(c1, 0, len1, c2, 0, len2, normalization, matrix_type));
            }
        }
        GenomeWideSelector::new(attempts)
    }

    /// Load (or fetch from cache) the per-chromosome weight vector for
    /// `method`, returning an empty divisive-identity vector for
    /// [`Normalization::None`] (never consulted by
    /// [`PixelSelector::transform_count`](crate::selector::PixelSelector)
    /// when normalization is `None`, but kept total for callers).
    fn load_weights(&mut self, chrom_id: u32, method: Normalization) -> Result<Weights> {
        if method.is_none() {
            return Ok(Weights::new(Vec::new(), WeightVectorType::Divisive));
        }
        let pointer = self
            .footer_tables
            .weight_pointer(method, chrom_id, &self.matrix_unit, self.resolution)
            .ok_or_else(|| HicError::normalization_not_found(method, chrom_id))?;

        let stream = Rc::clone(&self.stream);
        let version = self.header.version;
        let expected_len = self.bin_table.bins_for_chrom(chrom_id) as usize;
        let weights = self.weight_cache.get_or_try_init(chrom_id, method, move || {
            let mut s = stream.borrow_mut();
            let values = read_weight_vector(&mut *s, pointer, version)?;
            Ok((values, WeightVectorType::Divisive, expected_len))
        })?;
        Ok(weights.clone())
    }

    fn expected_values(&self, method: Normalization) -> Option<crate::format::footer::ExpectedValues> {
        if method.is_none() {
            self.footer_tables
                .unnormalized_expected(&self.matrix_unit, self.resolution)
                .cloned()
        } else {
            self.footer_tables
                .normalized_expected(method, &self.matrix_unit, self.resolution)
                .cloned()
        }
    }

    /// Sample block descriptors and row positions to estimate a pixel-cache
    /// byte budget that comfortably holds a typical row sweep: `max_row_blocks * avg_block_pixels * sizeof(ThinPixel<f32>)`,
    /// computed once for cis-only access and once for cis-and-trans,
    /// clamped to at least 10 MiB for files older than v9.
    pub fn estimate_optimal_cache_size(&mut self, n_samples: usize) -> Result<CacheSizePresets> {
        let n_samples = n_samples.max(1);
        let all_pairs = self.master.pairs();
        let cis_pairs: Vec<(u32, u32)> = all_pairs.iter().copied().filter(|&(a, b)| a == b).collect();

        let cis_only = self.estimate_for_pairs(&cis_pairs, n_samples)?;
        let cis_and_trans = self.estimate_for_pairs(&all_pairs, n_samples)?;

        let min_bytes = if self.header.version < 9 { 10 * 1024 * 1024 } else { 0 };
        Ok(CacheSizePresets {
            cis_only: cis_only.max(min_bytes),
            cis_and_trans: cis_and_trans.max(min_bytes),
        })
    }

    fn estimate_for_pairs(&mut self, pairs: &[(u32, u32)], n_samples: usize) -> Result<u64> {
        if pairs.is_empty() {
            return Ok(config::default_cache_bytes());
        }

        let mut indexes: Vec<(u32, u32, BlockIndex)> = Vec::new();
        for &(c1, c2) in pairs {
            let Some((offset, _)) = self.master.lookup(c1, c2) else {
                continue;
            };
            let entry = {
                let mut s = self.stream.borrow_mut();
                footer::read_block_index(&mut *s, offset, &self.matrix_unit, self.resolution)?
            };
            let Some(entry) = entry else { continue };
            indexes.push((c1, c2, BlockIndex::from_entry(&entry)));
        }
        if indexes.is_empty() {
            return Ok(config::default_cache_bytes());
        }

        let mut samples: Vec<(BlockDescriptor, u64, u64)> = Vec::new();
        'outer: for (c1, c2, index) in &indexes {
            let c1_off = self.bin_table.chrom_offset(*c1);
            let c2_off = self.bin_table.chrom_offset(*c2);
            for d in index.descriptors() {
                samples.push((*d, c1_off, c2_off));
                if samples.len() >= n_samples {
                    break 'outer;
                }
            }
        }

        let mut total_pixels = 0u64;
        let mut decoded = 0u64;
        {
            let mut stream = self.stream.borrow_mut();
            for (d, c1_off, c2_off) in &samples {
                if let Ok(block) = block_reader::read_block(&mut *stream, d, self.header.version, *c1_off, *c2_off) {
                    total_pixels += block.pixels.len() as u64;
                    decoded += 1;
                }
            }
        }
        let avg_block_pixels = if decoded > 0 { total_pixels / decoded } else { 0 };

        let mut max_row_blocks = 0u64;
        for (c1, c2, index) in &indexes {
            let n_rows = self.bin_table.bins_for_chrom(*c1);
            let col_end = self.bin_table.bins_for_chrom(*c2);
            max_row_blocks = max_row_blocks.max(max_overlap_for_index(index, n_rows, col_end, n_samples));
        }

        let pixel_size = std::mem::size_of::<ThinPixel<f32>>() as u64;
        Ok(max_row_blocks * avg_block_pixels * pixel_size)
    }
}

fn max_overlap_for_index(index: &BlockIndex, n_rows_total: u64, col_end: u64, n_samples: usize) -> u64 {
    if n_rows_total == 0 {
        return 0;
    }
    let step = (n_rows_total / n_samples as u64).max(1);
    let mut max_blocks = 0u64;
    let mut row = 0u64;
    while row < n_rows_total {
        let ids = index.overlapping(row, row + 1, 0, col_end);
        max_blocks = max_blocks.max(ids.len() as u64);
        row += step;
    }
    max_blocks
}

/// Read a weight vector sequentially starting at `pointer.file_offset`:
/// `f64` elements for v9+, `f32` elements (widened) otherwise.
fn read_weight_vector(
    stream: &mut dyn ByteStream,
    pointer: WeightVectorPointer,
    version: i32,
) -> Result<Vec<f64>> {
    stream.seek(pointer.file_offset)?;
    let elem_size: u64 = if version >= 9 { 8 } else { 4 };
    let n = pointer.n_bytes / elem_size;
    let mut values = Vec::with_capacity(n as usize);
    for _ in 0..n {
        values.push(if version >= 9 {
            stream.read_f64()?
        } else {
            stream.read_f32()? as f64
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    /// A single type-1, float-count block holding one self-contact pixel
    /// at bin (0, 0) with count 5.0.
    fn block_payload() -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1i32.to_le_bytes()); // n_records
        raw.extend_from_slice(&0i32.to_le_bytes()); // bin1_offset
        raw.extend_from_slice(&0i32.to_le_bytes()); // bin2_offset
        raw.push(1); // use_float_counts
        raw.push(1); // block_type = 1
        raw.extend_from_slice(&1i16.to_le_bytes()); // n_rows
        raw.extend_from_slice(&0i16.to_le_bytes()); // row_delta
        raw.extend_from_slice(&1i16.to_le_bytes()); // n_cols
        raw.extend_from_slice(&0i16.to_le_bytes()); // col_delta
        raw.extend_from_slice(&5.0f32.to_le_bytes());
        raw
    }

    /// A minimal v8, single-chromosome, single-resolution, single-block
    /// fixture: header, one compressed block, one per-pair block-index
    /// record, then the master table pointing back at it — the same
    /// relative order real `.hic` files use (block indices precede the
    /// master table, which is finalized last). No expected-value or
    /// weight sections (the footer ends exactly at EOF).
    fn build_fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"HIC\0");
        buf.extend_from_slice(&8i32.to_le_bytes()); // version
        let master_offset_pos = buf.len();
        buf.extend_from_slice(&0i64.to_le_bytes()); // master_index_offset, patched below
        buf.push(0); // genome_id = ""
        buf.extend_from_slice(&0i32.to_le_bytes()); // n_attrs
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_chroms
        buf.extend_from_slice(b"chr1\0");
        buf.extend_from_slice(&1000i32.to_le_bytes());
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_resolutions
        buf.extend_from_slice(&100i32.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes()); // n_frag_resolutions

        let compressed = deflate(&block_payload());
        let block_file_offset = buf.len() as i64;
        buf.extend_from_slice(&compressed);

        let entry_offset = buf.len() as i64;
        buf.extend_from_slice(&0i32.to_le_bytes()); // c1
        buf.extend_from_slice(&0i32.to_le_bytes()); // c2
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_resolutions
        buf.extend_from_slice(b"BP\0");
        buf.extend_from_slice(&0i32.to_le_bytes()); // old_index
        buf.extend_from_slice(&[0u8; 16]); // sum/occupied/p5/p95
        buf.extend_from_slice(&100i32.to_le_bytes()); // resolution
        buf.extend_from_slice(&1_000_000i32.to_le_bytes()); // block_bin_count
        buf.extend_from_slice(&1i32.to_le_bytes()); // block_column_count
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_blocks
        buf.extend_from_slice(&0i32.to_le_bytes()); // block_id
        buf.extend_from_slice(&block_file_offset.to_le_bytes());
        buf.extend_from_slice(&(compressed.len() as i32).to_le_bytes());
        let entry_end = buf.len() as i64;

        let master_offset = buf.len() as i64;
        buf[master_offset_pos..master_offset_pos + 8].copy_from_slice(&master_offset.to_le_bytes());

        buf.extend_from_slice(&0i32.to_le_bytes()); // master n_bytes (unused)
        buf.extend_from_slice(&1i32.to_le_bytes()); // n_entries
        buf.extend_from_slice(b"0_0\0");
        buf.extend_from_slice(&entry_offset.to_le_bytes());
        buf.extend_from_slice(&((entry_end - entry_offset) as i32).to_le_bytes());

        buf
    }

    #[test]
    fn opens_minimal_fixture_and_fetches_a_pixel() {
        let mut file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        assert_eq!(file.resolution(), 100);
        assert_eq!(file.version(), 8);

        let selector = file
            .fetch(0, 0, 1000, Normalization::None, MatrixType::Observed)
            .unwrap();
        let pixels: Vec<_> = selector.sorted_iter::<f32>().map(|r| r.unwrap()).collect();
        assert_eq!(pixels.len(), 1);
        assert_eq!(pixels[0].bin1_id, 0);
        assert_eq!(pixels[0].bin2_id, 0);
        assert_eq!(pixels[0].count, 5.0);
    }

    #[test]
    fn fetch_query_parses_ucsc_syntax() {
        let mut file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        let selector = file
            .fetch_query("chr1:0-1000", QuerySyntax::Ucsc, Normalization::None, MatrixType::Observed)
            .unwrap();
        assert_eq!(selector.sorted_iter::<f32>().count(), 1);
    }

    #[test]
    fn unknown_resolution_is_rejected() {
        let err = HicFile::from_stream(MemoryStream::new(build_fixture()), 999, "BP", None).unwrap_err();
        assert!(matches!(err, HicError::InvalidQuery(_)));
    }

    #[test]
    fn avail_normalizations_is_empty_without_weight_index() {
        let file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        assert!(file.avail_normalizations().is_empty());
    }

    #[test]
    fn requesting_missing_normalization_surfaces_not_found() {
        let mut file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        let err = file
            .fetch(0, 0, 1000, Normalization::Kr, MatrixType::Observed)
            .unwrap_err();
        assert!(matches!(err, HicError::NormalizationNotFound { .. }));
    }

    #[test]
    fn fetch_all_covers_the_single_chromosome() {
        let mut file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        let selector = file.fetch_all(Normalization::None, MatrixType::Observed).unwrap();
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.iter::<f32>().count(), 1);
    }

    #[test]
    fn cache_size_estimate_is_nonzero_and_clamped_for_pre_v9() {
        let mut file = HicFile::from_stream(MemoryStream::new(build_fixture()), 100, "BP", None).unwrap();
        let presets = file.estimate_optimal_cache_size(10).unwrap();
        assert!(presets.cis_only >= 10 * 1024 * 1024);
        assert!(presets.cis_and_trans >= presets.cis_only.min(presets.cis_and_trans));
    }
}
