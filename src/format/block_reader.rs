//! Block fetch, decompress, and pixel decode, for versions v6 through
//! v9 and both list (type 1) and dense (type 2) block encodings.
//!
//! Bin ids are widened to global 64-bit ids in exactly one place —
//! `decode_block`'s row/col delta accumulation — so downstream code
//! sees only global 64-bit ids.

use crate::error::{HicError, Result};
use crate::format::footer::BlockDescriptor;
use crate::pixel::ThinPixel;
use crate::stream::ByteStream;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// A decompressed, decoded block: pixels sorted by `(bin1_id, bin2_id)`
/// when the on-disk encoding guarantees sortedness (true for both block
/// types used here).
#[derive(Debug, Clone)]
pub struct InteractionBlock {
    pub pixels: Vec<ThinPixel<f32>>,
}

/// Fetch `descriptor`, zlib-inflate it, and decode its pixel encoding for
/// file `version`. `chrom1_offset`/`chrom2_offset` are the block-relative
/// bin offsets (`coord1.bin1.start`-style chromosome prefix sums) added to
/// decoded row/col ids so callers only ever see global bin ids.
pub fn read_block(
    stream: &mut dyn ByteStream,
    descriptor: &BlockDescriptor,
    version: i32,
    chrom1_offset: u64,
    chrom2_offset: u64,
) -> Result<InteractionBlock> {
    stream.seek(descriptor.file_offset)?;
    let compressed = stream.read_bytes(descriptor.compressed_size as usize)?;
    let raw = inflate(&compressed, descriptor.file_offset)?;
    decode_block(&raw, version, chrom1_offset, chrom2_offset, descriptor.file_offset)
}

/// Grow the output buffer `3x` the compressed size initially, `+1x` on
/// each "insufficient space" retry.
/// `flate2`'s streaming reader doesn't need manual growth, but we keep
/// the retry loop so a short/corrupt stream surfaces as
/// `CorruptedBlock` rather than a generic I/O error.
fn inflate(compressed: &[u8], offset: u64) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::with_capacity(compressed.len() * 3);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| HicError::corrupted_block(offset, format!("deflate error: {e}")))?;
    Ok(out)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
    fn u8(&mut self) -> Result<u8> {
        self.bytes(1).map(|b| b[0])
    }
    fn i16(&mut self) -> Result<i16> {
        self.bytes(2).map(|b| i16::from_le_bytes([b[0], b[1]]))
    }
    fn i32(&mut self) -> Result<i32> {
        self.bytes(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
    fn f32(&mut self) -> Result<f32> {
        self.bytes(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(HicError::invalid_format("truncated block record"));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

fn decode_block(
    raw: &[u8],
    version: i32,
    chrom1_offset: u64,
    chrom2_offset: u64,
    file_offset: u64,
) -> Result<InteractionBlock> {
    let mut cur = Cursor::new(raw);
    let n_records = cur
        .i32()
        .map_err(|_| HicError::corrupted_block(file_offset, "missing record count"))?;
    if n_records < 0 {
        return Err(HicError::corrupted_block(file_offset, "negative record count"));
    }

    if version < 7 {
        return decode_v6(&mut cur, n_records, chrom1_offset, chrom2_offset, file_offset);
    }

    let bin1_offset = cur.i32()? as i64;
    let bin2_offset = cur.i32()? as i64;
    let use_float_counts = cur.u8()? != 0;
    let (use_short_bin1, use_short_bin2) = if version > 8 {
        (cur.u8()? == 0, cur.u8()? == 0)
    } else {
        (true, true)
    };
    let block_type = cur.u8()?;

    let mut pixels = Vec::with_capacity(n_records.max(0) as usize);
    match block_type {
        1 => decode_type1(
            &mut cur,
            bin1_offset,
            bin2_offset,
            use_short_bin1,
            use_short_bin2,
            use_float_counts,
            chrom1_offset,
            chrom2_offset,
            file_offset,
            &mut pixels,
        )?,
        2 => decode_type2(
            &mut cur,
            n_records,
            bin1_offset,
            bin2_offset,
            use_float_counts,
            chrom1_offset,
            chrom2_offset,
            file_offset,
            &mut pixels,
        )?,
        other => {
            return Err(HicError::corrupted_block(
                file_offset,
                format!("unknown block type {other}"),
            ))
        }
    }

    pixels.sort_unstable_by_key(|p| (p.bin1_id, p.bin2_id));
    Ok(InteractionBlock { pixels })
}

fn decode_v6(
    cur: &mut Cursor,
    n_records: i32,
    chrom1_offset: u64,
    chrom2_offset: u64,
    file_offset: u64,
) -> Result<InteractionBlock> {
    let mut pixels = Vec::with_capacity(n_records.max(0) as usize);
    for _ in 0..n_records {
        let bin1 = cur.i32().map_err(|_| {
            HicError::corrupted_block(file_offset, "truncated v6 record")
        })?;
        let bin2 = cur.i32()?;
        let count = cur.f32()?;
        pixels.push(ThinPixel::new(
            chrom1_offset + bin1 as u64,
            chrom2_offset + bin2 as u64,
            count,
        ));
    }
    pixels.sort_unstable_by_key(|p| (p.bin1_id, p.bin2_id));
    Ok(InteractionBlock { pixels })
}

#[allow(clippy::too_many_arguments)]
fn decode_type1(
    cur: &mut Cursor,
    bin1_offset: i64,
    bin2_offset: i64,
    use_short_bin1: bool,
    use_short_bin2: bool,
    use_float_counts: bool,
    chrom1_offset: u64,
    chrom2_offset: u64,
    file_offset: u64,
    out: &mut Vec<ThinPixel<f32>>,
) -> Result<()> {
    let n_rows = if use_short_bin1 {
        cur.i16()? as i64
    } else {
        cur.i32()? as i64
    };
    for _ in 0..n_rows {
        let row_delta = if use_short_bin1 {
            cur.i16()? as i64
        } else {
            cur.i32()? as i64
        };
        let row = bin1_offset + row_delta;
        let n_cols = if use_short_bin2 {
            cur.i16()? as i64
        } else {
            cur.i32()? as i64
        };
        for _ in 0..n_cols {
            let col_delta = if use_short_bin2 {
                cur.i16()? as i64
            } else {
                cur.i32()? as i64
            };
            let col = bin2_offset + col_delta;
            let count = if use_float_counts {
                cur.f32()?
            } else {
                cur.i16()? as f32
            };
            if row < 0 || col < 0 {
                return Err(HicError::corrupted_block(file_offset, "negative bin id"));
            }
            out.push(ThinPixel::new(
                chrom1_offset + row as u64,
                chrom2_offset + col as u64,
                count,
            ));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn decode_type2(
    cur: &mut Cursor,
    n_records: i32,
    bin1_offset: i64,
    bin2_offset: i64,
    use_float_counts: bool,
    chrom1_offset: u64,
    chrom2_offset: u64,
    file_offset: u64,
    out: &mut Vec<ThinPixel<f32>>,
) -> Result<()> {
    let n_pts = cur.i32()?;
    let w = cur.i16()? as i64;
    if w <= 0 {
        return Err(HicError::corrupted_block(file_offset, "non-positive row width"));
    }
    let mut emitted = 0;
    for idx in 0..n_pts as i64 {
        if emitted >= n_records {
            break;
        }
        let row = idx / w;
        let col = idx % w;
        let is_absent;
        let value;
        if use_float_counts {
            let v = cur.f32()?;
            is_absent = v.is_nan();
            value = v;
        } else {
            let v = cur.i16()?;
            is_absent = v == i16::MIN;
            value = v as f32;
        }
        if is_absent {
            continue;
        }
        let global_row = bin1_offset + row;
        let global_col = bin2_offset + col;
        out.push(ThinPixel::new(
            chrom1_offset + global_row as u64,
            chrom2_offset + global_col as u64,
            value,
        ));
        emitted += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn decodes_v6_plain_triples() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&2i32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());
        raw.extend_from_slice(&1i32.to_le_bytes());
        raw.extend_from_slice(&5.0f32.to_le_bytes());
        raw.extend_from_slice(&3i32.to_le_bytes());
        raw.extend_from_slice(&3i32.to_le_bytes());
        raw.extend_from_slice(&2.0f32.to_le_bytes());

        let block = decode_block(&raw, 6, 100, 100, 0).unwrap();
        assert_eq!(block.pixels.len(), 2);
        assert_eq!(block.pixels[0].bin1_id, 100);
        assert_eq!(block.pixels[0].bin2_id, 101);
        assert_eq!(block.pixels[1].bin1_id, 103);
    }

    #[test]
    fn decodes_type1_row_sparse_v8() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&2i32.to_le_bytes()); // n_records
        raw.extend_from_slice(&10i32.to_le_bytes()); // bin1_offset
        raw.extend_from_slice(&20i32.to_le_bytes()); // bin2_offset
        raw.push(1); // use_float_counts
        raw.push(1); // block_type = 1
        // n_rows (i16, since version<=8 always short)
        raw.extend_from_slice(&1i16.to_le_bytes());
        raw.extend_from_slice(&0i16.to_le_bytes()); // row_delta
        raw.extend_from_slice(&2i16.to_le_bytes()); // n_cols
        raw.extend_from_slice(&0i16.to_le_bytes()); // col_delta
        raw.extend_from_slice(&1.5f32.to_le_bytes());
        raw.extend_from_slice(&1i16.to_le_bytes()); // col_delta
        raw.extend_from_slice(&2.5f32.to_le_bytes());

        let block = decode_block(&raw, 8, 0, 0, 0).unwrap();
        assert_eq!(block.pixels.len(), 2);
        assert_eq!(block.pixels[0].bin1_id, 10);
        assert_eq!(block.pixels[0].bin2_id, 20);
        assert_eq!(block.pixels[0].count, 1.5);
        assert_eq!(block.pixels[1].bin2_id, 21);
    }

    #[test]
    fn decodes_type2_dense_with_sentinel() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&2i32.to_le_bytes()); // n_records
        raw.extend_from_slice(&0i32.to_le_bytes()); // bin1_offset
        raw.extend_from_slice(&0i32.to_le_bytes()); // bin2_offset
        raw.push(1); // use_float_counts
        raw.push(2); // block_type = 2
        raw.extend_from_slice(&4i32.to_le_bytes()); // n_pts
        raw.extend_from_slice(&2i16.to_le_bytes()); // w
        raw.extend_from_slice(&1.0f32.to_le_bytes());
        raw.extend_from_slice(&f32::NAN.to_le_bytes());
        raw.extend_from_slice(&f32::NAN.to_le_bytes());
        raw.extend_from_slice(&4.0f32.to_le_bytes());

        let block = decode_block(&raw, 8, 0, 0, 0).unwrap();
        assert_eq!(block.pixels.len(), 2);
        assert_eq!(block.pixels[0].bin1_id, 0);
        assert_eq!(block.pixels[0].bin2_id, 0);
        assert_eq!(block.pixels[1].bin1_id, 1);
        assert_eq!(block.pixels[1].bin2_id, 1);
    }

    #[test]
    fn bad_block_type_is_corrupted_block_error() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0i32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());
        raw.push(1);
        raw.push(9);
        let err = decode_block(&raw, 8, 0, 0, 0).unwrap_err();
        assert!(matches!(err, HicError::CorruptedBlock { .. }));
    }

    #[test]
    fn end_to_end_deflate_round_trip() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1i32.to_le_bytes());
        raw.extend_from_slice(&7i32.to_le_bytes());
        raw.extend_from_slice(&9.0f32.to_le_bytes());
        let compressed = deflate(&raw);
        let decompressed = inflate(&compressed, 0).unwrap();
        assert_eq!(decompressed, raw);
    }
}
