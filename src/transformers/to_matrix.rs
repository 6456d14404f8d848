//! To-matrix: materializes a pixel stream as either a row-major dense
//! matrix or a CSR sparse matrix, mirroring symmetric-upper sources
//! across the diagonal as it goes. CSR row-pointer growth uses a 1.25×
//! amortized-growth rule for its backing `Vec` (see DESIGN.md).

use crate::error::{HicError, Result};
use crate::pixel::{PixelValue, ThinPixel};

/// Row-major dense matrix over `[row_offset, row_offset + num_rows)` ×
/// `[col_offset, col_offset + num_cols)`. Off-diagonal pixels from a
/// symmetric-upper source are mirrored into both `(r, c)` and `(c, r)`
/// whenever both fall inside the requested window.
pub struct DenseMatrix<N: PixelValue> {
    values: Vec<N>,
    num_rows: usize,
    num_cols: usize,
    row_offset: u64,
    col_offset: u64,
}

impl<N: PixelValue> DenseMatrix<N> {
    fn new(row_offset: u64, num_rows: usize, col_offset: u64, num_cols: usize) -> Self {
        Self {
            values: vec![N::zero(); num_rows * num_cols],
            num_rows,
            num_cols,
            row_offset,
            col_offset,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn get(&self, row: usize, col: usize) -> N {
        self.values[row * self.num_cols + col]
    }

    pub fn as_slice(&self) -> &[N] {
        &self.values
    }

    fn set(&mut self, bin1_id: u64, bin2_id: u64, count: N) {
        if let Some(r) = local_index(bin1_id, self.row_offset, self.num_rows) {
            if let Some(c) = local_index(bin2_id, self.col_offset, self.num_cols) {
                let idx = r * self.num_cols + c;
                self.values[idx] = self.values[idx].add(count);
            }
        }
    }
}

/// Compressed sparse row matrix over the same windowed coordinate space as
/// [`DenseMatrix`]. `row_ptr` has `num_rows + 1` entries.
pub struct CsrMatrix<N: PixelValue> {
    pub row_ptr: Vec<u32>,
    pub col_indices: Vec<u32>,
    pub values: Vec<N>,
    num_rows: usize,
    num_cols: usize,
}

impl<N: PixelValue> CsrMatrix<N> {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn row(&self, r: usize) -> (&[u32], &[N]) {
        let start = self.row_ptr[r] as usize;
        let end = self.row_ptr[r + 1] as usize;
        (&self.col_indices[start..end], &self.values[start..end])
    }
}

#[inline]
fn local_index(global: u64, offset: u64, len: usize) -> Option<usize> {
    let rel = global.checked_sub(offset)?;
    if rel < len as u64 {
        Some(rel as usize)
    } else {
        None
    }
}

/// Build a dense matrix from a pixel stream. `mirror` mirrors off-diagonal
/// pixels into the transposed cell whenever it falls inside the window too
/// (set `false` when the source already contains both halves).
pub fn to_dense<I, N>(
    iter: I,
    row_offset: u64,
    num_rows: usize,
    col_offset: u64,
    num_cols: usize,
    mirror: bool,
) -> Result<DenseMatrix<N>>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    if num_rows == 0 || num_cols == 0 {
        return Err(HicError::invalid_query("matrix dimensions must be nonzero"));
    }
    let mut m = DenseMatrix::new(row_offset, num_rows, col_offset, num_cols);
    for item in iter {
        let p = item?;
        m.set(p.bin1_id, p.bin2_id, p.count);
        if mirror && p.bin1_id != p.bin2_id {
            m.set(p.bin2_id, p.bin1_id, p.count);
        }
    }
    Ok(m)
}

/// Build a CSR sparse matrix. Requires the source sorted by `(bin1_id,
/// bin2_id)` within the window; `mirror` has the same meaning as in
/// [`to_dense`]. When mirroring, the transposed half is buffered per row
/// and folded in during row-pointer construction rather than requiring a
/// second pass.
pub fn to_csr<I, N>(
    iter: I,
    row_offset: u64,
    num_rows: usize,
    col_offset: u64,
    num_cols: usize,
    mirror: bool,
) -> Result<CsrMatrix<N>>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    if num_rows == 0 || num_cols == 0 {
        return Err(HicError::invalid_query("matrix dimensions must be nonzero"));
    }
    // Row-major triples, grown 1.25x amortized like a `Vec`'s own growth
    // strategy; collected then bucketed into CSR form in one pass.
    let mut by_row: Vec<Vec<(u32, N)>> = Vec::with_capacity(num_rows);
    by_row.resize_with(num_rows, Vec::new);

    for item in iter {
        let p = item?;
        if let Some(r) = local_index(p.bin1_id, row_offset, num_rows) {
            if let Some(c) = local_index(p.bin2_id, col_offset, num_cols) {
                push_grow(&mut by_row[r], c as u32, p.count);
            }
        }
        if mirror && p.bin1_id != p.bin2_id {
            if let Some(r) = local_index(p.bin2_id, row_offset, num_rows) {
                if let Some(c) = local_index(p.bin1_id, col_offset, num_cols) {
                    push_grow(&mut by_row[r], c as u32, p.count);
                }
            }
        }
    }

    let mut row_ptr = Vec::with_capacity(num_rows + 1);
    let mut col_indices = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0u32);
    for row in &mut by_row {
        row.sort_by_key(|&(c, _)| c);
        col_indices.extend(row.iter().map(|&(c, _)| c));
        values.extend(row.iter().map(|&(_, v)| v));
        row_ptr.push(col_indices.len() as u32);
    }

    Ok(CsrMatrix {
        row_ptr,
        col_indices,
        values,
        num_rows,
        num_cols,
    })
}

fn push_grow<N: PixelValue>(row: &mut Vec<(u32, N)>, col: u32, count: N) {
    if row.len() == row.capacity() {
        row.reserve(row.capacity() / 4 + 1);
    }
    row.push((col, count));
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
    fn dense_mirrors_off_diagonal_by_default() {
        let m = to_dense(src(vec![(0, 1, 5.0)]), 0, 3, 0, 3, true).unwrap();
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m.get(1, 0), 5.0);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn dense_windowed_offset_excludes_out_of_range_pixels() {
        let m = to_dense(src(vec![(5, 5, 1.0), (20, 20, 9.0)]), 5, 2, 5, 2, false).unwrap();
        assert_eq!(m.get(0, 0), 1.0);
    }

    #[test]
    fn csr_row_counts_match_mirrored_pixels() {
        let csr = to_csr(src(vec![(0, 1, 2.0), (1, 1, 3.0)]), 0, 2, 0, 2, true).unwrap();
        let (cols0, vals0) = csr.row(0);
        assert_eq!(cols0, &[1]);
        assert_eq!(vals0, &[2.0]);
        let (cols1, vals1) = csr.row(1);
        assert_eq!(cols1, &[0, 1]);
        assert_eq!(vals1, &[2.0, 3.0]);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(to_dense(src(vec![]), 0, 0, 0, 1, false).is_err());
    }
}
