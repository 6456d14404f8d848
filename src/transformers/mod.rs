//! Transformers: lazy, forward-only wrappers that compose pixel streams
//! into merged, coarsened, band-limited, coordinate-joined, or
//! dense/sparse-matrix/dataframe outputs.
//!
//! None of these own a file handle or a cache; they only consume whatever
//! `Iterator<Item = Result<ThinPixel<N>>>` a selector (or another
//! transformer) hands them, and none buffer more than a small working
//! set unless documented otherwise.

pub mod coarsen;
pub mod diagonal_band;
pub mod join;
pub mod merge;
pub mod to_dataframe;
pub mod to_matrix;

pub use coarsen::Coarsen;
pub use diagonal_band::DiagonalBand;
pub use join::JoinGenomicCoordinates;
pub use merge::PixelMerger;
pub use to_dataframe::{Bg2DataFrame, CooDataFrame, Span};
pub use to_matrix::{CsrMatrix, DenseMatrix};

/// Hook a sorted pixel iterator can implement to skip whole suffixes of
/// rows cheaply`, use it to skip whole suffixes of rows
/// past the band"). The default no-op is correct for any iterator; only
/// [`crate::selector::SortedPixelIter`] overrides it with a real skip.
pub trait RowAdvance {
    /// Discard whatever of the current row is still buffered/pending,
    /// positioning the iterator to resume at the start of the next row.
    /// A no-op is always a valid (if non-optimal) implementation.
    fn jump_to_next_row(&mut self) {}
}
