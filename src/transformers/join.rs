//! Join genomic coordinates: maps `ThinPixel{bin1_id,
//! bin2_id, count}` to `Pixel{bin1, bin2, count}` by looking each bin id
//! up in the shared `BinTable`. Zero buffering — one lookup per pixel.

use crate::bintable::BinTable;
use crate::error::Result;
use crate::pixel::{Pixel, PixelValue, ThinPixel};

pub struct JoinGenomicCoordinates<'a, I, N: PixelValue> {
    inner: I,
    bin_table1: &'a BinTable,
    bin_table2: &'a BinTable,
}

impl<'a, I, N> JoinGenomicCoordinates<'a, I, N>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    pub fn new(inner: I, bin_table1: &'a BinTable, bin_table2: &'a BinTable) -> Self {
        Self {
            inner,
            bin_table1,
            bin_table2,
        }
    }
}

impl<'a, I, N> Iterator for JoinGenomicCoordinates<'a, I, N>
where
    I: Iterator<Item = Result<ThinPixel<N>>>,
    N: PixelValue,
{
    type Item = Result<Pixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        let thin = match self.inner.next()? {
            Ok(p) => p,
            Err(e) => return Some(Err(e)),
        };
        let bin1 = match self.bin_table1.at(thin.bin1_id) {
            Ok(b) => b,
            Err(e) => return Some(Err(e)),
        };
        let bin2 = match self.bin_table2.at(thin.bin2_id) {
            Ok(b) => b,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok(Pixel::new(bin1, bin2, thin.count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;

    fn table() -> BinTable {
        let reference = Reference::new(vec![("chr1".into(), 1000)]).unwrap();
        BinTable::fixed(reference, 100).unwrap()
    }

    #[test]
    fn joins_coordinates() {
        let table = table();
        let pixels = vec![Ok(ThinPixel::new(0u64, 2u64, 5.0f32))];
        let mut joined =
            JoinGenomicCoordinates::new(pixels.into_iter(), &table, &table);
        let p = joined.next().unwrap().unwrap();
        assert_eq!(p.bin1.start, 0);
        assert_eq!(p.bin2.start, 200);
        assert_eq!(p.count, 5.0);
    }

    #[test]
    fn propagates_out_of_range_bin_id_as_error() {
        let table = table();
        let pixels = vec![Ok(ThinPixel::new(0u64, 9999u64, 5.0f32))];
        let mut joined =
            JoinGenomicCoordinates::new(pixels.into_iter(), &table, &table);
        assert!(joined.next().unwrap().is_err());
    }
}
