//! Diagonal band filter: drops every pixel with
//! `|bin2_id - bin1_id| >= num_bins`. `num_bins == 0` produces an empty
//! stream; a huge `num_bins` passes every pixel through.

use super::RowAdvance;
use crate::error::Result;
use crate::pixel::{PixelValue, ThinPixel};

pub struct DiagonalBand<I> {
    inner: I,
    num_bins: u64,
}

impl<I> DiagonalBand<I> {
    pub fn new(inner: I, num_bins: u64) -> Self {
        Self { inner, num_bins }
    }
}

impl<I, N> Iterator for DiagonalBand<I>
where
    I: Iterator<Item = Result<ThinPixel<N>>> + RowAdvance,
    N: PixelValue,
{
    type Item = Result<ThinPixel<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_bins == 0 {
            return None;
        }
        loop {
            let item = self.inner.next()?;
            let pixel = match item {
                Ok(p) => p,
                Err(e) => return Some(Err(e)),
            };
            let dist = pixel.bin2_id.abs_diff(pixel.bin1_id);
            if dist < self.num_bins {
                return Some(Ok(pixel));
            }
            // Pixels within a row are yielded in ascending bin2_id order,
            // so once one falls outside the band every later pixel on the
            // same row does too.
            if pixel.bin2_id >= pixel.bin1_id {
                self.inner.jump_to_next_row();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformers::RowAdvance;

    struct Plain(std::vec::IntoIter<Result<ThinPixel<f32>>>);
    impl Iterator for Plain {
        type Item = Result<ThinPixel<f32>>;
        fn next(&mut self) -> Option<Self::Item> {
            self.0.next()
        }
    }
    impl RowAdvance for Plain {}

    fn pixels(v: Vec<(u64, u64, f32)>) -> Plain {
        Plain(
            v.into_iter()
                .map(|(a, b, c)| Ok(ThinPixel::new(a, b, c)))
                .collect::<Vec<_>>()
                .into_iter(),
        )
    }

    #[test]
    fn zero_width_band_is_empty() {
        let mut band = DiagonalBand::new(pixels(vec![(0, 0, 1.0)]), 0);
        assert!(band.next().is_none());
    }

    #[test]
    fn huge_width_passes_everything() {
        let src = pixels(vec![(0, 0, 1.0), (0, 5, 2.0), (3, 100, 3.0)]);
        let band = DiagonalBand::new(src, u64::MAX);
        assert_eq!(band.count(), 3);
    }

    #[test]
    fn drops_pixels_outside_band() {
        let src = pixels(vec![(0, 0, 1.0), (0, 5, 2.0), (0, 1, 3.0)]);
        let band = DiagonalBand::new(src, 3);
        let kept: Vec<_> = band.map(|r| r.unwrap().bin2_id).collect();
        assert_eq!(kept, vec![0, 1]);
    }
}
