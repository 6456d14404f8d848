//! `hic merge`: the k-way pixel-merger write path.
//! Fetches the whole-genome pixel stream from every input file at the
//! same `(resolution, unit)` and writes the coordinate-wise additive
//! merge as COO text -- writing a new binary block-compressed file is
//! out of scope, so the merge workhorse itself
//! (`transformers::PixelMerger`) is exercised directly against text
//! output a caller can feed into any downstream format converter.

use crate::error::Result;
use crate::file::HicFile;
use crate::normalization::Normalization;
use crate::pixel::MatrixType;
use crate::transformers::PixelMerger;
use std::io::Write;
use std::path::Path;

pub struct MergeCommand {
    pub resolution: i32,
    pub unit: String,
}

impl MergeCommand {
    pub fn new(resolution: i32, unit: impl Into<String>) -> Self {
        Self {
            resolution,
            unit: unit.into(),
        }
    }

    /// Merge every file in `inputs` at this command's `(resolution,
    /// unit)` and write the summed pixel stream as COO text to `out`.
    pub fn run(&self, inputs: &[impl AsRef<Path>], out: &mut dyn Write) -> Result<()> {
        let mut files: Vec<HicFile> = inputs
            .iter()
            .map(|p| HicFile::open(p, self.resolution, self.unit.clone(), None))
            .collect::<Result<_>>()?;

        let selectors = files
            .iter_mut()
            .map(|f| f.fetch_all(Normalization::None, MatrixType::Observed))
            .collect::<Result<Vec<_>>>()?;

        let sources: Vec<_> = selectors.iter().map(|s| s.iter::<f64>()).collect();
        let merged = PixelMerger::new(sources);

        let mut int_buf = itoa::Buffer::new();
        let mut float_buf = ryu::Buffer::new();
        for pixel in merged {
            let p = pixel?;
            out.write_all(int_buf.format(p.bin1_id).as_bytes())?;
            out.write_all(b"\t")?;
            out.write_all(int_buf.format(p.bin2_id).as_bytes())?;
            out.write_all(b"\t")?;
            out.write_all(float_buf.format(p.count).as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_command_constructs_with_given_resolution() {
        let cmd = MergeCommand::new(10_000, "BP");
        assert_eq!(cmd.resolution, 10_000);
    }
}
