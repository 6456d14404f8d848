//! `hic coarsen`: the coarsen-transformer write path.
//! Like `hic merge`, this writes COO text rather than a new binary file
//! (format encoding is out of scope); it exists to exercise
//! `transformers::Coarsen` end-to-end against a real selector stream.

use crate::error::Result;
use crate::file::HicFile;
use crate::normalization::Normalization;
use crate::pixel::MatrixType;
use crate::transformers::Coarsen;
use std::io::Write;
use std::path::Path;

pub struct CoarsenCommand {
    pub resolution: i32,
    pub unit: String,
    pub factor: u64,
}

impl CoarsenCommand {
    pub fn new(resolution: i32, unit: impl Into<String>, factor: u64) -> Self {
        Self {
            resolution,
            unit: unit.into(),
            factor,
        }
    }

    pub fn run(&self, path: impl AsRef<Path>, out: &mut dyn Write) -> Result<()> {
        let mut file = HicFile::open(path, self.resolution, self.unit.clone(), None)?;
        let selector = file.fetch_all(Normalization::None, MatrixType::Observed)?;
        let coarsened = Coarsen::new(selector.iter::<f64>(), self.factor);

        let mut int_buf = itoa::Buffer::new();
        let mut float_buf = ryu::Buffer::new();
        for pixel in coarsened {
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
    fn coarsen_command_constructs_with_factor() {
        let cmd = CoarsenCommand::new(1_000, "BP", 4);
        assert_eq!(cmd.factor, 4);
    }
}
