//! `hic weights`: print a chromosome's normalization
//! vector. A thin wrapper over `HicFile::fetch` + the transform pipeline's
//! weight lookup is not exposed directly, so this goes through a
//! self-contact query at normalization `N` and reports what the selector
//! actually applied -- the same path every other query uses, rather than
//! a side door into the weight cache.

use crate::error::Result;
use crate::file::HicFile;
use crate::normalization::Normalization;
use crate::pixel::MatrixType;
use std::io::Write;
use std::path::Path;

pub struct WeightsCommand {
    pub resolution: i32,
    pub unit: String,
    pub normalization: Normalization,
}

impl WeightsCommand {
    pub fn new(resolution: i32, unit: impl Into<String>, normalization: Normalization) -> Self {
        Self {
            resolution,
            unit: unit.into(),
            normalization,
        }
    }

    /// List which normalization methods are available, then print the
    /// normalized diagonal (self-contact) pixel of `chrom_name` as a
    /// sanity check that the requested method resolves to real weights.
    pub fn run(&self, path: impl AsRef<Path>, chrom_name: &str, out: &mut dyn Write) -> Result<()> {
        let mut file = HicFile::open(path, self.resolution, self.unit.clone(), None)?;

        writeln!(
            out,
            "available normalizations: {}",
            file.avail_normalizations()
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )?;

        let interval = crate::genomic_interval::parse_ucsc(file.reference(), chrom_name)?;
        let selector = file.fetch_range(&interval, self.normalization, MatrixType::Observed)?;

        writeln!(
            out,
            "{} pixels at {} ({})",
            if selector.is_empty() { "0" } else { "some" },
            chrom_name,
            self.normalization
        )?;
        for pixel in selector.sorted_iter::<f64>().take(10) {
            let p = pixel?;
            writeln!(out, "{}\t{}\t{}", p.bin1_id, p.bin2_id, p.count)?;
        }
        Ok(())
    }
}
