//! `hic header`: print version, genome id, resolutions, and chromosomes
//! for a file. A thin wrapper over a single read-only library call.

use crate::error::Result;
use crate::file::HicFile;
use std::io::Write;
use std::path::Path;

pub struct HeaderCommand {
    pub resolution: i32,
    pub unit: String,
}

impl HeaderCommand {
    pub fn new(resolution: i32, unit: impl Into<String>) -> Self {
        Self {
            resolution,
            unit: unit.into(),
        }
    }

    /// Open `path` at this command's `(resolution, unit)` and write a
    /// human-readable summary to `out`.
    pub fn run(&self, path: impl AsRef<Path>, out: &mut dyn Write) -> Result<()> {
        let mut file = HicFile::open(path, self.resolution, self.unit.clone(), None)?;

        writeln!(out, "version: {}", file.version())?;
        writeln!(out, "genome: {}", file.genome_id())?;
        writeln!(
            out,
            "resolutions: {}",
            file.available_resolutions()
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(out, "matrix unit: {}", file.matrix_unit())?;
        writeln!(out, "chromosomes ({}):", file.reference().len())?;
        for chrom in file.reference().iter() {
            writeln!(out, "  {}\t{}\t{}", chrom.id(), chrom.name(), chrom.length())?;
        }

        for diag in file.take_diagnostics() {
            writeln!(out, "diagnostic: {diag}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_command_constructs_with_unit() {
        let cmd = HeaderCommand::new(100, "BP");
        assert_eq!(cmd.resolution, 100);
        assert_eq!(cmd.unit, "BP");
    }
}
