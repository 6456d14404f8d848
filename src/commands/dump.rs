//! `hic dump`: dump pixels over a query rectangle as
//! COO or BG2 text to a writer, going through the `to_dataframe`
//! transformer exactly as a library caller would rather than
//! reimplementing pixel formatting here.

use crate::error::Result;
use crate::file::{HicFile, QuerySyntax};
use crate::normalization::Normalization;
use crate::pixel::MatrixType;
use crate::transformers::{to_dataframe, Span};
use std::io::{self, Write};
use std::path::Path;

/// Output schema for `hic dump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Three-column `bin1_id  bin2_id  count`.
    Coo,
    /// Seven-column `chrom1 start1 end1 chrom2 start2 end2 count`.
    Bg2,
}

pub struct DumpCommand {
    pub resolution: i32,
    pub unit: String,
    pub normalization: Normalization,
    pub matrix_type: MatrixType,
    pub span: Span,
    pub format: OutputFormat,
}

impl DumpCommand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolution: i32,
        unit: impl Into<String>,
        normalization: Normalization,
        matrix_type: MatrixType,
        span: Span,
        format: OutputFormat,
    ) -> Self {
        Self {
            resolution,
            unit: unit.into(),
            normalization,
            matrix_type,
            span,
            format,
        }
    }

    /// Fetch `range1` (and, if intra a different region, `range2`) from
    /// `path` and write the resulting pixel stream to `out`.
    pub fn run(
        &self,
        path: impl AsRef<Path>,
        range1: &str,
        range2: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut file = HicFile::open(path, self.resolution, self.unit.clone(), None)?;

        let selector = match range2 {
            None => file.fetch_query(range1, QuerySyntax::Ucsc, self.normalization, self.matrix_type)?,
            Some(range2) => {
                let first = crate::genomic_interval::parse_ucsc(file.reference(), range1)?;
                let second = crate::genomic_interval::parse_ucsc(file.reference(), range2)?;
                file.fetch_pair(&first, &second, self.normalization, self.matrix_type)?
            }
        };

        match self.format {
            OutputFormat::Coo => {
                let df = to_dataframe::to_coo::<_, f64>(selector.sorted_iter::<f64>(), self.span)?;
                write_coo(out, &df)?;
            }
            OutputFormat::Bg2 => {
                let df = to_dataframe::to_bg2::<_, f64>(
                    selector.sorted_iter::<f64>(),
                    file.bin_table(),
                    file.bin_table(),
                    self.span,
                    false,
                )?;
                write_bg2(out, &df, file.reference())?;
            }
        }
        Ok(())
    }
}

fn write_coo(out: &mut dyn Write, df: &to_dataframe::CooDataFrame<f64>) -> io::Result<()> {
    let mut int_buf = itoa::Buffer::new();
    let mut float_buf = ryu::Buffer::new();
    for i in 0..df.len() {
        out.write_all(int_buf.format(df.bin1_id[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(int_buf.format(df.bin2_id[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(float_buf.format(df.count[i]).as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_bg2(
    out: &mut dyn Write,
    df: &to_dataframe::Bg2DataFrame<f64>,
    reference: &crate::reference::Reference,
) -> io::Result<()> {
    let mut int_buf = itoa::Buffer::new();
    let mut float_buf = ryu::Buffer::new();
    for i in 0..df.len() {
        let name1 = reference.get(df.chrom1[i]).map(|c| c.name()).unwrap_or("?");
        let name2 = reference.get(df.chrom2[i]).map(|c| c.name()).unwrap_or("?");
        out.write_all(name1.as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(int_buf.format(df.start1[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(int_buf.format(df.end1[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(name2.as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(int_buf.format(df.start2[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(int_buf.format(df.end2[i]).as_bytes())?;
        out.write_all(b"\t")?;
        out.write_all(float_buf.format(df.count[i]).as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ThinPixel;

    #[test]
    fn coo_text_is_tab_separated() {
        let df = to_dataframe::to_coo::<_, f64>(
            vec![Ok(ThinPixel::new(0u64, 1u64, 5.0f64))].into_iter(),
            Span::Upper,
        )
        .unwrap();
        let mut buf = Vec::new();
        write_coo(&mut buf, &df).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0\t1\t5.0\n");
    }
}
