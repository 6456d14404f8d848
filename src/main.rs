// Clippy allows
#![allow(clippy::too_many_arguments)]

//! `hic`: a thin CLI over `grit_hic`'s query surface.
//!
//! Usage: hic <COMMAND> [OPTIONS]
//!
//! Library code never prints; this binary is the only place in the crate
//! that writes to stdout/stderr.

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process;

use grit_hic::commands::{CoarsenCommand, DumpCommand, HeaderCommand, MergeCommand, WeightsCommand};
use grit_hic::normalization::Normalization;
use grit_hic::pixel::MatrixType;
use grit_hic::transformers::Span;

#[derive(Parser)]
#[command(name = "hic")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "Random-access reader for block-compressed Hi-C contact matrix files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MatrixTypeArg {
    Observed,
    Expected,
    Oe,
}

impl From<MatrixTypeArg> for MatrixType {
    fn from(v: MatrixTypeArg) -> Self {
        match v {
            MatrixTypeArg::Observed => MatrixType::Observed,
            MatrixTypeArg::Expected => MatrixType::Expected,
            MatrixTypeArg::Oe => MatrixType::Oe,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpanArg {
    Upper,
    Lower,
    Full,
}

impl From<SpanArg> for Span {
    fn from(v: SpanArg) -> Self {
        match v {
            SpanArg::Upper => Span::Upper,
            SpanArg::Lower => Span::Lower,
            SpanArg::Full => Span::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Coo,
    #[value(name = "bg2")]
    Bg2,
}

impl From<OutputFormatArg> for grit_hic::commands::dump::OutputFormat {
    fn from(v: OutputFormatArg) -> Self {
        match v {
            OutputFormatArg::Coo => grit_hic::commands::dump::OutputFormat::Coo,
            OutputFormatArg::Bg2 => grit_hic::commands::dump::OutputFormat::Bg2,
        }
    }
}

fn parse_normalization(s: &str) -> Result<Normalization, String> {
    Normalization::parse(&s.to_ascii_uppercase())
        .ok_or_else(|| format!("unknown normalization method \"{s}\""))
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, genome id, resolutions, and chromosomes.
    Header {
        /// Path to the .hic file.
        file: PathBuf,

        /// Resolution (bp) to open the file at.
        #[arg(short, long)]
        resolution: i32,

        /// Bin unit: BP or FRAG.
        #[arg(long, default_value = "BP")]
        unit: String,
    },

    /// Dump pixels over a query rectangle as COO or BG2 text.
    Dump {
        /// Path to the .hic file.
        file: PathBuf,

        /// First range, UCSC syntax (e.g. chr1:0-1,000,000).
        range1: String,

        /// Second range, UCSC syntax; defaults to `range1` (cis query).
        range2: Option<String>,

        #[arg(short, long)]
        resolution: i32,

        #[arg(long, default_value = "BP")]
        unit: String,

        #[arg(short, long, value_parser = parse_normalization, default_value = "NONE")]
        normalization: Normalization,

        #[arg(long, value_enum, default_value = "observed")]
        matrix_type: MatrixTypeArg,

        #[arg(long, value_enum, default_value = "upper")]
        span: SpanArg,

        #[arg(long, value_enum, default_value = "coo")]
        format: OutputFormatArg,
    },

    /// Print a chromosome's normalization weight vector.
    Weights {
        /// Path to the .hic file.
        file: PathBuf,

        /// Chromosome to report, UCSC syntax (e.g. chr1).
        chrom: String,

        #[arg(short, long)]
        resolution: i32,

        #[arg(long, default_value = "BP")]
        unit: String,

        #[arg(short, long, value_parser = parse_normalization)]
        normalization: Normalization,
    },

    /// K-way merge the whole-genome pixel streams of multiple files at
    /// one resolution into a single summed COO stream.
    Merge {
        /// Where to write the merged COO text.
        out: PathBuf,

        /// Input .hic files to merge.
        #[arg(required = true)]
        input: Vec<PathBuf>,

        #[arg(short, long)]
        resolution: i32,

        #[arg(long, default_value = "BP")]
        unit: String,
    },

    /// Coarsen a file's whole-genome pixel stream by an integer factor.
    Coarsen {
        /// Input .hic file.
        input: PathBuf,

        /// Where to write the coarsened COO text.
        out: PathBuf,

        #[arg(short, long)]
        resolution: i32,

        #[arg(long, default_value = "BP")]
        unit: String,

        /// Coarsening factor (bins are grouped `factor`-wide).
        #[arg(short, long)]
        factor: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Header { file, resolution, unit } => {
            run_header(file, resolution, unit)
        }
        Commands::Dump {
            file,
            range1,
            range2,
            resolution,
            unit,
            normalization,
            matrix_type,
            span,
            format,
        } => run_dump(
            file,
            range1,
            range2,
            resolution,
            unit,
            normalization,
            matrix_type.into(),
            span.into(),
            format.into(),
        ),
        Commands::Weights {
            file,
            chrom,
            resolution,
            unit,
            normalization,
        } => run_weights(file, chrom, resolution, unit, normalization),
        Commands::Merge {
            out,
            input,
            resolution,
            unit,
        } => run_merge(out, input, resolution, unit),
        Commands::Coarsen {
            input,
            out,
            resolution,
            unit,
            factor,
        } => run_coarsen(input, out, resolution, unit, factor),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run_header(file: PathBuf, resolution: i32, unit: String) -> grit_hic::error::Result<()> {
    let cmd = HeaderCommand::new(resolution, unit);
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    cmd.run(file, &mut lock)
}

fn run_dump(
    file: PathBuf,
    range1: String,
    range2: Option<String>,
    resolution: i32,
    unit: String,
    normalization: Normalization,
    matrix_type: MatrixType,
    span: Span,
    format: grit_hic::commands::dump::OutputFormat,
) -> grit_hic::error::Result<()> {
    let cmd = DumpCommand::new(resolution, unit, normalization, matrix_type, span, format);
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    cmd.run(file, &range1, range2.as_deref(), &mut lock)
}

fn run_weights(
    file: PathBuf,
    chrom: String,
    resolution: i32,
    unit: String,
    normalization: Normalization,
) -> grit_hic::error::Result<()> {
    let cmd = WeightsCommand::new(resolution, unit, normalization);
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    cmd.run(file, &chrom, &mut lock)
}

fn run_merge(
    out: PathBuf,
    input: Vec<PathBuf>,
    resolution: i32,
    unit: String,
) -> grit_hic::error::Result<()> {
    let cmd = MergeCommand::new(resolution, unit);
    let mut out_file = std::fs::File::create(&out)?;
    let n = input.len();
    cmd.run(&input, &mut out_file)?;
    eprintln!("merged {n} file(s) into {}", out.display());
    Ok(())
}

fn run_coarsen(
    input: PathBuf,
    out: PathBuf,
    resolution: i32,
    unit: String,
    factor: u64,
) -> grit_hic::error::Result<()> {
    let cmd = CoarsenCommand::new(resolution, unit, factor);
    let mut out_file = std::fs::File::create(&out)?;
    cmd.run(&input, &mut out_file)?;
    eprintln!("coarsened {} by {factor}x into {}", input.display(), out.display());
    Ok(())
}
