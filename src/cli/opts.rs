use clap::{value_parser, Parser};
use std::path::PathBuf;

/// k-mer coverage search: reports, for each query, which subjects it
/// covers above a configurable threshold.
#[derive(Debug, Parser)]
#[command(name = "khc", version, about)]
pub struct Cli {
    /// Subject database: FASTA (optionally gzipped) or a previously
    /// written binary index [path]
    #[clap(value_parser, help_heading = "Core")]
    pub subjects: PathBuf,

    /// Query source(s): FASTA, FASTQ, or bare base text; "-" or omitted
    /// means standard input [path ...]
    #[clap(value_parser, help_heading = "Core")]
    pub query: Vec<PathBuf>,

    /// k-mer size, must be odd (required when SUBJECTS is FASTA) [integer]
    #[clap(short = 'k', long, value_parser = value_parser!(u32).range(1..=31), help_heading = "Core")]
    pub ksize: Option<u32>,

    /// Minimum coverage percent to report a subject [float]
    #[clap(short = 'c', long, default_value = "90.0", help_heading = "Core")]
    pub min_cov_pct: f64,

    /// Maximum k-mer variants per subject window; 0 = unlimited [integer]
    #[clap(short = 'j', long = "max-variants", default_value = "1024", help_heading = "Windows")]
    pub max_variants: u32,

    /// Skip query k-mers that contain degenerate bases instead of erroring [flag]
    #[clap(short = 's', long = "skip-degenerate", help_heading = "Windows")]
    pub skip_degenerate: bool,

    /// Prefix each query's output with a "## Query: NAME" banner [flag]
    #[clap(short = 't', long = "tag-query", help_heading = "Output")]
    pub tag_query: bool,

    /// Write the built binary index to FILE [path]
    #[clap(short = 'w', long = "write-index", value_parser, help_heading = "Output")]
    pub write_index: Option<PathBuf>,

    /// Memory budget in GiB for choosing dense vs sparse index (default:
    /// physical memory minus 2 GiB) [integer]
    #[clap(short = 'm', long = "memory-gb", help_heading = "Core")]
    pub memory_gb: Option<u64>,

    /// Verbose progress on stderr [flag]
    #[clap(short = 'v', long, help_heading = "Output")]
    pub verbose: bool,
}
