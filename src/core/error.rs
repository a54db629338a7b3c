use thiserror::Error;

/// Fatal conditions raised by the core. Every variant maps to process exit
/// code 1 at the CLI boundary; none of these are retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("degenerate base in query k-mer '{kmer}' (use -s to skip these)")]
    DegenerateBase { kmer: String },

    #[error("variant explosion at subject position {position}: {product} variants exceeds cap {cap} for k-mer '{kmer}'")]
    VariantExplosion {
        kmer: String,
        position: usize,
        product: u64,
        cap: u32,
    },

    #[error("unsupported k-mer size {k}: must be odd and in 1..={max}")]
    UnsupportedK { k: u32, max: u32 },

    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
