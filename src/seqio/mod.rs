//! Sequence reading: FASTA, FASTQ, and bare base text, with transparent
//! gzip decompression. This is the "external collaborator" the core
//! leaves unspecified; it hands the core plain `id`/`data` pairs.

use std::io::Read;

use flate2::read::GzDecoder;
use needletail::Sequence as _;

use crate::core::error::Error;

/// A single sequence read from a subject or query source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Full header line, including the leading `>` or `@`. Empty for bare
    /// input.
    pub header: String,
    /// The part of the header between the marker and the first
    /// whitespace; `"(anonymous)"` for bare input.
    pub id: String,
    /// Sequence data collated into a single byte string.
    pub data: Vec<u8>,
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn ungzip_if_needed(bytes: Vec<u8>) -> Result<Vec<u8>, Error> {
    if bytes.len() >= 2 && bytes[0..2] == GZIP_MAGIC {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    } else {
        Ok(bytes)
    }
}

fn first_non_whitespace(bytes: &[u8]) -> Option<u8> {
    bytes.iter().copied().find(|b| !b.is_ascii_whitespace())
}

/// Reads every sequence out of `reader`, autodetecting FASTA (`>`), FASTQ
/// (`@`), or bare base text (anything else), after transparently
/// decompressing gzip input.
pub fn read_sequences<R: Read>(mut reader: R) -> Result<Vec<Sequence>, Error> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let bytes = ungzip_if_needed(raw)?;

    match first_non_whitespace(&bytes) {
        None => Ok(Vec::new()),
        Some(marker @ (b'>' | b'@')) => read_fastx(&bytes, marker as char),
        Some(_) => Ok(vec![read_bare(&bytes)]),
    }
}

fn read_bare(bytes: &[u8]) -> Sequence {
    let data: Vec<u8> = bytes.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    Sequence {
        header: String::new(),
        id: "(anonymous)".to_string(),
        data,
    }
}

fn read_fastx(bytes: &[u8], marker: char) -> Result<Vec<Sequence>, Error> {
    let mut reader = needletail::parse_fastx_reader(bytes)
        .map_err(|e| Error::Parse(format!("failed to parse sequence input: {e}")))?;
    let mut out = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| Error::Parse(format!("malformed record: {e}")))?;
        let header = String::from_utf8_lossy(record.id()).into_owned();
        let id = header.split_whitespace().next().unwrap_or("").to_string();
        out.push(Sequence {
            header: format!("{marker}{header}"),
            id,
            data: record.sequence().into_owned(),
        });
    }
    Ok(out)
}

/// Detects whether a subject source is a previously-persisted binary
/// index (`~`) rather than FASTA/FASTQ/bare text.
pub fn looks_like_binary_index(bytes: &[u8]) -> bool {
    first_non_whitespace(bytes) == Some(b'~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn detects_bare_sequence() {
        let seqs = read_sequences(Cursor::new(b"ACGT\nACGT\n".to_vec())).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].id, "(anonymous)");
        assert_eq!(seqs[0].data, b"ACGTACGT");
    }

    #[test]
    fn parses_fasta_multi_record() {
        let input = b">s1 desc one\nACGT\nACGT\n>s2\nTTTT\n".to_vec();
        let seqs = read_sequences(Cursor::new(input)).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].id, "s1");
        assert_eq!(seqs[0].data, b"ACGTACGT");
        assert_eq!(seqs[1].id, "s2");
        assert_eq!(seqs[1].data, b"TTTT");
    }

    #[test]
    fn parses_fastq() {
        let input = b"@r1\nACGT\n+\nIIII\n".to_vec();
        let seqs = read_sequences(Cursor::new(input)).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].id, "r1");
        assert_eq!(seqs[0].data, b"ACGT");
    }

    #[test]
    fn empty_input_yields_no_sequences() {
        let seqs = read_sequences(Cursor::new(Vec::new())).unwrap();
        assert!(seqs.is_empty());
    }

    #[test]
    fn binary_sniff_detects_tilde_marker() {
        assert!(looks_like_binary_index(b"~khc~ nseq 1"));
        assert!(!looks_like_binary_index(b">fasta"));
    }
}
