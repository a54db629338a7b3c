use std::io::{BufRead, Write};

use crate::core::codec::{IndexBinaryCodec, IndexHeader};
use crate::core::error::Error;
use crate::core::index::{pack_location, KmerIndex};
use crate::core::window::ExpandingWindow;

/// One entry in a template database: an identifier and its length in
/// k-mer positions (not bases).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub length: u32,
}

/// A single subject's query result row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub length: u32,
    pub hits: u32,
    pub percent: f64,
}

/// Owns the subject list and k-mer index for a set of reference
/// sequences; builds from FASTA-like input and answers coverage queries.
pub struct TemplateDatabase {
    ksize: u32,
    max_variants: u32,
    subjects: Vec<Subject>,
    index: KmerIndex,
}

/// One input sequence as handed to the database builder or a query.
pub struct SequenceRef<'a> {
    pub id: &'a str,
    pub data: &'a [u8],
}

impl TemplateDatabase {
    /// Builds a database from an iterator of subjects, in order. Each
    /// subject contributes one location per sequence position: variants
    /// of a degenerate window all share the same location.
    pub fn build<'a, I>(ksize: u32, max_variants: u32, memory_budget_bytes: u64, subjects: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = SequenceRef<'a>>,
    {
        let mut index = KmerIndex::for_ksize(ksize, memory_budget_bytes)?;
        let mut recorded = Vec::new();
        for (subject_index, seq) in subjects.into_iter().enumerate() {
            let length = if seq.data.len() < ksize as usize {
                0
            } else {
                (seq.data.len() - ksize as usize + 1) as u32
            };
            recorded.push(Subject {
                id: seq.id.to_string(),
                length,
            });
            if seq.data.len() < ksize as usize {
                continue;
            }
            let mut window = ExpandingWindow::new(ksize, max_variants, seq.data)?;
            let mut position: i64 = -1;
            while window.next()? {
                if window.variant() == 0 {
                    position += 1;
                }
                let loc = pack_location(subject_index as u32, position as u32);
                index.add(window.code(), loc);
            }
        }
        Ok(TemplateDatabase {
            ksize,
            max_variants,
            subjects: recorded,
            index,
        })
    }

    pub fn ksize(&self) -> u32 {
        self.ksize
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn index(&self) -> &KmerIndex {
        &self.index
    }

    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        let nbases: u64 = self
            .subjects
            .iter()
            .map(|s| s.length as u64 + self.ksize as u64 - 1)
            .sum();
        let header = IndexHeader {
            nseq: self.subjects.len() as u32,
            nbases,
            ksize: self.ksize,
            maxvars: self.max_variants,
        };
        IndexBinaryCodec::write(w, header, &self.subjects, &self.index)
    }

    pub fn read_binary<R: BufRead>(r: &mut R, memory_budget_bytes: u64) -> Result<Self, Error> {
        let (header, subjects, index) = IndexBinaryCodec::read(r, None, memory_budget_bytes)?;
        Ok(TemplateDatabase {
            ksize: header.ksize,
            max_variants: header.maxvars,
            subjects,
            index,
        })
    }

    /// Runs one query sequence against the database, returning every
    /// subject whose coverage percentage meets `min_cov_pct`, in subject
    /// order.
    pub fn query(
        &self,
        query: &[u8],
        min_cov_pct: f64,
        skip_degenerates: bool,
    ) -> Result<Vec<QueryHit>, Error> {
        self.query_source(std::iter::once(query), min_cov_pct, skip_degenerates)
    }

    /// Runs every sequence of one query source against the database in a
    /// single coverage pass, so a multi-record query source reports the
    /// union of coverage across all of its sequences rather than one
    /// result set per record.
    pub fn query_source<'q, I>(
        &self,
        queries: I,
        min_cov_pct: f64,
        skip_degenerates: bool,
    ) -> Result<Vec<QueryHit>, Error>
    where
        I: IntoIterator<Item = &'q [u8]>,
    {
        crate::core::coverage::CoverageEngine::run(self, queries, min_cov_pct, skip_degenerates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_length_counts_kmers_not_bases() {
        let db = TemplateDatabase::build(
            5,
            1024,
            1 << 30,
            vec![SequenceRef {
                id: "s1",
                data: b"ACGTACGTACG",
            }],
        )
        .unwrap();
        assert_eq!(db.subjects()[0].length, 7);
    }

    #[test]
    fn short_subject_has_zero_length_and_no_insertions() {
        let db = TemplateDatabase::build(
            5,
            1024,
            1 << 30,
            vec![SequenceRef {
                id: "short",
                data: b"ACG",
            }],
        )
        .unwrap();
        assert_eq!(db.subjects()[0].length, 0);
        assert_eq!(db.index().size(), 0);
    }

    #[test]
    fn coverage_basic_scenario() {
        let db = TemplateDatabase::build(
            5,
            1024,
            1 << 30,
            vec![SequenceRef {
                id: "s1",
                data: b"ACGTACGTACG",
            }],
        )
        .unwrap();
        let hits = db.query(b"CGTACGT", 0.0, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hits, 3);
        assert!((hits[0].percent - 100.0 * 3.0 / 7.0).abs() < 1e-9);
    }
}
