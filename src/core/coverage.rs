use crate::core::database::{QueryHit, TemplateDatabase};
use crate::core::error::Error;
use crate::core::index::unpack_location;
use crate::core::window::StrictWindow;

/// Per-query-source coverage state: one bit-vector per subject, filled in
/// as k-mers from every sequence of the query source are looked up and
/// translated into subject locations. All sequences of one source share a
/// single pass, so coverage is the union across the whole source, not
/// per-record.
pub struct CoverageEngine;

impl CoverageEngine {
    /// Runs every sequence in `queries` through one shared coverage pass
    /// and reports, for each subject meeting `min_cov_pct`, its aggregate
    /// hit count across all of them.
    pub fn run<'q, I>(
        db: &TemplateDatabase,
        queries: I,
        min_cov_pct: f64,
        skip_degenerates: bool,
    ) -> Result<Vec<QueryHit>, Error>
    where
        I: IntoIterator<Item = &'q [u8]>,
    {
        let mut bits: Vec<Vec<u8>> = db.subjects().iter().map(|s| vec![0u8; s.length as usize]).collect();

        for query in queries {
            let mut window = StrictWindow::new(db.ksize(), skip_degenerates, query)?;
            while window.next() {
                let code = window.code()?;
                for &loc in db.index().get(code) {
                    let (subject_index, position) = unpack_location(loc);
                    if let Some(vector) = bits.get_mut(subject_index as usize) {
                        if let Some(cell) = vector.get_mut(position as usize) {
                            *cell = 1;
                        }
                    }
                }
            }
        }

        let mut results = Vec::new();
        for (subject, vector) in db.subjects().iter().zip(bits.iter()) {
            let hits: u32 = vector.iter().map(|&b| b as u32).sum();
            let percent = if subject.length == 0 {
                0.0
            } else {
                100.0 * hits as f64 / subject.length as f64
            };
            if percent >= min_cov_pct {
                results.push(QueryHit {
                    id: subject.id.clone(),
                    length: subject.length,
                    hits,
                    percent,
                });
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::{SequenceRef, TemplateDatabase};

    #[test]
    fn empty_query_yields_zero_hits_for_every_subject() {
        let db = TemplateDatabase::build(
            3,
            1024,
            1 << 30,
            vec![SequenceRef {
                id: "s1",
                data: b"ACGTACG",
            }],
        )
        .unwrap();
        let hits = db.query(b"", 0.0, false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hits, 0);
        assert_eq!(hits[0].percent, 0.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let db = TemplateDatabase::build(
            3,
            1024,
            1 << 30,
            vec![SequenceRef {
                id: "s1",
                data: b"ACGTACG",
            }],
        )
        .unwrap();
        let full = db.query(b"ACGTACG", 0.0, false).unwrap();
        let pct = full[0].percent;
        let at_threshold = db.query(b"ACGTACG", pct, false).unwrap();
        assert_eq!(at_threshold.len(), 1);
        let above = db.query(b"ACGTACG", pct + 0.001, false).unwrap();
        assert!(above.is_empty());
    }
}
