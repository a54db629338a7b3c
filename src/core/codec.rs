use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};

use crate::core::database::Subject;
use crate::core::error::Error;
use crate::core::index::{DenseIndex, KmerIndex, Location, SparseIndex};

pub const MAGIC: &str = "~khc~";

/// Parameters recorded in a persisted index's header line, checked on read
/// against what the caller expects before the body is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub nseq: u32,
    pub nbases: u64,
    pub ksize: u32,
    pub maxvars: u32,
}

/// Reads and writes a `TemplateDatabase`'s subjects and index in the
/// binary layout described by the external interface: an ASCII header and
/// subject table, followed by raw host-endian binary for the index body.
/// The format is not endian-portable; `read` checks magic and parameters
/// but not byte order.
pub struct IndexBinaryCodec;

impl IndexBinaryCodec {
    pub fn write<W: Write>(
        w: &mut W,
        header: IndexHeader,
        subjects: &[Subject],
        index: &KmerIndex,
    ) -> Result<(), Error> {
        writeln!(
            w,
            "{} nseq {} nbases {} ksize {} maxvars {}",
            MAGIC, header.nseq, header.nbases, header.ksize, header.maxvars
        )?;
        for subject in subjects {
            writeln!(w, "{} {}", subject.id, subject.length)?;
        }
        Self::write_body(w, index)
    }

    fn write_body<W: Write>(w: &mut W, index: &KmerIndex) -> Result<(), Error> {
        let secondary = match index {
            KmerIndex::Dense(d) => d.secondary(),
            KmerIndex::Sparse(s) => s.secondary(),
        };
        w.write_all(&(secondary.len() as u64).to_ne_bytes())?;
        for list in secondary {
            w.write_all(&(list.len() as u64).to_ne_bytes())?;
            for &loc in list {
                w.write_all(&loc.to_ne_bytes())?;
            }
        }
        let entries: Vec<(u64, u32)> = match index {
            KmerIndex::Dense(d) => d.entries_with_slot().map(|(code, slot, _)| (code, slot)).collect(),
            KmerIndex::Sparse(s) => s.entries_with_slot().map(|(code, slot, _)| (code, slot)).collect(),
        };
        w.write_all(&(entries.len() as u64).to_ne_bytes())?;
        for (code, slot) in entries {
            w.write_all(&code.to_ne_bytes())?;
            w.write_all(&slot.to_ne_bytes())?;
        }
        Ok(())
    }

    /// Reads a header, subject table, and index body. `expect_ksize`, when
    /// set, is checked against the header's k and produces `FormatMismatch`
    /// on a disagreement. `memory_budget_bytes` governs whether the
    /// rebuilt index is dense or sparse, exactly as at construction time.
    pub fn read<R: BufRead>(
        r: &mut R,
        expect_ksize: Option<u32>,
        memory_budget_bytes: u64,
    ) -> Result<(IndexHeader, Vec<Subject>, KmerIndex), Error> {
        let header = Self::read_header(r)?;
        if let Some(k) = expect_ksize {
            if k != header.ksize {
                return Err(Error::FormatMismatch(format!(
                    "index was built with k={} but k={} was requested",
                    header.ksize, k
                )));
            }
        }
        let mut subjects = Vec::with_capacity(header.nseq as usize);
        for _ in 0..header.nseq {
            let mut line = String::new();
            if r.read_line(&mut line)? == 0 {
                return Err(Error::FormatMismatch("truncated subject table".into()));
            }
            let mut parts = line.trim_end().rsplitn(2, ' ');
            let length: u32 = parts
                .next()
                .ok_or_else(|| Error::FormatMismatch("malformed subject line".into()))?
                .parse()
                .map_err(|_| Error::FormatMismatch("malformed subject length".into()))?;
            let id = parts
                .next()
                .ok_or_else(|| Error::FormatMismatch("malformed subject line".into()))?
                .to_string();
            subjects.push(Subject { id, length });
        }
        let width = 2 * header.ksize - 1;
        let dense = DenseIndex::estimated_primary_bytes(width) <= memory_budget_bytes;
        let index = Self::read_body(r, width, dense)?;
        Ok((header, subjects, index))
    }

    fn read_header<R: BufRead>(r: &mut R) -> Result<IndexHeader, Error> {
        let mut line = String::new();
        r.read_line(&mut line)?;
        let mut fields = line.split_whitespace();
        let magic = fields
            .next()
            .ok_or_else(|| Error::FormatMismatch("empty header".into()))?;
        if magic != MAGIC {
            return Err(Error::FormatMismatch(format!(
                "bad magic: expected {}, found {}",
                MAGIC, magic
            )));
        }
        let mut values: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();
        let rest: Vec<&str> = fields.collect();
        for pair in rest.chunks(2) {
            if let [key, value] = pair {
                values.insert(key, value);
            }
        }
        let parse = |key: &str| -> Result<u64, Error> {
            values
                .get(key)
                .ok_or_else(|| Error::FormatMismatch(format!("missing header field {key}")))?
                .parse()
                .map_err(|_| Error::FormatMismatch(format!("malformed header field {key}")))
        };
        Ok(IndexHeader {
            nseq: parse("nseq")? as u32,
            nbases: parse("nbases")?,
            ksize: parse("ksize")? as u32,
            maxvars: parse("maxvars")? as u32,
        })
    }

    fn read_body<R: Read>(r: &mut R, width: u32, dense: bool) -> Result<KmerIndex, Error> {
        let nsecondary = read_u64(r)? as usize;
        let mut secondary = Vec::with_capacity(nsecondary);
        for _ in 0..nsecondary {
            let nlocs = read_u64(r)? as usize;
            let mut list = Vec::with_capacity(nlocs);
            for _ in 0..nlocs {
                list.push(read_u64(r)?);
            }
            secondary.push(list);
        }
        let nentries = read_u64(r)?;
        if dense {
            let mut primary = vec![0u32; 1usize << width];
            for _ in 0..nentries {
                let code = read_u64(r)?;
                let slot = read_u32(r)?;
                primary[code as usize] = slot;
            }
            Ok(KmerIndex::Dense(DenseIndex::from_parts(width, primary, secondary)))
        } else {
            let mut primary: BTreeMap<u64, u32> = BTreeMap::new();
            for _ in 0..nentries {
                let code = read_u64(r)?;
                let slot = read_u32(r)?;
                primary.insert(code, slot);
            }
            Ok(KmerIndex::Sparse(SparseIndex::from_parts(primary, secondary)))
        }
    }
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, Error> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}
