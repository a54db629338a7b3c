use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sysinfo::System;

const DEFAULT_RESERVE_GIB: u64 = 2;

/// Resolves the memory budget in bytes: the user's `-m` value if given,
/// otherwise total physical memory minus a 2 GiB reserve.
pub fn resolve_memory_budget_bytes(memory_gb: Option<u64>) -> u64 {
    match memory_gb {
        Some(gb) => gb * (1 << 30),
        None => {
            let mut sys = System::new();
            sys.refresh_memory();
            let total_bytes = sys.total_memory();
            let reserve = DEFAULT_RESERVE_GIB * (1 << 30);
            total_bytes.saturating_sub(reserve)
        }
    }
}

/// Reads an entire input source into memory: a real path, or stdin when
/// `path` is `None` or `"-"`.
pub fn read_source(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match path {
        None => {
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading standard input")?;
        }
        Some(p) if p == Path::new("-") => {
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading standard input")?;
        }
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening {}", p.display()))?;
            BufReader::new(file)
                .read_to_end(&mut buf)
                .with_context(|| format!("reading {}", p.display()))?;
        }
    }
    Ok(buf)
}
