use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use khc::cli::io::{read_source, resolve_memory_budget_bytes};
use khc::cli::opts::Cli;
use khc::core::database::{QueryHit, SequenceRef, TemplateDatabase};
use khc::seqio::{looks_like_binary_index, read_sequences};

fn main() {
    if let Err(e) = run() {
        eprintln!("khc: {e:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let started = Instant::now();
    let memory_budget = resolve_memory_budget_bytes(cli.memory_gb);

    let subjects_bytes = read_source(Some(&cli.subjects))?;
    let db = if looks_like_binary_index(&subjects_bytes) {
        if cli.verbose {
            eprintln!("Reading binary index from {}", cli.subjects.display());
        }
        let mut reader = BufReader::new(subjects_bytes.as_slice());
        TemplateDatabase::read_binary(&mut reader, memory_budget)
            .with_context(|| format!("reading binary index {}", cli.subjects.display()))?
    } else {
        let ksize = cli
            .ksize
            .context("-k is required when SUBJECTS is FASTA")?;
        let sequences = read_sequences(subjects_bytes.as_slice())
            .with_context(|| format!("parsing subjects {}", cli.subjects.display()))?;

        if cli.verbose {
            let estimated = khc::core::index::DenseIndex::estimated_primary_bytes(2 * ksize - 1);
            if estimated <= memory_budget {
                eprintln!(
                    "Vector memory ({} MiB) fits {} MiB: using dense index",
                    estimated >> 20,
                    memory_budget >> 20
                );
            } else {
                eprintln!(
                    "Vector memory ({} MiB) would exceed {} MiB: using sparse index",
                    estimated >> 20,
                    memory_budget >> 20
                );
            }
        }

        let progress = if cli.verbose {
            let bar = ProgressBar::new(sequences.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            Some(bar)
        } else {
            None
        };

        let refs: Vec<SequenceRef> = sequences
            .iter()
            .map(|s| SequenceRef {
                id: &s.id,
                data: &s.data,
            })
            .collect();
        if let Some(bar) = &progress {
            bar.set_message(format!("building index k={ksize}"));
        }
        let db = TemplateDatabase::build(ksize, cli.max_variants, memory_budget, refs)
            .context("building template database")?;
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        db
    };

    if let Some(out_path) = &cli.write_index {
        let file = File::create(out_path)
            .with_context(|| format!("creating {}", out_path.display()))?;
        let mut writer = BufWriter::new(file);
        db.write_binary(&mut writer)
            .with_context(|| format!("writing index to {}", out_path.display()))?;
        writer.flush()?;
    }

    let queries: Vec<Option<std::path::PathBuf>> = if cli.query.is_empty() {
        vec![None]
    } else {
        cli.query.iter().cloned().map(Some).collect()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (i, query_path) in queries.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let bytes = read_source(query_path.as_deref())?;
        let query_sequences = read_sequences(bytes.as_slice()).context("parsing query input")?;

        if cli.tag_query {
            for seq in &query_sequences {
                let name = if seq.id.is_empty() { "(anonymous)" } else { &seq.id };
                writeln!(out, "## Query: {name}")?;
            }
        }
        let refs: Vec<&[u8]> = query_sequences.iter().map(|s| s.data.as_slice()).collect();
        let hits = db
            .query_source(refs, cli.min_cov_pct, cli.skip_degenerate)
            .context("running query")?;
        write_hits(&mut out, &hits)?;
    }

    if cli.verbose {
        eprintln!("Elapsed time: {:.2?}", started.elapsed());
    }
    Ok(())
}

fn write_hits(out: &mut impl Write, hits: &[QueryHit]) -> Result<()> {
    for hit in hits {
        writeln!(out, "{} {} {} {:.3}", hit.id, hit.length, hit.hits, hit.percent)?;
    }
    Ok(())
}
