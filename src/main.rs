use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

mod cli;

use cli::{Args, Command};
use scrye::config::get_config;
use scrye::index::persist;
use scrye::{build_index, QueryEngine};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&get_config().log_level))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Index {
            corpus_dir,
            index_dir,
        } => run_index(corpus_dir, resolve_index_dir(index_dir)),
        Command::Query { index_dir, k } => run_query_repl(
            resolve_index_dir(index_dir),
            k.unwrap_or_else(|| get_config().default_k),
        ),
    }
}

fn resolve_index_dir(index_dir: Option<PathBuf>) -> PathBuf {
    index_dir.unwrap_or_else(|| get_config().default_index_dir.clone())
}

fn run_index(corpus_dir: PathBuf, index_dir: PathBuf) -> Result<()> {
    let stats = build_index(&corpus_dir, &index_dir)
        .with_context(|| format!("failed to build index at {}", index_dir.display()))?;

    println!(
        "Indexed {} documents ({} duplicates skipped, {} malformed skipped) across {} batches.",
        stats.documents_indexed,
        stats.documents_skipped_duplicate,
        stats.documents_skipped_malformed,
        stats.batch_count
    );
    Ok(())
}

fn run_query_repl(index_dir: PathBuf, k: usize) -> Result<()> {
    let engine = QueryEngine::load(&index_dir)
        .with_context(|| format!("failed to load index at {}", index_dir.display()))?;
    let query_log_path = index_dir.join("query_log.txt");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("query> ");
        stdout.flush()?;

        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() || query == ":q" {
            break;
        }

        let started = Instant::now();
        let results = engine.search(query, k);
        let elapsed_ms = started.elapsed().as_millis();

        if results.is_empty() {
            println!("No results found.");
        } else {
            for (rank, url) in results.iter().enumerate() {
                match url {
                    Some(url) => println!("{}. {}", rank + 1, url),
                    None => println!("{}. <missing docID>", rank + 1),
                }
            }
        }

        let urls = results
            .iter()
            .map(|u| u.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",");
        let log_line = format!("{query}\t{urls}\t{elapsed_ms}");
        if let Err(e) = persist::append_query_log(&query_log_path, &log_line) {
            tracing::warn!(error = %e, "failed to append to query log");
        }
    }

    Ok(())
}
