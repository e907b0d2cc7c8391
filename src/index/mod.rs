//! The Indexer subsystem: batch indexing, shard merging, offset-index
//! building, the docID mapping store, and the persistence layer they all
//! share.

pub mod builder;
pub mod docid_map;
pub mod merge;
pub mod offsets;
pub mod persist;
pub mod report;

pub use builder::{BuildStats, Builder};

use crate::config::get_config;
use crate::error::IndexError;
use std::fs;
use std::path::Path;

/// One-shot, blocking build: walks `corpus_dir`, produces the shard files,
/// offset map, docID map, and report under `index_dir`.
///
/// Staging files live in `index_dir/.staging` and are removed as each
/// batch is merged; the directory is cleared up front so a staging
/// directory left behind by a previous aborted build can never be
/// re-merged into the new one.
pub fn build_index(corpus_dir: &Path, index_dir: &Path) -> Result<BuildStats, IndexError> {
    let config = get_config();
    let staging_dir = index_dir.join(".staging");

    if staging_dir.exists() {
        fs::remove_dir_all(&staging_dir).map_err(|source| IndexError::Persist {
            path: staging_dir.clone(),
            source,
        })?;
    }
    fs::create_dir_all(index_dir).map_err(|source| IndexError::Persist {
        path: index_dir.to_path_buf(),
        source,
    })?;

    let mut builder = Builder::new(&staging_dir, config.batch_size, config.hamming_threshold);
    builder.walk_corpus(corpus_dir)?;
    let stats = builder.into_stats();

    merge::merge_batches(&staging_dir, index_dir, stats.batch_count)?;
    offsets::build_offset_index(index_dir)?;
    report::write_report(index_dir, stats.documents_indexed)?;

    fs::remove_dir_all(&staging_dir).map_err(|source| IndexError::Persist {
        path: staging_dir,
        source,
    })?;

    tracing::info!(
        documents = stats.documents_indexed,
        duplicates_skipped = stats.documents_skipped_duplicate,
        malformed_skipped = stats.documents_skipped_malformed,
        "index build complete"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_record(dir: &Path, name: &str, url: &str, content: &str) {
        let record = serde_json::json!({ "url": url, "content": content });
        fs::write(dir.join(name), record.to_string()).unwrap();
    }

    #[test]
    fn end_to_end_build_produces_expected_files() {
        let corpus = tempdir().unwrap();
        let index_dir = tempdir().unwrap();

        write_record(corpus.path(), "d0.json", "http://d0", "<p>the quick brown fox</p>");
        write_record(corpus.path(), "d1.json", "http://d1", "<p>lazy dog sleeps</p>");

        let stats = build_index(corpus.path(), index_dir.path()).unwrap();
        assert_eq!(stats.documents_indexed, 2);

        assert!(index_dir.path().join("merged_docIDs.json").exists());
        assert!(index_dir.path().join("index_offsets.json").exists());
        assert!(index_dir.path().join("report.txt").exists());
        assert!(index_dir.path().join("f_inverted_index.jsonl").exists());
        assert!(!index_dir.path().join(".staging").exists());
    }
}
