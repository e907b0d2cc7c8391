//! Batch Indexer: walks the corpus, tokenizes, filters near-duplicates,
//! and flushes bounded in-memory batches to the staging directory.
//!
//! The near-duplicate detector's fingerprint set lives as a field of
//! [`Builder`] rather than as global state (§9 design note), so a caller
//! can run several independent builds in one process without cross-talk.

use crate::error::IndexError;
use crate::index::persist;
use crate::models::{CorpusRecord, DocId, DocIdMap, Posting, PostingsMap};
use crate::search::simhash::SimHashIndex;
use crate::search::tokenization::{extract_visible_text, tokenize};
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bookkeeping returned once the full corpus walk (and trailing flush)
/// completes.
#[derive(Debug, Default)]
pub struct BuildStats {
    pub documents_indexed: u32,
    pub documents_skipped_duplicate: u32,
    pub documents_skipped_malformed: u32,
    pub batch_count: usize,
}

/// Owns the mutable state of one index build: the next docID to assign,
/// the current in-memory batch, and the near-duplicate fingerprint set.
pub struct Builder {
    batch_size: usize,
    next_doc_id: DocId,
    batch_postings: PostingsMap,
    batch_doc_ids: DocIdMap,
    simhash: SimHashIndex,
    batch_index: usize,
    staging_dir: PathBuf,
    stats: BuildStats,
}

impl Builder {
    pub fn new(staging_dir: impl Into<PathBuf>, batch_size: usize, hamming_threshold: u32) -> Self {
        Self {
            batch_size,
            next_doc_id: 0,
            batch_postings: PostingsMap::new(),
            batch_doc_ids: DocIdMap::new(),
            simhash: SimHashIndex::new(hamming_threshold),
            batch_index: 0,
            staging_dir: staging_dir.into(),
            stats: BuildStats::default(),
        }
    }

    /// Walks `corpus_dir` recursively in sorted lexicographic order,
    /// ingesting every regular file found.
    pub fn walk_corpus(&mut self, corpus_dir: &Path) -> Result<(), IndexError> {
        fs::create_dir_all(&self.staging_dir).map_err(|source| IndexError::Persist {
            path: self.staging_dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = WalkBuilder::new(corpus_dir)
            .standard_filters(false)
            .hidden(false)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        for path in paths {
            self.ingest_file(&path);
        }

        self.flush_batch()?;
        Ok(())
    }

    fn ingest_file(&mut self, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable corpus file");
                self.stats.documents_skipped_malformed += 1;
                return;
            }
        };

        let record: CorpusRecord = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed corpus file");
                self.stats.documents_skipped_malformed += 1;
                return;
            }
        };

        if record.url.is_empty() || record.content.is_empty() {
            tracing::warn!(path = %path.display(), "skipping corpus record missing url or content");
            self.stats.documents_skipped_malformed += 1;
            return;
        }

        let visible_text = extract_visible_text(&record.content);
        let tokens = tokenize(&visible_text);

        if self.simhash.is_duplicate(&tokens) {
            self.stats.documents_skipped_duplicate += 1;
            return;
        }

        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        self.batch_doc_ids.insert(doc_id, record.url);

        let mut term_freq: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *term_freq.entry(token).or_insert(0) += 1;
        }
        for (term, tf) in term_freq {
            self.batch_postings
                .entry(term)
                .or_default()
                .push(Posting::new(doc_id, tf));
        }

        self.stats.documents_indexed += 1;

        if self.batch_doc_ids.len() >= self.batch_size {
            if let Err(e) = self.flush_batch() {
                tracing::warn!(error = %e, "failed to flush batch");
            }
        }
    }

    /// Writes the current in-memory batch to the staging directory and
    /// clears it. A no-op if the batch is empty (e.g. the trailing flush
    /// after an exactly-full final batch).
    fn flush_batch(&mut self) -> Result<(), IndexError> {
        if self.batch_doc_ids.is_empty() {
            return Ok(());
        }

        let postings_path = self
            .staging_dir
            .join(format!("inverted_index_{}.json", self.batch_index));
        let docids_path = self
            .staging_dir
            .join(format!("doc_id_mapping_{}.json", self.batch_index));

        persist::write_batch_postings(&postings_path, &self.batch_postings)?;
        persist::write_batch_docid_map(&docids_path, &self.batch_doc_ids)?;

        tracing::info!(
            batch = self.batch_index,
            documents = self.batch_doc_ids.len(),
            total_indexed = self.stats.documents_indexed,
            "flushed batch"
        );

        self.batch_postings.clear();
        self.batch_doc_ids.clear();
        self.batch_index += 1;
        self.stats.batch_count = self.batch_index;

        Ok(())
    }

    pub fn into_stats(self) -> BuildStats {
        self.stats
    }
}
