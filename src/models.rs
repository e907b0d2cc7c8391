//! Shared data types for the indexer and query engine.
//!
//! Both sides of the crate depend on this module so that the on-disk
//! shapes (`Posting`, `ShardKey`) and the corpus record shape
//! (`CorpusRecord`) never drift between the writer and the reader.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Dense, monotonically increasing document identifier assigned at ingest time.
pub type DocId = u32;

/// A single `(docID, tf)` pair within a term's postings list.
///
/// A tuple struct serializes via serde as a two-element JSON array
/// (`[docID, tf]`), matching the compact `{term: [[docID, tf], ...]}`
/// line format described by the filesystem layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting(pub DocId, pub u32);

impl Posting {
    pub fn new(doc_id: DocId, tf: u32) -> Self {
        Self(doc_id, tf)
    }

    pub fn doc_id(self) -> DocId {
        self.0
    }

    pub fn tf(self) -> u32 {
        self.1
    }
}

/// A corpus input record: at minimum a stable URL and raw HTML-like content.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRecord {
    pub url: String,
    pub content: String,
}

/// One shard bucket: 26 letters, `numbers`, or `special`.
///
/// Classification is by the first character of the (already-lowercased)
/// term: a-z routes to its own letter shard, a leading digit routes to
/// `numbers`, anything else routes to `special`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardKey {
    Letter(char),
    Numbers,
    Special,
}

impl ShardKey {
    /// Classify a term by its first character, per §4.4 of the spec.
    pub fn classify(term: &str) -> Self {
        match term.chars().next() {
            Some(c) if c.is_ascii_digit() => ShardKey::Numbers,
            Some(c) if c.is_ascii_alphabetic() => ShardKey::Letter(c.to_ascii_lowercase()),
            _ => ShardKey::Special,
        }
    }

    /// The basename (without directory) of this shard's file on disk.
    pub fn file_name(self) -> String {
        match self {
            ShardKey::Letter(c) => format!("{c}_inverted_index.jsonl"),
            ShardKey::Numbers => "numbers_inverted_index.jsonl".to_string(),
            ShardKey::Special => "special_inverted_index.jsonl".to_string(),
        }
    }

    /// All 28 possible shard keys, in the canonical report/offset-scan order.
    pub fn all() -> Vec<ShardKey> {
        let mut keys: Vec<ShardKey> = ('a'..='z').map(ShardKey::Letter).collect();
        keys.push(ShardKey::Numbers);
        keys.push(ShardKey::Special);
        keys
    }
}

/// In-memory accumulation of postings for a single batch, keyed by term.
/// Uses `ahash` rather than the default SipHash-backed `HashMap` since this
/// map is rebuilt and rehashed on every batch flush and merge pass.
pub type PostingsMap = AHashMap<String, Vec<Posting>>;

/// `docID -> URL`, the in-memory shape of both per-batch and merged doc maps.
pub type DocIdMap = AHashMap<DocId, String>;
