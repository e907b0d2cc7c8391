//! Query Engine: loads the offset map and docID map once, then answers
//! `search` calls by seeking directly into shard files for the postings
//! of each distinct query term and ranking candidates by TF-IDF cosine
//! similarity.

use crate::error::QueryError;
use crate::index::persist;
use crate::models::{DocId, DocIdMap, ShardKey};
use crate::search::tokenization::tokenize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only, precomputed state loaded once per process. Holds no open
/// file handles, so it is `Send + Sync` and safe to share across threads
/// that each run independent queries (§5: "safe to execute multiple
/// queries in parallel provided file handles are not shared").
pub struct QueryEngine {
    index_dir: PathBuf,
    offsets: HashMap<String, u64>,
    docid_to_url: DocIdMap,
    n: usize,
}

impl QueryEngine {
    /// Loads `index_offsets.json` and `merged_docIDs.json` from `index_dir`.
    /// Either file missing or malformed is fatal, per the error policy table.
    pub fn load(index_dir: &Path) -> Result<Self, QueryError> {
        let offsets_path = index_dir.join("index_offsets.json");
        let offsets = persist::read_offsets(&offsets_path).map_err(|source| {
            QueryError::FatalStartup {
                path: offsets_path.clone(),
                source,
            }
        })?;

        let docid_map_path = index_dir.join("merged_docIDs.json");
        let docid_to_url = persist::read_docid_map(&docid_map_path).map_err(|source| {
            QueryError::FatalStartup {
                path: docid_map_path.clone(),
                source,
            }
        })?;

        let n = docid_to_url.len();
        Ok(Self {
            index_dir: index_dir.to_path_buf(),
            offsets,
            docid_to_url,
            n,
        })
    }

    /// Tokenizes `query`, loads only the postings lists it needs via
    /// offset-seek, scores candidates by TF-IDF cosine similarity, and
    /// returns the top `k` URLs (`None` for a docID absent from the map —
    /// should not occur under the indexer's invariants, but modeled
    /// honestly rather than panicking).
    pub fn search(&self, query: &str, k: usize) -> Vec<Option<String>> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut query_tf: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *query_tf.entry(token.clone()).or_insert(0) += 1;
        }

        let postings_cache = self.load_postings(query_tf.keys());
        if postings_cache.is_empty() {
            return Vec::new();
        }

        let mut q_weight: HashMap<&str, f64> = HashMap::new();
        for (term, postings) in &postings_cache {
            let df = postings.len() as f64;
            let idf = (self.n as f64 / df).ln();
            let tf = query_tf[term] as f64;
            q_weight.insert(term.as_str(), (1.0 + tf.ln()) * idf);
        }

        let mut doc_vecs: HashMap<DocId, HashMap<&str, f64>> = HashMap::new();
        for (term, postings) in &postings_cache {
            let df = postings.len() as f64;
            let idf = (self.n as f64 / df).ln();
            for posting in postings {
                let weight = (1.0 + (posting.tf() as f64).ln()) * idf;
                doc_vecs
                    .entry(posting.doc_id())
                    .or_default()
                    .insert(term.as_str(), weight);
            }
        }

        let mut scored: Vec<(DocId, f64)> = doc_vecs
            .into_iter()
            .map(|(doc_id, vec)| (doc_id, cosine_similarity(&q_weight, &vec)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(doc_id, _)| self.docid_to_url.get(&doc_id).cloned())
            .collect()
    }

    fn load_postings<'a>(
        &self,
        terms: impl Iterator<Item = &'a String>,
    ) -> HashMap<String, Vec<crate::models::Posting>> {
        let mut cache = HashMap::new();
        for term in terms {
            let Some(&offset) = self.offsets.get(term) else {
                continue;
            };
            let shard_key = ShardKey::classify(term);
            let shard_path = persist::shard_path(&self.index_dir, shard_key);
            match persist::read_postings_at_offset(&shard_path, offset) {
                Some(postings) => {
                    cache.insert(term.clone(), postings);
                }
                None => {
                    tracing::warn!(term, offset, "failed to read postings at offset, skipping term");
                }
            }
        }
        cache
    }
}

fn cosine_similarity(query: &HashMap<&str, f64>, doc: &HashMap<&str, f64>) -> f64 {
    let mut dot = 0.0;
    for (term, q_weight) in query {
        if let Some(d_weight) = doc.get(term) {
            dot += q_weight * d_weight;
        }
    }

    let query_norm: f64 = query.values().map(|w| w * w).sum::<f64>().sqrt();
    let doc_norm: f64 = doc.values().map(|w| w * w).sum::<f64>().sqrt();

    if query_norm == 0.0 || doc_norm == 0.0 {
        0.0
    } else {
        dot / (query_norm * doc_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{docid_map, persist};
    use crate::models::{Posting, PostingsMap};
    use tempfile::tempdir;

    fn build_tiny_index(dir: &Path) {
        let mut postings = PostingsMap::new();
        postings.insert("cat".to_string(), vec![Posting::new(0, 3), Posting::new(1, 1)]);
        postings.insert("dog".to_string(), vec![Posting::new(0, 1), Posting::new(1, 3)]);

        let mut buckets: HashMap<ShardKey, PostingsMap> = HashMap::new();
        for (term, p) in postings {
            buckets.entry(ShardKey::classify(&term)).or_default().insert(term, p);
        }
        for (key, bucket) in buckets {
            persist::merge_batch_into_shard(&persist::shard_path(dir, key), &bucket).unwrap();
        }

        let mut doc_ids = DocIdMap::new();
        doc_ids.insert(0, "http://cats-cats-cats".to_string());
        doc_ids.insert(1, "http://dogs-dogs-dogs".to_string());
        docid_map::save(&dir.join("merged_docIDs.json"), &doc_ids).unwrap();

        let offsets = crate::index::offsets::build_offset_index(dir).unwrap();
        assert!(offsets.contains_key("cat"));
    }

    #[test]
    fn ranks_the_document_with_higher_term_frequency_first() {
        let dir = tempdir().unwrap();
        build_tiny_index(dir.path());

        let engine = QueryEngine::load(dir.path()).unwrap();
        let results = engine.search("cat", 5);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_deref(), Some("http://cats-cats-cats"));
        assert_eq!(results[1].as_deref(), Some("http://dogs-dogs-dogs"));
    }

    #[test]
    fn empty_query_returns_no_results() {
        let dir = tempdir().unwrap();
        build_tiny_index(dir.path());

        let engine = QueryEngine::load(dir.path()).unwrap();
        assert!(engine.search("   ...   ", 5).is_empty());
    }

    #[test]
    fn unknown_term_returns_no_results() {
        let dir = tempdir().unwrap();
        build_tiny_index(dir.path());

        let engine = QueryEngine::load(dir.path()).unwrap();
        assert!(engine.search("zzyzx", 5).is_empty());
    }

    #[test]
    fn missing_index_files_are_a_fatal_startup_error() {
        let dir = tempdir().unwrap();
        assert!(QueryEngine::load(dir.path()).is_err());
    }
}
