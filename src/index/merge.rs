//! Shard Merger: consolidates staged batch files into the final,
//! first-character-bucketed shard files, and merges the per-batch docID
//! maps into one consolidated map.

use crate::error::IndexError;
use crate::index::{docid_map, persist};
use crate::models::{DocIdMap, PostingsMap, ShardKey};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Merges every staged `inverted_index_N.json` / `doc_id_mapping_N.json`
/// pair (in ascending batch order) into the final shard files and
/// `merged_docIDs.json` under `index_dir`, deleting each batch file once
/// it has been merged in.
pub fn merge_batches(
    staging_dir: &Path,
    index_dir: &Path,
    batch_count: usize,
) -> Result<(), IndexError> {
    fs::create_dir_all(index_dir).map_err(|source| IndexError::Persist {
        path: index_dir.to_path_buf(),
        source,
    })?;

    let mut merged_doc_ids = DocIdMap::new();

    for batch_index in 0..batch_count {
        let postings_path = staging_dir.join(format!("inverted_index_{batch_index}.json"));
        let docids_path = staging_dir.join(format!("doc_id_mapping_{batch_index}.json"));

        let batch_postings = persist::read_batch_postings(&postings_path).map_err(|source| {
            IndexError::Persist {
                path: postings_path.clone(),
                source,
            }
        })?;
        let batch_doc_ids = persist::read_batch_docid_map(&docids_path).map_err(|source| {
            IndexError::Persist {
                path: docids_path.clone(),
                source,
            }
        })?;

        merge_one_batch_into_shards(index_dir, &batch_postings)?;
        docid_map::merge_into(&mut merged_doc_ids, batch_doc_ids);

        fs::remove_file(&postings_path).map_err(|source| IndexError::Persist {
            path: postings_path,
            source,
        })?;
        fs::remove_file(&docids_path).map_err(|source| IndexError::Persist {
            path: docids_path,
            source,
        })?;

        tracing::info!(batch = batch_index, "merged batch into shards");
    }

    let merged_path = index_dir.join("merged_docIDs.json");
    docid_map::save(&merged_path, &merged_doc_ids)?;

    Ok(())
}

/// Buckets one batch's postings by first-character class and append-merges
/// each bucket into its on-disk shard.
fn merge_one_batch_into_shards(
    index_dir: &Path,
    batch_postings: &PostingsMap,
) -> Result<(), IndexError> {
    let mut buckets: HashMap<ShardKey, PostingsMap> = HashMap::new();

    for (term, postings) in batch_postings {
        let key = ShardKey::classify(term);
        buckets
            .entry(key)
            .or_default()
            .insert(term.clone(), postings.clone());
    }

    for (key, bucket) in buckets {
        let shard_path = persist::shard_path(index_dir, key);
        persist::merge_batch_into_shard(&shard_path, &bucket)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::persist;
    use crate::models::Posting;
    use tempfile::tempdir;

    #[test]
    fn merges_two_batches_concatenating_postings() {
        let staging = tempdir().unwrap();
        let index_dir = tempdir().unwrap();

        let mut batch0_postings = PostingsMap::new();
        batch0_postings.insert("fox".to_string(), vec![Posting::new(0, 1)]);
        let mut batch0_docs = DocIdMap::new();
        batch0_docs.insert(0, "http://a".to_string());

        let mut batch1_postings = PostingsMap::new();
        batch1_postings.insert("fox".to_string(), vec![Posting::new(1, 3)]);
        let mut batch1_docs = DocIdMap::new();
        batch1_docs.insert(1, "http://b".to_string());

        persist::write_batch_postings(
            &staging.path().join("inverted_index_0.json"),
            &batch0_postings,
        )
        .unwrap();
        persist::write_batch_docid_map(&staging.path().join("doc_id_mapping_0.json"), &batch0_docs)
            .unwrap();
        persist::write_batch_postings(
            &staging.path().join("inverted_index_1.json"),
            &batch1_postings,
        )
        .unwrap();
        persist::write_batch_docid_map(&staging.path().join("doc_id_mapping_1.json"), &batch1_docs)
            .unwrap();

        merge_batches(staging.path(), index_dir.path(), 2).unwrap();

        let shard = persist::read_shard_into_map(&index_dir.path().join("f_inverted_index.jsonl"))
            .unwrap();
        let postings = &shard["fox"];
        assert_eq!(postings.len(), 2);
        assert!(postings.contains(&Posting::new(0, 1)));
        assert!(postings.contains(&Posting::new(1, 3)));

        assert!(!staging.path().join("inverted_index_0.json").exists());
        assert!(index_dir.path().join("merged_docIDs.json").exists());
    }

    #[test]
    fn routes_terms_to_expected_buckets() {
        assert_eq!(ShardKey::classify("fox"), ShardKey::Letter('f'));
        assert_eq!(ShardKey::classify("123abc"), ShardKey::Numbers);
        assert_eq!(ShardKey::classify("'quoted"), ShardKey::Special);
    }
}
