use scrye::search::query_engine::QueryEngine;
use scrye::{build_index, index::persist};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_record(dir: &Path, name: &str, url: &str, content: &str) {
    let record = serde_json::json!({ "url": url, "content": content });
    fs::write(dir.join(name), record.to_string()).unwrap();
}

#[test]
fn two_document_corpus_returns_the_matching_document() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();

    write_record(corpus.path(), "d0.json", "http://d0", "the quick brown fox");
    write_record(corpus.path(), "d1.json", "http://d1", "lazy dog");

    build_index(corpus.path(), index_dir.path()).unwrap();
    let engine = QueryEngine::load(index_dir.path()).unwrap();

    let results = engine.search("quick fox", 5);
    assert_eq!(results, vec![Some("http://d0".to_string())]);
}

#[test]
fn identical_documents_are_collapsed_to_one_by_simhash() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();

    write_record(corpus.path(), "d0.json", "http://d0", "the quick brown fox jumps over the lazy dog");
    write_record(corpus.path(), "d1.json", "http://d1", "the quick brown fox jumps over the lazy dog");

    let stats = build_index(corpus.path(), index_dir.path()).unwrap();
    assert_eq!(stats.documents_indexed, 1);
    assert_eq!(stats.documents_skipped_duplicate, 1);

    let docid_map = persist::read_docid_map(&index_dir.path().join("merged_docIDs.json")).unwrap();
    assert_eq!(docid_map.len(), 1);
    assert!(!docid_map.contains_key(&1));
}

#[test]
fn higher_term_frequency_ranks_first() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();

    write_record(corpus.path(), "d0.json", "http://d0", "cat cat cat dog");
    write_record(corpus.path(), "d1.json", "http://d1", "cat dog dog dog");

    build_index(corpus.path(), index_dir.path()).unwrap();
    let engine = QueryEngine::load(index_dir.path()).unwrap();

    let results = engine.search("cat", 2);
    assert_eq!(
        results,
        vec![Some("http://d0".to_string()), Some("http://d1".to_string())]
    );
}

#[test]
fn punctuation_only_query_returns_no_results() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();
    write_record(corpus.path(), "d0.json", "http://d0", "the quick brown fox");

    build_index(corpus.path(), index_dir.path()).unwrap();
    let engine = QueryEngine::load(index_dir.path()).unwrap();

    assert!(engine.search("???", 5).is_empty());
}

#[test]
fn nonexistent_term_returns_no_results() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();
    write_record(corpus.path(), "d0.json", "http://d0", "the quick brown fox");

    build_index(corpus.path(), index_dir.path()).unwrap();
    let engine = QueryEngine::load(index_dir.path()).unwrap();

    assert!(engine.search("nonexistent", 5).is_empty());
}

#[test]
fn every_offset_round_trips_to_its_own_term_after_a_full_build() {
    let corpus = tempdir().unwrap();
    let index_dir = tempdir().unwrap();

    for i in 0..8 {
        write_record(
            corpus.path(),
            &format!("doc{i}.json"),
            &format!("http://doc/{i}"),
            &format!("unique article number {i} about rivers and mountains"),
        );
    }

    build_index(corpus.path(), index_dir.path()).unwrap();

    let offsets = persist::read_offsets(&index_dir.path().join("index_offsets.json")).unwrap();
    assert!(!offsets.is_empty());

    for (term, &offset) in &offsets {
        let shard_key = scrye::models::ShardKey::classify(term);
        let shard_path = persist::shard_path(index_dir.path(), shard_key);
        let (found_term, postings) =
            persist::read_term_and_postings_at_offset(&shard_path, offset).unwrap();
        assert_eq!(&found_term, term);
        assert!(!postings.is_empty());
    }
}
