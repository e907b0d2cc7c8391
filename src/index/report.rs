//! Builds the human-readable `report.txt` summarizing a completed build:
//! documents indexed, unique tokens, and total on-disk size in KB.

use crate::error::IndexError;
use crate::index::persist;
use crate::models::ShardKey;
use std::fs;
use std::path::Path;

pub fn write_report(
    index_dir: &Path,
    documents_indexed: u32,
) -> Result<(), IndexError> {
    let mut unique_tokens = 0usize;
    for key in ShardKey::all() {
        let path = persist::shard_path(index_dir, key);
        unique_tokens += persist::shard_term_count(&path).map_err(|source| IndexError::Persist {
            path: path.clone(),
            source,
        })?;
    }

    let docid_map_path = index_dir.join("merged_docIDs.json");
    let total_bytes = persist::total_index_bytes(index_dir, &docid_map_path);
    let total_kb = total_bytes as f64 / 1024.0;

    let report = format!(
        "DOCUMENTS INDEXED: {documents_indexed}\nUNIQUE TOKENS: {unique_tokens}\nTOTAL SIZE (IN KB): {total_kb:.2} KB\n"
    );

    let report_path = index_dir.join("report.txt");
    fs::write(&report_path, report).map_err(|source| IndexError::Persist {
        path: report_path,
        source,
    })
}
