//! Offset Index Builder: scans every shard after the merge completes and
//! records the byte offset at which each term's record begins, so the
//! query engine can seek straight to a term's line instead of scanning.

use crate::error::IndexError;
use crate::models::ShardKey;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Scans every shard under `index_dir`, building `term -> byte offset`,
/// and writes it to `index_dir/index_offsets.json`.
///
/// Each shard is independent (offsets within one shard say nothing about
/// any other), so the 28 shard scans run concurrently via `rayon` and are
/// merged into one map afterward.
pub fn build_offset_index(index_dir: &Path) -> Result<HashMap<String, u64>, IndexError> {
    let per_shard: Vec<HashMap<String, u64>> = ShardKey::all()
        .into_par_iter()
        .map(|key| {
            let path = index_dir.join(key.file_name());
            if !path.exists() {
                return Ok(HashMap::new());
            }
            let mut shard_offsets = HashMap::new();
            scan_shard(&path, &mut shard_offsets).map_err(|source| IndexError::Persist {
                path: path.clone(),
                source,
            })?;
            Ok(shard_offsets)
        })
        .collect::<Result<Vec<_>, IndexError>>()?;

    let mut offsets = HashMap::new();
    for shard_offsets in per_shard {
        offsets.extend(shard_offsets);
    }

    let offsets_path = index_dir.join("index_offsets.json");
    super::persist::write_offsets(&offsets_path, &offsets)?;

    Ok(offsets)
}

fn scan_shard(path: &Path, offsets: &mut HashMap<String, u64>) -> std::io::Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut pos: u64 = 0;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        let start_offset = pos;
        pos += bytes_read as u64;

        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HashMap<String, serde_json::Value>>(line.trim_end()) {
            Ok(entry) => {
                if let Some(term) = entry.keys().next() {
                    offsets.insert(term.clone(), start_offset);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), offset = start_offset, error = %e, "skipping malformed line while building offset index");
            }
        }
    }

    Ok(())
}
