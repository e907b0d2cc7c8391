//! Persistence layer: binary/textual file I/O for batches, shards, the
//! offset map, and the docID map, plus the atomic-swap discipline shards
//! are written under.
//!
//! Resolves the "shard-merge idempotence" open question from the spec by
//! writing every shard update to a temp file in the same directory and
//! renaming it over the final path (`fs::rename` is atomic within one
//! filesystem) rather than appending to the live file in place.

use crate::error::IndexError;
use crate::models::{DocIdMap, Posting, PostingsMap, ShardKey};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Writes a one-key `{term: postings}` record as a compact JSON line.
fn write_record_line<W: Write>(w: &mut W, term: &str, postings: &[Posting]) -> io::Result<()> {
    let mut map = HashMap::with_capacity(1);
    map.insert(term, postings);
    let line = serde_json::to_string(&map).expect("postings serialize infallibly");
    w.write_all(line.as_bytes())?;
    w.write_all(b"\n")
}

/// Loads an entire shard file into a map, skipping malformed lines with a
/// warning (they're logged, not propagated — §7 `CorruptShardLine`).
pub fn read_shard_into_map(path: &Path) -> io::Result<PostingsMap> {
    let mut map = PostingsMap::new();
    if !path.exists() {
        return Ok(map);
    }
    let file = File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HashMap<String, Vec<Posting>>>(&line) {
            Ok(entry) => {
                if let Some((term, postings)) = entry.into_iter().next() {
                    map.insert(term, postings);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping corrupt shard line");
            }
        }
    }
    Ok(map)
}

/// Merges `batch` into the on-disk shard at `shard_path`, concatenating
/// postings lists on key collision, then atomically swaps the rewritten
/// file into place.
pub fn merge_batch_into_shard(shard_path: &Path, batch: &PostingsMap) -> Result<(), IndexError> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut existing =
        read_shard_into_map(shard_path).map_err(|source| IndexError::Persist {
            path: shard_path.to_path_buf(),
            source,
        })?;

    for (term, postings) in batch {
        existing
            .entry(term.clone())
            .or_default()
            .extend(postings.iter().copied());
    }

    let tmp_path = shard_path.with_extension("jsonl.tmp");
    {
        let file = File::create(&tmp_path).map_err(|source| IndexError::Persist {
            path: tmp_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        for (term, postings) in &existing {
            write_record_line(&mut writer, term, postings).map_err(|source| {
                IndexError::Persist {
                    path: tmp_path.clone(),
                    source,
                }
            })?;
        }
        writer.flush().map_err(|source| IndexError::Persist {
            path: tmp_path.clone(),
            source,
        })?;
    }

    fs::rename(&tmp_path, shard_path).map_err(|source| IndexError::Persist {
        path: shard_path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Seeks to `offset` in `shard_path`, reads one line, and parses its sole
/// `{term: postings}` entry. Returns `None` on IO failure or a malformed
/// line (`ShardIOError`/`CorruptShardLine`: caller treats this term as
/// contributing nothing).
pub fn read_postings_at_offset(shard_path: &Path, offset: u64) -> Option<Vec<Posting>> {
    let mut file = match File::open(shard_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %shard_path.display(), error = %e, "shard file unreadable");
            return None;
        }
    };
    if file.seek(SeekFrom::Start(offset)).is_err() {
        return None;
    }
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    if reader.read_line(&mut line).is_err() {
        return None;
    }

    match serde_json::from_str::<HashMap<String, Vec<Posting>>>(line.trim_end()) {
        Ok(entry) => entry.into_values().next(),
        Err(e) => {
            tracing::warn!(path = %shard_path.display(), offset, error = %e, "corrupt shard line at offset");
            None
        }
    }
}

/// Like [`read_postings_at_offset`] but also returns the record's term key,
/// for callers that need to confirm the round-trip property (seeking to
/// `offsets[t]` yields a record whose sole key is `t`).
pub fn read_term_and_postings_at_offset(
    shard_path: &Path,
    offset: u64,
) -> Option<(String, Vec<Posting>)> {
    let mut file = File::open(shard_path).ok()?;
    file.seek(SeekFrom::Start(offset)).ok()?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;

    serde_json::from_str::<HashMap<String, Vec<Posting>>>(line.trim_end())
        .ok()?
        .into_iter()
        .next()
}

/// Path of the shard file for `key` inside `index_dir`.
pub fn shard_path(index_dir: &Path, key: ShardKey) -> PathBuf {
    index_dir.join(key.file_name())
}

pub fn write_offsets(path: &Path, offsets: &HashMap<String, u64>) -> Result<(), IndexError> {
    let file = File::create(path).map_err(|source| IndexError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), offsets).map_err(|e| IndexError::Persist {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })
}

pub fn read_offsets(path: &Path) -> io::Result<HashMap<String, u64>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_docid_map(path: &Path, map: &DocIdMap) -> Result<(), IndexError> {
    let string_keyed: HashMap<String, &str> = map
        .iter()
        .map(|(id, url)| (id.to_string(), url.as_str()))
        .collect();
    let file = File::create(path).map_err(|source| IndexError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), &string_keyed).map_err(|e| IndexError::Persist {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })
}

/// Reads the string-keyed docID map and converts keys back to `u32`.
pub fn read_docid_map(path: &Path) -> io::Result<DocIdMap> {
    let text = fs::read_to_string(path)?;
    let string_keyed: HashMap<String, String> =
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(string_keyed
        .into_iter()
        .filter_map(|(k, v)| k.parse::<u32>().ok().map(|id| (id, v)))
        .collect())
}

/// Writes a batch's postings map to a per-batch JSON file (one JSON object,
/// not line-delimited — batches are whole-file loaded by the merger).
pub fn write_batch_postings(path: &Path, postings: &PostingsMap) -> Result<(), IndexError> {
    let file = File::create(path).map_err(|source| IndexError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), postings).map_err(|e| IndexError::Persist {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })
}

pub fn read_batch_postings(path: &Path) -> io::Result<PostingsMap> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_batch_docid_map(path: &Path, map: &DocIdMap) -> Result<(), IndexError> {
    write_docid_map(path, map)
}

pub fn read_batch_docid_map(path: &Path) -> io::Result<DocIdMap> {
    read_docid_map(path)
}

/// Size in bytes of every shard file that exists under `index_dir`, plus
/// the docID map, used by the report builder.
pub fn total_index_bytes(index_dir: &Path, docid_map_path: &Path) -> u64 {
    let mut total = fs::metadata(docid_map_path).map(|m| m.len()).unwrap_or(0);
    for key in ShardKey::all() {
        let path = shard_path(index_dir, key);
        if let Ok(meta) = fs::metadata(&path) {
            total += meta.len();
        }
    }
    total
}

/// Appends one line to the query log, creating the file if absent.
pub fn append_query_log(path: &Path, line: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}

/// Counts terms (line count) currently stored in a shard.
pub fn shard_term_count(path: &Path) -> io::Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let file = File::open(path)?;
    Ok(BufReader::new(file)
        .lines()
        .filter(|l| l.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(false))
        .count())
}
