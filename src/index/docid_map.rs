//! DocID Mapping Store: the flat `docID -> URL` table, persisted as a
//! string-keyed JSON object and merged across batches by disjoint key
//! range (docIDs are assigned monotonically, so batches never collide).

use crate::error::IndexError;
use crate::index::persist;
use crate::models::DocIdMap;
use std::io;
use std::path::Path;

/// Merges `addition` into `base`, in place. Because docIDs are assigned
/// densely and monotonically across the whole build, two batches'
/// key ranges never overlap; this is a plain union.
pub fn merge_into(base: &mut DocIdMap, addition: DocIdMap) {
    base.extend(addition);
}

pub fn save(path: &Path, map: &DocIdMap) -> Result<(), IndexError> {
    persist::write_docid_map(path, map)
}

/// Loads the consolidated docID map, converting string keys back to `u32`
/// (an artifact of JSON object keys always being strings).
pub fn load(path: &Path) -> io::Result<DocIdMap> {
    persist::read_docid_map(path)
}
