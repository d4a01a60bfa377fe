//! Resuming a run from a previously written output file
//!
//! Keys that already have a translation in the existing output are not sent
//! again; their translations seed the merge instead.

use crate::formats::{self, Format, FormatResult};
use crate::tree::{FlatMap, flatten};
use std::path::Path;
use tracing::info;

/// Split `flat` into keys still to translate and the seed of known translations
///
/// Every key of `existing` is removed from `flat` and carried, with its
/// existing value, into the returned seed. A key never ends up in both maps.
pub fn resume(mut flat: FlatMap, existing: FlatMap) -> (FlatMap, FlatMap) {
    for key in existing.keys() {
        flat.remove(key);
    }
    (flat, existing)
}

/// Flattened content of a previous output, if there is one
///
/// Returns an empty map when `path` does not exist. A file that exists but
/// cannot be read or parsed is an error, so a damaged output is never
/// silently overwritten.
pub fn load_existing(path: &Path, format: Format) -> FormatResult<FlatMap> {
    if !path.exists() {
        return Ok(FlatMap::new());
    }
    let tree = formats::read_as(path, format)?;
    let existing = flatten(&tree, "");
    info!(path = %path.display(), keys = existing.len(), "resuming from existing output");
    Ok(existing)
}
