//! Partitioning of flat key/value pairs into size-bounded chunks
//!
//! Each chunk becomes one request to the completion service, so the budget
//! bounds prompt size. Size is measured as `key.len() + value.len()` in bytes,
//! summed over the chunk.

use crate::tree::FlatMap;

/// Default chunk budget in bytes
pub const DEFAULT_CHUNK_BUDGET: usize = 500;

/// A batch of flat key/value pairs sent together to a translator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    entries: FlatMap,
    byte_len: usize,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair, growing the byte count by its size
    pub fn insert(&mut self, key: String, value: String) {
        let added = entry_size(&key, &value);
        if let Some(previous) = self.entries.insert(key.clone(), value) {
            self.byte_len -= entry_size(&key, &previous);
        }
        self.byte_len += added;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total key + value length of all pairs, in bytes
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &FlatMap {
        &self.entries
    }
}

impl FromIterator<(String, String)> for Chunk {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut chunk = Chunk::new();
        for (key, value) in iter {
            chunk.insert(key, value);
        }
        chunk
    }
}

/// Size of one pair as counted against the chunk budget
pub fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Split a flat map into chunks of at most `byte_budget` bytes
///
/// Pairs are taken in the map's iteration order, which is unspecified, so
/// chunk composition may differ between runs.
///
/// # Guarantees
///
/// - Every key lands in exactly one chunk
/// - A chunk exceeds the budget only when it holds a single oversized pair
/// - At least one chunk is returned, even for empty input
///
/// # Example
///
/// ```ignore
/// let chunks = partition(flat, 500);
/// assert!(chunks.iter().all(|c| c.len() == 1 || c.byte_len() <= 500));
/// ```
pub fn partition(flat: FlatMap, byte_budget: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Chunk::new();

    for (key, value) in flat {
        let size = entry_size(&key, &value);
        if current.byte_len() + size > byte_budget && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.insert(key, value);
    }

    chunks.push(current);
    chunks
}
