//! Compiled template cache
//!
//! Entries are keyed by template path and validated against the file's
//! modification time. A mismatch in either direction means the entry is
//! stale: version control checkouts can move mtimes backwards, so equality
//! is the only safe test.
//!
//! Eviction is by insertion order (FIFO), not by recency. A cache hit does
//! not move an entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compiler::CompiledTemplate;

/// Hex-encoded SHA-256 of a template's raw source
pub fn content_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// One compiled template together with the file state it was built from
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Template path (cache key)
    pub path: PathBuf,

    /// Compiled template
    pub template: Arc<CompiledTemplate>,

    /// Modification time observed when the template was read
    pub modified: SystemTime,

    /// SHA-256 of the source, kept for diagnostics
    pub content_hash: String,
}

impl CacheEntry {
    /// Create an entry, hashing `source`
    pub fn new(
        path: impl Into<PathBuf>,
        template: Arc<CompiledTemplate>,
        modified: SystemTime,
        source: &str,
    ) -> Self {
        Self {
            path: path.into(),
            template,
            modified,
            content_hash: content_hash(source),
        }
    }

    /// Whether the entry still matches a file with the given mtime
    pub fn is_fresh(&self, modified: SystemTime) -> bool {
        self.modified == modified
    }
}

/// Snapshot of the cache for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached templates
    pub size: usize,
    /// Capacity
    pub max_size: usize,
    /// Cached paths, oldest first
    pub paths: Vec<PathBuf>,
}

/// Bounded, insertion-ordered map of compiled templates
#[derive(Debug, Clone)]
pub struct TemplateCache {
    entries: IndexMap<PathBuf, Arc<CacheEntry>>,
    max_size: usize,
}

impl TemplateCache {
    /// Create an empty cache holding at most `max_size` templates.
    ///
    /// A `max_size` of zero disables caching.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_size,
        }
    }

    /// Look up an entry without validating it
    pub fn get(&self, path: &Path) -> Option<&Arc<CacheEntry>> {
        self.entries.get(path)
    }

    /// Insert an entry, returning the entry evicted to make room.
    ///
    /// Replacing an existing path keeps its original insertion slot and
    /// never evicts anything else.
    pub fn insert(&mut self, entry: CacheEntry) -> Option<Arc<CacheEntry>> {
        if self.max_size == 0 {
            return None;
        }

        let entry = Arc::new(entry);
        if let Some(slot) = self.entries.get_mut(&entry.path) {
            *slot = entry;
            return None;
        }

        let evicted = if self.entries.len() >= self.max_size {
            self.entries.shift_remove_index(0).map(|(path, old)| {
                tracing::debug!("Evicted cached template: {}", path.display());
                old
            })
        } else {
            None
        };

        self.entries.insert(entry.path.clone(), entry);
        evicted
    }

    /// Remove one entry, keeping the order of the rest
    pub fn remove(&mut self, path: &Path) -> Option<Arc<CacheEntry>> {
        self.entries.shift_remove(path)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only the `keep` most recently inserted entries.
    ///
    /// Returns the number of entries removed.
    pub fn truncate_to_newest(&mut self, keep: usize) -> usize {
        let excess = self.entries.len().saturating_sub(keep);
        if excess > 0 {
            self.entries.drain(..excess);
        }
        excess
    }

    /// Number of cached templates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Snapshot for reporting
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            paths: self.entries.keys().cloned().collect(),
        }
    }
}
