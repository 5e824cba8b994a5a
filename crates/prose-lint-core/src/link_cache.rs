//! File-existence and anchor cache shared by link checks within one run.

use crate::slug::extract_anchors;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Anchors defined by one file.
pub type AnchorSet = Arc<HashSet<String>>;

/// Counters reported by [`LinkCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Paths whose existence is cached.
    pub paths: usize,
    /// Files whose anchors are cached.
    pub anchor_sets: usize,
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that touched the filesystem.
    pub misses: usize,
}

/// Caches filesystem lookups for the dead-link rule.
///
/// Entries are insert-if-absent; the cache is safe to share across
/// threads and is emptied only by [`LinkCache::clear`].
#[derive(Debug, Default)]
pub struct LinkCache {
    exists: Mutex<HashMap<PathBuf, bool>>,
    anchors: Mutex<HashMap<PathBuf, Option<AnchorSet>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl LinkCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `path` exists as a file or directory.
    pub fn exists(&self, path: &Path) -> bool {
        if let Some(found) = self.exists.lock().get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *found;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let found = path.exists();
        *self
            .exists
            .lock()
            .entry(path.to_path_buf())
            .or_insert(found)
    }

    /// Anchors defined by the Markdown file at `path`.
    ///
    /// Returns `None` when the file cannot be read.
    pub fn anchors(&self, path: &Path) -> Option<AnchorSet> {
        if let Some(cached) = self.anchors.lock().get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let loaded = match std::fs::read_to_string(path) {
            Ok(content) => Some(Arc::new(extract_anchors(&content))),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read link target");
                None
            }
        };
        self.anchors
            .lock()
            .entry(path.to_path_buf())
            .or_insert(loaded)
            .clone()
    }

    /// Drops every cached entry and resets the counters.
    pub fn clear(&self) {
        self.exists.lock().clear();
        self.anchors.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Current cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            paths: self.exists.lock().len(),
            anchor_sets: self.anchors.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn caches_existence_until_cleared() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("guide.md");
        let cache = LinkCache::new();

        assert!(!cache.exists(&file));
        std::fs::write(&file, "# Guide\n").unwrap();
        assert!(!cache.exists(&file), "stale entry should be served");

        cache.clear();
        assert!(cache.exists(&file));
        assert_eq!(
            cache.stats(),
            CacheStats {
                paths: 1,
                anchor_sets: 0,
                hits: 0,
                misses: 1
            }
        );
    }

    #[test]
    fn loads_anchors_once() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("guide.md");
        std::fs::write(&file, "# Guide\n\n## Install steps\n").unwrap();
        let cache = LinkCache::new();

        let anchors = cache.anchors(&file).unwrap();
        assert!(anchors.contains("install-steps"));
        let again = cache.anchors(&file).unwrap();
        assert!(Arc::ptr_eq(&anchors, &again));

        let stats = cache.stats();
        assert_eq!(stats.anchor_sets, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn unreadable_file_has_no_anchors() {
        let cache = LinkCache::new();
        assert!(cache.anchors(Path::new("/definitely/not/here.md")).is_none());
    }
}
