use parking_lot::RwLock;
use std::collections::HashSet;

/// An insert-only set of canonical URLs shared between workers
///
/// Keys are never removed; the set grows for the lifetime of the crawl.
/// Membership reads share the lock, insertions take it exclusively, and
/// `insert_if_absent` performs its check and insert under a single write lock
/// so concurrent callers can never both observe "absent" for the same key.
#[derive(Debug, Default)]
pub struct UrlSet {
    urls: RwLock<HashSet<String>>,
}

impl UrlSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key unless it is already present
    ///
    /// # Returns
    ///
    /// * `true` - The key was newly added by this call
    /// * `false` - The key was already present
    pub fn insert_if_absent(&self, key: &str) -> bool {
        let mut urls = self.urls.write();
        if urls.contains(key) {
            return false;
        }
        urls.insert(key.to_string())
    }

    /// Checks whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.urls.read().contains(key)
    }

    /// Returns the number of keys in the set
    pub fn len(&self) -> usize {
        self.urls.read().len()
    }

    /// Returns whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.urls.read().is_empty()
    }
}
