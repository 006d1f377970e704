//! Prepared statement cache

use std::collections::HashMap;

/// Prepared statements keyed by their exact statement text.
///
/// Keys are byte-exact: `"SELECT 1"` and `"select 1"` are different entries.
/// Entries are never evicted; a connection that caches many distinct ad-hoc
/// statements grows without bound, so only pass the cache flag for statements
/// that are reused.
#[derive(Debug)]
pub struct StatementCache<S> {
    entries: HashMap<String, S>,
}

impl<S> Default for StatementCache<S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<S: Clone> StatementCache<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached handle for `sql`, if any.
    pub fn get(&self, sql: &str) -> Option<S> {
        self.entries.get(sql).cloned()
    }

    pub fn insert(&mut self, sql: &str, stmt: S) {
        self.entries.insert(sql.to_string(), stmt);
    }

    pub fn contains(&self, sql: &str) -> bool {
        self.entries.contains_key(sql)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_exact() {
        let mut cache = StatementCache::new();
        cache.insert("SELECT 1", 7u32);
        assert_eq!(cache.get("SELECT 1"), Some(7));
        assert_eq!(cache.get("select 1"), None);
        assert_eq!(cache.get("SELECT 1 "), None);
        assert_eq!(cache.len(), 1);
    }
}
