//! The standalone context store and the shared empty sentinel.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{ContextEntry, ContextError, ContextValue, DataContext, DataKey};

lazy_static::lazy_static! {
    static ref EMPTY: Arc<DataContextMap> = Arc::new(DataContextMap {
        entries: RwLock::new(BTreeMap::new()),
        read_only: true,
    });
}

/// A thread-safe [`DataContext`] backed by an ordered map.
///
/// Snapshots from [`to_list`](DataContext::to_list) are ordered by key id.
///
/// # Example
///
/// ```rust
/// use tether_context::{DataConstant, DataContext, DataContextMap, TypedContext};
///
/// static NAME: DataConstant<String> = DataConstant::new("user.name");
///
/// let context = DataContextMap::new();
/// context.add(&NAME, "Alice".to_string()).unwrap();
///
/// let snapshot = context.to_list();
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot[0].key().id(), "user.name");
/// ```
pub struct DataContextMap {
    entries: RwLock<BTreeMap<DataKey, ContextValue>>,
    read_only: bool,
}

impl DataContextMap {
    /// Create a new empty, writable store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            read_only: false,
        }
    }

    /// Create a writable store from existing entries. Later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = ContextEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(ContextEntry::into_parts)
            .collect::<BTreeMap<_, _>>();
        Self {
            entries: RwLock::new(map),
            read_only: false,
        }
    }

    /// The process-wide empty sentinel.
    ///
    /// The sentinel is read-only: every mutation on it is ignored. Compare with
    /// [`is_empty_sentinel`](Self::is_empty_sentinel), never by content.
    pub fn empty() -> Arc<DataContextMap> {
        Arc::clone(&EMPTY)
    }

    /// Whether `context` is the shared empty sentinel.
    pub fn is_empty_sentinel(context: &Arc<DataContextMap>) -> bool {
        Arc::ptr_eq(context, &EMPTY)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<DataKey, ContextValue>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access, or `None` for a read-only store.
    fn write(&self) -> Option<RwLockWriteGuard<'_, BTreeMap<DataKey, ContextValue>>> {
        if self.read_only {
            tracing::trace!("ignoring mutation of read-only context");
            return None;
        }
        Some(self.entries.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for DataContextMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.read();
        f.debug_struct("DataContextMap")
            .field("keys", &entries.keys().map(DataKey::id).collect::<Vec<_>>())
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl DataContext for DataContextMap {
    fn len(&self) -> usize {
        self.read().len()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn add_value(&self, key: &DataKey, value: ContextValue) -> Result<(), ContextError> {
        let Some(mut entries) = self.write() else {
            return Ok(());
        };
        if entries.contains_key(key) {
            return Err(ContextError::DuplicateKey { key: key.clone() });
        }
        entries.insert(key.clone(), value);
        Ok(())
    }

    fn add_or_update_value(&self, key: &DataKey, value: ContextValue) {
        if let Some(mut entries) = self.write() {
            entries.insert(key.clone(), value);
        }
    }

    fn value(&self, key: &DataKey) -> Option<ContextValue> {
        self.read().get(key).cloned()
    }

    fn contains(&self, key: &DataKey) -> bool {
        self.read().contains_key(key)
    }

    fn remove(&self, key: &DataKey) -> bool {
        match self.write() {
            Some(mut entries) => entries.remove(key).is_some(),
            None => false,
        }
    }

    fn merge(&self, other: &dyn DataContext) {
        // Snapshot first: `other` may be this very store.
        let incoming = other.to_list();
        if let Some(mut entries) = self.write() {
            for entry in incoming {
                let (key, value) = entry.into_parts();
                entries.insert(key, value);
            }
        }
    }

    fn clear(&self) {
        if let Some(mut entries) = self.write() {
            entries.clear();
        }
    }

    fn to_list(&self) -> Vec<ContextEntry> {
        self.read()
            .iter()
            .map(|(key, value)| ContextEntry::new(key.clone(), Arc::clone(value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataConstant, TypedContext};

    static COUNT: DataConstant<i64> = DataConstant::new("test.count");
    static NAME: DataConstant<String> = DataConstant::new("test.name");
    static FLAGS: DataConstant<Vec<bool>> = DataConstant::new("test.flags");

    #[test]
    fn add_rejects_duplicate_key() {
        let ctx = DataContextMap::new();
        ctx.add(&COUNT, 1).unwrap();

        let err = ctx.add(&COUNT, 2).unwrap_err();
        assert_eq!(
            err,
            ContextError::DuplicateKey {
                key: COUNT.key().clone()
            }
        );
        assert_eq!(ctx.get(&COUNT), 1);
    }

    #[test]
    fn add_or_update_overwrites() {
        let ctx = DataContextMap::new();
        ctx.add_or_update(&NAME, "first".to_string());
        ctx.add_or_update(&NAME, "second".to_string());
        assert_eq!(ctx.get(&NAME), "second");
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn remove_and_contains() {
        let ctx = DataContextMap::new();
        ctx.add(&FLAGS, vec![true, false]).unwrap();
        assert!(ctx.contains(&FLAGS));
        assert!(ctx.remove(&FLAGS));
        assert!(!ctx.contains(&FLAGS));
        assert!(!ctx.remove(&FLAGS));
    }

    #[test]
    fn merge_copies_and_overwrites() {
        let a = DataContextMap::new();
        a.add(&COUNT, 1).unwrap();
        a.add(&NAME, "a".to_string()).unwrap();

        let b = DataContextMap::new();
        b.add(&COUNT, 2).unwrap();
        b.add(&FLAGS, vec![true]).unwrap();

        a.merge(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(&COUNT), 2);
        assert_eq!(a.get(&NAME), "a");
        assert_eq!(a.get(&FLAGS), vec![true]);
        // Source untouched
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn merge_with_itself_is_harmless() {
        let ctx = DataContextMap::new();
        ctx.add(&COUNT, 5).unwrap();
        ctx.merge(&ctx);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get(&COUNT), 5);
    }

    #[test]
    fn to_list_is_ordered_by_key() {
        let ctx = DataContextMap::new();
        ctx.add(&NAME, "n".to_string()).unwrap();
        ctx.add(&COUNT, 1).unwrap();
        ctx.add(&FLAGS, Vec::new()).unwrap();

        let ids: Vec<String> = ctx
            .to_list()
            .iter()
            .map(|entry| entry.key().id().to_string())
            .collect();
        assert_eq!(ids, vec!["test.count", "test.flags", "test.name"]);
    }

    #[test]
    fn from_entries_builds_store() {
        let ctx = DataContextMap::from_entries(vec![
            COUNT.to_entry(1),
            NAME.to_entry("x".to_string()),
            COUNT.to_entry(9),
        ]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get(&COUNT), 9);
    }

    #[test]
    fn clear_empties_store() {
        let ctx = DataContextMap::new();
        ctx.add(&COUNT, 1).unwrap();
        ctx.clear();
        assert!(ctx.is_empty());
    }

    #[test]
    fn empty_sentinel_ignores_mutations() {
        let empty = DataContextMap::empty();
        assert!(DataContextMap::is_empty_sentinel(&empty));
        assert!(empty.is_read_only());

        empty.add(&COUNT, 1).unwrap();
        empty.add_or_update(&NAME, "ignored".to_string());
        empty.merge(&DataContextMap::from_entries(vec![COUNT.to_entry(3)]));

        assert_eq!(empty.len(), 0);
        assert!(!empty.remove(&COUNT));
        assert_eq!(empty.try_get(&COUNT), None);
    }

    #[test]
    fn fresh_store_is_not_the_sentinel() {
        let fresh = Arc::new(DataContextMap::new());
        assert!(!DataContextMap::is_empty_sentinel(&fresh));
        assert!(fresh.is_empty());
    }

    #[test]
    fn concurrent_writers_all_land() {
        let ctx = Arc::new(DataContextMap::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ctx = Arc::clone(&ctx);
                std::thread::spawn(move || {
                    let key: DataConstant<usize> = DataConstant::create("worker", &i.to_string());
                    ctx.add(&key, i).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ctx.len(), 8);
    }

    #[test]
    fn debug_lists_keys() {
        let ctx = DataContextMap::new();
        ctx.add(&NAME, "n".to_string()).unwrap();
        assert!(format!("{:?}", ctx).contains("test.name"));
    }
}
