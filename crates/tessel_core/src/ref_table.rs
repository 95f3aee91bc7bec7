//! Ref table - the durable store behind a stateless traversal
//!
//! The table maps a composite identity to the instance created at that
//! identity. Entries are inserted lazily on the first visit and are never
//! removed implicitly: each pass stamps the entries it visits, and the driver
//! calls [`RefTable::sweep`] at the end of a full pass to evict everything the
//! pass did not reach.
//!
//! # Example
//!
//! ```rust
//! use tessel_core::RefTable;
//!
//! let mut table: RefTable<&str> = RefTable::new();
//!
//! table.begin_pass();
//! table.visit_or_insert_with("a", || "first");
//! table.visit_or_insert_with("b", || "second");
//! assert!(table.sweep().is_empty());
//!
//! // Next pass only reaches "a"
//! table.begin_pass();
//! let a = table.visit_or_insert_with("a", || unreachable!());
//! assert!(!a.created);
//! let evicted = table.sweep();
//! assert_eq!(evicted.len(), 1);
//! assert_eq!(&*evicted[0].0, "b");
//! ```

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::error::CoreError;
use crate::key::Ikey;

struct Slot<V> {
    ikey: Ikey,
    value: V,
    /// Pass number of the last visit
    visited: u64,
}

/// Result of [`RefTable::visit_or_insert_with`]
pub struct Visit<'a, V> {
    /// The identity, shared with the table's own key
    pub ikey: Ikey,
    /// The instance bound at the identity
    pub value: &'a mut V,
    /// Whether the instance was created by this visit
    pub created: bool,
}

/// Mapping from composite identity to the instance created there
pub struct RefTable<V> {
    entries: FxHashMap<Ikey, Slot<V>>,
    pass: u64,
}

impl<V> RefTable<V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            pass: 0,
        }
    }

    /// Start a new pass; every entry becomes unvisited
    pub fn begin_pass(&mut self) -> u64 {
        self.pass += 1;
        self.pass
    }

    /// The current pass number
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Look up an instance without marking it visited
    pub fn resolve(&self, ikey: &str) -> Option<&V> {
        self.entries.get(ikey).map(|slot| &slot.value)
    }

    /// Look up an instance mutably without marking it visited
    pub fn resolve_mut(&mut self, ikey: &str) -> Option<&mut V> {
        self.entries.get_mut(ikey).map(|slot| &mut slot.value)
    }

    /// The table's own copy of an identity
    pub fn ikey(&self, ikey: &str) -> Option<Ikey> {
        self.entries.get(ikey).map(|slot| slot.ikey.clone())
    }

    /// Bind an instance to a fresh identity and mark it visited
    pub fn bind(&mut self, ikey: Ikey, value: V) -> Result<&mut V, CoreError> {
        if self.entries.contains_key(&*ikey) {
            return Err(CoreError::AlreadyBound(ikey.to_string()));
        }
        let slot = self.entries.entry(ikey.clone()).or_insert(Slot {
            ikey,
            value,
            visited: self.pass,
        });
        Ok(&mut slot.value)
    }

    /// Replace the instance at an identity, returning the previous one
    pub fn rebind(&mut self, ikey: &str, value: V) -> Option<V> {
        let slot = self.entries.get_mut(ikey)?;
        slot.visited = self.pass;
        Some(std::mem::replace(&mut slot.value, value))
    }

    /// Mark an existing identity visited and return its instance
    pub fn visit(&mut self, ikey: &str) -> Option<&mut V> {
        let pass = self.pass;
        self.entries.get_mut(ikey).map(|slot| {
            slot.visited = pass;
            &mut slot.value
        })
    }

    /// Mark an identity visited, creating its instance on first visit
    pub fn visit_or_insert_with<F>(&mut self, ikey: &str, create: F) -> Visit<'_, V>
    where
        F: FnOnce() -> V,
    {
        let pass = self.pass;
        // Reuse the table's own key on a hit so a visit does not allocate
        let key = self
            .entries
            .get_key_value(ikey)
            .map_or_else(|| Ikey::from(ikey), |(key, _)| key.clone());
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                slot.visited = pass;
                Visit {
                    ikey: slot.ikey.clone(),
                    value: &mut slot.value,
                    created: false,
                }
            }
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                let slot = entry.insert(Slot {
                    ikey: key.clone(),
                    value: create(),
                    visited: pass,
                });
                Visit {
                    ikey: key,
                    value: &mut slot.value,
                    created: true,
                }
            }
        }
    }

    /// Whether the identity was visited in the current pass
    pub fn is_visited(&self, ikey: &str) -> bool {
        self.entries
            .get(ikey)
            .is_some_and(|slot| slot.visited == self.pass)
    }

    /// Whether an instance is bound at the identity
    pub fn contains(&self, ikey: &str) -> bool {
        self.entries.contains_key(ikey)
    }

    /// Remove one identity
    pub fn remove(&mut self, ikey: &str) -> Option<V> {
        self.entries.remove(ikey).map(|slot| slot.value)
    }

    /// Evict every entry not visited in the current pass
    pub fn sweep(&mut self) -> Vec<(Ikey, V)> {
        let pass = self.pass;
        let stale: Vec<Ikey> = self
            .entries
            .values()
            .filter(|slot| slot.visited != pass)
            .map(|slot| slot.ikey.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|ikey| self.entries.remove(&*ikey).map(|slot| (ikey, slot.value)))
            .collect()
    }

    /// Number of bound identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all bound identities and instances
    pub fn iter(&self) -> impl Iterator<Item = (&Ikey, &V)> {
        self.entries.values().map(|slot| (&slot.ikey, &slot.value))
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for RefTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_insert_and_reuse() {
        let mut table = RefTable::new();
        table.begin_pass();

        let first = table.visit_or_insert_with("a/b", || 1);
        assert!(first.created);
        *first.value = 10;

        table.begin_pass();
        let second = table.visit_or_insert_with("a/b", || 2);
        assert!(!second.created);
        assert_eq!(*second.value, 10);
    }

    #[test]
    fn test_bind_exactly_once() {
        let mut table = RefTable::new();
        table.begin_pass();
        assert!(table.bind(Ikey::from("x"), 1).is_ok());
        assert_eq!(
            table.bind(Ikey::from("x"), 2).err(),
            Some(CoreError::AlreadyBound("x".into()))
        );
        assert_eq!(table.resolve("x"), Some(&1));
    }

    #[test]
    fn test_sweep_evicts_unvisited() {
        let mut table = RefTable::new();
        table.begin_pass();
        table.visit_or_insert_with("keep", || 'k');
        table.visit_or_insert_with("drop", || 'd');

        table.begin_pass();
        table.visit("keep");
        assert!(table.is_visited("keep"));
        assert!(!table.is_visited("drop"));

        let evicted = table.sweep();
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].1, 'd');
        assert!(table.contains("keep"));
        assert!(!table.contains("drop"));
    }

    #[test]
    fn test_rebind_replaces_value() {
        let mut table = RefTable::new();
        table.begin_pass();
        table.visit_or_insert_with("slot", || "old");
        assert_eq!(table.rebind("slot", "new"), Some("old"));
        assert_eq!(table.resolve("slot"), Some(&"new"));
        assert_eq!(table.rebind("missing", "x"), None);
    }

    #[test]
    fn test_visit_after_remove_recreates() {
        let mut table = RefTable::new();
        table.begin_pass();
        table.visit_or_insert_with("k", || 1);
        assert_eq!(table.remove("k"), Some(1));

        let visit = table.visit_or_insert_with("k", || 2);
        assert!(visit.created);
        assert_eq!(*visit.value, 2);
        assert!(table.is_visited("k"));
    }

    #[test]
    fn test_shared_ikey() {
        let mut table = RefTable::new();
        table.begin_pass();
        let visit = table.visit_or_insert_with("p/q", || ());
        let ikey = visit.ikey;
        assert_eq!(table.ikey("p/q"), Some(ikey));
    }
}
