//! Immutable sorted map
//!
//! Read-only map over merged entries, searched by binary search with the
//! comparator the entries were merged with.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::slice;
use std::sync::Arc;

use super::NaturalOrder;

/// Immutable map over strictly sorted, unique-keyed entries
///
/// Cloning is O(1); clones share the same entries.
pub struct SortedEntryMap<K, V, C = NaturalOrder<K>> {
    entries: Arc<[(K, V)]>,
    cmp: C,
}

impl<K: Ord, V> SortedEntryMap<K, V> {
    /// Empty map ordered by the keys' natural order
    pub fn empty() -> Self {
        Self::empty_by(K::cmp as NaturalOrder<K>)
    }
}

impl<K, V, C> SortedEntryMap<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Empty map ordered by `cmp`
    pub fn empty_by(cmp: C) -> Self {
        Self {
            entries: Arc::from(Vec::new()),
            cmp,
        }
    }

    /// Wrap entries that are already strictly sorted by `cmp`
    ///
    /// Sortedness is not checked; lookups on unsorted entries give
    /// unspecified results.
    pub fn from_sorted_vec(entries: Vec<(K, V)>, cmp: C) -> Self {
        Self {
            entries: Arc::from(entries),
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.search(key).ok()?;
        Some(&self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Entries in key order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries as a sorted slice
    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Entry with the smallest key
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entry(0)
    }

    /// Entry with the largest key
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entry(self.entries.len().checked_sub(1)?)
    }

    /// Entry with the greatest key less than or equal to `key`
    pub fn floor(&self, key: &K) -> Option<(&K, &V)> {
        match self.search(key) {
            Ok(idx) => self.entry(idx),
            Err(idx) => self.entry(idx.checked_sub(1)?),
        }
    }

    /// Entry with the least key greater than or equal to `key`
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        match self.search(key) {
            Ok(idx) | Err(idx) => self.entry(idx),
        }
    }

    /// Entry with the greatest key strictly less than `key`
    pub fn lower(&self, key: &K) -> Option<(&K, &V)> {
        match self.search(key) {
            Ok(idx) | Err(idx) => self.entry(idx.checked_sub(1)?),
        }
    }

    /// Entry with the least key strictly greater than `key`
    pub fn higher(&self, key: &K) -> Option<(&K, &V)> {
        match self.search(key) {
            Ok(idx) => self.entry(idx + 1),
            Err(idx) => self.entry(idx),
        }
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| (self.cmp)(k, key))
    }

    fn entry(&self, idx: usize) -> Option<(&K, &V)> {
        self.entries.get(idx).map(|(k, v)| (k, v))
    }
}

impl<K, V, C: Clone> Clone for SortedEntryMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for SortedEntryMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a SortedEntryMap<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over the entries of a [`SortedEntryMap`]
pub struct Iter<'a, K, V> {
    inner: slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
