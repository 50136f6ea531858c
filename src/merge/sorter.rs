//! Sorted Merger
//!
//! Collects sorted sources concurrently and merges them on request.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::config::MergerConfig;
use crate::error::Result;

use super::iterator::{MergeIter, MergeSource};
use super::{BoxedEntries, MatchingKeyPolicy, NaturalOrder, SortedEntryMap};

/// A registered source waiting for the next merge
struct PendingSource<K, V> {
    /// Taken exactly once, by the merge that drains this source
    entries: Mutex<Option<BoxedEntries<K, V>>>,
    size_hint: usize,
}

/// Concurrent registry of sorted sources with an on-demand k-way merge
///
/// ## Concurrency:
/// - `add` / `add_sized`: lock-free, callable from any number of threads
/// - merge construction (`iter*`, `create_*`): drains every source
///   registered so far. Callers must make sure the registrations meant for a
///   merge happen-before it; a racing `add` lands in either this merge or
///   the next one.
///
/// ## Ages:
/// Sources are aged by registration order: the first source registered
/// since the previous merge has age 0. [`MatchingKeyPolicy::ChooseLatest`]
/// and [`MatchingKeyPolicy::ChooseEarliest`] compare these ages.
pub struct SortedMerger<K, V> {
    pending: Accumulator<PendingSource<K, V>>,
    config: MergerConfig,
}

impl<K, V> SortedMerger<K, V> {
    /// Create a merger with the default configuration
    pub fn new() -> Self {
        Self {
            pending: Accumulator::new(),
            config: MergerConfig::default(),
        }
    }

    /// Create a merger with the given configuration
    pub fn with_config(config: MergerConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            pending: Accumulator::new(),
            config,
        })
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a source without reading it
    ///
    /// `entries` must be strictly sorted by the comparator of the merge that
    /// will consume it. `size_hint` is only used to size allocations; a wrong
    /// estimate never changes the merge result.
    pub fn add<I>(&self, entries: I, size_hint: usize)
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: Send + 'static,
    {
        let entries: BoxedEntries<K, V> = Box::new(entries.into_iter());
        self.pending.add(PendingSource {
            entries: Mutex::new(Some(entries)),
            size_hint,
        });
    }

    /// Register a source whose exact length is known (e.g. a `Vec` or a
    /// `BTreeMap`)
    pub fn add_sized<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator + Send + 'static,
    {
        let entries = entries.into_iter();
        let size_hint = entries.len();
        self.add(entries, size_hint);
    }

    /// Whether any source is waiting to be merged
    pub fn is_any_added(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop every pending source without merging
    pub fn clear(&self) {
        self.pending.clear();
    }

    // =========================================================================
    // Merging
    // =========================================================================

    /// Merge the pending sources by the keys' natural order
    pub fn iter(&self, policy: MatchingKeyPolicy) -> MergeIter<K, V, NaturalOrder<K>>
    where
        K: Ord,
    {
        self.iter_by(policy, K::cmp as NaturalOrder<K>)
    }

    /// Merge the pending sources with a custom comparator
    pub fn iter_by<C>(&self, policy: MatchingKeyPolicy, cmp: C) -> MergeIter<K, V, C>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        let sources = self.drain_sources();
        let merge = MergeIter::new(sources, policy, cmp, &self.config);
        debug!(
            %policy,
            validating = self.config.validates(),
            active = merge.active_sources(),
            max_size = merge.max_size(),
            "Created merge iterator"
        );
        merge
    }

    /// Merge into a `BTreeMap`
    pub fn create_btree_map(&self, policy: MatchingKeyPolicy) -> Result<BTreeMap<K, V>>
    where
        K: Ord,
    {
        if !self.is_any_added() {
            return Ok(BTreeMap::new());
        }
        let entries = self.iter(policy).into_vec()?;
        Ok(entries.into_iter().collect())
    }

    /// Merge into a concurrent `SkipMap`
    pub fn create_skip_map(&self, policy: MatchingKeyPolicy) -> Result<SkipMap<K, V>>
    where
        K: Ord + Send + 'static,
        V: Send + 'static,
    {
        let map = SkipMap::new();
        if !self.is_any_added() {
            return Ok(map);
        }
        for (key, value) in self.iter(policy).into_vec()? {
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Merge into an immutable sorted map by the keys' natural order
    pub fn create_sorted_map(
        &self,
        policy: MatchingKeyPolicy,
    ) -> Result<SortedEntryMap<K, V, NaturalOrder<K>>>
    where
        K: Ord,
    {
        self.create_sorted_map_by(policy, K::cmp as NaturalOrder<K>)
    }

    /// Merge into an immutable sorted map ordered by `cmp`
    pub fn create_sorted_map_by<C>(
        &self,
        policy: MatchingKeyPolicy,
        cmp: C,
    ) -> Result<SortedEntryMap<K, V, C>>
    where
        C: Fn(&K, &K) -> Ordering + Clone,
    {
        if !self.is_any_added() {
            return Ok(SortedEntryMap::empty_by(cmp));
        }
        let entries = self.iter_by(policy, cmp.clone()).into_vec()?;
        Ok(SortedEntryMap::from_sorted_vec(entries, cmp))
    }

    // =========================================================================
    // Merging with the Configured Policy
    // =========================================================================

    /// [`iter`](Self::iter) with [`MergerConfig::default_policy`]
    pub fn iter_default(&self) -> MergeIter<K, V, NaturalOrder<K>>
    where
        K: Ord,
    {
        self.iter(self.config.default_policy)
    }

    /// [`create_btree_map`](Self::create_btree_map) with
    /// [`MergerConfig::default_policy`]
    pub fn create_btree_map_default(&self) -> Result<BTreeMap<K, V>>
    where
        K: Ord,
    {
        self.create_btree_map(self.config.default_policy)
    }

    /// [`create_skip_map`](Self::create_skip_map) with
    /// [`MergerConfig::default_policy`]
    pub fn create_skip_map_default(&self) -> Result<SkipMap<K, V>>
    where
        K: Ord + Send + 'static,
        V: Send + 'static,
    {
        self.create_skip_map(self.config.default_policy)
    }

    /// [`create_sorted_map`](Self::create_sorted_map) with
    /// [`MergerConfig::default_policy`]
    pub fn create_sorted_map_default(&self) -> Result<SortedEntryMap<K, V, NaturalOrder<K>>>
    where
        K: Ord,
    {
        self.create_sorted_map(self.config.default_policy)
    }

    /// Take every pending source, in registration order
    fn drain_sources(&self) -> Vec<MergeSource<K, V>> {
        let snapshot = self.pending.clear_and_iterable();
        let mut sources: Vec<MergeSource<K, V>> = snapshot
            .iter()
            .filter_map(|pending| {
                let entries = pending.entries.lock().take()?;
                Some(MergeSource {
                    entries,
                    size_hint: pending.size_hint,
                })
            })
            .collect();
        // The chain is newest first
        sources.reverse();
        sources
    }
}

impl<K, V> Default for SortedMerger<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SortedMerger<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedMerger")
            .field("pending", &self.pending.iterable().len())
            .field("config", &self.config)
            .finish()
    }
}
