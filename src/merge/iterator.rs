//! Merge Iterator
//!
//! Lazy k-way merge over pre-sorted sources.
//!
//! ## Working Set
//! ```text
//!  cursors (VecDeque, sorted by head key)
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ head: 3  │ head: 5  │ head: 8  │ head: 13 │
//! │ age: 1   │ age: 0   │ age: 3   │ age: 2   │
//! └──────────┴──────────┴──────────┴──────────┘
//!   next()     fast-path   binary search for the rest
//! ```
//! `next()` yields the front cursor's head and advances that cursor. The new
//! head is compared with the second cursor first; when it is still the
//! smallest nothing moves. Otherwise it is re-inserted by binary search.
//! Equal keys are resolved by the [`MatchingKeyPolicy`]: the loser advances
//! and is re-inserted in turn.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use tracing::{debug, trace, warn};

use crate::config::MergerConfig;
use crate::error::{AccumergeError, Result};

use super::policy::MatchingKeyPolicy;
use super::BoxedEntries;

/// Upper bound on the entries `into_vec` reserves up front from size hints.
/// Larger merges grow the vector as entries arrive.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

/// A registered source as handed to the merge
pub(crate) struct MergeSource<K, V> {
    pub(crate) entries: BoxedEntries<K, V>,
    pub(crate) size_hint: usize,
}

/// One active source in the working set
struct Cursor<K, V> {
    entries: BoxedEntries<K, V>,
    /// Current entry, not yet yielded
    head: (K, V),
    /// Registration order, used only for tie-breaking
    age: usize,
    /// Entries pulled from `entries` so far (including `head`)
    pulled: usize,
    size_hint: usize,
}

/// Iterator yielding the merged entries of every source in key order
pub struct MergeIter<K, V, C> {
    cursors: VecDeque<Cursor<K, V>>,
    policy: MatchingKeyPolicy,
    cmp: C,
    /// Sum of the sources' size hints
    max_size: usize,
    validate_sorted: bool,
    validate_size_hints: bool,
    /// First validation failure; iteration stops once set
    error: Option<AccumergeError>,
}

impl<K, V, C> MergeIter<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Build the working set by pulling the first entry of every source.
    /// `sources` must be in registration order.
    pub(crate) fn new(
        sources: Vec<MergeSource<K, V>>,
        policy: MatchingKeyPolicy,
        cmp: C,
        config: &MergerConfig,
    ) -> Self {
        let mut merge = Self {
            cursors: VecDeque::with_capacity(config.initial_cursor_capacity.max(1)),
            policy,
            cmp,
            max_size: 0,
            validate_sorted: config.validate_sorted,
            validate_size_hints: config.validate_size_hints,
            error: None,
        };

        for (age, source) in sources.into_iter().enumerate() {
            let MergeSource {
                mut entries,
                size_hint,
            } = source;
            merge.max_size = merge.max_size.saturating_add(size_hint);

            match entries.next() {
                Some(head) => merge.insert(Cursor {
                    entries,
                    head,
                    age,
                    pulled: 1,
                    size_hint,
                }),
                None => merge.exhausted(age, 0, size_hint),
            }
        }

        merge
    }

    /// Sum of the size hints of the merged sources
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of sources that still have entries
    pub fn active_sources(&self) -> usize {
        self.cursors.len()
    }

    /// Validation failure that stopped the merge, if any
    pub fn error(&self) -> Option<&AccumergeError> {
        self.error.as_ref()
    }

    /// Consume the iterator, reporting a validation failure if one occurred
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drain the remaining entries into a vector sized by the size hints
    ///
    /// Hints are advisory: at most 2^20 entries are reserved
    /// up front, and a failed reservation falls back to growing on demand.
    pub fn into_vec(mut self) -> Result<Vec<(K, V)>> {
        let mut entries = Vec::new();
        if entries
            .try_reserve(self.max_size.min(MAX_PREALLOCATED_ENTRIES))
            .is_err()
        {
            debug!(max_size = self.max_size, "Skipped merge preallocation");
        }
        entries.extend(self.by_ref());
        self.finish()?;
        Ok(entries)
    }

    // =========================================================================
    // Working Set Maintenance
    // =========================================================================

    /// Place `cursor` at its sorted position, resolving key collisions
    fn insert(&mut self, mut cursor: Cursor<K, V>) {
        loop {
            let slot = match self.cursors.front() {
                None => {
                    self.cursors.push_front(cursor);
                    return;
                }
                Some(second) => match (self.cmp)(&cursor.head.0, &second.head.0) {
                    Ordering::Less => {
                        self.cursors.push_front(cursor);
                        return;
                    }
                    Ordering::Equal => 0,
                    Ordering::Greater => {
                        let idx = self
                            .cursors
                            .partition_point(|c| (self.cmp)(&c.head.0, &cursor.head.0).is_lt());
                        let collides = self
                            .cursors
                            .get(idx)
                            .is_some_and(|c| (self.cmp)(&c.head.0, &cursor.head.0).is_eq());
                        if !collides {
                            self.cursors.insert(idx, cursor);
                            return;
                        }
                        idx
                    }
                },
            };

            // Equal keys: the loser skips its entry and goes round again
            let incumbent = &mut self.cursors[slot];
            let challenger_wins = self.policy.challenger_wins(cursor.age, incumbent.age);
            trace!(
                policy = %self.policy,
                challenger = cursor.age,
                incumbent = incumbent.age,
                challenger_wins,
                "Matching key collision"
            );
            if challenger_wins {
                mem::swap(incumbent, &mut cursor);
            }

            match cursor.entries.next() {
                None => {
                    self.exhausted(cursor.age, cursor.pulled, cursor.size_hint);
                    return;
                }
                Some(entry) => {
                    let skipped = mem::replace(&mut cursor.head, entry);
                    cursor.pulled += 1;
                    if !self.check_order(&cursor, &skipped.0) {
                        return;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Record a source running dry; checks its size hint when enabled
    fn exhausted(&mut self, age: usize, pulled: usize, size_hint: usize) {
        if self.validate_size_hints && pulled != size_hint {
            self.fail(AccumergeError::SizeHintMismatch {
                age,
                hint: size_hint,
                actual: pulled,
            });
        }
    }

    /// Check that `cursor.head` strictly follows `previous` in its source
    fn check_order(&mut self, cursor: &Cursor<K, V>, previous: &K) -> bool {
        if self.validate_sorted && !(self.cmp)(previous, &cursor.head.0).is_lt() {
            self.fail(AccumergeError::UnsortedSource {
                age: cursor.age,
                position: cursor.pulled - 1,
            });
            return false;
        }
        true
    }

    fn fail(&mut self, err: AccumergeError) {
        if self.error.is_none() {
            warn!(error = %err, "Merge validation failed");
            self.error = Some(err);
            self.cursors.clear();
        }
    }
}

impl<K, V, C> Iterator for MergeIter<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        if self.error.is_some() {
            return None;
        }
        let mut first = self.cursors.pop_front()?;

        match first.entries.next() {
            None => {
                self.exhausted(first.age, first.pulled, first.size_hint);
                Some(first.head)
            }
            Some(entry) => {
                let result = mem::replace(&mut first.head, entry);
                first.pulled += 1;
                if self.check_order(&first, &result.0) {
                    self.insert(first);
                }
                Some(result)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.error.is_some() {
            (0, Some(0))
        } else if self.validate_sorted || self.validate_size_hints {
            // A failed check may end the merge before the held heads are yielded
            (0, None)
        } else {
            // Every cursor holds a distinct key that will be yielded
            (self.cursors.len(), None)
        }
    }
}

impl<K, V, C> FusedIterator for MergeIter<K, V, C> where C: Fn(&K, &K) -> Ordering {}

impl<K, V, C> fmt::Debug for MergeIter<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeIter")
            .field("policy", &self.policy)
            .field("active_sources", &self.cursors.len())
            .field("max_size", &self.max_size)
            .field("error", &self.error)
            .finish()
    }
}
