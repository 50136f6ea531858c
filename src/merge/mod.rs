//! Merge Module
//!
//! Registry of pre-sorted key/value sources and their lazy k-way merge.
//!
//! ## Responsibilities
//! - Accept sorted sources from any thread (backed by an [`Accumulator`])
//! - Merge them into one sorted sequence on demand
//! - Resolve equal keys with a [`MatchingKeyPolicy`]
//! - Materialize the merge into sorted maps
//!
//! ## Preconditions
//! Every source must be strictly sorted by the comparator used to merge it.
//! This is not checked unless validation is enabled in [`MergerConfig`];
//! unsorted input otherwise produces an out-of-order result without any
//! diagnostic.
//!
//! [`Accumulator`]: crate::accumulator::Accumulator
//! [`MergerConfig`]: crate::config::MergerConfig

mod iterator;
mod policy;
mod sorted_map;
mod sorter;

use std::cmp::Ordering;

pub use iterator::MergeIter;
pub use policy::MatchingKeyPolicy;
pub use sorted_map::SortedEntryMap;
pub use sorter::SortedMerger;

/// Type-erased source of sorted entries
pub type BoxedEntries<K, V> = Box<dyn Iterator<Item = (K, V)> + Send>;

/// Comparator used when merging by the keys' natural order
pub type NaturalOrder<K> = fn(&K, &K) -> Ordering;
