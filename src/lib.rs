//! # accumerge
//!
//! Concurrent accumulation and k-way merging of sorted data:
//! - Lock-free prepend accumulator with O(1) atomic drain
//! - Lock-free FIFO append accumulator
//! - Immutable, repeatable snapshots of accumulated items
//! - Lazy k-way merge of pre-sorted key/value sources
//! - Pluggable resolution of equal keys across sources
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Producer threads                            │
//! │           add(entries, size_hint) concurrently               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  SortedMerger                                │
//! │          pending sources in an Accumulator (CAS)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ clear_and_iterable (atomic drain)
//!                       ▼
//!               ┌───────────────┐
//!               │   MergeIter   │  MatchingKeyPolicy
//!               │ (k-way merge) │◀──────────────────
//!               └───────┬───────┘
//!                       │
//!          ┌────────────┼────────────────┐
//!          ▼            ▼                ▼
//!   ┌────────────┐ ┌──────────┐ ┌────────────────┐
//!   │  BTreeMap  │ │ SkipMap  │ │ SortedEntryMap │
//!   └────────────┘ └──────────┘ └────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod accumulator;
pub mod merge;
pub mod tsv;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AccumergeError, Result};
pub use config::MergerConfig;
pub use accumulator::{Accumulator, AppendAccumulator, Snapshot};
pub use merge::{MatchingKeyPolicy, MergeIter, SortedEntryMap, SortedMerger};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of accumerge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
