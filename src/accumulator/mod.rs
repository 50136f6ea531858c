//! Accumulator Module
//!
//! Lock-free container that many threads add to and one consumer drains.
//!
//! ## Responsibilities
//! - Prepend items from any number of threads without locking
//! - Drain everything at once in O(1) (atomic head exchange)
//! - Hand out immutable snapshots that later adds never disturb
//!
//! ## Data Structure
//! ```text
//!  head (ArcSwapOption)
//!    │
//!    ▼
//! ┌────────┐    ┌────────┐    ┌────────┐
//! │ item 3 │───▶│ item 2 │───▶│ item 1 │───▶ None
//! └────────┘    └────────┘    └────────┘
//!  newest                       oldest
//! ```
//! A node's `next` link is written once, before the node is published by
//! the head compare-and-swap, so any thread that observes a head also
//! observes the complete chain beneath it. Iteration order is the reverse
//! of insertion order.
//!
//! [`AppendAccumulator`] is the FIFO variant: it links new items after the
//! last one, so its views iterate in insertion order.

mod append;
mod node;
mod prepend;
mod snapshot;

pub use append::{AppendAccumulator, AppendIntoIter, AppendIter, AppendView};
pub use node::ItemRef;
pub use prepend::Accumulator;
pub use snapshot::{IntoIter, Iter, Snapshot};
