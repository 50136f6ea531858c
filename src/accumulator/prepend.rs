//! Prepend Accumulator
//!
//! Lock-free singly-linked accumulator. Items are prepended with a
//! compare-and-swap loop on the head; consumers drain the whole chain with a
//! single atomic exchange.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use crossbeam::utils::Backoff;

use super::node::{same_node, ItemRef, Link, Node};
use super::snapshot::{IntoIter, Snapshot};

/// Concurrent prepend-only accumulator
///
/// ## Concurrency:
/// - `add`, `add_if_empty`, `take`: lock-free CAS loops on `head`
/// - `peek`, `iterable`, `is_empty`: a single atomic load
/// - `clear_and_iterable`: a single atomic exchange
/// - `clear`: a plain store; an `add` racing with it may be discarded
///
/// All methods take `&self`; share the accumulator between threads with
/// an `Arc`.
pub struct Accumulator<T> {
    /// Most recently added node, `None` when empty
    head: ArcSwapOption<Node<T>>,
}

impl<T> Accumulator<T> {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            head: ArcSwapOption::empty(),
        }
    }

    /// Prepend an item
    ///
    /// Retries until the head swap succeeds; contention only lasts for a
    /// single pointer swap, so there is no retry bound.
    pub fn add(&self, item: T) {
        let mut node = Arc::new(Node {
            item,
            next: Link(self.head.load_full()),
        });
        let backoff = Backoff::new();
        loop {
            let prev = self
                .head
                .compare_and_swap(&node.next.0, Some(Arc::clone(&node)));
            if same_node(&prev, &node.next.0) {
                return;
            }

            // Lost the race: relink onto the head that beat us and retry
            let current = (*prev).clone();
            drop(prev);
            match Arc::get_mut(&mut node) {
                Some(unpublished) => unpublished.next = Link(current),
                None => unreachable!("a node rejected by the head swap is never shared"),
            }
            backoff.spin();
        }
    }

    /// Prepend an item only if the accumulator is empty at this instant
    ///
    /// Makes a single attempt. On success the accumulator holds exactly
    /// this item.
    pub fn add_if_empty(&self, item: T) -> bool {
        let node = Arc::new(Node {
            item,
            next: Link(None),
        });
        let empty: Option<Arc<Node<T>>> = None;
        let prev = self.head.compare_and_swap(&empty, Some(node));
        prev.is_none()
    }

    /// Prepend every item of `items`, in order
    pub fn add_all<I: IntoIterator<Item = T>>(&self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    /// Remove and return the most recently added item (LIFO)
    ///
    /// The handle shares the removed node, which still links to the older
    /// items. Holding it keeps those items alive even after they are taken
    /// or drained; use [`ItemRef::into_inner`] or drop it to release them.
    pub fn take(&self) -> Option<ItemRef<T>> {
        let backoff = Backoff::new();
        loop {
            let current = self.head.load_full();
            let node = current.as_ref()?;
            let prev = self.head.compare_and_swap(&current, node.next.0.clone());
            if same_node(&prev, &current) {
                return Some(ItemRef(Arc::clone(node)));
            }
            backoff.spin();
        }
    }

    /// The most recently added item, without removing it
    ///
    /// The result may already be stale when the caller looks at it. Like
    /// [`take`](Self::take), the handle keeps the older items alive.
    pub fn peek(&self) -> Option<ItemRef<T>> {
        self.head.load_full().map(ItemRef)
    }

    /// Snapshot of the current chain; the accumulator is left untouched
    pub fn iterable(&self) -> Snapshot<T> {
        Snapshot::new(self.head.load_full())
    }

    /// Empty the accumulator and return the chain it held
    ///
    /// O(1) regardless of chain length. Adds that happen afterwards build a
    /// new chain and are not visible through the returned snapshot.
    pub fn clear_and_iterable(&self) -> Snapshot<T> {
        Snapshot::new(self.head.swap(None))
    }

    /// Empty the accumulator and iterate the drained items by value
    ///
    /// Items are moved out of nodes that nothing else references. `T: Clone`
    /// is only exercised for nodes still shared with a snapshot or an
    /// [`ItemRef`]; [`clear_and_iterable`](Self::clear_and_iterable) drains
    /// any `T` by reference.
    pub fn clear_and_iter(&self) -> IntoIter<T>
    where
        T: Clone,
    {
        IntoIter::new(self.head.swap(None))
    }

    pub fn is_empty(&self) -> bool {
        self.head.load().is_none()
    }

    /// Discard every item
    pub fn clear(&self) {
        self.head.store(None);
    }
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an accumulator that iterates in the same order as `iter`
impl<T> FromIterator<T> for Accumulator<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let mut head = None;
        for item in items.into_iter().rev() {
            head = Some(Arc::new(Node {
                item,
                next: Link(head),
            }));
        }
        Self {
            head: ArcSwapOption::new(head),
        }
    }
}

impl<T> Extend<T> for Accumulator<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T: fmt::Debug> fmt::Debug for Accumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.iterable(), f)
    }
}
