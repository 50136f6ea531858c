//! Append Accumulator
//!
//! Lock-free FIFO counterpart of [`Accumulator`](super::Accumulator). Items
//! are linked after the current last node, so iteration follows insertion
//! order.
//!
//! ## Chain
//! ```text
//!  state (ArcSwapOption<Chain>)
//!    │
//!    ▼
//!  first ──▶ item 1 ──▶ item 2 ──▶ item 3 ──▶ (unset)
//!                                    ▲
//!  last (ArcSwap) ───────────────────┘
//! ```
//! A node's `next` is a set-once cell. An append first claims `last.next`,
//! then advances `last`; a competing append that loses the claim waits for
//! `last` to move and retries. Readers walk from `first` until they reach an
//! unset link, so they always see a prefix of the appends.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::{Arc, OnceLock};

use arc_swap::{ArcSwap, ArcSwapOption};
use crossbeam::utils::Backoff;

/// One appended item and the set-once link to the next-newer node
pub(crate) struct AppendNode<T> {
    item: T,
    next: NextLink<T>,
}

impl<T> AppendNode<T> {
    fn new(item: T) -> Arc<Self> {
        Arc::new(Self {
            item,
            next: NextLink(OnceLock::new()),
        })
    }
}

/// Forward link, released iteratively like the prepend chain
struct NextLink<T>(OnceLock<Arc<AppendNode<T>>>);

impl<T> Drop for NextLink<T> {
    fn drop(&mut self) {
        let mut current = self.0.take();
        while let Some(node) = current {
            current = Arc::into_inner(node).and_then(|mut node| node.next.0.take());
        }
    }
}

/// A non-empty chain: its first node and a pointer to its last one
struct Chain<T> {
    first: Arc<AppendNode<T>>,
    last: ArcSwap<AppendNode<T>>,
}

impl<T> Chain<T> {
    fn new(first: Arc<AppendNode<T>>) -> Self {
        Self {
            last: ArcSwap::new(Arc::clone(&first)),
            first,
        }
    }

    fn append(&self, node: Arc<AppendNode<T>>) {
        let backoff = Backoff::new();
        loop {
            let last = self.last.load_full();
            if last.next.0.set(Arc::clone(&node)).is_ok() {
                // Only the append that linked `last.next` may advance `last`
                let prev = self.last.compare_and_swap(&last, node);
                debug_assert!(Arc::ptr_eq(&prev, &last), "last advanced by another append");
                return;
            }
            backoff.snooze();
        }
    }
}

/// Concurrent append-only accumulator, iterated oldest first
///
/// ## Concurrency:
/// - `add`: lock-free; creates the chain with a CAS when empty
/// - `first`, `last`, `iterable`, `is_empty`: a single atomic load
/// - `clear_and_iterable`: a single atomic exchange
/// - `clear`: a plain store; an `add` racing with it may be discarded
///
/// Views are live: they start at the first node and follow links until an
/// unset one, so appends made after the view was taken show up when the
/// iteration reaches them. An `add` racing with a drain may land in the
/// drained chain.
pub struct AppendAccumulator<T> {
    state: ArcSwapOption<Chain<T>>,
}

impl<T> AppendAccumulator<T> {
    pub fn new() -> Self {
        Self {
            state: ArcSwapOption::empty(),
        }
    }

    /// Append an item after the current last one
    pub fn add(&self, item: T) {
        let node = AppendNode::new(item);
        let backoff = Backoff::new();
        loop {
            if let Some(chain) = self.state.load_full() {
                chain.append(node);
                return;
            }

            let empty: Option<Arc<Chain<T>>> = None;
            let chain = Arc::new(Chain::new(Arc::clone(&node)));
            let prev = self.state.compare_and_swap(&empty, Some(chain));
            if prev.is_none() {
                return;
            }
            // Another add created the chain first; append to it instead
            backoff.spin();
        }
    }

    /// Append every item of `items`, in order
    pub fn add_all<I: IntoIterator<Item = T>>(&self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    /// The earliest added item
    pub fn first(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state.load_full().map(|chain| chain.first.item.clone())
    }

    /// The most recently linked item
    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state
            .load_full()
            .map(|chain| chain.last.load().item.clone())
    }

    /// Live view of the current chain; the accumulator is left untouched
    pub fn iterable(&self) -> AppendView<T> {
        AppendView::new(self.state.load_full())
    }

    /// Empty the accumulator and return the chain it held
    pub fn clear_and_iterable(&self) -> AppendView<T> {
        AppendView::new(self.state.swap(None))
    }

    /// Empty the accumulator and iterate the drained items by value
    pub fn clear_and_iter(&self) -> AppendIntoIter<T>
    where
        T: Clone,
    {
        AppendIntoIter::new(self.state.swap(None))
    }

    pub fn is_empty(&self) -> bool {
        self.state.load().is_none()
    }

    /// Discard every item
    pub fn clear(&self) {
        self.state.store(None);
    }
}

impl<T> Default for AppendAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for AppendAccumulator<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let acc = Self::new();
        acc.add_all(iter);
        acc
    }
}

impl<T> Extend<T> for AppendAccumulator<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T: fmt::Debug> fmt::Debug for AppendAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.iterable(), f)
    }
}

// =============================================================================
// Views & Iterators
// =============================================================================

/// View over an append chain, oldest item first
pub struct AppendView<T> {
    first: Option<Arc<AppendNode<T>>>,
}

impl<T> AppendView<T> {
    fn new(chain: Option<Arc<Chain<T>>>) -> Self {
        Self {
            first: chain.map(|chain| Arc::clone(&chain.first)),
        }
    }

    /// The earliest item, if any
    pub fn first(&self) -> Option<&T> {
        self.first.as_deref().map(|node| &node.item)
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Number of items currently linked (walks the chain)
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> AppendIter<'_, T> {
        AppendIter {
            next: self.first.as_deref(),
        }
    }
}

impl<T> Clone for AppendView<T> {
    fn clone(&self) -> Self {
        Self {
            first: self.first.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AppendView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a AppendView<T> {
    type Item = &'a T;
    type IntoIter = AppendIter<'a, T>;

    fn into_iter(self) -> AppendIter<'a, T> {
        self.iter()
    }
}

/// Borrowing iterator over an [`AppendView`]
pub struct AppendIter<'a, T> {
    next: Option<&'a AppendNode<T>>,
}

impl<'a, T> Iterator for AppendIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        self.next = node.next.0.get().map(|next| &**next);
        Some(&node.item)
    }
}

impl<T> Clone for AppendIter<'_, T> {
    fn clone(&self) -> Self {
        Self { next: self.next }
    }
}

/// Owning iterator over a drained append chain
///
/// Unshared nodes give up their items; shared ones are cloned.
pub struct AppendIntoIter<T> {
    next: Option<Arc<AppendNode<T>>>,
}

impl<T> AppendIntoIter<T> {
    fn new(chain: Option<Arc<Chain<T>>>) -> Self {
        let next = chain.map(|chain| match Arc::try_unwrap(chain) {
            Ok(Chain { first, last }) => {
                // Release the tail pointer so the last node can be unwrapped
                drop(last);
                first
            }
            Err(shared) => Arc::clone(&shared.first),
        });
        Self { next }
    }
}

impl<T: Clone> Iterator for AppendIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = self.next.take()?;
        match Arc::try_unwrap(node) {
            Ok(mut node) => {
                self.next = node.next.0.take();
                Some(node.item)
            }
            Err(shared) => {
                self.next = shared.next.0.get().cloned();
                Some(shared.item.clone())
            }
        }
    }
}

impl<T: Clone> FusedIterator for AppendIntoIter<T> {}
