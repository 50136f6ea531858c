//! Accumulator snapshots
//!
//! A snapshot is a point-in-time view of an accumulator's chain. The nodes
//! it references never change, so iterating the same snapshot always yields
//! the same items in the same order.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use super::node::Node;

/// Immutable view over an accumulator chain (newest item first)
pub struct Snapshot<T> {
    head: Option<Arc<Node<T>>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(head: Option<Arc<Node<T>>>) -> Self {
        Self { head }
    }

    /// The first (most recently added) item, if any
    pub fn peek(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.item)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of items (walks the chain)
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Iterate the items by reference, newest first
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { head: None }
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for Snapshot<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.head)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over a snapshot
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        self.next = node.next.0.as_deref();
        Some(&node.item)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { next: self.next }
    }
}

/// Owning iterator over a drained chain.
///
/// Nodes that nobody else references are unwrapped and their items moved
/// out; nodes still shared with another snapshot are cloned.
pub struct IntoIter<T> {
    next: Option<Arc<Node<T>>>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(head: Option<Arc<Node<T>>>) -> Self {
        Self { next: head }
    }
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = self.next.take()?;
        match Arc::try_unwrap(node) {
            Ok(mut node) => {
                self.next = node.next.0.take();
                Some(node.item)
            }
            Err(shared) => {
                self.next = shared.next.0.clone();
                Some(shared.item.clone())
            }
        }
    }
}

impl<T: Clone> FusedIterator for IntoIter<T> {}
