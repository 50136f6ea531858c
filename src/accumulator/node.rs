//! Accumulator nodes
//!
//! Immutable, reference counted chain links shared by the accumulator and
//! every snapshot taken from it.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// One accumulated item and the link to the next-older node
pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) next: Link<T>,
}

/// Owning link to the rest of a chain.
///
/// Dropping a link releases the chain iteratively, so draining a chain of
/// millions of nodes does not recurse once per node.
pub(crate) struct Link<T>(pub(crate) Option<Arc<Node<T>>>);

impl<T> Drop for Link<T> {
    fn drop(&mut self) {
        let mut current = self.0.take();
        while let Some(node) = current {
            // Stop at the first node someone else still holds; the chain
            // below it is theirs to release.
            current = Arc::into_inner(node).and_then(|mut node| node.next.0.take());
        }
    }
}

/// Compares two heads by node identity
pub(crate) fn same_node<T>(a: &Option<Arc<Node<T>>>, b: &Option<Arc<Node<T>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

// =============================================================================
// Item Handle
// =============================================================================

/// Shared handle to an item returned by [`Accumulator::take`] and
/// [`Accumulator::peek`].
///
/// Snapshots taken earlier may still reference the same node, so the item is
/// borrowed through the handle rather than moved out. The node links to every
/// older item, so a live handle keeps that whole tail of the chain allocated.
///
/// [`Accumulator::take`]: super::Accumulator::take
/// [`Accumulator::peek`]: super::Accumulator::peek
pub struct ItemRef<T>(pub(crate) Arc<Node<T>>);

impl<T> ItemRef<T> {
    /// Move the item out if this handle is its last owner
    pub fn into_inner(self) -> Option<T> {
        Arc::into_inner(self.0).map(|node| node.item)
    }

    /// Whether two handles refer to the same accumulated item
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for ItemRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for ItemRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0.item
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0.item, f)
    }
}

impl<T: fmt::Display> fmt::Display for ItemRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.item, f)
    }
}
