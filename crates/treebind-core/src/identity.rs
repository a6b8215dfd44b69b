#![forbid(unsafe_code)]

//! Identity comparison for application data nodes.

use std::rc::Rc;
use std::sync::Arc;

/// Identity equality for data nodes.
///
/// Two handles are the same node when they point at the same allocation.
/// Field-wise equality is never consulted: two distinct nodes with equal
/// contents are different nodes.
pub trait NodeIdentity {
    /// Whether `self` and `other` refer to the same node.
    fn same_node(&self, other: &Self) -> bool;
}

impl<T: ?Sized> NodeIdentity for Rc<T> {
    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> NodeIdentity for Arc<T> {
    fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// Compare two optional nodes by identity; `None` equals only `None`.
#[must_use]
pub fn same_selection<D: NodeIdentity>(a: Option<&D>, b: Option<&D>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_node(b),
        (None, None) => true,
        _ => false,
    }
}

/// An optional selected node whose equality is identity-based.
///
/// This is the value type of the selection slot's observable, so writing the
/// node that is already held is a no-op even when `D` has no `PartialEq`.
#[derive(Debug)]
pub struct Selection<D>(pub Option<D>);

impl<D> Selection<D> {
    /// The empty selection.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Borrow the selected node, if any.
    #[must_use]
    pub fn node(&self) -> Option<&D> {
        self.0.as_ref()
    }

    /// Unwrap into the inner option.
    #[must_use]
    pub fn into_inner(self) -> Option<D> {
        self.0
    }
}

impl<D: Clone> Clone for Selection<D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<D> Default for Selection<D> {
    fn default() -> Self {
        Self(None)
    }
}

impl<D: NodeIdentity> PartialEq for Selection<D> {
    fn eq(&self, other: &Self) -> bool {
        same_selection(self.0.as_ref(), other.0.as_ref())
    }
}

impl<D> From<Option<D>> for Selection<D> {
    fn from(value: Option<D>) -> Self {
        Self(value)
    }
}
