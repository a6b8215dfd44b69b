#![forbid(unsafe_code)]

//! The bindable "selected item" cell.

use std::fmt;

use treebind_reactive::{Observable, Subscription};

use crate::identity::{NodeIdentity, Selection};

/// Two-way bindable cell holding the selected data node.
///
/// Cloning yields another handle to the same cell, so application code and
/// the behavior can each hold one. Writes notify subscribers synchronously;
/// writing the node already held (by identity) notifies nobody.
pub struct SelectionSlot<D> {
    cell: Observable<Selection<D>>,
}

impl<D> Clone for SelectionSlot<D> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for SelectionSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSlot")
            .field("cell", &self.cell)
            .finish()
    }
}

impl<D: NodeIdentity + Clone + 'static> Default for SelectionSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NodeIdentity + Clone + 'static> SelectionSlot<D> {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Observable::new(Selection::none()),
        }
    }

    /// A slot holding `initial`.
    #[must_use]
    pub fn with_value(initial: Option<D>) -> Self {
        Self {
            cell: Observable::new(Selection(initial)),
        }
    }

    /// Currently selected node.
    #[must_use]
    pub fn get(&self) -> Option<D> {
        self.cell.get().into_inner()
    }

    /// Whether the slot currently holds `node` (by identity).
    #[must_use]
    pub fn holds(&self, node: &D) -> bool {
        self.cell
            .with(|sel| sel.node().is_some_and(|cur| cur.same_node(node)))
    }

    /// Write a new selection. Returns `true` when subscribers were notified.
    pub fn set(&self, value: Option<D>) -> bool {
        self.cell.set(Selection(value))
    }

    /// Clear the selection.
    pub fn clear(&self) -> bool {
        self.set(None)
    }

    /// Observe writes. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(Option<&D>) + 'static) -> Subscription {
        self.cell.subscribe(move |sel: &Selection<D>| callback(sel.node()))
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Row(&'static str);

    #[test]
    fn starts_empty() {
        let slot = SelectionSlot::<Rc<Row>>::new();
        assert!(slot.get().is_none());
        assert_eq!(slot.version(), 0);
    }

    #[test]
    fn same_reference_does_not_notify() {
        let slot = SelectionSlot::new();
        let row = Rc::new(Row("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = slot.subscribe(move |v: Option<&Rc<Row>>| {
            seen_clone.borrow_mut().push(v.map(|r| r.0));
        });

        assert!(slot.set(Some(Rc::clone(&row))));
        assert!(!slot.set(Some(Rc::clone(&row))));
        assert_eq!(*seen.borrow(), vec![Some("a")]);
        assert!(slot.holds(&row));
    }

    #[test]
    fn structurally_equal_node_is_a_change() {
        let slot = SelectionSlot::with_value(Some(Rc::new(Row("a"))));
        assert!(slot.set(Some(Rc::new(Row("a")))));
        assert_eq!(slot.version(), 1);
    }

    #[test]
    fn clear_notifies_with_none() {
        let slot = SelectionSlot::with_value(Some(Rc::new(Row("a"))));
        let cleared = Rc::new(RefCell::new(false));
        let cleared_clone = Rc::clone(&cleared);
        let _sub = slot.subscribe(move |v: Option<&Rc<Row>>| {
            *cleared_clone.borrow_mut() = v.is_none();
        });
        assert!(slot.clear());
        assert!(*cleared.borrow());
        assert!(!slot.clear());
    }

    #[test]
    fn clones_share_the_cell() {
        let a = SelectionSlot::new();
        let b = a.clone();
        let row = Rc::new(Row("x"));
        a.set(Some(Rc::clone(&row)));
        assert!(b.holds(&row));
    }

    mod props {
        use super::Row;
        use crate::slot::SelectionSlot;
        use proptest::prelude::*;
        use std::cell::Cell;
        use std::rc::Rc;

        proptest! {
            /// Writes drawn from a small pool of nodes (and `None`) notify
            /// exactly when the held node changes identity.
            #[test]
            fn notifications_track_identity_transitions(
                picks in proptest::collection::vec(proptest::option::of(0usize..3), 0..48),
            ) {
                let pool: Vec<Rc<Row>> = ["a", "b", "a"].into_iter().map(|n| Rc::new(Row(n))).collect();
                let slot = SelectionSlot::new();
                let notified = Rc::new(Cell::new(0u64));
                let notified_clone = Rc::clone(&notified);
                let _sub = slot.subscribe(move |_: Option<&Rc<Row>>| {
                    notified_clone.set(notified_clone.get() + 1);
                });

                let mut held: Option<usize> = None;
                let mut transitions = 0u64;
                for pick in picks {
                    let changed = slot.set(pick.map(|i| Rc::clone(&pool[i])));
                    prop_assert_eq!(changed, pick != held);
                    if pick != held {
                        transitions += 1;
                        held = pick;
                    }
                    match held {
                        Some(i) => prop_assert!(slot.holds(&pool[i])),
                        None => prop_assert!(slot.get().is_none()),
                    }
                }
                prop_assert_eq!(slot.version(), transitions);
                prop_assert_eq!(notified.get(), transitions);
            }
        }
    }
}
