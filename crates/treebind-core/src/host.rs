#![forbid(unsafe_code)]

//! Widget capabilities consumed by the synchronization core.
//!
//! A [`TreeHost`] is the live tree widget. The core never owns or caches its
//! containers: a container is an opaque handle obtained from an accessor and
//! handed straight back to the widget. Every lookup is fallible because the
//! widget realizes containers lazily.
//!
//! # Handle contract
//!
//! A `Container` handle must stay valid across `set_expanded`,
//! `realize_children`, `set_selected`, focus and scroll calls on the same
//! widget. Structural edits to the underlying model (items added or removed)
//! may invalidate it; the core never holds a handle across such an edit.

use std::fmt;
use std::rc::Rc;

use crate::identity::NodeIdentity;

/// Payload of the widget's native "selection changed" notification.
#[derive(Debug, Clone)]
pub struct SelectionChanged<D> {
    /// Data node that was selected before the change.
    pub old: Option<D>,
    /// Data node that is selected now.
    pub new: Option<D>,
}

/// Handler registered with a widget for selection-changed notifications.
pub type SelectionHandler<D> = Rc<dyn Fn(&SelectionChanged<D>)>;

/// Token returned by [`TreeHost::subscribe_selection_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Wrap a raw id. Widgets mint these; callers treat them as opaque.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// A hierarchically rendered, lazily realized tree widget.
pub trait TreeHost {
    /// Application data node shown by one row.
    type Item: NodeIdentity + Clone + 'static;
    /// Opaque handle to a realized visual container.
    type Container: Clone + fmt::Debug;

    /// Top-level data items, in display order.
    fn root_items(&self) -> Vec<Self::Item>;

    /// Container for a top-level item, realizing it if the widget can.
    fn container_from_item(&mut self, item: &Self::Item) -> Option<Self::Container>;

    /// Data node behind a container.
    fn item_of(&self, container: &Self::Container) -> Option<Self::Item>;

    /// Whether the container is expanded.
    fn is_expanded(&self, container: &Self::Container) -> bool;

    /// Expand or collapse a container.
    fn set_expanded(&mut self, container: &Self::Container, expanded: bool);

    /// Force the widget to generate child containers for an expanded
    /// container (template/layout realization it would otherwise defer).
    ///
    /// Returns `false` when the container has no items host, in which case
    /// its children cannot be reached.
    fn realize_children(&mut self, container: &Self::Container) -> bool;

    /// Number of child items under a container.
    fn child_count(&self, container: &Self::Container) -> usize;

    /// Container of the `index`th child, or `None` when the widget has not
    /// produced it.
    fn container_from_index(
        &mut self,
        container: &Self::Container,
        index: usize,
    ) -> Option<Self::Container>;

    /// Whether the container is the selected one.
    fn is_selected(&self, container: &Self::Container) -> bool;

    /// Select or deselect a container. Selecting fires the widget's
    /// selection-changed notification.
    fn set_selected(&mut self, container: &Self::Container, selected: bool);

    /// Move input focus to a container.
    fn focus_container(&mut self, container: &Self::Container);

    /// Move input focus to the widget itself.
    fn focus(&mut self);

    /// Scroll so the container is inside the visible viewport.
    fn bring_into_view(&mut self, container: &Self::Container);

    /// Data node of the currently selected container.
    fn selected_item(&self) -> Option<Self::Item>;

    /// Register a selection-changed handler.
    fn subscribe_selection_changed(&mut self, handler: SelectionHandler<Self::Item>) -> HandlerId;

    /// Remove a handler. Returns `false` if the id was not registered.
    fn unsubscribe_selection_changed(&mut self, id: HandlerId) -> bool;
}
