#![forbid(unsafe_code)]

//! Lazily realized tree widget.
//!
//! [`LazyTree`] holds a forest of [`TreeNode`]s and hands out containers the
//! way a virtualizing toolkit does: a top-level row always has one, but a
//! child row only gets a container once its parent is expanded *and* the
//! widget has generated that parent's child containers (during a layout
//! pass, a user toggle, or an explicit [`TreeHost::realize_children`]).
//! Children registered with [`TreeNode::with_lazy_children`] are not even
//! attached to the model until the first expansion.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use treebind_widgets::tree::{LazyTree, TreeNode};
//!
//! let tree = LazyTree::new(vec![
//!     TreeNode::new(Rc::new("src"))
//!         .child(TreeNode::new(Rc::new("main.rs")))
//!         .child(TreeNode::new(Rc::new("lib.rs"))),
//!     TreeNode::new(Rc::new("Cargo.toml")),
//! ]);
//!
//! // Collapsed: only the two top-level rows are visible.
//! assert_eq!(tree.visible_rows().len(), 2);
//! ```

use std::fmt;
use std::rc::Rc;

use treebind_core::{HandlerId, NodeIdentity, SelectionChanged, SelectionHandler, TreeHost};

/// Address of a container: child indices starting from the top-level list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerPath(Vec<usize>);

impl ContainerPath {
    /// Path of the `index`th top-level row.
    #[must_use]
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Build from raw indices. An empty slice addresses nothing.
    #[must_use]
    pub fn from_indices(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }

    /// Path of this container's `index`th child.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path, `None` for top-level rows.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Depth of the container (top-level rows are 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The raw indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{idx}")?;
        }
        Ok(())
    }
}

/// A node in the tree hierarchy.
#[derive(Debug, Clone)]
pub struct TreeNode<D> {
    item: D,
    children: Vec<TreeNode<D>>,
    /// Attached to `children` on first expansion.
    lazy_children: Option<Vec<TreeNode<D>>>,
    expanded: bool,
    /// Child containers have been generated.
    generated: bool,
    /// The widget withholds this node's container.
    deferred: bool,
}

impl<D> TreeNode<D> {
    /// Create a collapsed node for `item`.
    #[must_use]
    pub fn new(item: D) -> Self {
        Self {
            item,
            children: Vec::new(),
            lazy_children: None,
            expanded: false,
            generated: false,
            deferred: false,
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode<D>) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode<D>>) -> Self {
        self.children = nodes;
        self
    }

    /// Configure lazily materialized children.
    ///
    /// They are attached to the node when it is first expanded.
    #[must_use]
    pub fn with_lazy_children(mut self, nodes: Vec<TreeNode<D>>) -> Self {
        self.lazy_children = Some(nodes);
        self.expanded = false;
        self
    }

    /// Start expanded (children laid out) or collapsed.
    #[must_use]
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        if expanded {
            self.materialize_lazy_children();
            self.generated = true;
        }
        self.expanded = expanded;
        self
    }

    /// Never generate a container for this node.
    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// The data node.
    #[must_use]
    pub fn item(&self) -> &D {
        &self.item
    }

    /// Materialized children.
    #[must_use]
    pub fn children(&self) -> &[TreeNode<D>] {
        &self.children
    }

    /// Whether this node has loaded or lazy children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
            || self
                .lazy_children
                .as_ref()
                .is_some_and(|children| !children.is_empty())
    }

    /// Whether this node is expanded.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the widget has generated this node's child containers.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Whether the widget withholds this node's container.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn materialize_lazy_children(&mut self) {
        if let Some(mut lazy) = self.lazy_children.take() {
            self.children.append(&mut lazy);
        }
    }

    /// Count all visible (expanded) nodes, including this one.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        let mut count = 1;
        if self.expanded {
            for child in &self.children {
                count += child.visible_count();
            }
        }
        count
    }

    /// Generate child containers of every visible expanded node.
    fn layout(&mut self) {
        if !self.expanded {
            return;
        }
        self.materialize_lazy_children();
        self.generated = true;
        for child in &mut self.children {
            child.layout();
        }
    }
}

/// One sanctioned mutation, recorded in the widget's journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMutation {
    /// A container was expanded.
    Expanded(ContainerPath),
    /// A container was collapsed.
    Collapsed(ContainerPath),
    /// Child containers were generated.
    Realized(ContainerPath),
    /// A container became the selection.
    Selected(ContainerPath),
    /// The selected container was deselected.
    Deselected(ContainerPath),
    /// A container received input focus.
    FocusedContainer(ContainerPath),
    /// The widget received input focus.
    FocusedHost,
    /// A container was scrolled into view; carries the new scroll offset.
    BroughtIntoView(ContainerPath, usize),
}

/// Virtualizing, single-selection tree widget.
pub struct LazyTree<D> {
    roots: Vec<TreeNode<D>>,
    selected: Option<ContainerPath>,
    focused_container: Option<ContainerPath>,
    has_focus: bool,
    scroll_offset: usize,
    /// Rows in the viewport; 0 means unbounded.
    viewport_height: usize,
    handlers: Vec<(HandlerId, SelectionHandler<D>)>,
    next_handler: u64,
    journal: Vec<TreeMutation>,
}

impl<D: fmt::Debug> fmt::Debug for LazyTree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTree")
            .field("roots", &self.roots)
            .field("selected", &self.selected)
            .field("focused_container", &self.focused_container)
            .field("has_focus", &self.has_focus)
            .field("scroll_offset", &self.scroll_offset)
            .field("viewport_height", &self.viewport_height)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl<D> LazyTree<D> {
    /// Create a widget over the given top-level nodes.
    #[must_use]
    pub fn new(roots: Vec<TreeNode<D>>) -> Self {
        Self {
            roots,
            selected: None,
            focused_container: None,
            has_focus: false,
            scroll_offset: 0,
            viewport_height: 0,
            handlers: Vec::new(),
            next_handler: 0,
            journal: Vec::new(),
        }
    }

    /// Limit the viewport to `rows` rows (0 = unbounded).
    #[must_use]
    pub fn with_viewport_height(mut self, rows: usize) -> Self {
        self.viewport_height = rows;
        self
    }

    /// Top-level nodes.
    #[must_use]
    pub fn roots(&self) -> &[TreeNode<D>] {
        &self.roots
    }

    /// First visible row.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Whether the widget holds input focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Container holding input focus.
    #[must_use]
    pub fn focused_container(&self) -> Option<&ContainerPath> {
        self.focused_container.as_ref()
    }

    /// Path of the selected container.
    #[must_use]
    pub fn selected_path(&self) -> Option<&ContainerPath> {
        self.selected.as_ref()
    }

    /// Recorded mutations since the last drain.
    #[must_use]
    pub fn journal(&self) -> &[TreeMutation] {
        &self.journal
    }

    /// Drain the mutation journal.
    pub fn take_journal(&mut self) -> Vec<TreeMutation> {
        std::mem::take(&mut self.journal)
    }

    /// Number of registered selection handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Model node at `path`, whether or not it has a container.
    #[must_use]
    pub fn node(&self, path: &ContainerPath) -> Option<&TreeNode<D>> {
        let (first, rest) = path.indices().split_first()?;
        let mut current = self.roots.get(*first)?;
        for &idx in rest {
            current = current.children.get(idx)?;
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &ContainerPath) -> Option<&mut TreeNode<D>> {
        let (first, rest) = path.indices().split_first()?;
        let mut current = self.roots.get_mut(*first)?;
        for &idx in rest {
            current = current.children.get_mut(idx)?;
        }
        Some(current)
    }

    /// Node at `path` if it has a container: every ancestor is expanded and
    /// has generated its child containers.
    fn container_node(&self, path: &ContainerPath) -> Option<&TreeNode<D>> {
        let (first, rest) = path.indices().split_first()?;
        let mut current = self.roots.get(*first)?;
        if current.deferred {
            return None;
        }
        for &idx in rest {
            if !(current.expanded && current.generated) {
                return None;
            }
            current = current.children.get(idx)?;
            if current.deferred {
                return None;
            }
        }
        Some(current)
    }

    fn container_node_mut(&mut self, path: &ContainerPath) -> Option<&mut TreeNode<D>> {
        if self.container_node(path).is_none() {
            return None;
        }
        self.node_mut(path)
    }

    /// Whether `path` currently has a container.
    #[must_use]
    pub fn is_realized(&self, path: &ContainerPath) -> bool {
        self.container_node(path).is_some()
    }

    /// Withhold or release the container for the node at `path`.
    pub fn set_deferred(&mut self, path: &ContainerPath, deferred: bool) -> bool {
        match self.node_mut(path) {
            Some(node) => {
                node.deferred = deferred;
                true
            }
            None => false,
        }
    }

    /// Flattened visible rows, in display order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<ContainerPath> {
        let mut rows = Vec::new();
        let mut path = Vec::new();
        for (idx, root) in self.roots.iter().enumerate() {
            path.push(idx);
            Self::collect_visible(root, &mut path, &mut rows);
            path.pop();
        }
        rows
    }

    fn collect_visible(node: &TreeNode<D>, path: &mut Vec<usize>, rows: &mut Vec<ContainerPath>) {
        if node.deferred {
            return;
        }
        rows.push(ContainerPath(path.clone()));
        if !node.expanded {
            return;
        }
        for (idx, child) in node.children.iter().enumerate() {
            path.push(idx);
            Self::collect_visible(child, path, rows);
            path.pop();
        }
    }

    /// Visible row index of `path`.
    #[must_use]
    pub fn row_of(&self, path: &ContainerPath) -> Option<usize> {
        self.visible_rows().iter().position(|row| row == path)
    }

    /// Visible rows inside the viewport window.
    #[must_use]
    pub fn viewport_rows(&self) -> Vec<ContainerPath> {
        let rows = self.visible_rows();
        let start = self.scroll_offset.min(rows.len());
        let end = if self.viewport_height == 0 {
            rows.len()
        } else {
            (start + self.viewport_height).min(rows.len())
        };
        rows[start..end].to_vec()
    }

    /// Layout pass: generate child containers under every visible expanded node.
    pub fn layout(&mut self) {
        for root in &mut self.roots {
            root.layout();
        }
    }

    /// Move input focus elsewhere.
    pub fn blur(&mut self) {
        self.has_focus = false;
        self.focused_container = None;
    }

    fn expand_at(&mut self, path: &ContainerPath, expanded: bool) -> bool {
        let Some(node) = self.container_node_mut(path) else {
            return false;
        };
        if expanded {
            node.materialize_lazy_children();
        }
        if node.expanded == expanded {
            return false;
        }
        node.expanded = expanded;
        self.journal.push(if expanded {
            TreeMutation::Expanded(path.clone())
        } else {
            TreeMutation::Collapsed(path.clone())
        });
        true
    }

    /// User expand/collapse of the row at `row`. Expanding lays out children.
    ///
    /// Returns `true` when a node with children was toggled.
    pub fn toggle_row(&mut self, row: usize) -> bool {
        self.layout();
        let Some(path) = self.visible_rows().get(row).cloned() else {
            return false;
        };
        let Some(node) = self.node(&path) else {
            return false;
        };
        if !node.has_children() {
            return false;
        }
        let expand = !node.expanded;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "tree.toggle",
            action = if expand { "expand" } else { "collapse" },
            path = %path,
        );
        self.expand_at(&path, expand);
        if expand && let Some(node) = self.node_mut(&path) {
            node.layout();
        }
        true
    }

    fn scroll_to(&mut self, path: &ContainerPath) -> Option<usize> {
        let row = self.row_of(path)?;
        if self.viewport_height > 0 {
            if row < self.scroll_offset {
                self.scroll_offset = row;
            } else if row >= self.scroll_offset + self.viewport_height {
                self.scroll_offset = row + 1 - self.viewport_height;
            }
        }
        Some(self.scroll_offset)
    }
}

impl<D: NodeIdentity + Clone + 'static> LazyTree<D> {
    /// Replace the model. Selection and focus are dropped.
    pub fn set_items(&mut self, roots: Vec<TreeNode<D>>) {
        let old = self.selected_item();
        self.roots = roots;
        self.selected = None;
        self.focused_container = None;
        self.scroll_offset = 0;
        if old.is_some() {
            self.fire(old, None);
        }
    }

    /// User click on the row at `row`: selects it.
    ///
    /// Returns `true` when the row exists.
    pub fn click_row(&mut self, row: usize) -> bool {
        self.layout();
        let Some(path) = self.visible_rows().get(row).cloned() else {
            return false;
        };
        self.set_selected(&path, true);
        self.focus_container(&path);
        true
    }

    /// Path of the first node whose item is `item`, searching the whole
    /// model (not just realized containers), pre-order.
    #[must_use]
    pub fn find_path(&self, item: &D) -> Option<ContainerPath> {
        fn walk<D: NodeIdentity>(
            node: &TreeNode<D>,
            item: &D,
            path: &mut Vec<usize>,
        ) -> Option<ContainerPath> {
            if node.item.same_node(item) {
                return Some(ContainerPath(path.clone()));
            }
            for (idx, child) in node.children.iter().enumerate() {
                path.push(idx);
                if let Some(found) = walk(child, item, path) {
                    return Some(found);
                }
                path.pop();
            }
            None
        }

        let mut path = Vec::new();
        for (idx, root) in self.roots.iter().enumerate() {
            path.push(idx);
            if let Some(found) = walk(root, item, &mut path) {
                return Some(found);
            }
            path.pop();
        }
        None
    }

    fn fire(&self, old: Option<D>, new: Option<D>) {
        let event = SelectionChanged { old, new };
        let handlers: Vec<SelectionHandler<D>> =
            self.handlers.iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(&event);
        }
    }
}

impl<D: NodeIdentity + Clone + 'static> TreeHost for LazyTree<D> {
    type Item = D;
    type Container = ContainerPath;

    fn root_items(&self) -> Vec<D> {
        self.roots.iter().map(|n| n.item.clone()).collect()
    }

    fn container_from_item(&mut self, item: &D) -> Option<ContainerPath> {
        self.roots
            .iter()
            .position(|n| n.item.same_node(item) && !n.deferred)
            .map(ContainerPath::root)
    }

    fn item_of(&self, container: &ContainerPath) -> Option<D> {
        self.container_node(container).map(|n| n.item.clone())
    }

    fn is_expanded(&self, container: &ContainerPath) -> bool {
        self.container_node(container).is_some_and(|n| n.expanded)
    }

    fn set_expanded(&mut self, container: &ContainerPath, expanded: bool) {
        self.expand_at(container, expanded);
    }

    fn realize_children(&mut self, container: &ContainerPath) -> bool {
        let Some(node) = self.container_node_mut(container) else {
            return false;
        };
        if node.expanded && !node.generated {
            node.materialize_lazy_children();
            node.generated = true;
            self.journal.push(TreeMutation::Realized(container.clone()));
        }
        true
    }

    fn child_count(&self, container: &ContainerPath) -> usize {
        self.container_node(container)
            .map_or(0, |n| n.children.len())
    }

    fn container_from_index(
        &mut self,
        container: &ContainerPath,
        index: usize,
    ) -> Option<ContainerPath> {
        let parent = self.container_node(container)?;
        if !(parent.expanded && parent.generated) {
            return None;
        }
        let child = parent.children.get(index)?;
        (!child.deferred).then(|| container.child(index))
    }

    fn is_selected(&self, container: &ContainerPath) -> bool {
        self.selected.as_ref() == Some(container)
    }

    fn set_selected(&mut self, container: &ContainerPath, selected: bool) {
        if !self.is_realized(container) {
            return;
        }
        let old_path = self.selected.clone();
        if selected {
            if old_path.as_ref() == Some(container) {
                return;
            }
            self.selected = Some(container.clone());
            self.journal.push(TreeMutation::Selected(container.clone()));
        } else {
            if old_path.as_ref() != Some(container) {
                return;
            }
            self.selected = None;
            self.journal
                .push(TreeMutation::Deselected(container.clone()));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "tree.select", path = %container, selected);
        let old = old_path.and_then(|p| self.node(&p).map(|n| n.item.clone()));
        let new = self.selected_item();
        self.fire(old, new);
    }

    fn focus_container(&mut self, container: &ContainerPath) {
        if !self.is_realized(container) {
            return;
        }
        self.has_focus = true;
        self.focused_container = Some(container.clone());
        self.journal
            .push(TreeMutation::FocusedContainer(container.clone()));
    }

    fn focus(&mut self) {
        self.has_focus = true;
        self.journal.push(TreeMutation::FocusedHost);
    }

    fn bring_into_view(&mut self, container: &ContainerPath) {
        if let Some(offset) = self.scroll_to(container) {
            self.journal
                .push(TreeMutation::BroughtIntoView(container.clone(), offset));
        }
    }

    fn selected_item(&self) -> Option<D> {
        self.selected
            .as_ref()
            .and_then(|p| self.node(p))
            .map(|n| n.item.clone())
    }

    fn subscribe_selection_changed(&mut self, handler: SelectionHandler<D>) -> HandlerId {
        let id = HandlerId::new(self.next_handler);
        self.next_handler += 1;
        self.handlers.push((id, handler));
        id
    }

    fn unsubscribe_selection_changed(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }
}
