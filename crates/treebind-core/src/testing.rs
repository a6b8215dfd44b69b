//! Arena-backed lazy tree used by the unit tests in this crate.

use std::rc::Rc;

use crate::host::{HandlerId, SelectionChanged, SelectionHandler, TreeHost};
use crate::identity::NodeIdentity;

#[derive(Debug)]
pub(crate) struct Named(pub String);

pub(crate) type Item = Rc<Named>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Expand(String),
    Collapse(String),
    Select(String),
    Deselect(String),
    FocusContainer(String),
    BringIntoView(String),
    FocusHost,
}

struct MockNode {
    item: Item,
    children: Vec<usize>,
    expanded: bool,
    generated: bool,
    withheld: bool,
    items_host: bool,
}

/// Children only get containers once their parent is expanded and realized.
pub(crate) struct MockHost {
    nodes: Vec<MockNode>,
    roots: Vec<usize>,
    selected: Option<usize>,
    ops: Vec<Op>,
    handlers: Vec<(HandlerId, SelectionHandler<Item>)>,
    next_handler: u64,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            selected: None,
            ops: Vec::new(),
            handlers: Vec::new(),
            next_handler: 0,
        }
    }

    pub(crate) fn detached_item(name: &str) -> Item {
        Rc::new(Named(name.to_string()))
    }

    fn push_node(&mut self, item: Item) -> usize {
        self.nodes.push(MockNode {
            item,
            children: Vec::new(),
            expanded: false,
            generated: false,
            withheld: false,
            items_host: true,
        });
        self.nodes.len() - 1
    }

    pub(crate) fn root(&mut self, name: &str) -> usize {
        let id = self.push_node(Self::detached_item(name));
        self.roots.push(id);
        id
    }

    pub(crate) fn child(&mut self, parent: usize, name: &str) -> usize {
        self.child_with_item(parent, Self::detached_item(name))
    }

    pub(crate) fn child_with_item(&mut self, parent: usize, item: Item) -> usize {
        let id = self.push_node(item);
        self.nodes[parent].children.push(id);
        id
    }

    fn find(&self, name: &str) -> usize {
        self.nodes
            .iter()
            .position(|n| n.item.0 == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
    }

    fn name(&self, id: usize) -> String {
        self.nodes[id].item.0.clone()
    }

    pub(crate) fn item(&self, name: &str) -> Item {
        Rc::clone(&self.nodes[self.find(name)].item)
    }

    pub(crate) fn withhold(&mut self, name: &str) {
        let id = self.find(name);
        self.nodes[id].withheld = true;
    }

    pub(crate) fn without_items_host(&mut self, name: &str) {
        let id = self.find(name);
        self.nodes[id].items_host = false;
    }

    pub(crate) fn preexpand(&mut self, name: &str) {
        let id = self.find(name);
        self.nodes[id].expanded = true;
        self.nodes[id].generated = true;
    }

    pub(crate) fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub(crate) fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub(crate) fn expansions(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Expand(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn is_expanded_named(&self, name: &str) -> bool {
        self.nodes[self.find(name)].expanded
    }

    pub(crate) fn selected_name(&self) -> Option<String> {
        self.selected.map(|id| self.name(id))
    }

    /// Expansion and selection flags of every node.
    pub(crate) fn snapshot(&self) -> Vec<(String, bool, bool)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, n)| (n.item.0.clone(), n.expanded, self.selected == Some(id)))
            .collect()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Simulate a click on an already realized row.
    pub(crate) fn user_select(&mut self, name: &str) {
        let id = self.find(name);
        self.set_selected(&id, true);
    }

    fn fire(&self, old: Option<usize>, new: Option<usize>) {
        let event = SelectionChanged {
            old: old.map(|id| Rc::clone(&self.nodes[id].item)),
            new: new.map(|id| Rc::clone(&self.nodes[id].item)),
        };
        let handlers: Vec<_> = self.handlers.iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(&event);
        }
    }
}

impl TreeHost for MockHost {
    type Item = Item;
    type Container = usize;

    fn root_items(&self) -> Vec<Item> {
        self.roots
            .iter()
            .map(|&id| Rc::clone(&self.nodes[id].item))
            .collect()
    }

    fn container_from_item(&mut self, item: &Item) -> Option<usize> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.nodes[id].item.same_node(item) && !self.nodes[id].withheld)
    }

    fn item_of(&self, container: &usize) -> Option<Item> {
        self.nodes.get(*container).map(|n| Rc::clone(&n.item))
    }

    fn is_expanded(&self, container: &usize) -> bool {
        self.nodes[*container].expanded
    }

    fn set_expanded(&mut self, container: &usize, expanded: bool) {
        self.nodes[*container].expanded = expanded;
        let name = self.name(*container);
        self.ops.push(if expanded {
            Op::Expand(name)
        } else {
            Op::Collapse(name)
        });
    }

    fn realize_children(&mut self, container: &usize) -> bool {
        let node = &mut self.nodes[*container];
        if !node.items_host {
            return false;
        }
        if node.expanded {
            node.generated = true;
        }
        true
    }

    fn child_count(&self, container: &usize) -> usize {
        self.nodes[*container].children.len()
    }

    fn container_from_index(&mut self, container: &usize, index: usize) -> Option<usize> {
        let node = &self.nodes[*container];
        if !(node.expanded && node.generated) {
            return None;
        }
        let child = *node.children.get(index)?;
        (!self.nodes[child].withheld).then_some(child)
    }

    fn is_selected(&self, container: &usize) -> bool {
        self.selected == Some(*container)
    }

    fn set_selected(&mut self, container: &usize, selected: bool) {
        let old = self.selected;
        if selected {
            if old == Some(*container) {
                return;
            }
            self.selected = Some(*container);
            let name = self.name(*container);
            self.ops.push(Op::Select(name));
        } else {
            if old != Some(*container) {
                return;
            }
            self.selected = None;
            let name = self.name(*container);
            self.ops.push(Op::Deselect(name));
        }
        self.fire(old, self.selected);
    }

    fn focus_container(&mut self, container: &usize) {
        let name = self.name(*container);
        self.ops.push(Op::FocusContainer(name));
    }

    fn focus(&mut self) {
        self.ops.push(Op::FocusHost);
    }

    fn bring_into_view(&mut self, container: &usize) {
        let name = self.name(*container);
        self.ops.push(Op::BringIntoView(name));
    }

    fn selected_item(&self) -> Option<Item> {
        self.selected.map(|id| Rc::clone(&self.nodes[id].item))
    }

    fn subscribe_selection_changed(&mut self, handler: SelectionHandler<Item>) -> HandlerId {
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
