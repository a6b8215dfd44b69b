#![forbid(unsafe_code)]

//! Locate-expand-reveal: resolve a data node to its (possibly unrealized)
//! container and make it the visible, focused selection.
//!
//! # Algorithm
//!
//! Depth-first, pre-order over the widget's containers, children in
//! ascending index order, first match wins. A container that does not hold
//! the target is expanded *before* its children are realized, since a
//! virtualizing widget only generates child containers under an expanded
//! parent. That ordering is what lets a cold, fully collapsed tree reach a
//! deeply nested node.
//!
//! The walk keeps an explicit stack of frames rather than recursing, so tree
//! depth is bounded by heap, not by the call stack.
//!
//! # Invariants
//!
//! 1. Selection is only touched on a match; a miss changes no selected flag.
//! 2. With `restore_expansion`, every container the walk expanded is
//!    collapsed again unless it is an ancestor of the match.
//! 3. Absent containers are skipped, never dereferenced.

use tracing::{debug_span, trace};

use crate::host::TreeHost;
use crate::identity::NodeIdentity;
use crate::policy::RevealPolicy;

/// Result of a reveal request. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The target was `None`; nothing was mutated.
    Cleared,
    /// The widget already had the target selected; no walk was performed.
    AlreadySelected,
    /// The target was found, selected and revealed.
    Revealed {
        /// Depth of the matched container (roots are 0).
        depth: usize,
        /// Containers inspected, including the match.
        visited: usize,
    },
    /// No realizable container holds the target.
    NotFound {
        /// Containers inspected.
        visited: usize,
    },
}

impl RevealOutcome {
    /// Whether the widget now shows the target as selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::AlreadySelected | Self::Revealed { .. })
    }

    /// Short label for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cleared => "cleared",
            Self::AlreadySelected => "already_selected",
            Self::Revealed { .. } => "revealed",
            Self::NotFound { .. } => "not_found",
        }
    }
}

/// Select `target` in `host`, expanding and realizing ancestors as needed.
///
/// A `None` target mutates nothing. A target the widget already reports as
/// selected short-circuits to [`RevealOutcome::AlreadySelected`], re-focusing
/// the widget when the policy asks for it.
pub fn reveal<W>(host: &mut W, target: Option<&W::Item>, policy: &RevealPolicy) -> RevealOutcome
where
    W: TreeHost + ?Sized,
{
    let span = debug_span!(
        "tree.reveal",
        visited = tracing::field::Empty,
        depth = tracing::field::Empty,
        outcome = tracing::field::Empty,
    );
    let _guard = span.enter();

    let outcome = match target {
        None => RevealOutcome::Cleared,
        Some(target)
            if host
                .selected_item()
                .is_some_and(|current| current.same_node(target)) =>
        {
            if policy.focus_host {
                host.focus();
            }
            RevealOutcome::AlreadySelected
        }
        Some(target) => Walk::new(host, target, policy).run(),
    };

    match outcome {
        RevealOutcome::Revealed { depth, visited } => {
            span.record("depth", depth as u64);
            span.record("visited", visited as u64);
        }
        RevealOutcome::NotFound { visited } => {
            span.record("visited", visited as u64);
        }
        RevealOutcome::Cleared | RevealOutcome::AlreadySelected => {}
    }
    span.record("outcome", outcome.as_str());
    outcome
}

/// One opened container on the walk stack.
struct Frame<C> {
    container: C,
    /// Collapse again on backtrack.
    restore: bool,
    next: usize,
    count: usize,
}

struct Walk<'a, W: TreeHost + ?Sized> {
    host: &'a mut W,
    target: &'a W::Item,
    policy: &'a RevealPolicy,
    visited: usize,
}

impl<'a, W: TreeHost + ?Sized> Walk<'a, W> {
    fn new(host: &'a mut W, target: &'a W::Item, policy: &'a RevealPolicy) -> Self {
        Self {
            host,
            target,
            policy,
            visited: 0,
        }
    }

    fn run(mut self) -> RevealOutcome {
        for item in self.host.root_items() {
            let Some(root) = self.host.container_from_item(&item) else {
                trace!("reveal.skip_unrealized_root");
                continue;
            };
            if let Some(depth) = self.search(root) {
                if self.policy.focus_host {
                    self.host.focus();
                }
                return RevealOutcome::Revealed {
                    depth,
                    visited: self.visited,
                };
            }
        }
        RevealOutcome::NotFound {
            visited: self.visited,
        }
    }

    /// Search one root's subtree. Returns the depth of the match.
    fn search(&mut self, root: W::Container) -> Option<usize> {
        if self.matches(&root) {
            self.select(&root);
            return Some(0);
        }

        let mut stack: Vec<Frame<W::Container>> = Vec::new();
        if self.may_open(0) {
            let frame = self.open(root);
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.count {
                let index = frame.next;
                frame.next += 1;
                let Some(child) = self.host.container_from_index(&frame.container, index) else {
                    trace!(index, "reveal.skip_unrealized_child");
                    continue;
                };
                let depth = stack.len();
                if self.matches(&child) {
                    self.select(&child);
                    return Some(depth);
                }
                if self.may_open(depth) {
                    let frame = self.open(child);
                    stack.push(frame);
                }
            } else if let Some(done) = stack.pop() {
                self.close(done);
            }
        }
        None
    }

    fn matches(&mut self, container: &W::Container) -> bool {
        self.visited += 1;
        self.host
            .item_of(container)
            .is_some_and(|item| item.same_node(self.target))
    }

    fn may_open(&self, depth: usize) -> bool {
        self.policy.max_depth.is_none_or(|max| depth < max)
    }

    /// Expand, then realize children. Order matters for lazy widgets.
    fn open(&mut self, container: W::Container) -> Frame<W::Container> {
        let was_expanded = self.host.is_expanded(&container);
        if !was_expanded {
            trace!(?container, "reveal.expand");
            self.host.set_expanded(&container, true);
        }
        let count = if self.host.realize_children(&container) {
            self.host.child_count(&container)
        } else {
            0
        };
        Frame {
            container,
            restore: !was_expanded && self.policy.restore_expansion,
            next: 0,
            count,
        }
    }

    fn close(&mut self, frame: Frame<W::Container>) {
        if frame.restore {
            trace!(container = ?frame.container, "reveal.collapse");
            self.host.set_expanded(&frame.container, false);
        }
    }

    fn select(&mut self, container: &W::Container) {
        self.host.set_selected(container, true);
        if self.policy.focus_container {
            self.host.focus_container(container);
        }
        if self.policy.bring_into_view {
            self.host.bring_into_view(container);
        }
    }
}
