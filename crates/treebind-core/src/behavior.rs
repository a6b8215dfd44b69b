#![forbid(unsafe_code)]

//! Two-way binding between a [`SelectionSlot`] and a live tree widget.
//!
//! # Paths
//!
//! - **Outgoing**: the widget's selection-changed notification writes the
//!   new node into the slot.
//! - **Inbound**: any other write into the slot runs
//!   [`reveal`](crate::reveal::reveal) against the attached widget.
//!
//! # Echo damping
//!
//! Both paths run synchronously on the UI thread and would otherwise feed
//! each other. A [`SyncPhase`] flag marks which path is active. A slot
//! notification that arrives while a path is running is dropped when it
//! carries the node that path is already applying. Any other value (an
//! observer redirecting the user's pick, say) cannot be revealed while the
//! widget is mid-mutation, so it is recorded as a pending reveal instead; the
//! same happens when the widget is found mutably borrowed.
//! [`SelectedItemBehavior::refresh`] applies a pending reveal.
//!
//! # Lifecycle
//!
//! The outgoing handler is registered with the widget if and only if the
//! behavior is attached. Each attachment gets a fresh generation number and
//! the handler ignores events from any generation but its own, so a handler
//! that outlives its attachment can never write the slot. A handler that
//! could not be unregistered because the widget was borrowed is retired and
//! removed the next time the behavior reaches that widget.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};
use treebind_reactive::Subscription;

use crate::host::{HandlerId, SelectionChanged, SelectionHandler, TreeHost};
use crate::identity::same_selection;
use crate::policy::RevealPolicy;
use crate::reveal::{RevealOutcome, reveal};
use crate::slot::SelectionSlot;

/// Which synchronization path is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Writing a widget-originated selection into the slot.
    Outgoing,
    /// Walking the widget to reveal a slot value.
    Revealing,
}

/// Sets a phase for the lifetime of the guard, restoring the previous one.
struct PhaseGuard<'a> {
    cell: &'a Cell<SyncPhase>,
    previous: SyncPhase,
}

impl<'a> PhaseGuard<'a> {
    fn enter(cell: &'a Cell<SyncPhase>, phase: SyncPhase) -> Self {
        let previous = cell.replace(phase);
        Self { cell, previous }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.cell.set(self.previous);
    }
}

struct Attachment<W> {
    widget: Weak<RefCell<W>>,
    handler: HandlerId,
}

struct Shared<W: TreeHost> {
    policy: RevealPolicy,
    attachment: RefCell<Option<Attachment<W>>>,
    phase: Cell<SyncPhase>,
    generation: Cell<u64>,
    last_outcome: Cell<Option<RevealOutcome>>,
    /// Node the running path is applying; its slot echo is dropped.
    in_flight: RefCell<Option<W::Item>>,
    /// The slot holds a value the widget has not been shown yet.
    pending: Cell<bool>,
    /// Handlers detached while their widget was borrowed.
    retired: RefCell<Vec<Attachment<W>>>,
}

impl<W: TreeHost + 'static> Shared<W> {
    fn widget(&self) -> Option<Rc<RefCell<W>>> {
        self.attachment
            .borrow()
            .as_ref()
            .and_then(|a| a.widget.upgrade())
    }

    fn on_slot_changed(&self, target: Option<&W::Item>) {
        let phase = self.phase.get();
        if phase != SyncPhase::Idle {
            if same_selection(target, self.in_flight.borrow().as_ref()) {
                debug!(?phase, "selection.echo_suppressed");
            } else {
                self.pending.set(true);
                debug!(?phase, "selection.deferred");
            }
            return;
        }
        self.sweep_retired();
        if let Some(widget) = self.widget() {
            self.reveal_in(&widget, target);
        }
    }

    fn reveal_in(&self, widget: &RefCell<W>, target: Option<&W::Item>) -> Option<RevealOutcome> {
        let Ok(mut host) = widget.try_borrow_mut() else {
            self.pending.set(true);
            debug!("selection.widget_busy");
            return None;
        };
        let _phase = PhaseGuard::enter(&self.phase, SyncPhase::Revealing);
        *self.in_flight.borrow_mut() = target.cloned();
        self.pending.set(false);
        let outcome = reveal(&mut *host, target, &self.policy);
        self.last_outcome.set(Some(outcome));
        Some(outcome)
    }

    /// Unregister retired handlers whose widget can be borrowed now.
    fn sweep_retired(&self) {
        let Ok(mut retired) = self.retired.try_borrow_mut() else {
            return;
        };
        retired.retain(|attachment| {
            let Some(live) = attachment.widget.upgrade() else {
                return false;
            };
            let Ok(mut host) = live.try_borrow_mut() else {
                return true;
            };
            let removed = host.unsubscribe_selection_changed(attachment.handler);
            debug!(handler = %attachment.handler, removed, "selection.retired_removed");
            false
        });
    }
}

/// Keeps a [`SelectionSlot`] and one attached tree widget in sync.
///
/// ```ignore
/// let tree = Rc::new(RefCell::new(LazyTree::new(roots)));
/// let behavior = SelectedItemBehavior::new(RevealPolicy::default());
/// behavior.attach(&tree);
///
/// behavior.set_selected_item(Some(deep_node)); // expands, selects, scrolls
/// tree.borrow_mut().click_row(0);              // slot follows the click
/// ```
pub struct SelectedItemBehavior<W: TreeHost + 'static> {
    slot: SelectionSlot<W::Item>,
    shared: Rc<Shared<W>>,
    _inbound: Subscription,
}

impl<W: TreeHost + 'static> std::fmt::Debug for SelectedItemBehavior<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedItemBehavior")
            .field("policy", &self.shared.policy)
            .field("attached", &self.is_attached())
            .field("phase", &self.shared.phase.get())
            .field("last_outcome", &self.shared.last_outcome.get())
            .finish_non_exhaustive()
    }
}

impl<W: TreeHost + 'static> SelectedItemBehavior<W> {
    /// A behavior with its own empty slot.
    #[must_use]
    pub fn new(policy: RevealPolicy) -> Self {
        Self::with_slot(SelectionSlot::new(), policy)
    }

    /// A behavior bound to an existing slot (for example one owned by a
    /// view model). Writes through either handle are seen by both.
    #[must_use]
    pub fn with_slot(slot: SelectionSlot<W::Item>, policy: RevealPolicy) -> Self {
        let shared = Rc::new(Shared {
            policy,
            attachment: RefCell::new(None),
            phase: Cell::new(SyncPhase::Idle),
            generation: Cell::new(0),
            last_outcome: Cell::new(None),
            in_flight: RefCell::new(None),
            pending: Cell::new(false),
            retired: RefCell::new(Vec::new()),
        });
        let weak = Rc::downgrade(&shared);
        let inbound = slot.subscribe(move |target| {
            if let Some(shared) = weak.upgrade() {
                shared.on_slot_changed(target);
            }
        });
        Self {
            slot,
            shared,
            _inbound: inbound,
        }
    }

    /// The bound slot.
    #[must_use]
    pub fn slot(&self) -> &SelectionSlot<W::Item> {
        &self.slot
    }

    /// Reveal configuration.
    #[must_use]
    pub fn policy(&self) -> &RevealPolicy {
        &self.shared.policy
    }

    /// Current slot value.
    #[must_use]
    pub fn selected_item(&self) -> Option<W::Item> {
        self.slot.get()
    }

    /// Programmatic selection. Returns `true` when the slot changed.
    pub fn set_selected_item(&self, item: Option<W::Item>) -> bool {
        self.slot.set(item)
    }

    /// Clear the slot. The widget keeps whatever it shows.
    pub fn clear(&self) -> bool {
        self.slot.clear()
    }

    /// Outcome of the most recent reveal, if any ran.
    #[must_use]
    pub fn last_outcome(&self) -> Option<RevealOutcome> {
        self.shared.last_outcome.get()
    }

    /// Whether the slot holds a value that could not be revealed when it was
    /// written, because the widget was busy. [`refresh`](Self::refresh)
    /// applies it.
    #[must_use]
    pub fn has_pending_reveal(&self) -> bool {
        self.shared.pending.get()
    }

    /// Whether a live widget is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.widget().is_some()
    }

    /// Attach to a widget. See [`attach_weak`](Self::attach_weak).
    pub fn attach(&self, widget: &Rc<RefCell<W>>) -> bool {
        self.attach_weak(Rc::downgrade(widget))
    }

    /// Attach to a widget through a weak handle.
    ///
    /// A dead handle is a no-op. Attaching while attached detaches from the
    /// previous widget first. Returns `true` when a handler was registered.
    pub fn attach_weak(&self, widget: Weak<RefCell<W>>) -> bool {
        let Some(live) = widget.upgrade() else {
            debug!("selection.attach_skipped");
            return false;
        };
        self.detach();
        self.shared.sweep_retired();

        let generation = self.shared.generation.get().wrapping_add(1);
        self.shared.generation.set(generation);
        let handler = self.outgoing_handler(generation);
        let id = match live.try_borrow_mut() {
            Ok(mut host) => host.subscribe_selection_changed(handler),
            Err(_) => {
                warn!("selection.attach_failed: widget is borrowed");
                return false;
            }
        };
        *self.shared.attachment.borrow_mut() = Some(Attachment {
            widget,
            handler: id,
        });
        debug!(handler = %id, generation, "selection.attached");

        if self.shared.policy.reveal_on_attach && self.shared.phase.get() == SyncPhase::Idle {
            let target = self.slot.get();
            if target.is_some() {
                self.shared.reveal_in(&live, target.as_ref());
            }
        }
        true
    }

    /// Detach from the current widget. Returns `true` when a handler was
    /// unregistered; detaching when nothing (or a dropped widget) is
    /// attached is a no-op.
    ///
    /// If the widget is mutably borrowed at this point the handler is
    /// retired: it stops writing the slot at once and is unregistered by the
    /// next `attach`, `detach`, `refresh` or slot write that finds the widget
    /// free. Dropping the behavior while the widget is borrowed leaves that
    /// inert handler in the widget until the widget itself is dropped.
    pub fn detach(&self) -> bool {
        self.shared.sweep_retired();
        let Some(attachment) = self.shared.attachment.borrow_mut().take() else {
            return false;
        };
        // Retire the handler even if the widget cannot be reached below.
        self.shared
            .generation
            .set(self.shared.generation.get().wrapping_add(1));

        let Some(live) = attachment.widget.upgrade() else {
            debug!("selection.detached: widget already dropped");
            return false;
        };
        let handler = attachment.handler;
        let removed = match live.try_borrow_mut() {
            Ok(mut host) => host.unsubscribe_selection_changed(handler),
            Err(_) => {
                warn!(handler = %handler, "selection.detach: widget is borrowed; handler retired");
                self.shared.retired.borrow_mut().push(attachment);
                false
            }
        };
        debug!(handler = %handler, removed, "selection.detached");
        removed
    }

    /// Re-run the reveal for the current slot value, for example after the
    /// widget loaded items that were missing when the value was written, or
    /// to apply a [pending reveal](Self::has_pending_reveal).
    pub fn refresh(&self) -> Option<RevealOutcome> {
        if self.shared.phase.get() != SyncPhase::Idle {
            return None;
        }
        self.shared.sweep_retired();
        let widget = self.shared.widget()?;
        let target = self.slot.get();
        self.shared.reveal_in(&widget, target.as_ref())
    }

    fn outgoing_handler(&self, generation: u64) -> SelectionHandler<W::Item> {
        let slot = self.slot.clone();
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move |event: &SelectionChanged<W::Item>| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if shared.generation.get() != generation {
                return;
            }
            let _phase = PhaseGuard::enter(&shared.phase, SyncPhase::Outgoing);
            *shared.in_flight.borrow_mut() = event.new.clone();
            // The widget now shows what the slot is about to hold.
            shared.pending.set(false);
            let changed = slot.set(event.new.clone());
            debug!(changed, "selection.outgoing");
        })
    }
}

impl<W: TreeHost + 'static> Drop for SelectedItemBehavior<W> {
    fn drop(&mut self) {
        self.detach();
    }
}
