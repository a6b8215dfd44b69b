#![forbid(unsafe_code)]

//! Observable value cell with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). When the value changes (determined by
//! `PartialEq`), every live subscriber is notified synchronously, in
//! registration order, before `set()` returns.
//!
//! Equality is whatever `T::eq` says. Cells that must compare by identity
//! (selection slots holding application nodes) wrap their payload in a
//! newtype whose `PartialEq` compares pointers.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: `set()` may be called from inside a subscriber
//!   callback. The interior borrow is released before callbacks run, so the
//!   nested write lands and notifies its own round of subscribers. The outer
//!   round then stops: subscribers it had not reached yet already saw the
//!   newer value, and never see the stale one afterwards. Cycles terminate
//!   only when a write stops changing the value; callers that need stronger
//!   damping must guard themselves.
//! - **Subscriber leak**: `Subscription` guards stored indefinitely keep
//!   their callbacks alive. Dead weak references are pruned lazily during
//!   `notify()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, debug_span};
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Subscribers stored as weak references. Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state:
/// both handles see the same value and share subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing mutation.
/// 2. `set(v)` where `v == current` is a no-op.
/// 3. Subscribers are notified in registration order.
/// 3a. No subscriber is handed a value older than one it already received.
/// 4. Dead subscribers (dropped [`Subscription`] guards) are pruned lazily.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable with the given initial value.
    ///
    /// The initial version is 0 and no subscribers are registered.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Set a new value. If the new value differs from the current value
    /// (by `PartialEq`), the version is incremented and all live subscribers
    /// are notified.
    ///
    /// Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Modify the value in place via a closure. If the value changes
    /// (compared by `PartialEq` against a snapshot), the version is
    /// incremented and subscribers are notified.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value != old {
                inner.version += 1;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Subscribe to value changes. The callback is invoked with a reference
    /// to the new value each time it changes.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes
    /// the callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        // `Rc<dyn Fn(&T)>` cannot coerce to `Rc<dyn Any>` directly, so box it.
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of currently registered subscribers (including dead ones
    /// not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };

        if callbacks.is_empty() {
            return;
        }

        let subscribers = callbacks.len() as u64;
        let (value, version) = {
            let inner = self.inner.borrow();
            (inner.value.clone(), inner.version)
        };
        let start = Instant::now();
        let span = debug_span!(
            "observable.notify",
            subscribers,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        for cb in &callbacks {
            // A nested write already delivered the newer value to everyone.
            if self.inner.borrow().version != version {
                debug!(version, "observable round superseded");
                break;
            }
            cb(&value);
        }

        let duration_us = start.elapsed().as_micros() as u64;
        span.record("duration_us", duration_us);
        debug!(duration_us, subscribers, "observable propagation finished");
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc` behind the callback, so
/// the `Weak` held by the observable fails to upgrade on the next
/// notification.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
