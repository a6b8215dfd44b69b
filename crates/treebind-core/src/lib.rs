#![forbid(unsafe_code)]

//! Selected-item synchronization for lazily realized tree widgets.
//!
//! Two change sources meet here: the user selecting a row inside the widget,
//! and application code writing a bound "selected item" value. This crate
//! keeps the two in step without feedback loops, including when the node to
//! select sits under ancestors that have never been expanded and therefore
//! have no containers yet.
//!
//! # Key Components
//!
//! - [`TreeHost`] - Capabilities the widget must expose
//! - [`SelectionSlot`] - The bindable selected-item cell
//! - [`SelectedItemBehavior`] - Attach/detach plus both sync directions
//! - [`reveal()`] - Locate-expand-reveal over the widget's containers
//! - [`RevealPolicy`] - Focus, scroll and traversal tunables
//!
//! # Threading
//!
//! Everything runs on the one UI thread. Nothing here is `Send`, and a
//! reveal runs to completion inside the write that triggered it.

pub mod behavior;
pub mod host;
pub mod identity;
pub mod policy;
pub mod reveal;
pub mod slot;

#[cfg(test)]
mod testing;

pub use behavior::{SelectedItemBehavior, SyncPhase};
pub use host::{HandlerId, SelectionChanged, SelectionHandler, TreeHost};
pub use identity::{NodeIdentity, Selection, same_selection};
pub use policy::{PolicyError, RevealPolicy};
pub use reveal::{RevealOutcome, reveal};
pub use slot::SelectionSlot;
