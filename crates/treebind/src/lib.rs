#![forbid(unsafe_code)]

//! Treebind public facade crate.
//!
//! Re-exports the synchronization core, the observable substrate and (with
//! the default `widgets` feature) the reference lazy tree widget, plus a
//! prelude for everyday use.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use treebind::prelude::*;
//!
//! let leaf: Rc<str> = Rc::from("leaf");
//! let tree = Rc::new(RefCell::new(LazyTree::new(vec![
//!     TreeNode::new(Rc::from("root")).child(TreeNode::new(Rc::clone(&leaf))),
//! ])));
//!
//! let behavior = SelectedItemBehavior::new(RevealPolicy::default());
//! behavior.attach(&tree);
//! behavior.set_selected_item(Some(Rc::clone(&leaf)));
//!
//! assert!(tree.borrow().selected_item().is_some_and(|s| Rc::ptr_eq(&s, &leaf)));
//! ```

// --- Core re-exports -------------------------------------------------------

pub use treebind_core::{
    HandlerId, NodeIdentity, PolicyError, RevealOutcome, RevealPolicy, SelectedItemBehavior,
    Selection, SelectionChanged, SelectionHandler, SelectionSlot, SyncPhase, TreeHost, reveal,
    same_selection,
};

// --- Reactive re-exports ---------------------------------------------------

pub use treebind_reactive::{Observable, Subscription};

// --- Widget re-exports -----------------------------------------------------

#[cfg(feature = "widgets")]
pub use treebind_widgets::{ContainerPath, LazyTree, TreeMutation, TreeNode};

pub mod prelude {
    pub use crate::{
        NodeIdentity, RevealOutcome, RevealPolicy, SelectedItemBehavior, SelectionSlot, TreeHost,
    };

    #[cfg(feature = "widgets")]
    pub use crate::{LazyTree, TreeNode};

    pub use crate::{core, reactive};

    #[cfg(feature = "widgets")]
    pub use crate::widgets;
}

pub use treebind_core as core;
pub use treebind_reactive as reactive;
#[cfg(feature = "widgets")]
pub use treebind_widgets as widgets;
