#![forbid(unsafe_code)]

//! Reference tree widget for the treebind synchronization core.
//!
//! [`LazyTree`](tree::LazyTree) realizes containers lazily and exposes the
//! [`TreeHost`](treebind_core::TreeHost) contract, so it can be driven by a
//! [`SelectedItemBehavior`](treebind_core::SelectedItemBehavior) exactly like
//! a toolkit widget would.

pub mod tree;

pub use tree::{ContainerPath, LazyTree, TreeMutation, TreeNode};
