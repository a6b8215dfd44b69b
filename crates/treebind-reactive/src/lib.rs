#![forbid(unsafe_code)]

//! Reactive value cells for treebind.
//!
//! A single-threaded [`Observable`] with synchronous subscriber notification
//! and RAII [`Subscription`] guards. Everything lives on the UI thread;
//! nothing here is `Send`.

pub mod observable;

pub use observable::{Observable, Subscription};
