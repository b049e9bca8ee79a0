//! Handler model: the callable wrapper and its registration options.
//!
//! ## Contents
//! - [`Handler`], [`HandlerRef`] named sync/async callables
//! - [`RegisterOptions`] aliases, priority, generic flag
//!
//! The topic engine consumes these; see [`crate::topics`].

mod handler;
mod options;

pub use handler::{Handler, HandlerRef};
pub use options::RegisterOptions;

pub(crate) use handler::HandlerExec;
