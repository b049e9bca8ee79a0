//! Events: named occurrences bound to a topic.
//!
//! ## Contents
//! - [`Event`] the trait call sites implement (or use as-is via the provided
//!   `trigger`)
//! - [`NamedEvent`] builder-configured plain implementation
//!
//! Events are a thin front end: they assemble a [`Message`](crate::Message)
//! and hand it to their owning [`Topic`](crate::Topic), which owns all
//! delivery semantics.

mod event;
mod named;

pub use event::Event;
pub use named::NamedEvent;
