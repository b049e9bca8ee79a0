//! # The message record delivered through topics.
//!
//! [`Message`] is the sole contract between any producer and the bus. It is
//! assembled with builder-style `with_*` methods and validated at the topic
//! boundary, not on construction: a message with an empty sender is rejected
//! by [`Topic::publish_event`](crate::Topic::publish_event), never here.
//!
//! ## Example
//! ```rust
//! use std::time::SystemTime;
//! use topicbus::Message;
//!
//! let msg = Message::new("month_filter", vec!["Jan", "Feb"])
//!     .with_destination("update_chart")
//!     .with_message_type("selection_changed")
//!     .with_timestamp(SystemTime::now())
//!     .with_meta("origin", "sidebar");
//!
//! assert_eq!(msg.sender.as_ref(), "month_filter");
//! assert_eq!(msg.destination.as_deref(), Some("update_chart"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::messages::Payload;

/// One occurrence to deliver: who sent it, what it carries, where it goes.
///
/// Messages are ephemeral: built per publish and not retained, except that a
/// failed delivery stores the payload alongside the error in the topic's
/// dead-letter buffer.
#[derive(Clone, Debug)]
pub struct Message {
    /// Identity of the producer. Must be non-empty; validated by the topic.
    pub sender: Arc<str>,
    /// Opaque payload handed to handlers.
    pub data: Payload,
    /// Optional name of a target handler or alias. Absent means the message
    /// reaches generic handlers only.
    pub destination: Option<Arc<str>>,
    /// Optional classification string.
    pub message_type: Option<Arc<str>>,
    /// Optional production time.
    pub timestamp: Option<SystemTime>,
    /// Reserved field. Delivery order is determined by handler priority, never
    /// by this value.
    pub priority: Option<i32>,
    /// Auxiliary key/value pairs.
    pub metadata: HashMap<String, String>,
}

impl Message {
    /// Creates a message with the required fields only.
    ///
    /// `data` is wrapped into a [`Payload`]; use [`Message::with_payload`]
    /// when you already hold one.
    pub fn new<T: std::any::Any + Send + Sync>(sender: impl Into<Arc<str>>, data: T) -> Self {
        Self::with_payload(sender, Payload::new(data))
    }

    /// Creates a message from an existing payload.
    pub fn with_payload(sender: impl Into<Arc<str>>, data: Payload) -> Self {
        Self {
            sender: sender.into(),
            data,
            destination: None,
            message_type: None,
            timestamp: None,
            priority: None,
            metadata: HashMap::new(),
        }
    }

    /// Targets a specific handler (by name or alias).
    #[inline]
    pub fn with_destination(mut self, destination: impl Into<Arc<str>>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Attaches a classification string.
    #[inline]
    pub fn with_message_type(mut self, message_type: impl Into<Arc<str>>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Attaches a production timestamp.
    #[inline]
    pub fn with_timestamp(mut self, at: SystemTime) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Stamps the message with the current wall-clock time.
    #[inline]
    pub fn with_timestamp_now(self) -> Self {
        self.with_timestamp(SystemTime::now())
    }

    /// Sets the reserved priority field.
    #[inline]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Adds one metadata pair.
    #[inline]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_optional_fields() {
        let msg = Message::new("s", 1_i64)
            .with_destination("h")
            .with_message_type("t")
            .with_priority(5)
            .with_meta("k", "v");

        assert_eq!(msg.sender.as_ref(), "s");
        assert_eq!(msg.data.downcast_ref::<i64>(), Some(&1));
        assert_eq!(msg.destination.as_deref(), Some("h"));
        assert_eq!(msg.message_type.as_deref(), Some("t"));
        assert_eq!(msg.priority, Some(5));
        assert_eq!(msg.metadata.get("k").map(String::as_str), Some("v"));
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_defaults_are_empty() {
        let msg = Message::new("s", ());
        assert!(msg.destination.is_none());
        assert!(msg.message_type.is_none());
        assert!(msg.priority.is_none());
        assert!(msg.metadata.is_empty());
    }

    #[test]
    fn test_timestamp_now_is_set() {
        let msg = Message::new("s", ()).with_timestamp_now();
        assert!(msg.timestamp.is_some());
    }
}
