//! # The event abstraction.
//!
//! An [`Event`] is a named occurrence bound to exactly one topic: a thin
//! polymorphic front end over message delivery. Call sites say "fire this
//! named occurrence" without assembling a [`Message`] by hand; all delivery
//! semantics (ordering, security, failure handling) stay in the topic.
//!
//! The provided [`Event::trigger`] builds the message for you: sender and
//! type are the event's name, the destination is the event's alias-or-name —
//! unless the event broadcasts, in which case no destination is set and the
//! message reaches generic handlers only. Distinct event kinds override
//! `trigger` to assemble their own message.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TopicError;
use crate::messages::{Message, Payload};
use crate::topics::Topic;

/// A named occurrence bound to one topic.
///
/// Implementors provide identity and the owning topic; `trigger` has a
/// default body that assembles and publishes the message.
#[async_trait]
pub trait Event: Send + Sync {
    /// Stable event name; doubles as the sender identity and, unless the
    /// event broadcasts, the destination.
    fn name(&self) -> &str;

    /// The topic this event delivers into.
    fn topic(&self) -> &Arc<Topic>;

    /// Reserved message priority attached to triggered messages.
    fn priority(&self) -> i32 {
        1
    }

    /// Alternate destination name, used instead of [`Event::name`] when set.
    fn alias(&self) -> Option<&str> {
        None
    }

    /// Broadcasting events set no destination: generic handlers only.
    fn allow_broadcast(&self) -> bool {
        false
    }

    /// Assembles a message for `data` and hands it to the owning topic.
    async fn trigger(&self, data: Payload) -> Result<(), TopicError> {
        let mut message = Message::with_payload(self.name(), data)
            .with_message_type(self.name())
            .with_timestamp_now()
            .with_priority(self.priority());

        if !self.allow_broadcast() {
            let destination = self.alias().unwrap_or_else(|| self.name()).to_owned();
            message = message.with_destination(destination);
        }

        self.topic().publish_event(message).await
    }
}
