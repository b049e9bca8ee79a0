//! # Builder-configured event (`NamedEvent`)
//!
//! [`NamedEvent`] is the plain implementation of [`Event`]: a name, an owning
//! topic, and optional priority/alias/broadcast settings. Use it when you
//! don't need a bespoke event type.
//!
//! ## Example
//! ```rust
//! use topicbus::{Handler, NamedEvent, Event, Payload, Topic, TopicConfig};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let topic = Arc::new(Topic::new("filters", TopicConfig::default()));
//! topic.register(Handler::sync("months_changed", |_| Ok(()))).await?;
//!
//! let changed = NamedEvent::new(topic.clone(), "months_changed");
//! changed.trigger(Payload::new(vec!["Jan", "Feb"])).await?;
//!
//! assert_eq!(topic.metrics().await.events_processed, 1);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;
use crate::topics::Topic;

/// Function-free [`Event`] implementation configured by builder methods.
#[derive(Clone, Debug)]
pub struct NamedEvent {
    name: Cow<'static, str>,
    topic: Arc<Topic>,
    priority: i32,
    alias: Option<Cow<'static, str>>,
    allow_broadcast: bool,
}

impl NamedEvent {
    /// Creates an event bound to `topic` with default priority 1.
    pub fn new(topic: Arc<Topic>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            topic,
            priority: 1,
            alias: None,
            allow_broadcast: false,
        }
    }

    /// Sets the reserved message priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Routes triggered messages to `alias` instead of the event name.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Makes triggered messages destination-less (generic handlers only).
    #[must_use]
    pub fn broadcast(mut self) -> Self {
        self.allow_broadcast = true;
        self
    }
}

#[async_trait]
impl Event for NamedEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn topic(&self) -> &Arc<Topic> {
        &self.topic
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn allow_broadcast(&self) -> bool {
        self.allow_broadcast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopicConfig;
    use crate::handlers::{Handler, RegisterOptions};
    use crate::messages::Payload;
    use crate::topics::ErrorStrategy;
    use std::sync::Mutex as StdMutex;

    fn warn_topic() -> Arc<Topic> {
        Arc::new(Topic::new(
            "t",
            TopicConfig { strategy: ErrorStrategy::Warn, ..TopicConfig::default() },
        ))
    }

    #[tokio::test]
    async fn test_trigger_reaches_handler_named_after_event() {
        let topic = warn_topic();
        let seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();

        topic
            .register(Handler::sync("refresh", move |data: &Payload| {
                sink.lock().unwrap().push(*data.downcast_ref::<i64>().unwrap());
                Ok(())
            }))
            .await
            .unwrap();

        let event = NamedEvent::new(topic.clone(), "refresh").with_priority(3);
        event.trigger(Payload::new(11_i64)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), [11]);
    }

    #[tokio::test]
    async fn test_alias_overrides_destination() {
        let topic = warn_topic();
        let seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();

        topic
            .register(Handler::sync("real_target", move |data: &Payload| {
                sink.lock().unwrap().push(*data.downcast_ref::<i64>().unwrap());
                Ok(())
            }))
            .await
            .unwrap();

        let event = NamedEvent::new(topic.clone(), "logical_name").with_alias("real_target");
        event.trigger(Payload::new(5_i64)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), [5]);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_generic_handlers_only() {
        let topic = warn_topic();
        let named_seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));
        let generic_seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));

        let sink = named_seen.clone();
        topic
            .register(Handler::sync("announce", move |data: &Payload| {
                sink.lock().unwrap().push(*data.downcast_ref::<i64>().unwrap());
                Ok(())
            }))
            .await
            .unwrap();

        let sink = generic_seen.clone();
        topic
            .register_with(
                Handler::sync("tap", move |data: &Payload| {
                    sink.lock().unwrap().push(*data.downcast_ref::<i64>().unwrap());
                    Ok(())
                }),
                RegisterOptions::default().generic(),
            )
            .await
            .unwrap();

        // "announce" matches the event name but the event broadcasts,
        // so only the generic tap sees it
        let event = NamedEvent::new(topic.clone(), "announce").broadcast();
        event.trigger(Payload::new(8_i64)).await.unwrap();

        assert!(named_seen.lock().unwrap().is_empty());
        assert_eq!(*generic_seen.lock().unwrap(), [8]);
    }

    #[tokio::test]
    async fn test_trigger_surfaces_topic_errors() {
        let topic = Arc::new(Topic::new("t", TopicConfig::default()));
        topic.add_to_blacklist("blocked_event").await;

        let event = NamedEvent::new(topic.clone(), "blocked_event");
        let err = event.trigger(Payload::new(())).await.unwrap_err();
        assert_eq!(err.as_label(), "sender_denied");
    }
}
