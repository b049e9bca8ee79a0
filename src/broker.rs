//! # Broker: the named topic registry.
//!
//! A [`Broker`] owns every [`Topic`] in a process and routes publish calls by
//! topic id. It is constructed explicitly by the application entry point and
//! passed to producers — there is no process-wide singleton.
//!
//! ## Rules
//! - [`Broker::publish`] resolves the topic and forwards; an unregistered id
//!   **fails fast** with [`BrokerError::TopicNotFound`]. Sender denial, by
//!   contrast, is absorbed into the topic's failure pipeline unless the topic
//!   is configured to raise.
//! - Topics enter the registry via [`Broker::create_topic`] (construct +
//!   register) or [`Broker::subscribe`] (register an externally built topic).
//! - Topics persist for the broker's lifetime; [`Broker::remove_topic`] exists
//!   for dynamic setups but registration is normally a setup-time affair.
//!
//! ## Example
//! ```rust
//! use topicbus::{Broker, ErrorStrategy, Handler, Message, TopicConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let broker = Broker::new("app");
//! let filters = broker
//!     .create_topic(
//!         "filters",
//!         TopicConfig { strategy: ErrorStrategy::Warn, ..TopicConfig::default() },
//!     )
//!     .await;
//!
//! filters.register(Handler::sync("months_changed", |_| Ok(()))).await?;
//!
//! broker
//!     .publish(
//!         "filters",
//!         Message::new("month_filter", vec!["Jan"]).with_destination("months_changed"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::TopicConfig;
use crate::error::BrokerError;
use crate::messages::Message;
use crate::topics::Topic;

/// Named registry of topics, keyed by topic id.
pub struct Broker {
    name: Arc<str>,
    topics: RwLock<HashMap<String, Arc<Topic>>>,
}

impl Broker {
    /// Creates an empty broker.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Broker name, for logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructs a topic from `config` and registers it under `id`.
    ///
    /// Re-using an id replaces the previous topic, mirroring plain map
    /// insertion; steady-state setups register each id once.
    pub async fn create_topic(&self, id: &str, config: TopicConfig) -> Arc<Topic> {
        let topic = Arc::new(Topic::new(id, config));
        self.subscribe(topic.clone()).await;
        topic
    }

    /// Registers an externally constructed topic under its own id.
    pub async fn subscribe(&self, topic: Arc<Topic>) {
        tracing::debug!(broker = %self.name, topic = %topic.full_id(), "topic registered");
        self.topics
            .write()
            .await
            .insert(topic.id().to_owned(), topic);
    }

    /// Resolves a topic by id and forwards the message to it.
    ///
    /// Fails fast with [`BrokerError::TopicNotFound`] when nothing is
    /// registered under `topic_id`; topic-level delivery errors are forwarded
    /// as [`BrokerError::Topic`].
    pub async fn publish(&self, topic_id: &str, message: Message) -> Result<(), BrokerError> {
        let topic = self
            .topic(topic_id)
            .await
            .ok_or_else(|| BrokerError::TopicNotFound { topic_id: topic_id.to_owned() })?;
        topic.publish_event(message).await?;
        Ok(())
    }

    /// Looks up a registered topic.
    pub async fn topic(&self, topic_id: &str) -> Option<Arc<Topic>> {
        self.topics.read().await.get(topic_id).cloned()
    }

    /// Unregisters and returns a topic, if present.
    pub async fn remove_topic(&self, topic_id: &str) -> Option<Arc<Topic>> {
        let removed = self.topics.write().await.remove(topic_id);
        match &removed {
            Some(topic) => {
                tracing::debug!(broker = %self.name, topic = %topic.full_id(), "topic removed");
            }
            None => {
                tracing::warn!(broker = %self.name, topic_id, "topic not found for removal");
            }
        }
        removed
    }

    /// Sorted ids of all registered topics.
    pub async fn topic_ids(&self) -> Vec<String> {
        let topics = self.topics.read().await;
        let mut ids: Vec<String> = topics.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Awaits completion of in-flight async handlers across every topic.
    pub async fn drain(&self) {
        let topics: Vec<Arc<Topic>> = self.topics.read().await.values().cloned().collect();
        for topic in topics {
            topic.drain().await;
        }
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker").field("name", &self.name).finish()
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new("broker")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{Handler, RegisterOptions};
    use crate::messages::Payload;
    use crate::topics::ErrorStrategy;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn test_publish_to_missing_topic_fails_fast() {
        let broker = Broker::default();
        let err = broker
            .publish("missing", Message::new("s", ()))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::TopicNotFound { .. }));
        assert_eq!(err.as_label(), "topic_not_found");
    }

    #[tokio::test]
    async fn test_create_subscribe_and_lookup() {
        let broker = Broker::new("app");
        broker.create_topic("filters", TopicConfig::default()).await;

        let external = Arc::new(Topic::new("orders", TopicConfig::default()));
        broker.subscribe(external.clone()).await;

        assert_eq!(broker.topic_ids().await, ["filters", "orders"]);
        assert!(Arc::ptr_eq(&broker.topic("orders").await.unwrap(), &external));
    }

    #[tokio::test]
    async fn test_remove_topic() {
        let broker = Broker::default();
        broker.create_topic("t", TopicConfig::default()).await;

        assert!(broker.remove_topic("t").await.is_some());
        assert!(broker.remove_topic("t").await.is_none());
        assert!(broker.topic("t").await.is_none());
    }

    #[tokio::test]
    async fn test_topic_error_is_forwarded() {
        let broker = Broker::default();
        let topic = broker.create_topic("t", TopicConfig::default()).await;
        topic.add_to_blacklist("intruder").await;

        let err = broker
            .publish("t", Message::new("intruder", ()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "sender_denied");
    }

    #[tokio::test]
    async fn test_drain_covers_all_topics() {
        let broker = Broker::default();
        let topic = broker
            .create_topic(
                "t",
                TopicConfig { strategy: ErrorStrategy::Warn, ..TopicConfig::default() },
            )
            .await;

        let seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        topic
            .register_with(
                Handler::future("slow", move |data: Payload| {
                    let sink = sink.clone();
                    async move {
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        sink.lock()
                            .unwrap()
                            .push(*data.downcast_ref::<i64>().unwrap());
                        Ok(())
                    }
                }),
                RegisterOptions::default().generic(),
            )
            .await
            .unwrap();

        broker.publish("t", Message::new("s", 1_i64)).await.unwrap();
        broker.drain().await;
        assert_eq!(*seen.lock().unwrap(), [1]);
    }

    /// End-to-end: WARN topic, high-priority handler failing on even
    /// payloads, low-priority generic recorder observing everything.
    #[tokio::test]
    async fn test_end_to_end_warn_scenario() {
        let broker = Broker::new("app");
        let topic = broker
            .create_topic(
                "numbers",
                TopicConfig {
                    strategy: ErrorStrategy::Warn,
                    max_dead_letters: 10,
                    ..TopicConfig::default()
                },
            )
            .await;

        topic
            .register_with(
                Handler::sync("validator", |data: &Payload| {
                    let n = *data.downcast_ref::<i64>().unwrap();
                    if n % 2 == 0 {
                        Err(format!("even input {n}").into())
                    } else {
                        Ok(())
                    }
                }),
                RegisterOptions::default().with_priority(100).generic(),
            )
            .await
            .unwrap();

        let seen: Arc<StdMutex<Vec<i64>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        topic
            .register_with(
                Handler::sync("recorder", move |data: &Payload| {
                    sink.lock().unwrap().push(*data.downcast_ref::<i64>().unwrap());
                    Ok(())
                }),
                RegisterOptions::default().with_priority(1).generic(),
            )
            .await
            .unwrap();

        for n in 1..=5_i64 {
            broker.publish("numbers", Message::new("s", n)).await.unwrap();
        }

        // the recorder observed every payload, in order
        assert_eq!(*seen.lock().unwrap(), [1, 2, 3, 4, 5]);

        // exactly the even payloads were captured
        let letters = topic.dead_letters().await;
        assert_eq!(letters.len(), 2);
        let captured: Vec<i64> = letters
            .iter()
            .map(|l| *l.payload.as_ref().unwrap().downcast_ref::<i64>().unwrap())
            .collect();
        assert_eq!(captured, [2, 4]);

        let metrics = topic.metrics().await;
        assert_eq!(metrics.errors, 2);
        // 5 recorder runs + 3 validator successes + 2 validator failures
        assert_eq!(metrics.events_processed, 10);
    }

    /// Bounded buffer: capacity + k failures leave exactly capacity entries,
    /// none of the earlier entries evicted.
    #[tokio::test]
    async fn test_dead_letter_buffer_is_bounded() {
        let broker = Broker::default();
        let topic = broker
            .create_topic(
                "t",
                TopicConfig {
                    strategy: ErrorStrategy::Ignore,
                    max_dead_letters: 3,
                    ..TopicConfig::default()
                },
            )
            .await;

        topic
            .register_with(
                Handler::sync("bomb", |data: &Payload| {
                    Err(format!("failure {}", data.downcast_ref::<i64>().unwrap()).into())
                }),
                RegisterOptions::default().generic(),
            )
            .await
            .unwrap();

        for n in 0..5_i64 {
            broker.publish("t", Message::new("s", n)).await.unwrap();
        }

        let letters = topic.dead_letters().await;
        assert_eq!(letters.len(), 3);
        for (i, letter) in letters.iter().enumerate() {
            assert!(letter.error.to_string().contains(&format!("failure {i}")));
        }
        assert_eq!(topic.metrics().await.errors, 5);
    }
}
