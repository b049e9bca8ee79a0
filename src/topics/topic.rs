//! # Topic: the dispatch engine.
//!
//! A [`Topic`] owns everything one channel needs: the priority-ordered handler
//! registry, the sender allow/deny policy, the failure strategy and buffer,
//! and running metrics. It exposes registration plus two delivery entry
//! points:
//!
//! - [`Topic::publish_event`] — validates the sender, then delivers;
//! - `handle_event` (internal) — walks the ordered registry, runs matching
//!   sync handlers inline and spawns matching async handlers fire-and-forget.
//!
//! ## Delivery flow
//! ```text
//! publish_event(message)
//!   ├─ sender empty?        ─► failure pipeline, no handler runs
//!   ├─ sender denied?       ─► failure pipeline, no handler runs
//!   └─ handle_event(message)
//!        for each registration (priority desc, stable):
//!          ├─ not selected (no destination match, not generic) ─► skip
//!          ├─ sync   ─► run inline, catch error/panic
//!          │             ├─ ok   ─► metrics(success, latency)
//!          │             └─ fail ─► metrics + dead letters + strategy
//!          │                        Raise ─► abort loop, return Err
//!          └─ async  ─► tokio::spawn (not awaited); outcome recorded
//!                        from inside the spawned task
//! ```
//!
//! ## Example
//! ```rust
//! use topicbus::{Handler, Message, Payload, RegisterOptions, Topic, TopicConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let topic = Topic::new("filters", TopicConfig::default());
//!
//! topic
//!     .register_with(
//!         Handler::sync("validate_selection", |data: &Payload| {
//!             let _months = data.downcast_ref::<Vec<&str>>();
//!             Ok(())
//!         }),
//!         RegisterOptions::default().with_priority(100),
//!     )
//!     .await?;
//!
//! topic
//!     .publish_event(
//!         Message::new("month_filter", vec!["Jan", "Feb"])
//!             .with_destination("validate_selection"),
//!     )
//!     .await?;
//!
//! assert_eq!(topic.metrics().await.events_processed, 1);
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::TopicConfig;
use crate::error::TopicError;
use crate::handlers::{HandlerExec, HandlerRef, RegisterOptions};
use crate::messages::{Message, Payload};
use crate::topics::dead_letters::{DeadLetter, DeadLetters};
use crate::topics::failure::{ErrorSink, ErrorStrategy};
use crate::topics::metrics::{MetricsSnapshot, TopicMetrics};
use crate::topics::registry::{HandlerInfo, HandlerRegistration, HandlerRegistry, RouteInfo};
use crate::topics::security::SenderPolicy;
use crate::topics::panic_info;

/// Named, versioned channel dispatching messages to registered handlers.
///
/// All methods take `&self`; interior state sits behind async locks so an
/// `Arc<Topic>` can be shared between producers, the broker, and spawned
/// handler tasks.
pub struct Topic {
    id: Arc<str>,
    version: Arc<str>,
    full_id: Arc<str>,
    debug: bool,
    policy: RwLock<SenderPolicy>,
    registry: RwLock<HandlerRegistry>,
    routes: RwLock<HashMap<Arc<str>, RouteInfo>>,
    sink: ErrorSink,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

impl Topic {
    /// Creates a topic identified by `(id, version)` with the given config.
    pub fn new(id: impl Into<Arc<str>>, config: TopicConfig) -> Self {
        let id = id.into();
        let version: Arc<str> = config.resolved_version().into();
        let full_id: Arc<str> = format!("{id}@{version}").into();

        if config.debug {
            tracing::debug!(topic = %full_id, "topic initialized");
        }

        Self {
            sink: ErrorSink {
                full_id: full_id.clone(),
                strategy: config.strategy,
                hook: config.error_hook.clone(),
                dead_letters: Arc::new(DeadLetters::new(config.resolved_capacity())),
                metrics: Arc::new(TopicMetrics::default()),
            },
            policy: RwLock::new(SenderPolicy::new(config.blacklist, config.whitelist)),
            registry: RwLock::new(HandlerRegistry::default()),
            routes: RwLock::new(HashMap::new()),
            inflight: Mutex::new(Vec::new()),
            debug: config.debug,
            id,
            version,
            full_id,
        }
    }

    /// Topic id without the version.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Semantic version of the topic interface.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full topic id, `"id@version"`.
    pub fn full_id(&self) -> &str {
        &self.full_id
    }

    /// Configured failure strategy.
    pub fn strategy(&self) -> ErrorStrategy {
        self.sink.strategy
    }

    // ---- Registration ----

    /// Registers a handler with default options.
    ///
    /// Returns the handler unchanged so call sites can keep using the same
    /// reference they registered.
    pub async fn register(&self, handler: HandlerRef) -> Result<HandlerRef, TopicError> {
        self.register_with(handler, RegisterOptions::default()).await
    }

    /// Registers a handler with explicit options.
    ///
    /// The registry keeps priority-descending order; equal priorities run in
    /// registration order. Handler names are unique within a topic —
    /// re-registering a name fails with [`TopicError::DuplicateHandler`].
    pub async fn register_with(
        &self,
        handler: HandlerRef,
        options: RegisterOptions,
    ) -> Result<HandlerRef, TopicError> {
        let name: Arc<str> = handler.name().into();

        {
            let mut registry = self.registry.write().await;
            if registry.contains_name(&name) {
                return Err(TopicError::DuplicateHandler {
                    handler: name,
                    topic: self.full_id.clone(),
                });
            }
            registry.insert(HandlerRegistration {
                handler: handler.clone(),
                name: name.clone(),
                aliases: options.aliases.iter().cloned().collect(),
                priority: options.priority,
                generic: options.generic,
                transactional: options.transactional,
            });
        }

        // Route side table: registration metadata lives here, never on the
        // callable itself.
        let mut aliases = options.aliases;
        aliases.sort_unstable();
        self.routes.write().await.insert(
            name.clone(),
            RouteInfo {
                topic: self.full_id.clone(),
                priority: options.priority,
                aliases,
            },
        );

        if self.debug {
            tracing::debug!(
                topic = %self.full_id,
                handler = %name,
                priority = options.priority,
                generic = options.generic,
                "handler registered"
            );
        }

        Ok(handler)
    }

    // ---- Security ----

    /// Denies a sender id.
    pub async fn add_to_blacklist(&self, sender_id: impl Into<String>) {
        self.policy.write().await.block(sender_id);
    }

    /// Lifts a denial.
    pub async fn remove_from_blacklist(&self, sender_id: &str) {
        self.policy.write().await.unblock(sender_id);
    }

    /// Adds a sender to the exclusive allow list, creating it if absent.
    pub async fn add_to_whitelist(&self, sender_id: impl Into<String>) {
        self.policy.write().await.admit(sender_id);
    }

    /// Removes a sender from the allow list. An emptied whitelist still
    /// denies everyone; it does not revert to open admission.
    pub async fn remove_from_whitelist(&self, sender_id: &str) {
        self.policy.write().await.revoke(sender_id);
    }

    /// Deny if blacklisted; else if a whitelist exists, allow only members;
    /// else allow.
    pub async fn is_sender_allowed(&self, sender_id: &str) -> bool {
        self.policy.read().await.is_allowed(sender_id)
    }

    // ---- Delivery ----

    /// Publishes a message to this topic.
    ///
    /// Empty-sender and denied publishes never reach any handler; they are
    /// synthesized as errors and routed through the same failure pipeline as
    /// handler failures (dead letters, metrics, strategy). Under
    /// [`ErrorStrategy::Raise`] the synthesized or wrapped error is returned;
    /// otherwise `Ok(())` even when failures were absorbed.
    pub async fn publish_event(&self, message: Message) -> Result<(), TopicError> {
        if message.sender.is_empty() {
            let error = TopicError::EmptySender { topic: self.full_id.clone() };
            return self.reject(error, &message).await;
        }
        if !self.is_sender_allowed(&message.sender).await {
            let error = TopicError::SenderDenied {
                sender: message.sender.clone(),
                topic: self.full_id.clone(),
            };
            return self.reject(error, &message).await;
        }

        if self.debug {
            tracing::debug!(
                topic = %self.full_id,
                sender = %message.sender,
                destination = message.destination.as_deref().unwrap_or(""),
                "event published"
            );
        }

        self.handle_event(message).await
    }

    /// Applies the failure pipeline to a rejected publish.
    async fn reject(&self, error: TopicError, message: &Message) -> Result<(), TopicError> {
        self.sink.fail(&error, Some(&message.data)).await;
        match self.sink.strategy {
            ErrorStrategy::Raise => Err(error),
            _ => Ok(()),
        }
    }

    /// Walks the ordered registry and invokes the selected handlers.
    async fn handle_event(&self, message: Message) -> Result<(), TopicError> {
        let selected = self
            .registry
            .read()
            .await
            .select(message.destination.as_deref());

        for registration in selected {
            match registration.handler.exec() {
                HandlerExec::Sync(run) => {
                    let start = Instant::now();
                    let outcome =
                        std::panic::catch_unwind(AssertUnwindSafe(|| run(&message.data)));

                    let error = match outcome {
                        Ok(Ok(())) => {
                            self.sink.metrics.record(true, start.elapsed());
                            continue;
                        }
                        Ok(Err(err)) => TopicError::HandlerFailed {
                            topic: self.full_id.clone(),
                            handler: registration.name.clone(),
                            error: err.message().into(),
                        },
                        Err(panic) => TopicError::HandlerPanicked {
                            topic: self.full_id.clone(),
                            handler: registration.name.clone(),
                            info: panic_info(&*panic).into(),
                        },
                    };

                    self.sink.fail(&error, Some(&message.data)).await;
                    if self.sink.strategy == ErrorStrategy::Raise {
                        // Critical topic: abort this delivery run, remaining
                        // handlers are skipped.
                        return Err(error);
                    }
                }
                HandlerExec::Future(make) => {
                    let fut = make(message.data.clone());
                    let task = run_async_handler(
                        fut,
                        self.sink.clone(),
                        registration.name.clone(),
                        message.data.clone(),
                    );

                    let mut inflight = self.inflight.lock().await;
                    inflight.retain(|handle| !handle.is_finished());
                    inflight.push(tokio::spawn(task));
                }
            }
        }

        Ok(())
    }

    /// Awaits completion of every spawned async handler.
    ///
    /// Delivery never waits for async handlers; this is the explicit hook for
    /// deterministic shutdown and tests.
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut inflight = self.inflight.lock().await;
            inflight.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    // ---- Introspection ----

    /// Point-in-time metrics view.
    pub async fn metrics(&self) -> MetricsSnapshot {
        let handler_count = self.registry.read().await.len();
        self.sink.metrics.snapshot(handler_count)
    }

    /// Captured failures, oldest first.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.sink.dead_letters.entries().await
    }

    /// All registrations in execution order, without the callables.
    pub async fn active_handlers(&self) -> Vec<HandlerInfo> {
        self.registry.read().await.active()
    }

    /// Looks up a registration by name or alias.
    pub async fn handler(&self, name: &str) -> Option<HandlerInfo> {
        self.registry.read().await.find(name)
    }

    /// Routing metadata for a handler name, from the topic-owned side table.
    pub async fn route_of(&self, name: &str) -> Option<RouteInfo> {
        self.routes.read().await.get(name).cloned()
    }

    /// Composes the message a registered handler would send onward: sender is
    /// `"full_id.handler"`, destination and type come from the registration.
    ///
    /// Returns `None` when no handler matches `handler_name`.
    pub async fn handler_message<T: Any + Send + Sync>(
        &self,
        handler_name: &str,
        data: T,
    ) -> Option<Message> {
        let info = self.registry.read().await.find(handler_name)?;
        let message_type: Arc<str> = if info.generic {
            "generic".into()
        } else {
            info.name.clone()
        };
        Some(
            Message::new(format!("{}.{}", self.full_id, info.name), data)
                .with_destination(info.name.clone())
                .with_message_type(message_type)
                .with_timestamp_now(),
        )
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("full_id", &self.full_id)
            .field("strategy", &self.sink.strategy)
            .finish()
    }
}

/// Body of one spawned async handler invocation: run to completion, record
/// the outcome, capture failures. Panics are contained here so a handler can
/// never take the runtime worker down.
async fn run_async_handler(
    fut: futures::future::BoxFuture<'static, Result<(), crate::error::HandlerError>>,
    sink: ErrorSink,
    handler: Arc<str>,
    payload: Payload,
) {
    let start = Instant::now();
    let error = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => {
            sink.metrics.record(true, start.elapsed());
            return;
        }
        Ok(Err(err)) => TopicError::HandlerFailed {
            topic: sink.full_id.clone(),
            handler,
            error: err.message().into(),
        },
        Err(panic) => TopicError::HandlerPanicked {
            topic: sink.full_id.clone(),
            handler,
            info: panic_info(&*panic).into(),
        },
    };

    sink.fail(&error, Some(&payload)).await;
    if sink.strategy == ErrorStrategy::Raise {
        // Delivery already returned; the abort semantics of Raise cannot
        // apply here. Surface loudly instead.
        tracing::error!(
            topic = %sink.full_id,
            error = %error,
            "async handler failed after delivery returned"
        );
    }
}
