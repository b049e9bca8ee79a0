//! # topicbus
//!
//! **topicbus** is an in-process, topic-based publish/subscribe messaging core
//! for Rust. It decouples producers of occurrences (a UI control's callback,
//! any in-process code) from the handlers that react to them, with
//! priority-ordered dispatch, sender allow/deny security, configurable
//! failure-handling strategies, a bounded failure-capture buffer, and latency
//! metrics.
//!
//! ## Architecture
//! ```text
//!  Producers:                         ┌─────────────────────────────────┐
//!    widget effect ──┐                │  Broker (named topic registry)  │
//!    event.trigger ──┼── publish ───► │   topic id ──► Arc<Topic>       │
//!    other code    ──┘                └───────────────┬─────────────────┘
//!                                                     ▼
//!  ┌─────────────────────────────────────────────────────────────────────┐
//!  │  Topic "filters@1.0.0"                                              │
//!  │  - SenderPolicy (blacklist / whitelist)                             │
//!  │  - HandlerRegistry (priority desc, stable)                          │
//!  │  - ErrorStrategy (Raise / Warn / Ignore / Custom) + ErrorSink       │
//!  │  - DeadLetters (bounded, drop-on-full)                              │
//!  │  - TopicMetrics (counters + latency EMA)                            │
//!  └───────┬────────────────────┬────────────────────┬───────────────────┘
//!          ▼                    ▼                    ▼
//!    sync handler         sync handler         async handler
//!    (inline, ordered)    (inline, ordered)    (tokio::spawn,
//!                                               fire-and-forget)
//! ```
//!
//! ## Delivery semantics
//! - A publish validates the sender first; a denied or empty sender never
//!   reaches any handler and is captured through the same failure pipeline as
//!   handler errors.
//! - Handlers run in priority order (higher first; ties in registration
//!   order). Non-generic handlers run only when the message destination
//!   matches their name or an alias; generic handlers always run; a message
//!   without a destination reaches generic handlers only.
//! - `publish` returns once all selected sync handlers ran and all async ones
//!   were spawned. [`Topic::drain`] / [`Broker::drain`] await the stragglers.
//! - Failures are captured per handler: buffered as dead letters, counted in
//!   metrics, then surfaced per [`ErrorStrategy`] — `Raise` aborts the
//!   delivery run and returns the error, the rest absorb it.
//!
//! ## Features
//! | Area           | Description                                             | Key types                             |
//! |----------------|---------------------------------------------------------|---------------------------------------|
//! | **Broker**     | Named topic registry, fail-fast routing by id.          | [`Broker`], [`BrokerError`]           |
//! | **Topics**     | Ordered dispatch, security, failure capture, metrics.   | [`Topic`], [`TopicConfig`]            |
//! | **Handlers**   | Named sync/async callables with registration options.   | [`Handler`], [`RegisterOptions`]      |
//! | **Messages**   | The delivery record and its opaque payload.             | [`Message`], [`Payload`]              |
//! | **Events**     | Named occurrences as a front end over publishing.       | [`Event`], [`NamedEvent`]             |
//! | **Failures**   | Strategies, dead letters, custom hooks.                 | [`ErrorStrategy`], [`DeadLetter`]     |
//!
//! ## Example
//! ```rust
//! use topicbus::{
//!     Broker, ErrorStrategy, Handler, Message, Payload, RegisterOptions, TopicConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Broker::new("app");
//!     let filters = broker
//!         .create_topic(
//!             "filters",
//!             TopicConfig { strategy: ErrorStrategy::Warn, ..TopicConfig::default() },
//!         )
//!         .await;
//!
//!     // Validation runs first (priority 100), charting later (priority 10).
//!     filters
//!         .register_with(
//!             Handler::sync("validate_selection", |data: &Payload| {
//!                 let months = data.downcast_ref::<Vec<&str>>().ok_or("bad payload")?;
//!                 if months.is_empty() {
//!                     return Err("empty selection".into());
//!                 }
//!                 Ok(())
//!             }),
//!             RegisterOptions::default().with_priority(100).generic(),
//!         )
//!         .await?;
//!     filters
//!         .register_with(
//!             Handler::sync("update_chart", |_data: &Payload| Ok(())),
//!             RegisterOptions::default().with_priority(10).generic(),
//!         )
//!         .await?;
//!
//!     broker
//!         .publish("filters", Message::new("month_filter", vec!["Jan", "Feb"]))
//!         .await?;
//!
//!     let metrics = filters.metrics().await;
//!     assert_eq!(metrics.events_processed, 2);
//!     assert_eq!(metrics.errors, 0);
//!     Ok(())
//! }
//! ```

mod broker;
mod config;
mod error;
mod events;
mod handlers;
mod messages;
mod topics;

// ---- Public re-exports ----

pub use broker::Broker;
pub use config::TopicConfig;
pub use error::{BrokerError, HandlerError, TopicError};
pub use events::{Event, NamedEvent};
pub use handlers::{Handler, HandlerRef, RegisterOptions};
pub use messages::{Message, Payload};
pub use topics::{
    DeadLetter, DeadLetters, ErrorHook, ErrorStrategy, HandlerInfo, MetricsSnapshot, RouteInfo,
    SenderPolicy, Topic, TopicMetrics,
};
