//! Topic engine: ordered dispatch, security, failure capture, and metrics.
//!
//! This module contains the embedded dispatch machinery behind a
//! [`Topic`]:
//!
//! - the priority-ordered handler registry (internal);
//! - [`SenderPolicy`]: blacklist/whitelist admission;
//! - [`ErrorStrategy`], [`ErrorHook`]: failure-surfacing policy;
//! - [`DeadLetters`], [`DeadLetter`]: bounded failure buffer;
//! - [`TopicMetrics`], [`MetricsSnapshot`]: per-topic counters and latency EMA.
//!
//! The only delivery entry points are [`Topic::publish_event`] (direct) and
//! [`Broker::publish`](crate::Broker::publish) (by topic id).

mod dead_letters;
mod failure;
mod metrics;
mod registry;
mod security;
mod topic;

pub use dead_letters::{DeadLetter, DeadLetters};
pub use failure::{ErrorHook, ErrorStrategy};
pub use metrics::{MetricsSnapshot, TopicMetrics};
pub use registry::{HandlerInfo, RouteInfo};
pub use security::SenderPolicy;
pub use topic::Topic;

/// Best-effort rendering of a caught panic payload.
pub(crate) fn panic_info(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
