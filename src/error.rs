//! Error types used by the bus: topic-level, broker-level, and handler-level.
//!
//! This module defines three error types:
//!
//! - [`TopicError`] — failures surfaced by a topic's delivery pipeline
//!   (security denials, handler failures, registration conflicts).
//! - [`BrokerError`] — failures raised by the broker itself, most notably
//!   [`BrokerError::TopicNotFound`], which is always raised and never absorbed.
//! - [`HandlerError`] — what a handler returns to signal that processing of a
//!   payload failed.
//!
//! [`TopicError`] is cheap to clone (`Arc<str>` fields) because every captured
//! failure is also stored in the topic's dead-letter buffer. All types provide
//! `as_label()` for stable log/metric labels.

use std::sync::Arc;

use thiserror::Error;

/// # Errors surfaced by a topic's delivery pipeline.
///
/// Whether a `TopicError` is returned to the publisher depends on the topic's
/// [`ErrorStrategy`](crate::ErrorStrategy): under `Raise` it propagates, under
/// the other strategies it is absorbed after being captured in the dead-letter
/// buffer and reflected in metrics.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TopicError {
    /// Message arrived with an empty sender identity.
    #[error("message rejected by topic '{topic}': sender is empty")]
    EmptySender {
        /// Full id of the rejecting topic.
        topic: Arc<str>,
    },

    /// Sender was blocked by the topic's blacklist/whitelist policy.
    #[error("sender '{sender}' blocked by security policy in topic '{topic}'")]
    SenderDenied {
        /// Identity of the denied sender.
        sender: Arc<str>,
        /// Full id of the denying topic.
        topic: Arc<str>,
    },

    /// A handler with the same name is already registered on this topic.
    #[error("handler '{handler}' already registered in topic '{topic}'")]
    DuplicateHandler {
        /// Name of the conflicting handler.
        handler: Arc<str>,
        /// Full id of the topic.
        topic: Arc<str>,
    },

    /// A handler returned an error while processing a payload.
    #[error("handler '{handler}' failed in topic '{topic}': {error}")]
    HandlerFailed {
        /// Full id of the topic.
        topic: Arc<str>,
        /// Name of the failing handler.
        handler: Arc<str>,
        /// The handler's error message.
        error: Arc<str>,
    },

    /// A handler panicked while processing a payload.
    #[error("handler '{handler}' panicked in topic '{topic}': {info}")]
    HandlerPanicked {
        /// Full id of the topic.
        topic: Arc<str>,
        /// Name of the panicking handler.
        handler: Arc<str>,
        /// Captured panic payload, best effort.
        info: Arc<str>,
    },
}

impl TopicError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::TopicError;
    ///
    /// let err = TopicError::SenderDenied { sender: "s".into(), topic: "t@1.0.0".into() };
    /// assert_eq!(err.as_label(), "sender_denied");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TopicError::EmptySender { .. } => "empty_sender",
            TopicError::SenderDenied { .. } => "sender_denied",
            TopicError::DuplicateHandler { .. } => "duplicate_handler",
            TopicError::HandlerFailed { .. } => "handler_failed",
            TopicError::HandlerPanicked { .. } => "handler_panicked",
        }
    }

    /// True for failures produced while executing a handler (as opposed to
    /// failures produced before delivery started).
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            TopicError::HandlerFailed { .. } | TopicError::HandlerPanicked { .. }
        )
    }
}

/// # Errors raised by the broker.
///
/// Unlike sender denial (absorbed unless the topic is configured to raise),
/// [`BrokerError::TopicNotFound`] always fails fast: publishing to an
/// unregistered topic id is a programming error, not a runtime condition.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BrokerError {
    /// No topic is registered under the requested id.
    #[error("topic '{topic_id}' not found")]
    TopicNotFound {
        /// The unresolved topic id.
        topic_id: String,
    },

    /// The resolved topic's delivery pipeline returned an error.
    #[error(transparent)]
    Topic(#[from] TopicError),
}

impl BrokerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::TopicNotFound { .. } => "topic_not_found",
            BrokerError::Topic(e) => e.as_label(),
        }
    }
}

/// # Error returned by a handler to signal a failed invocation.
///
/// Handlers produce a `HandlerError`; the topic wraps it into
/// [`TopicError::HandlerFailed`] with topic and handler identity attached
/// before it reaches the dead-letter buffer or the publisher.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HandlerError {
    message: Arc<str>,
}

impl HandlerError {
    /// Creates a handler error from any displayable message.
    pub fn fail(message: impl Into<Arc<str>>) -> Self {
        Self { message: message.into() }
    }

    /// The underlying message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::fail(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::fail(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = TopicError::HandlerFailed {
            topic: "orders@1.0.0".into(),
            handler: "audit".into(),
            error: "boom".into(),
        };
        assert_eq!(err.as_label(), "handler_failed");
        assert!(err.is_execution_failure());

        let denied = TopicError::SenderDenied { sender: "s".into(), topic: "t@1.0.0".into() };
        assert!(!denied.is_execution_failure());

        let missing = BrokerError::TopicNotFound { topic_id: "ghost".into() };
        assert_eq!(missing.as_label(), "topic_not_found");
    }

    #[test]
    fn test_broker_error_wraps_topic_error() {
        let inner = TopicError::EmptySender { topic: "t@1.0.0".into() };
        let err: BrokerError = inner.into();
        assert_eq!(err.as_label(), "empty_sender");
    }

    #[test]
    fn test_handler_error_from_str() {
        let err: HandlerError = "bad input".into();
        assert_eq!(err.message(), "bad input");
        assert_eq!(err.to_string(), "bad input");
    }
}
