//! # Failure pipeline: strategies and the capture path.
//!
//! Every failure in a topic — a handler error, a handler panic, or a rejected
//! publish — goes through the same pipeline ([`ErrorSink::capture`]):
//!
//! 1. best-effort insert into the bounded dead-letter buffer;
//! 2. strategy application:
//!    - `Raise`: nothing here; the call site surfaces the error to the
//!      publisher and aborts the delivery loop;
//!    - `Warn`: logged at `warn` level, delivery continues;
//!    - `Ignore`: no observable action;
//!    - `Custom`: the configured hook is invoked. A panic inside the hook is
//!      caught and logged at `error` level, never propagated — a failing
//!      error handler must not start an error cascade.
//!
//! The sink is a small clonable bundle so spawned async handlers can capture
//! failures without holding a reference to the whole topic.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::TopicError;
use crate::messages::Payload;
use crate::topics::dead_letters::DeadLetters;
use crate::topics::metrics::TopicMetrics;

/// Topic-wide policy governing how captured failures surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStrategy {
    /// Abort the delivery loop and return the wrapped error to the publisher.
    #[default]
    Raise,
    /// Log a warning and continue with the next handler.
    Warn,
    /// Absorb silently; observable only via metrics and the failure buffer.
    Ignore,
    /// Invoke the configured [`ErrorHook`]; continue with the next handler.
    Custom,
}

/// Custom failure callback: receives the error and the payload it concerned.
pub type ErrorHook = Arc<dyn Fn(&TopicError, Option<&Payload>) + Send + Sync>;

/// Clonable failure path shared by the delivery loop and spawned handlers.
#[derive(Clone)]
pub(crate) struct ErrorSink {
    pub(crate) full_id: Arc<str>,
    pub(crate) strategy: ErrorStrategy,
    pub(crate) hook: Option<ErrorHook>,
    pub(crate) dead_letters: Arc<DeadLetters>,
    pub(crate) metrics: Arc<TopicMetrics>,
}

impl ErrorSink {
    /// Records a failed invocation in metrics and runs the capture path.
    pub(crate) async fn fail(&self, error: &TopicError, payload: Option<&Payload>) {
        self.metrics.record(false, std::time::Duration::ZERO);
        self.capture(error, payload).await;
    }

    /// Runs the capture path for one failure: buffer insert, then strategy.
    ///
    /// Does not raise; under [`ErrorStrategy::Raise`] the call site decides
    /// whether to return the error to the publisher.
    pub(crate) async fn capture(&self, error: &TopicError, payload: Option<&Payload>) {
        self.dead_letters.push(error.clone(), payload.cloned()).await;

        match self.strategy {
            ErrorStrategy::Custom => {
                if let Some(hook) = &self.hook {
                    let outcome =
                        std::panic::catch_unwind(AssertUnwindSafe(|| hook(error, payload)));
                    if let Err(panic) = outcome {
                        tracing::error!(
                            topic = %self.full_id,
                            info = %crate::topics::panic_info(&*panic),
                            "custom error handler failed; suppressed"
                        );
                    }
                }
            }
            ErrorStrategy::Warn => {
                tracing::warn!(topic = %self.full_id, error = %error, "handler failure absorbed");
            }
            ErrorStrategy::Raise | ErrorStrategy::Ignore => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sink(strategy: ErrorStrategy, hook: Option<ErrorHook>) -> ErrorSink {
        ErrorSink {
            full_id: "t@1.0.0".into(),
            strategy,
            hook,
            dead_letters: Arc::new(DeadLetters::new(10)),
            metrics: Arc::new(TopicMetrics::default()),
        }
    }

    fn boom() -> TopicError {
        TopicError::HandlerFailed {
            topic: "t@1.0.0".into(),
            handler: "h".into(),
            error: "boom".into(),
        }
    }

    #[tokio::test]
    async fn test_capture_always_buffers() {
        for strategy in [
            ErrorStrategy::Raise,
            ErrorStrategy::Warn,
            ErrorStrategy::Ignore,
        ] {
            let sink = sink(strategy, None);
            sink.capture(&boom(), Some(&Payload::new(2_i64))).await;
            assert_eq!(sink.dead_letters.len().await, 1);
        }
    }

    #[tokio::test]
    async fn test_custom_hook_receives_error_and_payload() {
        let seen: Arc<Mutex<Vec<(String, Option<i64>)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let hook: ErrorHook = Arc::new(move |err, payload| {
            seen2.lock().unwrap().push((
                err.as_label().to_string(),
                payload.and_then(|p| p.downcast_ref::<i64>().copied()),
            ));
        });

        let sink = sink(ErrorStrategy::Custom, Some(hook));
        sink.capture(&boom(), Some(&Payload::new(4_i64))).await;

        let calls = seen.lock().unwrap();
        assert_eq!(calls.as_slice(), [("handler_failed".to_string(), Some(4))]);
    }

    #[tokio::test]
    async fn test_custom_hook_panic_is_contained() {
        let hook: ErrorHook = Arc::new(|_, _| panic!("hook exploded"));
        let sink = sink(ErrorStrategy::Custom, Some(hook));
        // must not propagate the panic
        sink.capture(&boom(), None).await;
        assert_eq!(sink.dead_letters.len().await, 1);
    }

    #[tokio::test]
    async fn test_custom_without_hook_is_silent() {
        let sink = sink(ErrorStrategy::Custom, None);
        sink.capture(&boom(), None).await;
        assert_eq!(sink.dead_letters.len().await, 1);
    }
}
