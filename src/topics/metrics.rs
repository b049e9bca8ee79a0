//! # Per-topic delivery metrics.
//!
//! Lock-free counters updated on every handler invocation (and on rejected
//! publishes): processed count, error count, last-processed timestamp, and an
//! exponential moving average of successful-invocation latency.
//!
//! The EMA uses smoothing factor α = 0.2 and is updated **only on success**,
//! so failed invocations never distort the latency signal:
//!
//! ```text
//! latency_avg' = α · latency + (1 − α) · latency_avg
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Smoothing factor for the latency moving average.
const LATENCY_ALPHA: f64 = 0.2;

/// Shared, atomically updated metrics record owned by one topic.
///
/// Cheap to share with spawned async handlers via `Arc`; every update is a
/// single atomic op (the EMA uses a CAS loop over the f64 bit pattern).
#[derive(Debug, Default)]
pub struct TopicMetrics {
    events_processed: AtomicU64,
    errors: AtomicU64,
    /// Unix millis of the last processed invocation; 0 = never.
    last_processed_ms: AtomicU64,
    /// f64 bit pattern of the latency EMA, in seconds.
    latency_avg_bits: AtomicU64,
}

impl TopicMetrics {
    /// Records one invocation outcome.
    ///
    /// `events_processed` always increments; `errors` increments only on
    /// failure; the EMA consumes `latency` only on success.
    pub fn record(&self, success: bool, latency: Duration) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().min(u64::MAX as u128) as u64)
            .unwrap_or(0);
        self.last_processed_ms.store(now_ms, Ordering::Relaxed);

        if success {
            let sample = latency.as_secs_f64();
            let _ = self
                .latency_avg_bits
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                    let old = f64::from_bits(bits);
                    let new = LATENCY_ALPHA * sample + (1.0 - LATENCY_ALPHA) * old;
                    Some(new.to_bits())
                });
        }
    }

    /// Takes a consistent-enough point-in-time view for monitoring.
    pub fn snapshot(&self, handler_count: usize) -> MetricsSnapshot {
        let events_processed = self.events_processed.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let last_ms = self.last_processed_ms.load(Ordering::Relaxed);

        MetricsSnapshot {
            events_processed,
            errors,
            last_processed: (last_ms > 0).then(|| UNIX_EPOCH + Duration::from_millis(last_ms)),
            latency_avg: Duration::from_secs_f64(
                f64::from_bits(self.latency_avg_bits.load(Ordering::Relaxed)).max(0.0),
            ),
            error_rate: errors as f64 / (events_processed.max(1)) as f64,
            handler_count,
        }
    }
}

/// Read-only metrics view returned by [`Topic::metrics`](crate::Topic::metrics).
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSnapshot {
    /// Total invocations recorded, successes and failures alike.
    pub events_processed: u64,
    /// Failed invocations (including rejected publishes).
    pub errors: u64,
    /// Wall-clock time of the most recent invocation, if any.
    pub last_processed: Option<SystemTime>,
    /// Exponential moving average of successful-invocation latency.
    pub latency_avg: Duration,
    /// `errors / max(1, events_processed)`.
    pub error_rate: f64,
    /// Handlers currently registered on the topic.
    pub handler_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_outcomes() {
        let m = TopicMetrics::default();
        m.record(true, Duration::from_millis(10));
        m.record(true, Duration::from_millis(10));
        m.record(false, Duration::ZERO);

        let snap = m.snapshot(2);
        assert_eq!(snap.events_processed, 3);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.handler_count, 2);
        assert!(snap.last_processed.is_some());
        assert!((snap.error_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_first_sample() {
        let m = TopicMetrics::default();
        m.record(true, Duration::from_secs(1));
        // starts from 0.0, so first sample contributes exactly alpha
        let snap = m.snapshot(0);
        assert!((snap.latency_avg.as_secs_f64() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_ema_ignores_failures() {
        let m = TopicMetrics::default();
        m.record(true, Duration::from_secs(1));
        let before = m.snapshot(0).latency_avg;
        m.record(false, Duration::from_secs(100));
        assert_eq!(m.snapshot(0).latency_avg, before);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = TopicMetrics::default().snapshot(0);
        assert_eq!(snap.events_processed, 0);
        assert_eq!(snap.errors, 0);
        assert!(snap.last_processed.is_none());
        assert_eq!(snap.error_rate, 0.0);
    }
}
