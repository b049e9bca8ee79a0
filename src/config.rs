//! # Per-topic configuration.
//!
//! [`TopicConfig`] defines a topic's behavior: interface version, failure
//! strategy and optional custom hook, initial sender lists, dead-letter buffer
//! capacity, and debug logging.
//!
//! # Example
//! ```
//! use topicbus::{ErrorStrategy, TopicConfig};
//!
//! let mut cfg = TopicConfig::default();
//! cfg.strategy = ErrorStrategy::Warn;
//! cfg.blacklist = vec!["spammer".into()];
//! cfg.max_dead_letters = 32;
//!
//! assert_eq!(cfg.version, "1.0.0");
//! ```

use crate::topics::{ErrorHook, ErrorStrategy};

/// Configuration consumed by [`Topic::new`](crate::Topic::new) and
/// [`Broker::create_topic`](crate::Broker::create_topic).
#[derive(Clone)]
pub struct TopicConfig {
    /// Semantic version of the topic interface; part of the full id
    /// (`"id@version"`).
    pub version: String,
    /// Failure-surfacing strategy.
    pub strategy: ErrorStrategy,
    /// Custom failure callback, consulted only under
    /// [`ErrorStrategy::Custom`].
    pub error_hook: Option<ErrorHook>,
    /// Sender ids denied from the start.
    pub blacklist: Vec<String>,
    /// Exclusive allow list. `None` (or an empty list) means every
    /// non-blacklisted sender may publish.
    pub whitelist: Option<Vec<String>>,
    /// Capacity of the dead-letter buffer.
    pub max_dead_letters: usize,
    /// Emit per-delivery debug logs for this topic.
    pub debug: bool,
}

impl Default for TopicConfig {
    /// Provides a default configuration:
    /// - `version = "1.0.0"`
    /// - `strategy = ErrorStrategy::Raise`
    /// - no custom hook, empty blacklist, no whitelist
    /// - `max_dead_letters = 100`
    /// - `debug = false`
    fn default() -> Self {
        Self {
            version: Self::DEFAULT_VERSION.to_string(),
            strategy: ErrorStrategy::default(),
            error_hook: None,
            blacklist: Vec::new(),
            whitelist: None,
            max_dead_letters: Self::DEFAULT_MAX_DEAD_LETTERS,
            debug: false,
        }
    }
}

impl TopicConfig {
    /// Default version string used when none is set.
    pub const DEFAULT_VERSION: &'static str = "1.0.0";
    /// Default dead-letter buffer capacity.
    pub const DEFAULT_MAX_DEAD_LETTERS: usize = 100;

    /// Version with the empty-string default resolved.
    pub(crate) fn resolved_version(&self) -> &str {
        if self.version.is_empty() {
            Self::DEFAULT_VERSION
        } else {
            &self.version
        }
    }

    /// Buffer capacity with the zero default resolved.
    pub(crate) fn resolved_capacity(&self) -> usize {
        if self.max_dead_letters == 0 {
            Self::DEFAULT_MAX_DEAD_LETTERS
        } else {
            self.max_dead_letters
        }
    }
}

impl std::fmt::Debug for TopicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicConfig")
            .field("version", &self.version)
            .field("strategy", &self.strategy)
            .field("error_hook", &self.error_hook.as_ref().map(|_| "<hook>"))
            .field("blacklist", &self.blacklist)
            .field("whitelist", &self.whitelist)
            .field("max_dead_letters", &self.max_dead_letters)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let cfg = TopicConfig::default();
        assert_eq!(cfg.resolved_version(), "1.0.0");
        assert_eq!(cfg.resolved_capacity(), 100);
        assert_eq!(cfg.strategy, ErrorStrategy::Raise);
        assert!(cfg.error_hook.is_none());
        assert!(!cfg.debug);
    }

    #[test]
    fn test_explicit_values_win() {
        let cfg = TopicConfig {
            version: "2.1.0".into(),
            max_dead_letters: 8,
            ..TopicConfig::default()
        };
        assert_eq!(cfg.resolved_version(), "2.1.0");
        assert_eq!(cfg.resolved_capacity(), 8);
    }
}
