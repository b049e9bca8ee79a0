//! # Registration options.
//!
//! [`RegisterOptions`] carries everything a topic needs to know about a
//! handler beyond the callable itself. [`Topic::register`](crate::Topic::register)
//! is the no-options convenience form;
//! [`Topic::register_with`](crate::Topic::register_with) takes these.

/// Per-registration configuration.
///
/// # Example
/// ```
/// use topicbus::RegisterOptions;
///
/// let opts = RegisterOptions::default()
///     .with_priority(100)
///     .with_alias("chart_update")
///     .generic();
///
/// assert_eq!(opts.priority, 100);
/// assert!(opts.generic);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RegisterOptions {
    /// Alternate names the handler matches as a destination.
    pub aliases: Vec<String>,
    /// Execution priority; higher runs earlier. Equal priorities run in
    /// registration order.
    pub priority: i32,
    /// Generic handlers receive every message regardless of destination.
    pub generic: bool,
    /// Reserved flag, carried as metadata only. No executable effect.
    pub transactional: bool,
}

impl RegisterOptions {
    /// Sets the execution priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds one alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Marks the handler as generic (receives every message).
    #[must_use]
    pub fn generic(mut self) -> Self {
        self.generic = true;
        self
    }

    /// Sets the reserved transactional flag.
    #[must_use]
    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }
}
