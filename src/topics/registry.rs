//! # Ordered handler registry.
//!
//! Holds a topic's registrations sorted by priority **descending**; entries
//! with equal priority keep registration order (stable insertion, first
//! registered runs first). Selection filters by destination:
//!
//! - generic registrations always match;
//! - non-generic ones match when the destination equals their name or one of
//!   their aliases;
//! - a message without a destination reaches generic registrations only.

use std::collections::HashSet;
use std::sync::Arc;

use crate::handlers::HandlerRef;

/// One registered handler plus its routing metadata.
#[derive(Clone)]
pub(crate) struct HandlerRegistration {
    pub(crate) handler: HandlerRef,
    pub(crate) name: Arc<str>,
    pub(crate) aliases: HashSet<String>,
    pub(crate) priority: i32,
    pub(crate) generic: bool,
    pub(crate) transactional: bool,
}

impl HandlerRegistration {
    /// True if this registration should run for the given destination.
    pub(crate) fn matches(&self, destination: Option<&str>) -> bool {
        if self.generic {
            return true;
        }
        match destination {
            Some(dest) => dest == self.name.as_ref() || self.aliases.contains(dest),
            None => false,
        }
    }

    fn info(&self) -> HandlerInfo {
        let mut aliases: Vec<String> = self.aliases.iter().cloned().collect();
        aliases.sort_unstable();
        HandlerInfo {
            name: self.name.clone(),
            priority: self.priority,
            aliases,
            generic: self.generic,
            transactional: self.transactional,
            is_async: self.handler.is_async(),
        }
    }
}

/// Introspection view of a registration, without the callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerInfo {
    /// Handler name (unique within the topic).
    pub name: Arc<str>,
    /// Execution priority.
    pub priority: i32,
    /// Alternate destination names, sorted.
    pub aliases: Vec<String>,
    /// Whether the handler receives every message.
    pub generic: bool,
    /// Reserved registration flag, carried as metadata.
    pub transactional: bool,
    /// Whether the handler is dispatched fire-and-forget.
    pub is_async: bool,
}

/// Routing metadata for one handler, owned by the topic as a side table
/// instead of being stamped onto the callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteInfo {
    /// Full id of the owning topic.
    pub topic: Arc<str>,
    /// Execution priority within that topic.
    pub priority: i32,
    /// Alternate destination names, sorted.
    pub aliases: Vec<String>,
}

/// Priority-ordered collection of registrations.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    entries: Vec<HandlerRegistration>,
}

impl HandlerRegistry {
    /// Inserts preserving the priority-descending/stable-order invariant.
    pub(crate) fn insert(&mut self, registration: HandlerRegistration) {
        let at = self
            .entries
            .iter()
            .position(|existing| registration.priority > existing.priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, registration);
    }

    /// True if a handler with this exact name exists.
    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name.as_ref() == name)
    }

    /// Registrations selected for a destination, in execution order.
    pub(crate) fn select(&self, destination: Option<&str>) -> Vec<HandlerRegistration> {
        self.entries
            .iter()
            .filter(|e| e.matches(destination))
            .cloned()
            .collect()
    }

    /// All registrations as introspection views, in execution order.
    pub(crate) fn active(&self) -> Vec<HandlerInfo> {
        self.entries.iter().map(HandlerRegistration::info).collect()
    }

    /// Finds a registration by name or alias.
    pub(crate) fn find(&self, name: &str) -> Option<HandlerInfo> {
        self.entries
            .iter()
            .find(|e| e.name.as_ref() == name || e.aliases.contains(name))
            .map(HandlerRegistration::info)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
