//! # Sender allow/deny policy.
//!
//! Per-topic security model with O(1) membership checks:
//!
//! - **blacklist**: denied sender ids, always checked first;
//! - **whitelist**: when present, only members may publish.
//!
//! A topic built without a whitelist admits every non-blacklisted sender. Once
//! a whitelist exists it is authoritative — removing its last member leaves an
//! empty whitelist that denies everyone, it does not revert to open admission.

use std::collections::HashSet;

/// Blacklist/whitelist policy deciding which senders may publish.
#[derive(Clone, Debug, Default)]
pub struct SenderPolicy {
    blacklist: HashSet<String>,
    whitelist: Option<HashSet<String>>,
}

impl SenderPolicy {
    /// Builds a policy from initial lists. An empty `whitelist` argument means
    /// "no whitelist" (open admission), matching topic construction.
    pub fn new(blacklist: Vec<String>, whitelist: Option<Vec<String>>) -> Self {
        let whitelist = match whitelist {
            Some(ids) if !ids.is_empty() => Some(ids.into_iter().collect()),
            _ => None,
        };
        Self {
            blacklist: blacklist.into_iter().collect(),
            whitelist,
        }
    }

    /// Deny if blacklisted; else if a whitelist exists, allow only members;
    /// else allow.
    pub fn is_allowed(&self, sender_id: &str) -> bool {
        if self.blacklist.contains(sender_id) {
            return false;
        }
        match &self.whitelist {
            Some(allowed) => allowed.contains(sender_id),
            None => true,
        }
    }

    /// Adds a sender to the blacklist.
    pub fn block(&mut self, sender_id: impl Into<String>) {
        self.blacklist.insert(sender_id.into());
    }

    /// Removes a sender from the blacklist.
    pub fn unblock(&mut self, sender_id: &str) {
        self.blacklist.remove(sender_id);
    }

    /// Adds a sender to the whitelist, creating the whitelist if absent.
    pub fn admit(&mut self, sender_id: impl Into<String>) {
        self.whitelist
            .get_or_insert_with(HashSet::new)
            .insert(sender_id.into());
    }

    /// Removes a sender from the whitelist, if one exists.
    pub fn revoke(&mut self, sender_id: &str) {
        if let Some(allowed) = &mut self.whitelist {
            allowed.remove(sender_id);
        }
    }

    /// True if a whitelist is configured (even an empty one).
    pub fn has_whitelist(&self) -> bool {
        self.whitelist.is_some()
    }
}
