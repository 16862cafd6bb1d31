use std::collections::HashSet;

use crate::ChatEntry;

/// Timestamps already emitted by one job.
pub type SeenSet = HashSet<u64>;

/// Nickname and content constraints applied to every entry of a job.
///
/// Both comparisons are case-sensitive. An empty field places no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    pub nickname: String,
    pub message: String,
}

impl Filter {
    pub fn new(nickname: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            message: message.into(),
        }
    }

    /// Builds a filter from user-typed text, trimming surrounding whitespace.
    pub fn from_input(nickname: Option<&str>, message: Option<&str>) -> Self {
        Self::new(
            nickname.map(str::trim).unwrap_or_default(),
            message.map(str::trim).unwrap_or_default(),
        )
    }

    pub fn is_unconstrained(&self) -> bool {
        self.nickname.is_empty() && self.message.is_empty()
    }

    pub fn nickname_matches(&self, nickname: &str) -> bool {
        self.nickname.is_empty() || self.nickname == nickname
    }

    pub fn message_matches(&self, content: &str) -> bool {
        self.message.is_empty() || content.contains(self.message.as_str())
    }

    /// Nickname and content checks, without dedup.
    pub fn matches(&self, entry: &ChatEntry) -> bool {
        self.nickname_matches(&entry.nickname) && self.message_matches(&entry.content)
    }
}

/// Decides whether `entry` is kept. On keep its timestamp is recorded in
/// `seen`, so a repeat later in the same page or a later page is dropped.
pub fn admit(entry: &ChatEntry, filter: &Filter, seen: &mut SeenSet) -> bool {
    if !filter.matches(entry) || seen.contains(&entry.timestamp_ms) {
        return false;
    }
    seen.insert(entry.timestamp_ms);
    true
}
