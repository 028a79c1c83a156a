//! In-memory directory of mentionable users, agents and channels.

use parley_protocol::Mention;
use parley_protocol::MentionKind;

/// How many entries the "quick mentions" shortcut list shows.
pub const QUICK_MENTION_COUNT: usize = 4;

/// Ordered list of mention targets. Enumeration order is the display order; filtering never
/// re-ranks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionIndex {
    entries: Vec<Mention>,
}

impl MentionIndex {
    pub fn new(entries: Vec<Mention>) -> Self {
        Self { entries }
    }

    /// Built-in directory used when nothing else is configured.
    pub fn sample() -> Self {
        Self::new(vec![
            Mention::new("1", MentionKind::User, "Alice Johnson"),
            Mention::new("2", MentionKind::User, "Bob Smith"),
            Mention::new("3", MentionKind::Agent, "Code Assistant"),
            Mention::new("4", MentionKind::Agent, "Research Agent"),
            Mention::new("5", MentionKind::Channel, "general"),
            Mention::new("6", MentionKind::Channel, "engineering"),
        ])
    }

    /// Entries whose display name contains `query`, case-insensitively, in index order.
    ///
    /// An empty query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&Mention> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|mention| mention.display_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn quick_mentions(&self) -> &[Mention] {
        let end = QUICK_MENTION_COUNT.min(self.entries.len());
        &self.entries[..end]
    }
}
