use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionId(pub String);

impl From<&str> for MentionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What a mention refers to. Only used to pick an icon/label in the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MentionKind {
    User,
    Agent,
    Channel,
}

impl MentionKind {
    /// Single-glyph marker shown in front of the name in the suggestion list.
    pub fn glyph(self) -> &'static str {
        match self {
            MentionKind::User => "@",
            MentionKind::Agent => "⚙",
            MentionKind::Channel => "#",
        }
    }
}

/// A user, agent or channel that can be referenced from a draft via `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    pub kind: MentionKind,
    pub display_name: String,
}

impl Mention {
    pub fn new(id: impl Into<String>, kind: MentionKind, display_name: impl Into<String>) -> Self {
        Self {
            id: MentionId(id.into()),
            kind,
            display_name: display_name.into(),
        }
    }

    /// Text spliced into the draft when this mention is inserted.
    pub fn insert_text(&self) -> String {
        format!("@{} ", self.display_name)
    }
}
