use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::attachment::Attachment;
use crate::mention::Mention;

/// Session-level composer mode. Selecting the active mode again returns to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComposerMode {
    #[default]
    None,
    Agent,
    Research,
    Image,
    Think,
}

impl ComposerMode {
    pub const ALL: [ComposerMode; 5] = [
        ComposerMode::None,
        ComposerMode::Agent,
        ComposerMode::Research,
        ComposerMode::Image,
        ComposerMode::Think,
    ];

    /// Whether this mode exposes the research tool toggles.
    pub fn uses_tools(self) -> bool {
        matches!(self, ComposerMode::Research)
    }

    pub fn label(self) -> &'static str {
        match self {
            ComposerMode::None => "Chat",
            ComposerMode::Agent => "Agent",
            ComposerMode::Research => "Research",
            ComposerMode::Image => "Image",
            ComposerMode::Think => "Think",
        }
    }
}

/// Tools that can be enabled while in research mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResearchTool {
    WebSearch,
    Academic,
    News,
    Code,
}

impl ResearchTool {
    pub const ALL: [ResearchTool; 4] = [
        ResearchTool::WebSearch,
        ResearchTool::Academic,
        ResearchTool::News,
        ResearchTool::Code,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResearchTool::WebSearch => "Web",
            ResearchTool::Academic => "Academic",
            ResearchTool::News => "News",
            ResearchTool::Code => "Code",
        }
    }
}

/// Per-mode submission options. Only research carries a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeOptions {
    None,
    Agent,
    Research { tools: Vec<ResearchTool> },
    Image,
    Think,
}

impl ModeOptions {
    /// Builds the options for `mode`; `tools` is only consulted for research.
    pub fn for_mode(mode: ComposerMode, tools: &BTreeSet<ResearchTool>) -> Self {
        match mode {
            ComposerMode::None => ModeOptions::None,
            ComposerMode::Agent => ModeOptions::Agent,
            ComposerMode::Research => ModeOptions::Research {
                tools: tools.iter().copied().collect(),
            },
            ComposerMode::Image => ModeOptions::Image,
            ComposerMode::Think => ModeOptions::Think,
        }
    }

    pub fn mode(&self) -> ComposerMode {
        match self {
            ModeOptions::None => ComposerMode::None,
            ModeOptions::Agent => ComposerMode::Agent,
            ModeOptions::Research { .. } => ComposerMode::Research,
            ModeOptions::Image => ComposerMode::Image,
            ModeOptions::Think => ComposerMode::Think,
        }
    }

    pub fn tools(&self) -> Option<&[ResearchTool]> {
        match self {
            ModeOptions::Research { tools } => Some(tools),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOptions {
    pub model: String,
    #[serde(flatten)]
    pub mode: ModeOptions,
}

/// Everything the composer hands to the submit collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub text: String,
    pub mentions: Vec<Mention>,
    pub attachments: Vec<Attachment>,
    pub options: SubmitOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn research_options_carry_sorted_tools() {
        let tools = BTreeSet::from([ResearchTool::News, ResearchTool::WebSearch]);
        let options = ModeOptions::for_mode(ComposerMode::Research, &tools);
        assert_eq!(
            options.tools(),
            Some(&[ResearchTool::WebSearch, ResearchTool::News][..])
        );
        assert_eq!(options.mode(), ComposerMode::Research);
    }

    #[test]
    fn non_research_modes_drop_tools() {
        let tools = BTreeSet::from([ResearchTool::Code]);
        let options = ModeOptions::for_mode(ComposerMode::Agent, &tools);
        assert_eq!(options, ModeOptions::Agent);
        assert_eq!(options.tools(), None);
    }

    #[test]
    fn submit_options_serialize_as_tagged_union() {
        let options = SubmitOptions {
            model: "claude-3.5-sonnet".to_string(),
            mode: ModeOptions::Research {
                tools: vec![ResearchTool::WebSearch],
            },
        };
        assert_eq!(
            serde_json::to_value(&options).expect("serialize"),
            json!({
                "model": "claude-3.5-sonnet",
                "mode": "research",
                "tools": ["web_search"],
            })
        );

        let plain = SubmitOptions {
            model: "claude-3-haiku".to_string(),
            mode: ModeOptions::None,
        };
        assert_eq!(
            serde_json::to_value(&plain).expect("serialize"),
            json!({ "model": "claude-3-haiku", "mode": "none" })
        );
    }
}
