//! The closed set of response agents and the keyword classifier.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which response agent handled a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentTag {
    /// News and search requests.
    Scout,
    /// Everything not claimed by another agent.
    Strategist,
    /// Negotiation support.
    Diplomat,
}

/// Classification table, evaluated top to bottom; first hit wins.
/// Keywords are lowercase and matched as substrings.
const KEYWORD_RULES: &[(AgentTag, &[&str])] = &[
    (AgentTag::Scout, &["news", "search"]),
    (AgentTag::Diplomat, &["negotiate"]),
];

impl AgentTag {
    /// Tag used when no keyword rule matches.
    pub const DEFAULT: AgentTag = AgentTag::Strategist;

    pub const ALL: [AgentTag; 3] = [AgentTag::Scout, AgentTag::Strategist, AgentTag::Diplomat];

    /// Classify free-form user text. Never fails: unmatched text goes to
    /// [`AgentTag::DEFAULT`].
    pub fn classify(text: &str) -> AgentTag {
        let lower = text.to_lowercase();
        KEYWORD_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(tag, _)| *tag)
            .unwrap_or(Self::DEFAULT)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scout => "scout",
            Self::Strategist => "strategist",
            Self::Diplomat => "diplomat",
        }
    }

    /// Label shown next to the "processing" indicator.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Scout => "Scout",
            Self::Strategist => "Strategist",
            Self::Diplomat => "Diplomat",
        }
    }

    /// Role line prepended to the context summary sent to the responder.
    pub fn persona_prompt(&self) -> &'static str {
        match self {
            Self::Scout => {
                "You are the Scout agent. Gather recent news and market intelligence \
                 relevant to the organization and cite your sources."
            }
            Self::Strategist => {
                "You are the Strategist agent. Turn the organization's goals into \
                 concrete, phased expansion plans."
            }
            Self::Diplomat => {
                "You are the Diplomat agent. Prepare negotiation positions, concessions \
                 and cultural considerations for the counterpart."
            }
        }
    }
}

impl std::fmt::Display for AgentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown agent tag '{}'", s))
    }
}
