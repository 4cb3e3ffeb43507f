//! Transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::AgentTag;
use super::router::RouteReply;

/// Sources shown under an agent message; the rest stay in the transcript.
pub const MAX_DISPLAY_SOURCES: usize = 2;

/// A grounding reference returned by the responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// One transcript entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_tag: Option<AgentTag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            agent_tag: None,
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Agent message carrying a routed reply.
    pub fn agent(reply: RouteReply) -> Self {
        Self {
            sender: Sender::Agent,
            text: reply.reply,
            agent_tag: reply.agent_tag,
            sources: reply.sources,
            timestamp: Utc::now(),
        }
    }

    /// Sources to render under the message.
    pub fn display_sources(&self) -> &[Source] {
        &self.sources[..self.sources.len().min(MAX_DISPLAY_SOURCES)]
    }
}
