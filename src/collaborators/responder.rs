//! Response-generation collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::CollaboratorError;
use crate::routing::{AgentTag, Source};

/// What a responder produced for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderReply {
    pub content: String,
    /// Tag suggested by the backend. The router keeps its own classification.
    #[serde(default)]
    pub agent_tag: Option<AgentTag>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl ResponderReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Generates the reply to a routed user request.
///
/// Implementations may block on network I/O; callers drop the returned
/// future to cancel, so implementations must not rely on running to
/// completion to release resources.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        user_text: &str,
        context_summary: &str,
    ) -> Result<ResponderReply, CollaboratorError>;
}
