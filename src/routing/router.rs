//! Router: classify, delegate to the responder, degrade on failure.

use std::sync::Arc;

use serde::Serialize;

use super::agent::AgentTag;
use super::message::Source;
use super::status::{RequestPhase, StatusGuard};
use crate::collaborators::Responder;
use crate::context::OrgContext;

/// Reply used when the responder fails.
pub const FALLBACK_REPLY: &str =
    "Our strategy agents are unreachable right now. Please try again in a moment.";

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReply {
    /// The classified agent; `None` for a degraded reply.
    pub agent_tag: Option<AgentTag>,
    pub reply: String,
    /// Full source list as returned by the responder.
    pub sources: Vec<Source>,
    pub degraded: bool,
}

impl RouteReply {
    fn fallback() -> Self {
        Self {
            agent_tag: None,
            reply: FALLBACK_REPLY.to_string(),
            sources: Vec::new(),
            degraded: true,
        }
    }
}

/// Routes chat input to one of the fixed agents.
///
/// Stateless apart from the responder handle; retries are the caller's
/// business.
#[derive(Clone)]
pub struct Router {
    responder: Arc<dyn Responder>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self { responder }
    }

    /// Route `text` without reporting status.
    ///
    /// `text` is expected to be non-empty; callers reject blank input.
    pub async fn route(&self, text: &str, context: &OrgContext) -> RouteReply {
        self.run(text, context, None).await
    }

    /// Route `text`, reporting each phase through `status`.
    ///
    /// The guard is left in `Delivered` or `Degraded`; dropping it returns
    /// the tracker to idle.
    pub async fn route_tracked(
        &self,
        text: &str,
        context: &OrgContext,
        status: &StatusGuard<'_>,
    ) -> RouteReply {
        self.run(text, context, Some(status)).await
    }

    async fn run(
        &self,
        text: &str,
        context: &OrgContext,
        status: Option<&StatusGuard<'_>>,
    ) -> RouteReply {
        let report = |phase: RequestPhase| {
            if let Some(guard) = status {
                guard.advance(phase);
            }
        };

        report(RequestPhase::Classifying);
        let agent = AgentTag::classify(text);
        log::debug!("Routing request to {} agent", agent);

        report(RequestPhase::AwaitingResponse { agent });
        let context_summary = build_context_summary(agent, context);

        match self.responder.respond(text, &context_summary).await {
            Ok(reply) => {
                if let Some(suggested) = reply.agent_tag.filter(|t| *t != agent) {
                    log::debug!(
                        "Responder suggested {} agent; keeping classified {}",
                        suggested,
                        agent
                    );
                }
                report(RequestPhase::Delivered { agent });
                RouteReply {
                    agent_tag: Some(agent),
                    reply: reply.content,
                    sources: reply.sources,
                    degraded: false,
                }
            }
            Err(e) => {
                log::warn!("Responder failed for {} agent: {}", agent, e);
                report(RequestPhase::Degraded);
                RouteReply::fallback()
            }
        }
    }
}

/// Agent persona line followed by the organization summary.
fn build_context_summary(agent: AgentTag, context: &OrgContext) -> String {
    let org = context.summary();
    if org.is_empty() {
        agent.persona_prompt().to_string()
    } else {
        format!("{}\n\n{}", agent.persona_prompt(), org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CollaboratorError, ResponderReply};
    use crate::routing::status::StatusTracker;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Echoes the request and records the context summary it saw.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(String, String)>>,
        sources: Vec<Source>,
    }

    #[async_trait]
    impl Responder for Recording {
        async fn respond(
            &self,
            user_text: &str,
            context_summary: &str,
        ) -> Result<ResponderReply, CollaboratorError> {
            self.seen
                .lock()
                .push((user_text.to_string(), context_summary.to_string()));
            Ok(ResponderReply {
                content: format!("re: {}", user_text),
                agent_tag: Some(AgentTag::Diplomat),
                sources: self.sources.clone(),
            })
        }
    }

    struct Failing;

    #[async_trait]
    impl Responder for Failing {
        async fn respond(&self, _: &str, _: &str) -> Result<ResponderReply, CollaboratorError> {
            Err(CollaboratorError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    fn ctx() -> OrgContext {
        OrgContext {
            org_type: "sme".into(),
            target_region: "LATAM".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_route_scout() {
        let router = Router::new(Arc::new(Recording::default()));
        let reply = router.route("Find recent news on tariffs", &ctx()).await;
        assert_eq!(reply.agent_tag, Some(AgentTag::Scout));
        assert_eq!(reply.reply, "re: Find recent news on tariffs");
        assert!(!reply.degraded);
    }

    #[tokio::test]
    async fn test_route_diplomat_and_default() {
        let router = Router::new(Arc::new(Recording::default()));
        assert_eq!(
            router.route("Help me negotiate this deal", &ctx()).await.agent_tag,
            Some(AgentTag::Diplomat)
        );
        assert_eq!(
            router.route("Build a market entry plan", &ctx()).await.agent_tag,
            Some(AgentTag::Strategist)
        );
    }

    #[tokio::test]
    async fn test_classified_tag_wins_over_suggestion() {
        // Recording always suggests Diplomat.
        let router = Router::new(Arc::new(Recording::default()));
        let reply = router.route("search for suppliers", &ctx()).await;
        assert_eq!(reply.agent_tag, Some(AgentTag::Scout));
    }

    #[tokio::test]
    async fn test_context_summary_reaches_responder() {
        let responder = Arc::new(Recording::default());
        let router = Router::new(responder.clone());
        router.route("Build a plan", &ctx()).await;
        let seen = responder.seen.lock();
        let (text, summary) = &seen[0];
        assert_eq!(text, "Build a plan");
        assert!(summary.starts_with(AgentTag::Strategist.persona_prompt()));
        assert!(summary.contains("Target region: LATAM"));
    }

    #[tokio::test]
    async fn test_sources_pass_through_untruncated() {
        let sources: Vec<Source> = (0..4)
            .map(|i| Source {
                title: format!("t{}", i),
                uri: format!("https://x/{}", i),
            })
            .collect();
        let router = Router::new(Arc::new(Recording {
            sources: sources.clone(),
            ..Default::default()
        }));
        let reply = router.route("news please", &ctx()).await;
        assert_eq!(reply.sources, sources);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        let router = Router::new(Arc::new(Failing));
        let reply = router.route("Find news", &ctx()).await;
        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert_eq!(reply.agent_tag, None);
        assert!(reply.degraded);
        assert!(reply.sources.is_empty());
    }

    #[tokio::test]
    async fn test_tracked_phases_and_release() {
        let tracker = StatusTracker::new();
        let router = Router::new(Arc::new(Failing));
        {
            let guard = tracker.try_begin().unwrap();
            router.route_tracked("negotiate", &ctx(), &guard).await;
            assert_eq!(guard.phase(), RequestPhase::Degraded);
        }
        assert!(tracker.current().is_idle());

        let router = Router::new(Arc::new(Recording::default()));
        {
            let guard = tracker.try_begin().unwrap();
            router.route_tracked("negotiate", &ctx(), &guard).await;
            assert_eq!(
                guard.phase(),
                RequestPhase::Delivered {
                    agent: AgentTag::Diplomat
                }
            );
        }
        assert!(tracker.current().is_idle());
    }

    #[test]
    fn test_summary_without_context_is_persona_only() {
        assert_eq!(
            build_context_summary(AgentTag::Scout, &OrgContext::default()),
            AgentTag::Scout.persona_prompt()
        );
    }
}
