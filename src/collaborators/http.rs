//! HTTP collaborators over an OpenAI-compatible `chat/completions` API.
//!
//! Both clients send a system + user message pair and read
//! `choices[0].message.content`. The responder additionally picks up
//! grounding sources from either a `sources: [{title, uri}]` array or a
//! `citations: ["https://..."]` array when the backend provides one.

use async_trait::async_trait;
use serde_json::Value;

use super::error::CollaboratorError;
use super::refiner::Refiner;
use super::responder::{Responder, ResponderReply};
use crate::config::LlmConfig;
use crate::routing::{AgentTag, Source};

/// Shared request plumbing for both collaborators.
#[derive(Debug, Clone)]
struct CompletionClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl CompletionClient {
    fn new(config: LlmConfig) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<Value, CollaboratorError> {
        if self.config.api_key.is_empty() {
            return Err(CollaboratorError::Unavailable(
                "no API key configured (set LLM_API_KEY)".into(),
            ));
        }

        let body = completion_body(&self.config.model, system_prompt, user_message);
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Status { status, body });
        }

        Ok(resp.json().await?)
    }
}

/// Build a `chat/completions` request body.
fn completion_body(model: &str, system_prompt: &str, user_message: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": user_message }
        ],
    })
}

/// Extract the assistant text from a completion payload.
fn completion_content(json: &Value) -> Result<String, CollaboratorError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| CollaboratorError::Malformed("no content in completion".into()))
}

/// Extract grounding sources, preferring structured `sources` over `citations`.
fn completion_sources(json: &Value) -> Vec<Source> {
    if let Some(sources) = json["sources"].as_array() {
        return sources
            .iter()
            .filter_map(|s| serde_json::from_value::<Source>(s.clone()).ok())
            .collect();
    }
    json["citations"]
        .as_array()
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(|uri| Source {
                    title: uri.to_string(),
                    uri: uri.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Turn a completion payload into a [`ResponderReply`].
fn parse_reply(json: &Value) -> Result<ResponderReply, CollaboratorError> {
    Ok(ResponderReply {
        content: completion_content(json)?,
        agent_tag: json["agent"]
            .as_str()
            .and_then(|tag| tag.parse::<AgentTag>().ok()),
        sources: completion_sources(json),
    })
}

/// Response generator backed by an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: CompletionClient,
}

impl HttpResponder {
    pub fn new(config: LlmConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: CompletionClient::new(config)?,
        })
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn respond(
        &self,
        user_text: &str,
        context_summary: &str,
    ) -> Result<ResponderReply, CollaboratorError> {
        let json = self.client.complete(context_summary, user_text).await?;
        parse_reply(&json)
    }
}

/// Text refiner backed by an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct HttpRefiner {
    client: CompletionClient,
}

impl HttpRefiner {
    pub fn new(config: LlmConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: CompletionClient::new(config)?,
        })
    }
}

#[async_trait]
impl Refiner for HttpRefiner {
    async fn refine(&self, raw: &str, instruction: &str) -> Result<String, CollaboratorError> {
        let system_prompt = format!(
            "{}\nReturn only the rewritten text, without commentary.",
            instruction
        );
        let json = self.client.complete(&system_prompt, raw).await?;
        completion_content(&json)
    }
}
