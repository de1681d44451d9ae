use crate::utils::error::{AgentError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// The two specialised services the orchestrator delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownstreamAgent {
    Listings,
    Sitter,
}

impl DownstreamAgent {
    pub fn label(&self) -> &'static str {
        match self {
            DownstreamAgent::Listings => "listings",
            DownstreamAgent::Sitter => "sitter",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            DownstreamAgent::Listings => "/agent/chat",
            DownstreamAgent::Sitter => "/api/chat",
        }
    }

    fn request_body(&self, query: &str) -> Value {
        match self {
            DownstreamAgent::Listings => json!({ "message": query }),
            DownstreamAgent::Sitter => json!({ "query": query }),
        }
    }

    /// Pulls the reply text out of the service's response envelope, falling
    /// back to the raw JSON when the shape is unexpected.
    fn extract_reply(&self, body: Value) -> Result<String> {
        let text = match self {
            DownstreamAgent::Listings => body
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str),
            DownstreamAgent::Sitter => body.get("response").and_then(Value::as_str),
        };

        match text {
            Some(text) => Ok(text.to_string()),
            None => Ok(serde_json::to_string(&body)?),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownstreamAgentClient {
    client: Client,
    listings_url: String,
    sitter_url: String,
}

impl DownstreamAgentClient {
    pub fn new(listings_url: impl Into<String>, sitter_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            listings_url: listings_url.into(),
            sitter_url: sitter_url.into(),
        })
    }

    pub fn base_url(&self, agent: DownstreamAgent) -> &str {
        match agent {
            DownstreamAgent::Listings => &self.listings_url,
            DownstreamAgent::Sitter => &self.sitter_url,
        }
    }

    pub async fn query(&self, agent: DownstreamAgent, user_query: &str) -> Result<String> {
        let url = format!(
            "{}{}",
            self.base_url(agent).trim_end_matches('/'),
            agent.path()
        );
        tracing::debug!("Querying {} agent at {}", agent.label(), url);

        let response = self
            .client
            .post(&url)
            .json(&agent.request_body(user_query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        agent.extract_reply(body)
    }
}
