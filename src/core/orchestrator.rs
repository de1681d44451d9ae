//! Fan-out between the listings and sitter services.
//!
//! The orchestrator is one hosted agent with two tools; the model decides
//! which of them to call.

use crate::adapters::downstream::{DownstreamAgent, DownstreamAgentClient};
use crate::core::agent::{preview, AgentRunner};
use crate::core::tools::{parse_arguments, ToolRegistry};
use crate::core::{Tool, ToolSpec};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    user_query: String,
}

/// Forwards a query to one downstream agent service. Failures become a JSON
/// error payload for the model instead of failing the run.
pub struct DelegateTool {
    agent: DownstreamAgent,
    client: Arc<DownstreamAgentClient>,
}

impl DelegateTool {
    pub fn new(agent: DownstreamAgent, client: Arc<DownstreamAgentClient>) -> Self {
        Self { agent, client }
    }

    fn name(&self) -> &'static str {
        match self.agent {
            DownstreamAgent::Listings => "query_listings_agent",
            DownstreamAgent::Sitter => "query_sitter_agent",
        }
    }
}

#[async_trait]
impl Tool for DelegateTool {
    fn spec(&self) -> ToolSpec {
        let (description, query_description) = match self.agent {
            DownstreamAgent::Listings => (
                "Query the listings agent for pet-friendly venue information. Use this when the user \
                 asks about pet-friendly venues, restaurants, outdoor areas, amenities, specific \
                 neighborhoods, or venue features like outdoor seating and pet policies.",
                "The user's query about pet-friendly venues, listings, or places",
            ),
            DownstreamAgent::Sitter => (
                "Query the pet sitter agent for pet sitter recommendations. Use this when the user \
                 asks about pet sitters, dog walkers, cat sitters, pet care services, sitter \
                 availability on specific days, rates, specializations, or experience.",
                "The user's query about pet sitters or pet care services",
            ),
        };

        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "user_query": {
                        "type": "string",
                        "description": query_description
                    }
                },
                "required": ["user_query"]
            }),
        }
    }

    async fn invoke(&self, arguments: Value) -> Result<String> {
        let args: DelegateArgs = parse_arguments(self.name(), arguments)?;
        tracing::info!(
            "Querying {} agent with: {}",
            self.agent.label(),
            preview(&args.user_query)
        );

        match self.client.query(self.agent, &args.user_query).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::error!("Error querying {} agent: {}", self.agent.label(), e);
                Ok(json!({
                    "error": format!("Failed to query {} agent: {}", self.agent.label(), e),
                    "status": "error"
                })
                .to_string())
            }
        }
    }
}

pub fn orchestrator_tools(client: Arc<DownstreamAgentClient>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(Arc::new(DelegateTool::new(DownstreamAgent::Listings, client.clone())))
        .with_tool(Arc::new(DelegateTool::new(DownstreamAgent::Sitter, client)))
}

/// Runs the orchestrator agent; failures are turned into an apology the
/// frontend can display.
pub async fn run_orchestrator(runner: &AgentRunner, user_query: &str) -> String {
    tracing::info!("Starting orchestration for query: {}", preview(user_query));
    match runner.run(user_query).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Error in orchestration: {}", e);
            format!("I encountered an error processing your request: {}", e)
        }
    }
}
