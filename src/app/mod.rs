//! Wiring: turns a [`ServiceConfig`] into the state each service runs on.

use crate::adapters::downstream::DownstreamAgentClient;
use crate::adapters::foundry::FoundryAgentClient;
use crate::adapters::storage::JsonFileSitterStore;
use crate::config::ServiceConfig;
use crate::core::agent::{
    AgentRunner, ORCHESTRATOR_AGENT_NAME, ORCHESTRATOR_INSTRUCTIONS, SITTER_AGENT_INSTRUCTIONS,
    SITTER_AGENT_NAME,
};
use crate::core::conversation::ConversationStore;
use crate::core::orchestrator::orchestrator_tools;
use crate::core::sitter_search::SitterSearch;
use crate::core::tools::{SearchSittersTool, SitterDetailsTool, ToolRegistry};
use crate::core::venue::VenueAgent;
use crate::core::{AgentDefinition, AgentRuntime};
use crate::server::orchestrator::OrchestratorState;
use crate::server::sitter::SitterState;
use crate::server::venue::VenueState;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

pub const SITTER_DEFAULT_PORT: u16 = 8002;
pub const VENUE_DEFAULT_PORT: u16 = 8001;
pub const ORCHESTRATOR_DEFAULT_PORT: u16 = 8003;

pub const VENUE_AGENT_NAME: &str = "OctopetsVenueAgent";

/// The Foundry runtime, or `None` when endpoint or key are missing.
pub fn build_runtime(config: &ServiceConfig) -> Result<Option<Arc<dyn AgentRuntime>>> {
    match config.foundry_settings() {
        Some(settings) => {
            tracing::info!("Azure AI agent client initialized for {}", settings.endpoint);
            let client = FoundryAgentClient::new(settings)?;
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::warn!("AZURE_OPENAI_ENDPOINT or AZURE_AI_API_KEY not set, agent platform disabled");
            Ok(None)
        }
    }
}

fn definition(config: &ServiceConfig, name: &str, instructions: &str) -> AgentDefinition {
    AgentDefinition {
        name: name.to_string(),
        instructions: instructions.to_string(),
        model: config.agent.model.clone(),
        agent_id: None,
    }
}

pub fn sitter_search(config: &ServiceConfig) -> Arc<SitterSearch<JsonFileSitterStore>> {
    Arc::new(SitterSearch::new(JsonFileSitterStore::new(
        &config.sitter.data_path,
    )))
}

pub fn sitter_tools(search: Arc<SitterSearch<JsonFileSitterStore>>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(Arc::new(SearchSittersTool::new(search.clone())))
        .with_tool(Arc::new(SitterDetailsTool::new(search)))
}

pub fn build_sitter_state(
    config: &ServiceConfig,
    runtime: Option<Arc<dyn AgentRuntime>>,
) -> SitterState {
    let search = sitter_search(config);
    let agent = runtime.map(|runtime| {
        AgentRunner::new(
            runtime,
            definition(config, SITTER_AGENT_NAME, SITTER_AGENT_INSTRUCTIONS),
            sitter_tools(search.clone()),
        )
    });

    SitterState { search, agent }
}

/// The venue agent only runs against a pre-provisioned platform agent.
pub fn build_venue_state(config: &ServiceConfig, runtime: Option<Arc<dyn AgentRuntime>>) -> VenueState {
    let runner = match (runtime, &config.agent.agent_id) {
        (Some(runtime), Some(agent_id)) => {
            let mut definition = definition(config, VENUE_AGENT_NAME, "");
            definition.agent_id = Some(agent_id.clone());
            Some(AgentRunner::new(runtime, definition, ToolRegistry::new()))
        }
        (Some(_), None) => {
            tracing::warn!("AZURE_AI_AGENT_ID not set, venue agent will use fallback replies");
            None
        }
        (None, _) => None,
    };

    VenueState {
        agent: VenueAgent::new(runner, Arc::new(ConversationStore::new())),
    }
}

pub fn build_orchestrator_state(
    config: &ServiceConfig,
    runtime: Option<Arc<dyn AgentRuntime>>,
) -> Result<OrchestratorState> {
    let downstream = Arc::new(DownstreamAgentClient::new(
        config.orchestrator.listings_agent_url.clone(),
        config.orchestrator.sitter_agent_url.clone(),
        Duration::from_secs(config.orchestrator.timeout_seconds),
    )?);

    let runner = runtime.map(|runtime| {
        AgentRunner::new(
            runtime,
            definition(config, ORCHESTRATOR_AGENT_NAME, ORCHESTRATOR_INSTRUCTIONS),
            orchestrator_tools(downstream),
        )
    });

    Ok(OrchestratorState {
        runner,
        listings_agent_url: config.orchestrator.listings_agent_url.clone(),
        sitter_agent_url: config.orchestrator.sitter_agent_url.clone(),
    })
}
