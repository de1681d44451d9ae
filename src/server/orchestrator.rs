//! Multi-agent orchestrator API.

use crate::core::agent::AgentRunner;
use crate::core::orchestrator::run_orchestrator;
use crate::core::ChatMessage;
use crate::utils::error::AgentError;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct OrchestratorState {
    pub runner: Option<AgentRunner>,
    pub listings_agent_url: String,
    pub sitter_agent_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub suggestions: Option<Vec<String>>,
}

pub fn router(state: Arc<OrchestratorState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/agent/chat", post(chat))
        .with_state(state)
}

async fn root(State(state): State<Arc<OrchestratorState>>) -> Json<Value> {
    Json(json!({
        "message": "Octopets Multi-Agent Orchestrator API 🐾",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Coordinates between listings and sitter agents for complex queries",
        "endpoints": {
            "chat": "/agent/chat",
            "health": "/health"
        },
        "agents": {
            "listings": state.listings_agent_url,
            "sitter": state.sitter_agent_url
        }
    }))
}

async fn health(State(state): State<Arc<OrchestratorState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "azure_ai_status": if state.runner.is_some() { "connected" } else { "not configured" }
    }))
}

/// POST /agent/chat - Delegates to the listings and/or sitter agents
async fn chat(
    State(state): State<Arc<OrchestratorState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    tracing::info!(
        "Received chat request: {}",
        crate::core::agent::preview(&request.message)
    );

    let content = match &state.runner {
        Some(runner) => run_orchestrator(runner, &request.message).await,
        None => {
            let err = AgentError::AgentNotConfigured {
                message: "set AZURE_OPENAI_ENDPOINT and AZURE_AI_API_KEY".to_string(),
            };
            tracing::error!("Error in orchestration: {}", err);
            format!("I encountered an error processing your request: {}", err)
        }
    };

    Json(ChatResponse {
        message: ChatMessage::from_agent(content),
        suggestions: None,
    })
}
