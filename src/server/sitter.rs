//! Pet sitter recommendation API.

use crate::adapters::storage::JsonFileSitterStore;
use crate::core::agent::AgentRunner;
use crate::core::sitter_search::SitterSearch;
use crate::core::{SearchCriteria, SearchOutcome, SitterRecord};
use crate::server::ApiError;
use crate::utils::error::AgentError;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct SitterState {
    pub search: Arc<SitterSearch<JsonFileSitterStore>>,
    /// `None` when the agent platform is not configured; search and lookup
    /// still work.
    pub agent: Option<AgentRunner>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

pub fn router(state: Arc<SitterState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/search", post(search))
        .route("/api/sitter/:sitter_id", get(sitter_details))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Pet Sitter Recommendation API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/api/chat",
            "search": "/api/search",
            "sitter_details": "/api/sitter/{sitter_id}",
            "health": "/health"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /api/chat - Free-text request answered by the recommendation agent
async fn chat(
    State(state): State<Arc<SitterState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.query.is_empty() {
        return Err(ApiError::unprocessable("query must not be empty"));
    }

    let agent = state.agent.as_ref().ok_or_else(|| {
        ApiError::with_context(
            "Agent error",
            AgentError::AgentNotConfigured {
                message: "set AZURE_OPENAI_ENDPOINT and AZURE_AI_API_KEY".to_string(),
            },
        )
    })?;

    let response = agent
        .run(&request.query)
        .await
        .map_err(|e| ApiError::with_context("Agent error", e))?;

    Ok(Json(ChatResponse { response }))
}

/// POST /api/search - Structured filter, top 5 by rating
async fn search(
    State(state): State<Arc<SitterState>>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let outcome = state
        .search
        .search(&criteria.normalized())
        .await
        .map_err(|e| ApiError::with_context("Search error", e))?;
    Ok(Json(outcome))
}

/// GET /api/sitter/:sitter_id
async fn sitter_details(
    State(state): State<Arc<SitterState>>,
    Path(sitter_id): Path<i64>,
) -> Result<Json<SitterRecord>, ApiError> {
    let record = state
        .search
        .get_by_id(sitter_id)
        .await
        .map_err(|e| ApiError::with_context("Error fetching sitter details", e))?;
    Ok(Json(record))
}
