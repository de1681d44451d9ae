//! Venue (listings) chat API with local conversation history.

use crate::core::venue::VenueAgent;
use crate::core::{ChatMessage, ConversationHistory};
use crate::server::ApiError;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct VenueState {
    pub agent: VenueAgent,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Pet info, location and so on; accepted for compatibility, not used.
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub conversation_id: String,
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub pet_type: Option<String>,
    pub venue_type: Option<String>,
    pub location: Option<String>,
}

pub fn router(state: Arc<VenueState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/chat", post(chat))
        .route("/agent/chat", post(chat))
        .route(
            "/api/conversations/:conversation_id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/api/venues/suggestions", get(venue_suggestions))
        .with_state(state)
}

async fn root(State(state): State<Arc<VenueState>>) -> Json<Value> {
    let connected = state.agent.is_connected();
    Json(json!({
        "message": "Octopets Agent API is running! 🐾",
        "azure_ai_status": if connected { "connected" } else { "disconnected" },
        "agent_id": state.agent.agent_id(),
    }))
}

/// POST /api/chat - One chat turn; creates the conversation when needed
async fn chat(
    State(state): State<Arc<VenueState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    if request.context.is_some() {
        tracing::debug!("Ignoring chat context: {:?}", request.context);
    }

    let reply = state
        .agent
        .chat(&request.message, request.conversation_id)
        .await;

    Json(ChatResponse {
        message: reply.message,
        conversation_id: reply.conversation_id,
        suggestions: reply.suggestions,
    })
}

async fn get_conversation(
    State(state): State<Arc<VenueState>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationHistory>, ApiError> {
    let history = state.agent.conversations().get(&conversation_id).await?;
    Ok(Json(history))
}

async fn delete_conversation(
    State(state): State<Arc<VenueState>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.agent.conversations().delete(&conversation_id).await?;
    Ok(Json(json!({ "message": "Conversation deleted successfully" })))
}

// TODO: query the listings catalogue once venue data is available to this service
async fn venue_suggestions(Query(query): Query<SuggestionQuery>) -> Json<Value> {
    tracing::debug!(
        "Venue suggestions requested (pet_type={:?}, venue_type={:?}, location={:?})",
        query.pet_type,
        query.venue_type,
        query.location
    );
    Json(json!({
        "suggestions": [],
        "message": "Venue suggestions feature coming soon!"
    }))
}
