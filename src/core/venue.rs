use crate::core::agent::{preview, AgentRunner};
use crate::core::conversation::ConversationStore;
use crate::core::ChatMessage;
use crate::utils::error::Result;
use std::sync::Arc;

/// Venue (listings) chat: keeps a local history per conversation and relays
/// each turn to a pre-provisioned platform agent on a persistent thread.
pub struct VenueAgent {
    runner: Option<AgentRunner>,
    conversations: Arc<ConversationStore>,
}

#[derive(Debug, Clone)]
pub struct VenueReply {
    pub conversation_id: String,
    pub message: ChatMessage,
    pub suggestions: Option<Vec<String>>,
}

impl VenueAgent {
    pub fn new(runner: Option<AgentRunner>, conversations: Arc<ConversationStore>) -> Self {
        if runner.is_none() {
            tracing::warn!("Agent platform not configured, venue chat will use fallback replies");
        }
        Self {
            runner,
            conversations,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.runner.is_some()
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.runner
            .as_ref()
            .and_then(|r| r.definition().agent_id.as_deref())
    }

    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    pub async fn chat(&self, user_message: &str, conversation_id: Option<String>) -> VenueReply {
        let conversation_id = conversation_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.conversations.get_or_create(&conversation_id).await;
        self.conversations
            .append(&conversation_id, ChatMessage::from_user(user_message))
            .await;

        let content = self.generate_reply(&conversation_id, user_message).await;
        let message = ChatMessage::from_agent(content);
        self.conversations
            .append(&conversation_id, message.clone())
            .await;

        VenueReply {
            conversation_id,
            message,
            // 場地推薦尚未實作
            suggestions: None,
        }
    }

    async fn generate_reply(&self, conversation_id: &str, user_message: &str) -> String {
        let Some(runner) = &self.runner else {
            return fallback_reply(user_message).to_string();
        };

        match self.relay(runner, conversation_id, user_message).await {
            Ok(reply) => {
                tracing::info!("Received agent response: {}", preview(&reply));
                reply
            }
            Err(e) => {
                tracing::error!("Agent platform error: {}", e);
                fallback_reply(user_message).to_string()
            }
        }
    }

    async fn relay(&self, runner: &AgentRunner, conversation_id: &str, user_message: &str) -> Result<String> {
        let thread_id = self
            .conversations
            .thread_or_create(conversation_id, move || async move {
                let thread_id = runner.create_thread().await?;
                tracing::info!(
                    "Created new agent thread {} for conversation {}",
                    thread_id,
                    conversation_id
                );
                Ok(thread_id)
            })
            .await?;

        runner.run_on_thread(&thread_id, user_message).await
    }
}

/// Canned keyword-based reply used when the platform is unreachable.
pub fn fallback_reply(user_message: &str) -> &'static str {
    let message = user_message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| message.contains(w));

    if mentions(&["dog", "puppy"]) {
        "🐕 That's awesome! Dogs love exploring new places. Are you looking for dog parks, pet-friendly restaurants, or maybe hiking trails? I can help you find spots where your pup can socialize and have fun!"
    } else if mentions(&["cat", "kitten"]) {
        "🐱 Cats are wonderful companions! Are you looking for cat-friendly cafes, pet stores with climbing areas, or perhaps quiet outdoor spaces where your kitty can safely explore?"
    } else if mentions(&["restaurant", "cafe", "food"]) {
        "🍽️ Great choice! I can help you find pet-friendly restaurants and cafes where you and your companion can enjoy a meal together. What type of cuisine are you in the mood for?"
    } else if mentions(&["park", "outdoor", "walk"]) {
        "🌳 Perfect! Outdoor activities are great for pets. I can suggest dog parks, hiking trails, beaches, and other outdoor spaces where pets are welcome. What kind of outdoor experience are you looking for?"
    } else {
        "That sounds interesting! 🎯 Based on what you've told me, I can help you find the perfect pet-friendly venues. Would you like me to suggest some options, or do you have a specific type of place in mind?"
    }
}
