use crate::core::tools::ToolRegistry;
use crate::core::{AgentDefinition, AgentRuntime};
use crate::utils::error::Result;
use std::sync::Arc;

/// A hosted agent bound to its tools. Each [`AgentRunner::run`] starts a new
/// platform thread, so runs never share conversation state.
#[derive(Clone)]
pub struct AgentRunner {
    runtime: Arc<dyn AgentRuntime>,
    definition: AgentDefinition,
    tools: ToolRegistry,
}

impl AgentRunner {
    pub fn new(runtime: Arc<dyn AgentRuntime>, definition: AgentDefinition, tools: ToolRegistry) -> Self {
        Self {
            runtime,
            definition,
            tools,
        }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn run(&self, user_query: &str) -> Result<String> {
        tracing::info!(
            "Running agent {} for query: {}",
            self.definition.name,
            preview(user_query)
        );

        let thread_id = self.runtime.create_thread().await?;
        self.run_on_thread(&thread_id, user_query).await
    }

    /// Continues an existing platform thread.
    pub async fn run_on_thread(&self, thread_id: &str, user_query: &str) -> Result<String> {
        let reply = self
            .runtime
            .run_thread(thread_id, &self.definition, user_query, &self.tools)
            .await?;
        tracing::debug!("Agent {} replied: {}", self.definition.name, preview(&reply));
        Ok(reply)
    }

    pub async fn create_thread(&self) -> Result<String> {
        self.runtime.create_thread().await
    }
}

/// First 100 characters, for log lines.
pub fn preview(text: &str) -> String {
    const LIMIT: usize = 100;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub const SITTER_AGENT_NAME: &str = "PetSitterRecommendationAgent";

pub const SITTER_AGENT_INSTRUCTIONS: &str = "You are a professional pet sitter recommendation assistant. Your role is to:

1. Analyze the user's request carefully to understand their needs (location, pet type, services needed, schedule, budget, special requirements)
2. Use the search_pet_sitters tool to find matching pet sitters based on the criteria
3. Make intelligent recommendations based on the results, considering:
   - Rating and reviews
   - Years of experience
   - Specializations that match the user's needs
   - Availability and services offered
   - Certifications and insurance status
4. Provide a clear, concise recommendation with 2-3 top choices
5. Include relevant details like rates, availability, and why they're a good match
6. DO NOT ask follow-up questions - make the best recommendation based on the information provided

Available pet sitter data includes locations in: New York, Seattle, San Francisco, Los Angeles, Chicago, and Miami.

Always be helpful, professional, and focus on finding the best match for the pet owner's needs.";

pub const ORCHESTRATOR_AGENT_NAME: &str = "OctopetsOrchestratorAgent";

pub const ORCHESTRATOR_INSTRUCTIONS: &str = "You are an intelligent orchestrator for the Octopets platform. Your role is to:

1. ANALYZE the user's query to identify what they need:
   - Venue/listing information (pet-friendly places, restaurants, outdoor areas, etc.)
   - Pet sitter information (dog walkers, cat sitters, availability, rates, etc.)
   - Both venue and sitter information for complex requests

2. DELEGATE to the appropriate specialized agent(s):
   - Use query_listings_agent for venue-related questions
   - Use query_sitter_agent for pet sitter-related questions
   - Use BOTH tools when the query requires both types of information

3. SYNTHESIZE the results into a coherent, helpful response that:
   - Addresses all aspects of the user's request
   - Combines information from multiple agents when needed
   - Provides clear recommendations with relevant details
   - Maintains a friendly, professional tone

Always use the tools to get current, accurate information. Never make up venue or sitter details.";
