use crate::core::tools::ToolRegistry;
use crate::domain::model::SitterRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Read-only source of sitter records. Implementations return a fresh
/// snapshot on every call.
pub trait SitterStore: Send + Sync {
    fn load_sitters(&self) -> impl std::future::Future<Output = Result<Vec<SitterRecord>>> + Send;
}

/// Structured description of a callable function, as the agent platform
/// expects it in a function-tool definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Tools answer with text; structured results are JSON-encoded.
    async fn invoke(&self, arguments: serde_json::Value) -> Result<String>;
}

/// Static configuration of a hosted agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    pub model: String,
    /// Pre-provisioned platform agent. When unset the runtime creates one.
    pub agent_id: Option<String>,
}

/// The hosted LLM agent platform. Conversation memory and tool planning
/// live on the other side of this trait.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn create_thread(&self) -> Result<String>;

    async fn run_thread(
        &self,
        thread_id: &str,
        definition: &AgentDefinition,
        user_message: &str,
        tools: &ToolRegistry,
    ) -> Result<String>;
}
