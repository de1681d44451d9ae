pub mod agent;
pub mod conversation;
pub mod orchestrator;
pub mod sitter_search;
pub mod tools;
pub mod venue;

pub use crate::domain::model::{
    ChatMessage, ConversationHistory, SearchCriteria, SearchOutcome, Sender, SitterRecord,
};
pub use crate::domain::ports::{AgentDefinition, AgentRuntime, SitterStore, Tool, ToolSpec};
pub use crate::utils::error::Result;
