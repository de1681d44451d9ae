pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::adapters::storage::JsonFileSitterStore;
pub use crate::config::{CliConfig, ServiceConfig};
pub use crate::core::sitter_search::{filter_and_rank, SitterSearch, MAX_RESULTS};
pub use crate::domain::model::{SearchCriteria, SearchOutcome, SitterRecord};
pub use crate::utils::error::{AgentError, Result};
