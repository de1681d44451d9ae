use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Pet sitter with ID {id} not found.")]
    NotFound { id: i64 },

    #[error("Conversation not found")]
    ConversationNotFound { conversation_id: String },

    #[error("Sitter data unavailable at {path}: {reason}")]
    DataUnavailable { path: String, reason: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Agent platform is not configured: {message}")]
    AgentNotConfigured { message: String },

    #[error("Agent run {run_id} ended with status '{status}': {message}")]
    AgentRunFailed {
        run_id: String,
        status: String,
        message: String,
    },

    #[error("Agent returned no text response for thread {thread_id}")]
    EmptyAgentResponse { thread_id: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for tool {tool}: {message}")]
    ToolArguments { tool: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Data,
    Network,
    Configuration,
    Agent,
    Tool,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::NotFound { .. } | AgentError::ConversationNotFound { .. } => {
                ErrorCategory::NotFound
            }
            AgentError::DataUnavailable { .. } | AgentError::SerializationError(_) => {
                ErrorCategory::Data
            }
            AgentError::ApiError(_) | AgentError::UnexpectedStatus { .. } => {
                ErrorCategory::Network
            }
            AgentError::ConfigError { .. }
            | AgentError::MissingConfigError { .. }
            | AgentError::InvalidConfigValueError { .. }
            | AgentError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AgentError::AgentNotConfigured { .. }
            | AgentError::AgentRunFailed { .. }
            | AgentError::EmptyAgentResponse { .. } => ErrorCategory::Agent,
            AgentError::UnknownTool { .. } | AgentError::ToolArguments { .. } => {
                ErrorCategory::Tool
            }
            AgentError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Agent | ErrorCategory::Tool => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// CLI 退出碼：依嚴重程度，找不到資料另給 4
    pub fn exit_code(&self) -> i32 {
        if self.category() == ErrorCategory::NotFound {
            return 4;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            AgentError::NotFound { .. } | AgentError::ConversationNotFound { .. } => {
                self.to_string()
            }
            AgentError::DataUnavailable { path, .. } => {
                format!("The pet sitter dataset could not be read ({})", path)
            }
            AgentError::ApiError(_) | AgentError::UnexpectedStatus { .. } => {
                "A remote service could not be reached".to_string()
            }
            AgentError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            AgentError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            AgentError::ConfigError { message } => message.clone(),
            AgentError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            AgentError::AgentNotConfigured { .. } => {
                "The AI agent platform is not configured".to_string()
            }
            AgentError::AgentRunFailed { .. } | AgentError::EmptyAgentResponse { .. } => {
                "The AI agent could not produce a response".to_string()
            }
            AgentError::UnknownTool { .. } | AgentError::ToolArguments { .. } => {
                "The AI agent made an invalid tool request".to_string()
            }
            AgentError::IoError(_) | AgentError::SerializationError(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::NotFound => "Check the ID and try again",
            ErrorCategory::Data => "Verify SITTER_DATA_PATH points to a valid JSON array of sitters",
            ErrorCategory::Network => "Check network connectivity and the downstream service URLs",
            ErrorCategory::Configuration => "Review environment variables and the config file",
            ErrorCategory::Agent => {
                "Check AZURE_OPENAI_ENDPOINT, AZURE_AI_API_KEY and the model deployment name"
            }
            ErrorCategory::Tool => "Retry the request; the model may pick valid arguments next time",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
