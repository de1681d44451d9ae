use crate::adapters::downstream::DEFAULT_DOWNSTREAM_TIMEOUT;
use crate::adapters::foundry::{FoundrySettings, DEFAULT_API_VERSION};
use crate::adapters::storage::DEFAULT_SITTER_DATA_PATH;
use crate::utils::error::{AgentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sitter: SitterConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub agent_id: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_run_timeout_seconds")]
    pub run_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitterConfig {
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_listings_url")]
    pub listings_agent_url: String,
    #[serde(default = "default_sitter_url")]
    pub sitter_agent_url: String,
    #[serde(default = "default_downstream_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_run_timeout_seconds() -> u64 {
    120
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_request_timeout_seconds() -> u64 {
    300
}

fn default_data_path() -> String {
    DEFAULT_SITTER_DATA_PATH.to_string()
}

fn default_listings_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_sitter_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_downstream_timeout_seconds() -> u64 {
    DEFAULT_DOWNSTREAM_TIMEOUT.as_secs()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: default_api_version(),
            model: default_model(),
            agent_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_seconds: default_run_timeout_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            cors_origins: default_cors_origins(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for SitterConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            listings_agent_url: default_listings_url(),
            sitter_agent_url: default_sitter_url(),
            timeout_seconds: default_downstream_timeout_seconds(),
        }
    }
}

/// 逗號分隔的來源清單，去除空白與空項目
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AgentError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AgentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AZURE_AI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AgentError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 只從環境變數建立配置 (與既有部署的變數名稱相容)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.agent.endpoint = non_empty("AZURE_OPENAI_ENDPOINT");
        config.agent.api_key = non_empty("AZURE_AI_API_KEY");
        config.agent.agent_id = non_empty("AZURE_AI_AGENT_ID");
        if let Some(model) = non_empty("AZURE_MODEL_DEPLOYMENT_NAME") {
            config.agent.model = model;
        }
        if let Some(version) = non_empty("AZURE_AI_API_VERSION") {
            config.agent.api_version = version;
        }

        if let Some(port) = non_empty("PORT") {
            let parsed = port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| AgentError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: port.clone(),
                    reason: e.to_string(),
                })?;
            config.server.port = Some(parsed);
        }
        if let Some(frontend) = non_empty("FRONTEND_URL") {
            config.server.cors_origins = parse_origins(&frontend);
        }

        if let Some(path) = non_empty("SITTER_DATA_PATH") {
            config.sitter.data_path = path;
        }

        if let Some(url) = non_empty("LISTINGS_AGENT_URL") {
            config.orchestrator.listings_agent_url = url;
        }
        if let Some(url) = non_empty("SITTER_AGENT_URL") {
            config.orchestrator.sitter_agent_url = url;
        }

        Ok(config)
    }

    /// 平台連線設定；缺少 endpoint 或金鑰時回傳 None
    pub fn foundry_settings(&self) -> Option<FoundrySettings> {
        let endpoint = self.agent.endpoint.as_ref()?;
        let api_key = self.agent.api_key.as_ref()?;

        let mut settings = FoundrySettings::new(endpoint.clone(), api_key.clone());
        settings.api_version = self.agent.api_version.clone();
        settings.poll_interval = Duration::from_millis(self.agent.poll_interval_ms);
        settings.run_timeout = Duration::from_secs(self.agent.run_timeout_seconds);
        Some(settings)
    }

    pub fn port_or(&self, default_port: u16) -> u16 {
        self.server.port.unwrap_or(default_port)
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(endpoint) = &self.agent.endpoint {
            validation::validate_url("agent.endpoint", endpoint)?;
        }
        validation::validate_non_empty_string("agent.model", &self.agent.model)?;
        validation::validate_range("agent.poll_interval_ms", self.agent.poll_interval_ms, 10, 60_000)?;
        validation::validate_range(
            "agent.run_timeout_seconds",
            self.agent.run_timeout_seconds,
            1,
            3_600,
        )?;

        if let Some(port) = self.server.port {
            validation::validate_range("server.port", port, 1, u16::MAX)?;
        }
        for origin in &self.server.cors_origins {
            validation::validate_origin("server.cors_origins", origin)?;
        }

        validation::validate_path("sitter.data_path", &self.sitter.data_path)?;

        validation::validate_url(
            "orchestrator.listings_agent_url",
            &self.orchestrator.listings_agent_url,
        )?;
        validation::validate_url(
            "orchestrator.sitter_agent_url",
            &self.orchestrator.sitter_agent_url,
        )?;
        validation::validate_range("orchestrator.timeout_seconds", self.orchestrator.timeout_seconds, 1, 600)?;

        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[agent]
endpoint = "https://octopets.services.ai.azure.com/api/projects/octopets"
api_key = "secret"
model = "gpt-4o-mini"

[server]
port = 9002
cors_origins = ["http://localhost:3000", "https://octopets.example.com"]

[sitter]
data_path = "fixtures/sitters.json"

[orchestrator]
listings_agent_url = "http://listings:8001"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.port_or(8002), 9002);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.sitter.data_path, "fixtures/sitters.json");
        assert_eq!(config.orchestrator.sitter_agent_url, "http://localhost:8002");
        assert!(config.foundry_settings().is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config.port_or(8003), 8003);
        assert_eq!(config.sitter.data_path, DEFAULT_SITTER_DATA_PATH);
        assert!(config.foundry_settings().is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OCTOPETS_TEST_API_KEY", "from-env");

        let toml_content = r#"
[agent]
endpoint = "https://example.services.ai.azure.com"
api_key = "${OCTOPETS_TEST_API_KEY}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.agent.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("OCTOPETS_TEST_API_KEY");
    }

    #[test]
    fn test_from_lookup_reads_deployment_variables() {
        let vars: HashMap<&str, &str> = [
            ("AZURE_OPENAI_ENDPOINT", "https://example.services.ai.azure.com/api/projects/p"),
            ("AZURE_AI_API_KEY", "k"),
            ("FRONTEND_URL", "http://a.test, http://b.test ,"),
            ("PORT", "8080"),
            ("SITTER_AGENT_URL", "http://sitter:8002"),
        ]
        .into_iter()
        .collect();

        let config = ServiceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.orchestrator.sitter_agent_url, "http://sitter:8002");
        assert!(config.foundry_settings().is_some());
    }

    #[test]
    fn test_unparseable_port_is_rejected() {
        let result = ServiceConfig::from_lookup(|key| (key == "PORT").then(|| "80a".to_string()));

        match result {
            Err(AgentError::InvalidConfigValueError { field, value, .. }) => {
                assert_eq!(field, "PORT");
                assert_eq!(value, "80a");
            }
            other => panic!("expected invalid PORT, got {:?}", other),
        }
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[orchestrator]
listings_agent_url = "not-a-url"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ServiceConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, AgentError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[sitter]\ndata_path = \"/srv/sitters.json\"\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.sitter.data_path, "/srv/sitters.json");
    }
}
