use octopets_agents::config::{load_service_config, ServiceArgs};
use octopets_agents::AgentError;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn args_for(file: &NamedTempFile, port: Option<u16>) -> ServiceArgs {
    ServiceArgs {
        config: Some(file.path().to_string_lossy().to_string()),
        port,
        verbose: false,
    }
}

#[test]
fn test_load_toml_with_port_override() {
    let file = config_file(
        r#"
[agent]
endpoint = "https://octopets.services.ai.azure.com/api/projects/octopets"
api_key = "secret"
model = "gpt-4o-mini"

[server]
port = 9000
cors_origins = ["https://octopets.example.com"]

[sitter]
data_path = "/srv/data/pet-sitter.json"
"#,
    );

    let config = load_service_config(&args_for(&file, Some(8102))).unwrap();

    assert_eq!(config.server.port, Some(8102));
    assert_eq!(config.agent.model, "gpt-4o-mini");
    assert_eq!(config.sitter.data_path, "/srv/data/pet-sitter.json");
    assert_eq!(config.orchestrator.sitter_agent_url, "http://localhost:8002");

    let settings = config.foundry_settings().expect("platform configured");
    assert_eq!(settings.api_key, "secret");
    assert_eq!(settings.api_version, "2025-05-01");
}

#[test]
fn test_environment_placeholders_are_substituted() {
    std::env::set_var("OCTOPETS_CONFIG_TEST_KEY", "from-env");
    let file = config_file(
        r#"
[agent]
endpoint = "https://example.services.ai.azure.com"
api_key = "${OCTOPETS_CONFIG_TEST_KEY}"
"#,
    );

    let config = load_service_config(&args_for(&file, None)).unwrap();
    assert_eq!(config.agent.api_key.as_deref(), Some("from-env"));
}

#[test]
fn test_origin_with_path_is_rejected() {
    let file = config_file(
        r#"
[server]
cors_origins = ["https://octopets.example.com/app"]
"#,
    );

    let err = load_service_config(&args_for(&file, None)).unwrap_err();
    assert!(matches!(err, AgentError::InvalidConfigValueError { .. }));
}

#[test]
fn test_invalid_downstream_url_is_rejected() {
    let file = config_file(
        r#"
[orchestrator]
sitter_agent_url = "not a url"
"#,
    );

    assert!(load_service_config(&args_for(&file, None)).is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let args = ServiceArgs {
        config: Some("/nonexistent/octopets.toml".to_string()),
        port: None,
        verbose: false,
    };

    let err = load_service_config(&args).unwrap_err();
    assert!(matches!(err, AgentError::IoError(_)));
}
