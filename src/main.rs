use clap::Parser;
use octopets_agents::app;
use octopets_agents::config::{load_service_config, CliConfig, Command};
use octopets_agents::utils::error::AgentError;
use octopets_agents::utils::logger;
use octopets_agents::utils::validation::validate_required_field;
use octopets_agents::{Result, SearchCriteria, ServiceConfig};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.service.verbose);

    tracing::info!("Starting octopets CLI");
    if cli.service.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let mut config = match load_service_config(&cli.service) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.data_path {
        config.sitter.data_path = path;
    }

    match run(cli.command, &config).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.exit_code();

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(command: Command, config: &ServiceConfig) -> Result<String> {
    match command {
        Command::Search(args) => {
            let criteria = SearchCriteria::from(args);
            tracing::debug!("Search criteria: {:?}", criteria);
            let outcome = app::sitter_search(config).search(&criteria).await?;
            Ok(serde_json::to_string_pretty(&outcome)?)
        }
        Command::Show { id } => {
            let record = app::sitter_search(config).get_by_id(id).await?;
            Ok(serde_json::to_string_pretty(&record)?)
        }
        Command::Ask { query } => {
            let query = query.join(" ");
            validate_required_field("agent.endpoint", &config.agent.endpoint)?;
            validate_required_field("agent.api_key", &config.agent.api_key)?;

            let runtime = app::build_runtime(config)?;
            let state = app::build_sitter_state(config, runtime);
            let agent = state.agent.ok_or_else(|| AgentError::AgentNotConfigured {
                message: "set AZURE_OPENAI_ENDPOINT and AZURE_AI_API_KEY".to_string(),
            })?;

            tracing::info!("🤖 Asking {}: {}", agent.definition().name, query);
            agent.run(&query).await
        }
    }
}
