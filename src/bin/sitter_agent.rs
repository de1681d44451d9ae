use clap::Parser;
use octopets_agents::app::{self, SITTER_DEFAULT_PORT};
use octopets_agents::config::{load_service_config, ServiceArgs};
use octopets_agents::server::{self, sitter};
use octopets_agents::utils::logger;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sitter-agent")]
#[command(about = "Pet sitter recommendation API")]
struct Args {
    #[command(flatten)]
    service: ServiceArgs,

    /// Sitter dataset path (overrides SITTER_DATA_PATH and the config file)
    #[arg(long)]
    data_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_service_logger(args.service.verbose);
    tracing::info!("🐾 Starting Pet Sitter Recommendation API");

    let mut config = match load_service_config(&args.service) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if let Some(path) = args.data_path {
        config.sitter.data_path = path;
    }
    tracing::info!("📁 Sitter data: {}", config.sitter.data_path);

    let runtime = app::build_runtime(&config)?;
    let state = Arc::new(app::build_sitter_state(&config, runtime));

    let router = server::apply_middleware(sitter::router(state), &config.server);
    server::serve(router, &config.server.host, config.port_or(SITTER_DEFAULT_PORT)).await?;

    Ok(())
}
