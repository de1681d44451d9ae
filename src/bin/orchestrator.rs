use clap::Parser;
use octopets_agents::app::{self, ORCHESTRATOR_DEFAULT_PORT};
use octopets_agents::config::{load_service_config, ServiceArgs};
use octopets_agents::server::{self, orchestrator};
use octopets_agents::utils::logger;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Multi-agent orchestration across the listings and sitter agents")]
struct Args {
    #[command(flatten)]
    service: ServiceArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_service_logger(args.service.verbose);
    tracing::info!("🐾 Starting Octopets Orchestrator API");

    let config = match load_service_config(&args.service) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::info!(
        "🔗 Listings agent: {}, sitter agent: {}",
        config.orchestrator.listings_agent_url,
        config.orchestrator.sitter_agent_url
    );

    let runtime = app::build_runtime(&config)?;
    let state = Arc::new(app::build_orchestrator_state(&config, runtime)?);

    let router = server::apply_middleware(orchestrator::router(state), &config.server);
    server::serve(router, &config.server.host, config.port_or(ORCHESTRATOR_DEFAULT_PORT)).await?;

    Ok(())
}
