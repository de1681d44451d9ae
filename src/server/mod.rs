//! HTTP surfaces for the three agent services.
//!
//! Each service builds an axum [`Router`] over an explicitly constructed
//! state object; [`apply_middleware`] adds CORS, tracing and a request
//! timeout, and [`serve`] runs it until Ctrl+C or SIGTERM.

pub mod error;
pub mod orchestrator;
pub mod sitter;
pub mod venue;

use crate::config::toml_config::ServerConfig;
use crate::utils::error::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::ApiError;

/// Browsers reject credentialed CORS with wildcards, so `*` switches
/// credentials off; explicit origins keep them on.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE];

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim_end_matches('/').parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn apply_middleware(router: Router, config: &ServerConfig) -> Router {
    tracing::info!("CORS origins configured: {:?}", config.cors_origins);

    router
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS 放最外層，preflight 先處理
        .layer(cors_layer(&config.cors_origins))
}

pub async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
        crate::utils::error::AgentError::InvalidConfigValueError {
            field: "server.host".to_string(),
            value: host.to_string(),
            reason: format!("{}", e),
        }
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
