use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use corral_client::{GitHubClient, ServiceAuth};
use corral_orchestrator::api;
use corral_orchestrator::config::{Config, LogFormat};
use corral_orchestrator::service::{RateLimiter, RunnerGroupOrchestrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "corral_orchestrator=info,corral_client=info,tower_http=info".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!(org = %config.org, api_url = %config.api_url, "Starting Corral Orchestrator...");

    let service_auth = config.service_auth()?;
    match &service_auth {
        ServiceAuth::Token(_) => tracing::info!("Using static service token"),
        ServiceAuth::App(app) => tracing::info!(
            app_id = %app.app_id,
            installation_id = app.installation_id,
            "Using GitHub App installation credentials"
        ),
    }

    let client = GitHubClient::with_timeout(&config.api_url, service_auth, config.request_timeout())
        .context("Failed to create GitHub client")?;

    let orchestrator = RunnerGroupOrchestrator::new(
        Arc::new(client),
        config.org.clone(),
        config.page_size,
        RateLimiter::new(config.rate_limit, config.rate_burst),
    );

    // Build router with all API endpoints
    let app = api::create_router(Arc::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
