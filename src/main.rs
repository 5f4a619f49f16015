// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::graph_repository::GraphRepository;
use crate::application::widget_service::WidgetInstance;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_graph_repository::HttpGraphRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::widget_router;
use crate::presentation::relay::{relay_router, RelayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let client = reqwest::Client::builder()
        .timeout(app_config.server.fetch_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn GraphRepository> = Arc::new(HttpGraphRepository::new(client.clone()));

    // Mount widgets (application layer); first fetches run in the background
    let mut widgets = Vec::with_capacity(app_config.widgets.len());
    for widget_config in app_config.widgets {
        let widget = WidgetInstance::mount(widget_config, repository.clone()).await;
        tracing::info!(
            "Mounted widget {} (auto refresh every {:?})",
            widget.id(),
            widget.auto_refresh_period().await
        );
        widgets.push(widget);
    }
    let state = Arc::new(AppState::new(widgets));

    // Widget server (presentation layer)
    let addr: SocketAddr = app_config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", app_config.server.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting forecast-graph service on {}", addr);
    let widget_server = async {
        axum::serve(listener, widget_router(state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Widget server failed")
    };

    if app_config.relay.enabled {
        let relay_addr: SocketAddr = app_config
            .relay
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid relay address {}", app_config.relay.listen_addr))?;
        if app_config.relay.token.is_empty() {
            tracing::warn!("CORS relay has no token; set BARENTSWATCH_TOKEN");
        }
        let relay_listener = tokio::net::TcpListener::bind(relay_addr).await?;
        tracing::info!("CORS relay listening on {}", relay_addr);
        let relay_server = async {
            axum::serve(
                relay_listener,
                relay_router(RelayState::new(client.clone(), &app_config.relay)),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Relay server failed")
        };
        tokio::try_join!(widget_server, relay_server)?;
    } else {
        widget_server.await?;
    }

    state.dispose_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
