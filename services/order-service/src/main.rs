use common::config::ServiceConfig;
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

mod handlers;
mod routes;
mod state;

const SERVICE_NAME: &str = "order-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let telemetry_config = TelemetryConfig::from_env(SERVICE_NAME);
    let enable_jaeger = telemetry_config.enable_jaeger;
    init_telemetry(telemetry_config)?;

    let config = ServiceConfig::from_env()?;

    tracing::info!("Starting order service...");
    tracing::info!("Distributed tracing: {}", if enable_jaeger { "enabled" } else { "disabled" });

    let state = state::AppState::from_config(&config).await?;

    let app = routes::build_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Order service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
