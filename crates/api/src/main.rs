use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use croplens_api::config::ServerConfig;
use croplens_api::router::build_app_router;
use croplens_api::state::AppState;
use croplens_gateway::{GatewayConfig, ModelGateway};
use croplens_tasks::{InMemoryTaskRegistry, TaskDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "croplens_api=debug,croplens_tasks=debug,croplens_gateway=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let gateway_config = GatewayConfig::from_env();
    tracing::info!(
        endpoint = %gateway_config.endpoint,
        vision_model = %gateway_config.models.vision,
        reasoning_model = %gateway_config.models.reasoning,
        configured = gateway_config.is_configured(),
        "Loaded model gateway configuration"
    );

    // --- Task registry + dispatcher ---
    let models = gateway_config.models.clone();
    let gateway = Arc::new(ModelGateway::new(gateway_config));
    let registry = Arc::new(InMemoryTaskRegistry::new());
    let dispatcher = Arc::new(TaskDispatcher::new(registry, gateway, models));
    tracing::info!("Task dispatcher started");

    // --- App state + router ---
    let state = AppState::new(config.clone(), Arc::clone(&dispatcher));
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    dispatcher
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
