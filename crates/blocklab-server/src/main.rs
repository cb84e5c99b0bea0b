//! Binary entrypoint for the blocklab HTTP server.
//!
//! Configuration comes from `BLOCKLAB_*` environment variables (see
//! [`ServerConfig`]); log filtering from `RUST_LOG`.

use blocklab_server::config::ServerConfig;
use blocklab_server::router::build_router;
use blocklab_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let state = AppState::new(&config).expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!(db_path = %config.db_path, "blocklab server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // The router (and with it the store connection) is dropped once serve returns.
    tracing::info!("blocklab server stopped");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
