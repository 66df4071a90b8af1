pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

/// Build the axum Router with the liveness and cycle routes.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state_file: PathBuf) -> Router {
    let app_state = state::AppState::new(state_file);

    Router::new()
        // Liveness
        .route("/", get(routes::health::root))
        .route("/healthz", get(routes::health::healthz))
        // Cycle
        .route("/api/cycle", get(routes::cycle::get_cycle))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind `0.0.0.0:{port}` and serve until the future is dropped.
pub async fn serve(state_file: PathBuf, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(state_file, listener).await
}

/// Serve on a pre-bound listener so the caller can learn the actual port
/// first (useful when `port = 0`).
pub async fn serve_on(state_file: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state_file);

    tracing::info!("HTTP server listening on port {actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
