//! HTTP server assembly and the JSON endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::pages;
use crate::config::Config;
use crate::store::{self, TaskStats, TaskStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Box<dyn TaskStore>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = store::create_task_store(config.store_type, config.database_path.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize task store: {}", e))?;
    if !store.is_persistent() {
        tracing::warn!("Using in-memory task store; tasks will not survive a restart");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/tasks/new", get(pages::new_task_form).post(pages::create_task))
        .route(
            "/tasks/:id/edit",
            get(pages::edit_task_form).post(pages::update_task),
        )
        .route("/tasks/:id/delete", post(pages::delete_task))
        .route("/api/health", get(health))
        .route("/api/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "persistent": state.store.is_persistent(),
    }))
}

/// Task counts grouped by status.
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TaskStats>, (StatusCode, String)> {
    state
        .store
        .stats()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e))
}
