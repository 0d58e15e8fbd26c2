//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (intentionally unauthenticated for probes)
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::get_repos))
        .route("/info", get(handlers::get_info))
        // Chart API
        .route(
            "/api/{repo}/charts",
            get(handlers::get_repo_charts).post(handlers::post_chart),
        )
        .route("/api/{repo}/prov", post(handlers::post_prov))
        .route("/api/{repo}/charts/{chart}", get(handlers::get_chart))
        .route(
            "/api/{repo}/charts/{chart}/{version}",
            get(handlers::get_chart_version).delete(handlers::delete_chart_version),
        )
        // Helm repository surface
        .route("/{repo}/index.yaml", get(handlers::get_repo_index))
        .route("/{repo}/charts/{file}", get(handlers::get_chart_file))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
