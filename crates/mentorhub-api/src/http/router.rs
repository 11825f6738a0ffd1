//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! A built web client is served from `web/dist/` (configurable via
//! `MENTORHUB_WEB_DIR`). API routes take priority; unknown paths fall
//! through to the client's `index.html`. If the directory does not exist,
//! only the API is served.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Form flows
        .route(
            "/flows/learning-path",
            post(handlers::flow::learning_path),
        )
        .route("/flows/code-snippet", post(handlers::flow::code_snippet))
        .route(
            "/flows/project-ideas",
            post(handlers::flow::project_ideas),
        )
        .route(
            "/flows/concept-explainer",
            post(handlers::flow::concept_explainer),
        )
        // Chat sessions
        .route("/chat/sessions", post(handlers::chat::create_session))
        .route(
            "/chat/sessions/{id}",
            get(handlers::chat::get_session).delete(handlers::chat::delete_session),
        )
        .route(
            "/chat/sessions/{id}/messages",
            post(handlers::chat::send_message),
        )
        .route(
            "/chat/sessions/{id}/actions/summarise",
            post(handlers::chat::summarise),
        )
        .route(
            "/chat/sessions/{id}/clear",
            post(handlers::chat::clear_session),
        )
        .route(
            "/chat/sessions/{id}/notifications",
            get(handlers::chat::notifications),
        )
        // Render preview
        .route("/render", post(handlers::render::render_content));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let web_dir =
        std::env::var("MENTORHUB_WEB_DIR").unwrap_or_else(|_| "web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{}/index.html", web_dir);
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "static web client serving enabled");
    }

    router
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
