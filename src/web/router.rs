//! Router configuration for the web layer.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::WebConfig;

use super::dto::{ErrorBody, FileListResponse, UploadResponse};
use super::handlers::{self, download_file, index, list_files, upload_file, AppState};
use super::middleware::create_cors_layer;

/// OpenAPI document for the upload API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home::index,
        handlers::file::upload_file,
        handlers::file::list_files,
        handlers::file::download_file,
    ),
    components(schemas(UploadResponse, FileListResponse, ErrorBody)),
    tags(
        (name = "pages", description = "HTML pages"),
        (name = "files", description = "Subject-scoped file uploads")
    )
)]
pub struct ApiDoc;

/// Create the main application router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(index))
        // Uploads are not size limited.
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/files/:subject", get(list_files))
        .route("/uploads/:subject/:filename", get(download_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Create a router serving front-end assets under `/static`.
///
/// Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let path = Path::new(static_path);
    if !path.is_dir() {
        tracing::warn!("Static directory not found: {}", path.display());
        return None;
    }

    Some(Router::new().nest_service("/static", ServeDir::new(path)))
}

/// Assemble the full application: API routes, health check, OpenAPI
/// document, optional static assets and gzip compression.
pub fn create_app(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let mut router = create_router(app_state, &web_config.cors_origins)
        .merge(create_health_router())
        .merge(create_swagger_router());

    if web_config.serve_static {
        if let Some(static_router) = create_static_router(&web_config.static_path) {
            router = router.merge(static_router);
        }
    }

    router.layer(CompressionLayer::new())
}
