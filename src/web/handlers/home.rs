//! Homepage handler.

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::template::{TemplateContext, Value};
use crate::web::dto::ErrorBody;
use crate::web::error::ApiError;
use crate::web::handlers::{AppState, HOMEPAGE_TEMPLATE};

/// Build the variables the homepage template can use.
///
/// - `title`: site title
/// - `subjects`: configured subjects
/// - `default_subject`: subject shown on load
/// - `accept`: value for the file input's `accept` attribute, e.g. `.docx,.pdf`
pub fn homepage_context(state: &AppState) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.set("title", Value::from(&state.site.title));
    context.set("subjects", Value::from(state.site.subjects.clone()));
    context.set(
        "default_subject",
        state
            .site
            .subjects
            .first()
            .map(Value::from)
            .unwrap_or(Value::Null),
    );

    let accept = state
        .extensions
        .extensions()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");
    context.set("accept", Value::from(accept));

    context
}

/// GET / - Render the homepage.
#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses(
        (status = 200, description = "Homepage", content_type = "text/html", body = String),
        (status = 500, description = "Template failed to render", body = ErrorBody)
    )
)]
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let context = homepage_context(&state);

    let page = state
        .templates
        .render(HOMEPAGE_TEMPLATE, &context)
        .map_err(|e| {
            tracing::error!("Failed to render homepage: {}", e);
            ApiError::internal("Failed to render page")
        })?;

    Ok(Html(page))
}
