// HTTP request handlers
use crate::infrastructure::config::WidgetConfig;
use crate::presentation::app_state::AppState;
use crate::presentation::render::render_widget;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn widget_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/widgets", get(list_widgets))
        .route("/widgets/:id", get(show_widget))
        .route("/widgets/:id/refresh", post(refresh_widget))
        .route("/widgets/:id/fallback.svg", get(fallback_svg))
        .route("/widgets/:id/config", put(update_widget_config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Ids of every mounted widget
pub async fn list_widgets(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.widgets.keys().cloned().collect())
}

/// Rendered widget fragment: scoped stylesheet plus sanitized graph
pub async fn show_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.widget(&id) {
        Some(widget) => Html(render_widget(&widget.view().await)).into_response(),
        None => (StatusCode::NOT_FOUND, "Unknown widget").into_response(),
    }
}

/// Manual refresh, the same fetch path the timer uses
pub async fn refresh_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(widget) = state.widget(&id) else {
        return (StatusCode::NOT_FOUND, "Unknown widget").into_response();
    };

    widget.refresh().await;
    Redirect::to(&format!("/widgets/{}", urlencoding::encode(&id))).into_response()
}

/// Replace a widget's configuration. The body's id must match the path.
pub async fn update_widget_config(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(config): Json<WidgetConfig>,
) -> impl IntoResponse {
    let Some(widget) = state.widget(&id) else {
        return (StatusCode::NOT_FOUND, "Unknown widget").into_response();
    };
    if config.id != id {
        return (StatusCode::BAD_REQUEST, "Widget id does not match path").into_response();
    }

    tracing::info!("Applying new configuration to widget {}", id);
    widget.apply_config(config).await;
    StatusCode::NO_CONTENT.into_response()
}

/// The widget's current `svg_code`, which tracks the last good graph
pub async fn fallback_svg(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(widget) = state.widget(&id) else {
        return (StatusCode::NOT_FOUND, "Unknown widget").into_response();
    };

    let svg_code = widget.config().await.svg_code;
    if svg_code.trim().is_empty() {
        return (StatusCode::NOT_FOUND, "No fallback graph").into_response();
    }
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg_code).into_response()
}
