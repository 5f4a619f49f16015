// CORS relay - Forwards one upstream endpoint with an injected bearer token
use crate::infrastructure::config::RelaySettings;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Response, StatusCode, Uri},
    Router,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RelayState {
    client: reqwest::Client,
    route: String,
    upstream_url: String,
    token: String,
}

impl RelayState {
    pub fn new(client: reqwest::Client, settings: &RelaySettings) -> Self {
        Self {
            client,
            route: settings.route.clone(),
            upstream_url: settings.upstream_url.clone(),
            token: settings.token.clone(),
        }
    }
}

/// Every path and method lands in [`relay`], which does its own routing so
/// that rejections carry the CORS header too.
pub fn relay_router(state: RelayState) -> Router {
    Router::new().fallback(relay).with_state(Arc::new(state))
}

pub async fn relay(State(state): State<Arc<RelayState>>, method: Method, uri: Uri) -> Response<Body> {
    if method != Method::GET {
        return plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }
    if uri.path() != state.route {
        return plain(StatusCode::NOT_FOUND, "Not Found");
    }

    let target = match uri.query() {
        Some(query) => format!("{}?{}", state.upstream_url, query),
        None => state.upstream_url.clone(),
    };
    tracing::debug!("Relaying to {}", target);

    let upstream = state
        .client
        .get(&target)
        .header(header::AUTHORIZATION, format!("Bearer {}", state.token))
        .send()
        .await;

    let upstream = match upstream {
        Ok(upstream) => upstream,
        Err(e) => return relay_error(&e.to_string()),
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(e) => return relay_error(&e.to_string()),
    };

    let mut response = Response::builder()
        .status(status)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }

    response
        .body(Body::from(body))
        .unwrap_or_else(|e| relay_error(&e.to_string()))
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn relay_error(message: &str) -> Response<Body> {
    tracing::warn!("Relay upstream request failed: {}", message);

    let body = serde_json::json!({ "error": message }).to_string();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
