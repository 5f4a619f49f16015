// HTTP graph repository implementation
use crate::application::graph_repository::GraphRepository;
use crate::domain::error::GraphError;
use crate::domain::graph_source::GraphRequest;
use crate::domain::payload::{classify_text, is_json_content_type, parse_json, FetchResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

const ACCEPT_GRAPH: &str = "image/svg+xml, application/json, text/plain, */*";

#[derive(Debug, Clone, Default)]
pub struct HttpGraphRepository {
    client: reqwest::Client,
}

impl HttpGraphRepository {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphRepository for HttpGraphRepository {
    async fn fetch_graph(&self, request: &GraphRequest) -> FetchResult {
        let mut builder = self
            .client
            .get(request.target_url())
            .header(ACCEPT, ACCEPT_GRAPH);
        if let Some(token) = &request.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GraphError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphError::Network(status.as_u16().to_string()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::debug!(
            "Graph response {} with content type {:?}",
            status,
            content_type
        );

        let body = response
            .text()
            .await
            .map_err(|e| GraphError::Network(e.to_string()))?;

        if is_json_content_type(content_type.as_deref()) {
            parse_json(&body)
        } else {
            classify_text(content_type.as_deref(), &body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::Payload;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn request(url: String, token: Option<&str>) -> GraphRequest {
        GraphRequest::new(url, token.map(str::to_string), None)
    }

    #[tokio::test]
    async fn test_svg_with_bearer_token_and_accept_header() {
        let router = Router::new().route(
            "/meteogram.svg",
            get(|headers: HeaderMap| async move {
                let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
                let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
                if auth != Some("Bearer secret") || accept != Some(ACCEPT_GRAPH) {
                    return (StatusCode::UNAUTHORIZED, [(header::CONTENT_TYPE, "text/plain")], "no");
                }
                (StatusCode::OK, [(header::CONTENT_TYPE, "image/svg+xml")], "<svg/>")
            }),
        );
        let base = serve(router).await;
        let repository = HttpGraphRepository::default();

        let result = repository
            .fetch_graph(&request(format!("{}/meteogram.svg", base), Some("secret")))
            .await;
        assert_eq!(result, Ok(Payload::Svg("<svg/>".to_string())));
    }

    #[tokio::test]
    async fn test_json_and_status_classification() {
        let router = Router::new()
            .route("/wave", get(|| async { axum::Json(json!({ "timeseries": [] })) }))
            .route(
                "/broken",
                get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{oops") }),
            )
            .route("/html", get(|| async { axum::response::Html("<p>graph:</p><svg></svg>") }))
            .route("/text", get(|| async { "just words" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(router).await;
        let repository = HttpGraphRepository::default();

        let wave = repository.fetch_graph(&request(format!("{}/wave", base), None)).await;
        assert_eq!(wave, Ok(Payload::Json(json!({ "timeseries": [] }))));

        let broken = repository.fetch_graph(&request(format!("{}/broken", base), None)).await;
        assert!(matches!(broken, Err(GraphError::Parse(_))));

        let html = repository.fetch_graph(&request(format!("{}/html", base), None)).await;
        assert_eq!(html, Ok(Payload::Svg("<svg></svg>".to_string())));

        let text = repository.fetch_graph(&request(format!("{}/text", base), None)).await;
        assert_eq!(text, Err(GraphError::UnsupportedContentType));

        let missing = repository.fetch_graph(&request(format!("{}/missing", base), None)).await;
        assert_eq!(missing.unwrap_err().to_string(), "Network error: 404");
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = HttpGraphRepository::default()
            .fetch_graph(&request(format!("http://{}/graph", addr), None))
            .await;
        assert!(matches!(result, Err(GraphError::Network(_))));
    }
}
