// Repository trait for graph content access
use crate::domain::graph_source::GraphRequest;
use crate::domain::payload::FetchResult;
use async_trait::async_trait;

#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Perform a single read of the graph source and classify what came back.
    /// Failures are returned as values, never panics.
    async fn fetch_graph(&self, request: &GraphRequest) -> FetchResult;
}
