// Graph source domain model

/// A single upstream read: where to fetch and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    pub url: String,
    pub api_token: Option<String>,
    pub cors_relay: Option<String>,
}

impl GraphRequest {
    pub fn new(url: String, api_token: Option<String>, cors_relay: Option<String>) -> Self {
        Self {
            url,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            cors_relay: cors_relay.filter(|r| !r.trim().is_empty()),
        }
    }

    /// URL actually requested, routed through the relay prefix when one is set
    pub fn target_url(&self) -> String {
        match &self.cors_relay {
            Some(relay) => format!("{}{}", relay, urlencoding::encode(&self.url)),
            None => self.url.clone(),
        }
    }
}

/// Where a widget gets its graph from. A URL always wins over inline SVG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    Remote(GraphRequest),
    Inline(String),
    Unconfigured,
}

impl GraphSource {
    pub fn resolve(
        source_url: &str,
        api_token: Option<&str>,
        cors_relay: Option<&str>,
        svg_code: &str,
    ) -> Self {
        let url = source_url.trim();
        if !url.is_empty() {
            return GraphSource::Remote(GraphRequest::new(
                url.to_string(),
                api_token.map(str::to_string),
                cors_relay.map(str::to_string),
            ));
        }

        if is_usable_inline(svg_code) {
            GraphSource::Inline(svg_code.to_string())
        } else {
            GraphSource::Unconfigured
        }
    }
}

/// Inline code that is empty or starts with a comment is a disabled placeholder
pub fn is_usable_inline(svg_code: &str) -> bool {
    let trimmed = svg_code.trim();
    !trimmed.is_empty() && !trimmed.starts_with("<!--")
}
