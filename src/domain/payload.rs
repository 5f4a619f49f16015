// Fetched payload classification
use super::error::GraphError;

/// Content read from a graph source, classified by type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Svg(String),
    Json(serde_json::Value),
}

pub type FetchResult = Result<Payload, GraphError>;

pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

pub fn parse_json(body: &str) -> FetchResult {
    serde_json::from_str(body)
        .map(Payload::Json)
        .map_err(|e| GraphError::Parse(e.to_string()))
}

/// Classify a non-JSON body: declared SVG or an SVG document is taken as-is,
/// an `<svg>` element embedded in other markup (HTML) is cut out.
pub fn classify_text(content_type: Option<&str>, body: &str) -> FetchResult {
    let trimmed = body.trim();
    let declared_svg = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("image/svg+xml"))
        .unwrap_or(false);

    if declared_svg || trimmed.starts_with("<svg") || trimmed.starts_with("<?xml") {
        return Ok(Payload::Svg(trimmed.to_string()));
    }

    match extract_svg_element(trimmed) {
        Some(svg) => Ok(Payload::Svg(svg.to_string())),
        None => Err(GraphError::UnsupportedContentType),
    }
}

/// First `<svg>` element in `markup`, including nested svg children.
/// An unterminated element runs to the end of the input.
pub fn extract_svg_element(markup: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `markup`
    let lower = markup.to_ascii_lowercase();
    let start = find_open_tag(&lower, 0)?;

    let mut depth = 0usize;
    let mut cursor = start;
    loop {
        let next_open = find_open_tag(&lower, cursor);
        let next_close = lower[cursor..].find("</svg").map(|i| cursor + i);

        match (next_open, next_close) {
            (Some(open), close) if close.is_none_or(|c| open < c) => {
                let tag_end = lower[open..].find('>').map(|i| open + i)?;
                let self_closing = lower[..tag_end].ends_with('/');
                if self_closing && depth == 0 {
                    return Some(&markup[start..=tag_end]);
                }
                if !self_closing {
                    depth += 1;
                }
                cursor = tag_end + 1;
            }
            (_, Some(close)) => {
                depth = depth.saturating_sub(1);
                let end = lower[close..].find('>').map(|i| close + i + 1)?;
                if depth == 0 {
                    return Some(&markup[start..end]);
                }
                cursor = end;
            }
            (_, None) => return Some(&markup[start..]),
        }
    }
}

fn find_open_tag(lower: &str, from: usize) -> Option<usize> {
    let mut cursor = from;
    while let Some(offset) = lower[cursor..].find("<svg") {
        let idx = cursor + offset;
        match lower[idx + 4..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(idx),
            None => return None,
            _ => cursor = idx + 4,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_svg_is_taken_verbatim() {
        let body = "\n<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>\n";
        let result = classify_text(Some("image/svg+xml; charset=utf-8"), body).unwrap();
        assert_eq!(
            result,
            Payload::Svg("<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>".to_string())
        );
    }

    #[test]
    fn test_xml_prologue_is_sniffed() {
        let body = "<?xml version=\"1.0\"?><svg width=\"10\" height=\"10\"/>";
        assert!(matches!(classify_text(Some("text/plain"), body), Ok(Payload::Svg(_))));
    }

    #[test]
    fn test_svg_is_extracted_from_html() {
        let body = "<html><body><p>Forecast</p><SVG viewBox=\"0 0 1 1\"><svg x=\"16\"><path/></svg></SVG><svg id=\"other\"/></body></html>";
        let result = classify_text(Some("text/html"), body).unwrap();
        assert_eq!(
            result,
            Payload::Svg("<SVG viewBox=\"0 0 1 1\"><svg x=\"16\"><path/></svg></SVG>".to_string())
        );
    }

    #[test]
    fn test_svgfoo_tag_is_not_an_svg() {
        assert_eq!(
            classify_text(None, "<p><svgfoo>nope</svgfoo></p>"),
            Err(GraphError::UnsupportedContentType)
        );
    }

    #[test]
    fn test_plain_text_is_unsupported() {
        assert_eq!(
            classify_text(Some("text/plain"), "Service unavailable"),
            Err(GraphError::UnsupportedContentType)
        );
    }

    #[test]
    fn test_json_parse_error_message() {
        let err = parse_json("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Parse error: "));
        assert!(is_json_content_type(Some("Application/JSON; charset=utf-8")));
        assert!(!is_json_content_type(None));
    }
}
