// Errors surfaced by the graph pipeline
use thiserror::Error;

/// Every failure the fetch/synthesize/normalize pipeline can produce.
///
/// The `Display` text is what the widget shows to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported content type")]
    UnsupportedContentType,

    #[error("Invalid SVG content")]
    InvalidSvgContent,

    #[error("Invalid JSON format")]
    InvalidJsonFormat,

    #[error("Missing timeseries in Waveforecast data")]
    MissingTimeseries,

    #[error("Wave height missing in timeseries")]
    MissingWaveHeight,
}
