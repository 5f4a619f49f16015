// Domain layer - Graph sources, payloads, wave samples and theme
pub mod error;
pub mod graph_source;
pub mod payload;
pub mod theme;
pub mod wave;
