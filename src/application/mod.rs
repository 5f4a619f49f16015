// Application layer - Graph pipeline and widget use cases
pub mod chart_synthesizer;
pub mod graph_repository;
pub mod refresh_scheduler;
pub mod svg_normalizer;
pub mod theme_recolorer;
pub mod widget_service;
