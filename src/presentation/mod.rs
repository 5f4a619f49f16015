// Presentation layer - HTTP handlers, rendering and the CORS relay
pub mod app_state;
pub mod handlers;
pub mod relay;
pub mod render;
