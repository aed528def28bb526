use std::sync::Arc;

use crate::config::Config;
use crate::document::RenderPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Normalize → template → engine. Holds no per-request state.
    pub pipeline: Arc<RenderPipeline>,
}
