use std::sync::Arc;

use crate::analysis::engine::AnalysisEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; remote analysis is enabled only when a credential was configured.
    pub engine: Arc<AnalysisEngine>,
    pub config: Config,
}
