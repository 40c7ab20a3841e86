use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyser"
    }))
}

/// GET /api/v1/diagnostics
/// Reports whether remote analysis is active and whether the key looks well formed.
/// The key is only ever returned masked.
pub async fn diagnostics_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "configured": state.config.is_remote_configured(),
        "credential": state.config.credential_check(),
        "masked_key": state.config.masked_api_key(),
        "model": state.engine.remote_model(),
    }))
}
