use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and whether AI food parsing is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let ai_model = state
        .ai_available()
        .then_some(state.config.cloudflare_ai_model.as_str());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fitlog-api",
        "ai_available": state.ai_available(),
        "ai_model": ai_model
    }))
}
