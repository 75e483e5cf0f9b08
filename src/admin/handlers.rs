use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::http::server::AppState;

/// `PUT /config`: merge the body into the running configuration.
///
/// Echoes the configuration now in effect, without its secrets.
pub async fn put_config(State(state): State<AppState>, Json(partial): Json<Value>) -> Response {
    if !partial.is_object() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "configuration must be a JSON object" })),
        )
            .into_response();
    }

    match state.scheduler.reconfigure(partial).await {
        Ok(config) => {
            tracing::info!(
                parallel = config.parallel,
                interval_ms = config.interval,
                index_pct = config.index_pct,
                base_url = %config.base_url,
                "Configuration updated"
            );
            Json(state.store.public_view()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected configuration update");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Catch-all: the current `{ req, res }` stats document, pretty printed.
pub async fn get_stats(State(state): State<AppState>) -> Response {
    match serde_json::to_string_pretty(&state.stats.snapshot()) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize stats");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
