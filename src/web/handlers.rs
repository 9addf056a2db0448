use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Protected landing page; only reachable once the gate lets the request through
pub async fn protected_handler(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "Serving protected resource");
    Json(json!({
        "status": "granted",
        "path": uri.path(),
    }))
}
