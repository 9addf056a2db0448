//! Axum middleware mounting the gate in front of a router
//!
//! Exactly one outcome per request: the inner service runs, the caller is
//! redirected to CAS, or an error response is returned.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::gate::Decision;
use super::helpers::build_session_cookie;
use super::request::RequestContext;
use crate::AppState;

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "message": message,
            "code": "SERVICE_URL_UNAVAILABLE"
        })),
    )
        .into_response()
}

pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let mut ctx = RequestContext::from_parts(&parts, state.sessions.clone());

    let decision = match state.gate.decide(&mut ctx) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(
                event = "gate_error",
                path = %parts.uri.path(),
                error = %e,
                "Authentication gate failed; aborting request"
            );
            return internal_error(e.to_string());
        }
    };

    let mut response = match decision {
        Decision::Proceed => {
            return next.run(Request::from_parts(parts, body)).await;
        }
        Decision::RedirectTo(url) => state.redirect_strategy.redirect(&parts.headers, &url),
    };

    // A gateway attempt may have created the session; hand its id to the browser
    if let Some(session_id) = ctx.created_session_id() {
        let cookie = build_session_cookie(session_id, state.config.is_production());
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to create session cookie header"
                );
            }
        }
    }

    response
}
