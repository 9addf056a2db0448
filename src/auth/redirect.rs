//! Turning a redirect decision into an HTTP response

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use super::error::ConfigError;

pub trait RedirectStrategy: Send + Sync {
    fn redirect(&self, request_headers: &HeaderMap, login_url: &str) -> Response;
}

/// Plain `302 Found` with a `Location` header
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRedirectStrategy;

impl RedirectStrategy for DefaultRedirectStrategy {
    fn redirect(&self, _request_headers: &HeaderMap, login_url: &str) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, login_url.to_string())]).into_response()
    }
}

/// Script-driven requests cannot follow a cross-origin redirect to CAS, so
/// they get a `401` carrying the login URL instead. Browser navigations
/// still get the normal redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct AjaxAwareRedirectStrategy;

fn is_script_request(headers: &HeaderMap) -> bool {
    let xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json") && !v.contains("text/html"));

    xhr || wants_json
}

impl RedirectStrategy for AjaxAwareRedirectStrategy {
    fn redirect(&self, request_headers: &HeaderMap, login_url: &str) -> Response {
        if !is_script_request(request_headers) {
            return DefaultRedirectStrategy.redirect(request_headers, login_url);
        }

        tracing::debug!(
            event = "gate_redirect_script_request",
            "Answering script request with 401 instead of redirect"
        );
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Authentication required",
                "login_url": login_url,
                "code": "AUTHENTICATION_REQUIRED"
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectStrategyKind {
    #[default]
    Default,
    Ajax,
}

impl FromStr for RedirectStrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEFAULT" => Ok(RedirectStrategyKind::Default),
            "AJAX" => Ok(RedirectStrategyKind::Ajax),
            other => Err(ConfigError::UnknownRedirectStrategy(other.to_string())),
        }
    }
}

pub fn build_redirect_strategy(kind: RedirectStrategyKind) -> Arc<dyn RedirectStrategy> {
    match kind {
        RedirectStrategyKind::Default => Arc::new(DefaultRedirectStrategy),
        RedirectStrategyKind::Ajax => Arc::new(AjaxAwareRedirectStrategy),
    }
}
